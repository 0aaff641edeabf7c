// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use crate::variant::Variant;
use crate::{Error, ErrorCode, Obj, Symbol};
use arcstr::ArcStr;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A tagged value, as stored in a property slot or passed to and from verb code.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Var(Variant);

impl Var {
    #[must_use]
    pub fn from_variant(variant: Variant) -> Self {
        Self(variant)
    }

    #[must_use]
    pub fn variant(&self) -> &Variant {
        &self.0
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self.0, Variant::None)
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match &self.0 {
            Variant::Int(i) => Some(*i),
            Variant::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<Obj> {
        match &self.0 {
            Variant::Obj(o) => Some(*o),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match &self.0 {
            Variant::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&imbl::Vector<Var>> {
        match &self.0 {
            Variant::List(l) => Some(l),
            _ => None,
        }
    }

    /// MOO truthiness: non-zero numbers, non-empty strings and lists.
    #[must_use]
    pub fn is_true(&self) -> bool {
        match &self.0 {
            Variant::Bool(b) => *b,
            Variant::Int(i) => *i != 0,
            Variant::Float(f) => *f != 0.0,
            Variant::Str(s) => !s.is_empty(),
            Variant::List(l) => !l.is_empty(),
            _ => false,
        }
    }
}

impl Default for Var {
    fn default() -> Self {
        v_none()
    }
}

impl Debug for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Variant::None => f.write_str("None"),
            Variant::Bool(b) => write!(f, "{b}"),
            Variant::Obj(o) => write!(f, "{o}"),
            Variant::Int(i) => write!(f, "{i}"),
            Variant::Float(fl) => write!(f, "{fl:?}"),
            Variant::Str(s) => write!(f, "{s:?}"),
            Variant::Sym(s) => write!(f, "'{s}"),
            Variant::Err(e) => write!(f, "{}", e.err_type),
            Variant::List(l) => {
                f.write_str("{")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<i64> for Var {
    fn from(i: i64) -> Self {
        v_int(i)
    }
}

impl From<&str> for Var {
    fn from(s: &str) -> Self {
        v_str(s)
    }
}

impl From<String> for Var {
    fn from(s: String) -> Self {
        v_string(s)
    }
}

impl From<Obj> for Var {
    fn from(o: Obj) -> Self {
        v_obj(o)
    }
}

#[must_use]
pub fn v_none() -> Var {
    Var(Variant::None)
}

#[must_use]
pub fn v_bool(b: bool) -> Var {
    Var(Variant::Bool(b))
}

#[must_use]
pub fn v_int(i: i64) -> Var {
    Var(Variant::Int(i))
}

#[must_use]
pub fn v_float(f: f64) -> Var {
    Var(Variant::Float(f))
}

#[must_use]
pub fn v_str(s: &str) -> Var {
    Var(Variant::Str(ArcStr::from(s)))
}

#[must_use]
pub fn v_string(s: String) -> Var {
    Var(Variant::Str(ArcStr::from(s)))
}

#[must_use]
pub fn v_sym(s: Symbol) -> Var {
    Var(Variant::Sym(s))
}

#[must_use]
pub fn v_obj(o: Obj) -> Var {
    Var(Variant::Obj(o))
}

#[must_use]
pub fn v_err(code: ErrorCode) -> Var {
    Var(Variant::Err(Arc::new(Error::from(code))))
}

#[must_use]
pub fn v_list(values: &[Var]) -> Var {
    Var(Variant::List(values.iter().cloned().collect()))
}

pub fn v_list_iter<I: IntoIterator<Item = Var>>(values: I) -> Var {
    Var(Variant::List(values.into_iter().collect()))
}

#[must_use]
pub fn v_empty_list() -> Var {
    Var(Variant::List(imbl::Vector::new()))
}
