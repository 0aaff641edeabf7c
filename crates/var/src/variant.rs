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

use crate::{Error, Obj, Symbol};
use arcstr::ArcStr;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Our series of types
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Variant {
    None,
    Bool(bool),
    Obj(Obj),
    Int(i64),
    Float(f64),
    Str(ArcStr),
    Sym(Symbol),
    Err(Arc<Error>),
    List(imbl::Vector<crate::Var>),
}

impl Hash for Variant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Variant::None => {}
            Variant::Bool(b) => b.hash(state),
            Variant::Obj(o) => o.hash(state),
            Variant::Int(i) => i.hash(state),
            Variant::Float(f) => f.to_bits().hash(state),
            Variant::Str(s) => s.to_lowercase().hash(state),
            Variant::Sym(s) => s.hash(state),
            Variant::Err(e) => e.hash(state),
            Variant::List(l) => l.hash(state),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::None, Variant::None) => true,
            (Variant::Bool(l), Variant::Bool(r)) => l == r,
            (Variant::Obj(l), Variant::Obj(r)) => l == r,
            (Variant::Int(l), Variant::Int(r)) => l == r,
            (Variant::Float(l), Variant::Float(r)) => l.to_bits() == r.to_bits(),
            // MOO string equality is case-insensitive.
            (Variant::Str(l), Variant::Str(r)) => l.eq_ignore_ascii_case(r),
            (Variant::Sym(l), Variant::Sym(r)) => l == r,
            (Variant::Err(l), Variant::Err(r)) => l.err_type == r.err_type,
            (Variant::List(l), Variant::List(r)) => l == r,
            _ => false,
        }
    }
}

impl Eq for Variant {}
