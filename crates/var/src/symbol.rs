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

//! Interned, case-insensitive names.
//!
//! Property and verb names are compared case-insensitively but displayed with the case they
//! were written in. A `Symbol` carries two ids:
//! - `compare_id`: shared by every case variant of the same string; drives `Eq`/`Hash`.
//! - `repr_id`: identifies the exact spelling, for display.
//!
//! The compare id doubles as the precomputed name hash used by property definitions and the
//! verb resolution cache.

use ahash::AHashMap;
use arcstr::ArcStr;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::RwLock;
use unicase::UniCase;

#[derive(Default)]
struct Interner {
    compare_ids: AHashMap<UniCase<ArcStr>, u32>,
    repr_ids: AHashMap<ArcStr, (u32, u32)>,
    reprs: Vec<ArcStr>,
}

impl Interner {
    fn intern(&mut self, s: &str) -> Symbol {
        if let Some((repr_id, compare_id)) = self.repr_ids.get(s) {
            return Symbol {
                compare_id: *compare_id,
                repr_id: *repr_id,
            };
        }
        let arc = ArcStr::from(s);
        let next_compare = self.compare_ids.len() as u32;
        let compare_id = *self
            .compare_ids
            .entry(UniCase::new(arc.clone()))
            .or_insert(next_compare);
        let repr_id = self.reprs.len() as u32;
        self.reprs.push(arc.clone());
        self.repr_ids.insert(arc, (repr_id, compare_id));
        Symbol {
            compare_id,
            repr_id,
        }
    }
}

static INTERNER: Lazy<RwLock<Interner>> = Lazy::new(|| RwLock::new(Interner::default()));

#[derive(Copy, Clone)]
pub struct Symbol {
    compare_id: u32,
    repr_id: u32,
}

impl Symbol {
    /// Intern `s`, returning its symbol. Case variants share a `compare_id`.
    pub fn mk(s: &str) -> Self {
        {
            let interner = INTERNER.read().unwrap_or_else(|e| e.into_inner());
            if let Some((repr_id, compare_id)) = interner.repr_ids.get(s) {
                return Self {
                    compare_id: *compare_id,
                    repr_id: *repr_id,
                };
            }
        }
        INTERNER
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .intern(s)
    }

    #[must_use]
    pub fn compare_id(&self) -> u32 {
        self.compare_id
    }

    /// A well-mixed 64-bit hash of the case-folded name.
    #[must_use]
    pub fn hash_u64(&self) -> u64 {
        // Fibonacci hashing spreads the dense compare ids across the whole word.
        u64::from(self.compare_id).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    #[must_use]
    pub fn as_arc_str(&self) -> ArcStr {
        let interner = INTERNER.read().unwrap_or_else(|e| e.into_inner());
        interner.reprs[self.repr_id as usize].clone()
    }

    #[must_use]
    pub fn as_string(&self) -> String {
        self.as_arc_str().to_string()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.compare_id == other.compare_id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.compare_id.hash(state);
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_arc_str())
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.as_arc_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::mk(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_arc_str())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol::mk(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_equality() {
        let a = Symbol::mk("Look");
        let b = Symbol::mk("look");
        let c = Symbol::mk("LOOK");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.compare_id(), c.compare_id());
        assert_eq!(a.hash_u64(), c.hash_u64());
    }

    #[test]
    fn test_case_preserved() {
        let a = Symbol::mk("MixedCase");
        let b = Symbol::mk("mixedcase");
        assert_eq!(a.to_string(), "MixedCase");
        assert_eq!(b.to_string(), "mixedcase");
    }

    #[test]
    fn test_distinct_names() {
        assert_ne!(Symbol::mk("get"), Symbol::mk("give"));
    }

    #[test]
    fn test_serde() {
        let sym = Symbol::mk("description");
        let json = serde_json::to_string(&sym).unwrap();
        assert_eq!(json, "\"description\"");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sym);
    }
}
