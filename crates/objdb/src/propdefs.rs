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

use moor_common::model::PropPerms;
use moor_var::{Obj, Symbol, Var};

/// A property definition, owned by exactly one object: its definer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropDef {
    definer: Obj,
    name: Symbol,
    hash: u64,
}

impl PropDef {
    #[must_use]
    pub fn new(definer: Obj, name: Symbol) -> Self {
        Self {
            definer,
            name,
            hash: name.hash_u64(),
        }
    }

    #[must_use]
    pub fn definer(&self) -> Obj {
        self.definer
    }

    #[must_use]
    pub fn name(&self) -> Symbol {
        self.name
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn matches(&self, name: Symbol) -> bool {
        self.hash == name.hash_u64() && self.name == name
    }

    pub(crate) fn renamed(self, name: Symbol) -> Self {
        Self::new(self.definer, name)
    }
}

/// The contents of a property value slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropValue {
    /// No local override; the value comes from the nearest ancestor along the path to the
    /// definer that has one.
    Inherited,
    Set(Var),
}

impl PropValue {
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        matches!(self, PropValue::Inherited)
    }
}

/// One entry of an object's flat property value array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropSlot {
    pub value: PropValue,
    pub perms: PropPerms,
}

impl PropSlot {
    #[must_use]
    pub fn set(value: Var, perms: PropPerms) -> Self {
        Self {
            value: PropValue::Set(value),
            perms,
        }
    }

    #[must_use]
    pub fn inherited(perms: PropPerms) -> Self {
        Self {
            value: PropValue::Inherited,
            perms,
        }
    }
}
