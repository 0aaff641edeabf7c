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

use crate::util::BitEnum;
use enum_primitive_derive::Primitive;
use moor_var::Obj;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Primitive)]
pub enum PropFlag {
    Read = 0,
    Write = 1,
    Chown = 2,
}

impl PropFlag {
    pub fn parse_str(s: &str) -> Option<BitEnum<PropFlag>> {
        let mut flags = BitEnum::new();
        for c in s.chars() {
            match c {
                'r' => flags |= PropFlag::Read,
                'w' => flags |= PropFlag::Write,
                'c' => flags |= PropFlag::Chown,
                _ => return None,
            }
        }
        Some(flags)
    }

    #[must_use]
    pub fn rw() -> BitEnum<PropFlag> {
        BitEnum::new_with(PropFlag::Read) | PropFlag::Write
    }

    #[must_use]
    pub fn rc() -> BitEnum<PropFlag> {
        BitEnum::new_with(PropFlag::Read) | PropFlag::Chown
    }

    #[must_use]
    pub fn r() -> BitEnum<PropFlag> {
        BitEnum::new_with(PropFlag::Read)
    }
}

pub fn prop_flags_string(flags: BitEnum<PropFlag>) -> String {
    let mut s = String::new();
    if flags.contains(PropFlag::Read) {
        s.push('r');
    }
    if flags.contains(PropFlag::Write) {
        s.push('w');
    }
    if flags.contains(PropFlag::Chown) {
        s.push('c');
    }
    s
}

/// Owner and permission bits carried by every property value slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropPerms {
    owner: Obj,
    flags: BitEnum<PropFlag>,
}

impl PropPerms {
    #[must_use]
    pub fn new(owner: Obj, flags: BitEnum<PropFlag>) -> Self {
        Self { owner, flags }
    }

    #[must_use]
    pub fn owner(&self) -> Obj {
        self.owner
    }

    #[must_use]
    pub fn flags(&self) -> BitEnum<PropFlag> {
        self.flags
    }

    #[must_use]
    pub fn with_owner(self, owner: Obj) -> Self {
        Self { owner, ..self }
    }

    #[must_use]
    pub fn with_flags(self, flags: BitEnum<PropFlag>) -> Self {
        Self { flags, ..self }
    }
}
