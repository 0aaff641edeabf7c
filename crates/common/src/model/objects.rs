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

#[derive(Debug, Ord, PartialOrd, Copy, Clone, Eq, PartialEq, Hash, Primitive)]
pub enum ObjFlag {
    User = 0,
    Programmer = 1,
    Wizard = 2,
    Read = 4,
    Write = 5,
    Fertile = 7,
    Anonymous = 8,
    /// Set by the object allocator on ids it has retired. Anonymous staleness is tracked through
    /// generations instead.
    Invalid = 9,
    Recycled = 10,
}

impl ObjFlag {
    /// Flags a script may toggle directly; the rest are maintained by the database.
    #[must_use]
    pub fn user_settable() -> BitEnum<Self> {
        BitEnum::new_with(Self::User)
            | Self::Programmer
            | Self::Wizard
            | Self::Read
            | Self::Write
            | Self::Fertile
    }
}

pub fn obj_flags_string(flags: BitEnum<ObjFlag>) -> String {
    let mut s = String::new();
    for (flag, c) in [
        (ObjFlag::User, 'u'),
        (ObjFlag::Programmer, 'p'),
        (ObjFlag::Wizard, 'w'),
        (ObjFlag::Read, 'r'),
        (ObjFlag::Write, 'W'),
        (ObjFlag::Fertile, 'f'),
        (ObjFlag::Anonymous, 'a'),
    ] {
        if flags.contains(flag) {
            s.push(c);
        }
    }
    s
}
