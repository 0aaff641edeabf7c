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

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

use crate::error::DecodingError;

/// The "system" object. Where $name style references hang off of.
pub const SYSTEM_OBJECT: Obj = Obj::mk_id(0);

/// Used throughout to refer to a missing object value.
pub const NOTHING: Obj = Obj::mk_id(-1);

const OBJID_TYPE_CODE: u8 = 0;
const ANONYMOUS_TYPE_CODE: u8 = 1;

/// A reference to an object.
///
/// Either a numbered database object (`#123`), or an anonymous object which lives in the
/// object table's side table and has no stable number.
///
/// Internal representation: lower 32 bits hold the id, top 3 bits a kind code.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Obj(u64);

impl Obj {
    pub const fn mk_id(id: i32) -> Self {
        // `as u32` on an i32 reinterprets the bits; no sign extension into the upper word.
        let as_u64 = (id as u32) as u64;
        Self(as_u64 | ((OBJID_TYPE_CODE as u64) << 61))
    }

    pub const fn mk_anonymous(id: u32) -> Self {
        Self((id as u64) | ((ANONYMOUS_TYPE_CODE as u64) << 61))
    }

    fn type_code(&self) -> u8 {
        (self.0 >> 61) as u8
    }

    fn low_bits(&self) -> u32 {
        (self.0 & 0x0000_0000_ffff_ffff) as u32
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.type_code() == ANONYMOUS_TYPE_CODE
    }

    #[must_use]
    pub fn is_numbered(&self) -> bool {
        self.type_code() == OBJID_TYPE_CODE
    }

    /// The numeric id of a numbered object. Anonymous objects have none.
    #[must_use]
    pub fn id(&self) -> Option<i32> {
        self.is_numbered().then(|| self.low_bits() as i32)
    }

    /// Dense, non-negative index for numbered objects, suitable for addressing the object table.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.id().and_then(|id| usize::try_from(id).ok())
    }

    #[must_use]
    pub fn anonymous_id(&self) -> Option<u32> {
        self.is_anonymous().then(|| self.low_bits())
    }

    #[must_use]
    pub fn is_nothing(&self) -> bool {
        *self == NOTHING
    }

    #[must_use]
    pub fn is_sysobj(&self) -> bool {
        *self == SYSTEM_OBJECT
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.id().is_some_and(|id| id >= 0)
    }

    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn to_literal(&self) -> String {
        self.to_string()
    }
}

impl Display for Obj {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.type_code() {
            ANONYMOUS_TYPE_CODE => write!(f, "*anonymous {}*", self.low_bits()),
            _ => write!(f, "#{}", self.low_bits() as i32),
        }
    }
}

impl Debug for Obj {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl TryFrom<&str> for Obj {
    type Error = DecodingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let Some(digits) = value.strip_prefix('#') else {
            return Err(DecodingError::CouldNotDecode(format!(
                "Expected object literal to start with '#', got {value}"
            )));
        };
        let id = digits.parse::<i32>().map_err(|e| {
            DecodingError::CouldNotDecode(format!("Could not parse object id {value}: {e}"))
        })?;
        Ok(Self::mk_id(id))
    }
}
