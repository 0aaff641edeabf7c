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
use byteview::ByteView;
use enum_primitive_derive::Primitive;

#[derive(Debug, Ord, PartialOrd, Copy, Clone, Eq, PartialEq, Hash, Primitive)]
pub enum VerbFlag {
    Read = 0,
    Write = 1,
    Exec = 2,
    Debug = 3,
}

pub fn verb_perms_string(perms: BitEnum<VerbFlag>) -> String {
    let mut perms_string = String::new();
    if perms.contains(VerbFlag::Read) {
        perms_string.push('r');
    }
    if perms.contains(VerbFlag::Write) {
        perms_string.push('w');
    }
    if perms.contains(VerbFlag::Exec) {
        perms_string.push('x');
    }
    if perms.contains(VerbFlag::Debug) {
        perms_string.push('d');
    }

    perms_string
}

impl VerbFlag {
    pub fn parse_str(s: &str) -> Option<BitEnum<Self>> {
        let mut flags = BitEnum::new();
        for c in s.chars() {
            match c {
                'r' => flags |= VerbFlag::Read,
                'w' => flags |= VerbFlag::Write,
                'x' => flags |= VerbFlag::Exec,
                'd' => flags |= VerbFlag::Debug,
                _ => return None,
            }
        }
        Some(flags)
    }

    #[must_use]
    pub fn rwxd() -> BitEnum<Self> {
        BitEnum::new_with(Self::Read) | Self::Write | Self::Exec | Self::Debug
    }
    #[must_use]
    pub fn rx() -> BitEnum<Self> {
        BitEnum::new_with(Self::Read) | Self::Exec
    }
    #[must_use]
    pub fn rxd() -> BitEnum<Self> {
        BitEnum::new_with(Self::Read) | Self::Exec | Self::Debug
    }
    #[must_use]
    pub fn r() -> BitEnum<Self> {
        BitEnum::new_with(Self::Read)
    }
}

/// The program type encoded for a verb.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Primitive)]
#[repr(u8)]
pub enum BinaryType {
    /// Empty code blobs.
    None = 0,
    /// Compiled LambdaMOO-style opcodes, owned by the VM.
    LambdaMoo18X = 1,
}

/// A compiled verb body. Opaque here: the database stores and returns it, only the VM decodes it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VerbProgram {
    binary_type: BinaryType,
    bytes: ByteView,
}

impl VerbProgram {
    #[must_use]
    pub fn new(binary_type: BinaryType, bytes: &[u8]) -> Self {
        Self {
            binary_type,
            bytes: ByteView::new(bytes),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(BinaryType::None, &[])
    }

    #[must_use]
    pub fn binary_type(&self) -> BinaryType {
        self.binary_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for VerbProgram {
    fn default() -> Self {
        Self::empty()
    }
}
