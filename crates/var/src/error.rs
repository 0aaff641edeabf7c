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
use strum::{Display as StrumDisplay, EnumString, FromRepr};
use thiserror::Error;

/// MOO error codes, as raised to script code.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    FromRepr,
    EnumString,
    StrumDisplay,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[allow(non_camel_case_types)]
#[strum(ascii_case_insensitive)]
pub enum ErrorCode {
    E_NONE = 0,
    E_TYPE = 1,
    E_DIV = 2,
    E_PERM = 3,
    E_PROPNF = 4,
    E_VERBNF = 5,
    E_VARNF = 6,
    E_INVIND = 7,
    E_RECMOVE = 8,
    E_MAXREC = 9,
    E_RANGE = 10,
    E_ARGS = 11,
    E_NACC = 12,
    E_INVARG = 13,
    E_QUOTA = 14,
    E_FLOAT = 15,
}

impl ErrorCode {
    #[must_use]
    pub fn msg<S: Into<String>>(self, msg: S) -> Error {
        Error::new(self, Some(msg.into()))
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E_NONE => "No error",
            ErrorCode::E_TYPE => "Type mismatch",
            ErrorCode::E_DIV => "Division by zero",
            ErrorCode::E_PERM => "Permission denied",
            ErrorCode::E_PROPNF => "Property not found",
            ErrorCode::E_VERBNF => "Verb not found",
            ErrorCode::E_VARNF => "Variable not found",
            ErrorCode::E_INVIND => "Invalid indirection",
            ErrorCode::E_RECMOVE => "Recursive move",
            ErrorCode::E_MAXREC => "Too many verb calls",
            ErrorCode::E_RANGE => "Range error",
            ErrorCode::E_ARGS => "Incorrect number of arguments",
            ErrorCode::E_NACC => "Move refused by destination",
            ErrorCode::E_INVARG => "Invalid argument",
            ErrorCode::E_QUOTA => "Resource limit exceeded",
            ErrorCode::E_FLOAT => "Floating-point arithmetic error",
        }
    }
}

/// An error value: a code plus an optional message.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Error {
    pub err_type: ErrorCode,
    pub msg: Option<String>,
}

impl Error {
    #[must_use]
    pub fn new(err_type: ErrorCode, msg: Option<String>) -> Self {
        Self { err_type, msg }
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.msg
            .clone()
            .unwrap_or_else(|| self.err_type.description().to_string())
    }
}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Self::new(code, None)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.err_type)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.msg {
            Some(msg) => write!(f, "{} ({msg})", self.err_type),
            None => write!(f, "{}", self.err_type),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum DecodingError {
    #[error("Could not decode: {0}")]
    CouldNotDecode(String),
}
