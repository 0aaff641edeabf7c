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

use moor_var::{E_INVARG, E_INVIND, E_NACC, E_PERM, E_PROPNF, E_RECMOVE, E_VERBNF};
use moor_var::{Error, Obj};
use thiserror::Error;

/// Errors related to the world state and operations on it.
///
/// Every one of these is detected before any mutation is made.
#[derive(Error, Debug, Eq, PartialEq, Clone)]
pub enum WorldStateError {
    #[error("Object not found: {0}")]
    ObjectNotFound(Obj),
    #[error("Object permission denied")]
    ObjectPermissionDenied,
    #[error("Object {0} still has children, contents or parents")]
    ObjectNotBarren(Obj),
    #[error("Recursive move detected: {0} -> {1}")]
    RecursiveMove(Obj, Obj),
    #[error("Recursive parent detected: {0} would become its own ancestor via {1}")]
    RecursiveParent(Obj, Obj),
    #[error("Invalid parent: {0}")]
    InvalidParent(Obj),
    #[error("Duplicate parent: {0}")]
    DuplicateParent(Obj),

    #[error("Property not found: {0}.{1}")]
    PropertyNotFound(Obj, String),
    #[error("Property permission denied")]
    PropertyPermissionDenied,
    #[error("Property definition not found: {0}.{1}")]
    PropertyDefinitionNotFound(Obj, String),
    #[error("Duplicate property definition: {0}.{1}")]
    DuplicatePropertyDefinition(Obj, String),
    #[error("Property name conflict: {0}-or-descendants and {1}-or-ancestors both define {2}")]
    ChparentPropertyNameConflict(Obj, Obj, String),
    #[error("Cannot clear {0}.{1} on its defining object")]
    CannotClearDefiner(Obj, String),

    #[error("Verb not found: {0}:{1}")]
    VerbNotFound(Obj, String),
    #[error("Verb permission denied")]
    VerbPermissionDenied,
    #[error("Invalid verb descriptor: {0}:{1}")]
    InvalidVerbDescriptor(Obj, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Translations from WorldStateError to MOO error codes.
impl WorldStateError {
    #[must_use]
    pub fn to_error(&self) -> Error {
        let err_code = match self {
            Self::ObjectNotFound(_) => E_INVIND,
            Self::ObjectPermissionDenied
            | Self::VerbPermissionDenied
            | Self::PropertyPermissionDenied => E_PERM,
            Self::ObjectNotBarren(_) => E_NACC,
            Self::RecursiveMove(_, _) | Self::RecursiveParent(_, _) => E_RECMOVE,
            Self::VerbNotFound(_, _) | Self::InvalidVerbDescriptor(_, _) => E_VERBNF,
            Self::PropertyNotFound(_, _) | Self::PropertyDefinitionNotFound(_, _) => E_PROPNF,
            Self::InvalidParent(_)
            | Self::DuplicateParent(_)
            | Self::DuplicatePropertyDefinition(_, _)
            | Self::ChparentPropertyNameConflict(_, _, _)
            | Self::CannotClearDefiner(_, _)
            | Self::InvalidArgument(_) => E_INVARG,
        };

        err_code.msg(self.to_string())
    }
}

impl From<WorldStateError> for Error {
    fn from(val: WorldStateError) -> Self {
        val.to_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moor_var::ErrorCode;
    use test_case::test_case;

    #[test_case(WorldStateError::ObjectNotFound(Obj::mk_id(9)), ErrorCode::E_INVIND)]
    #[test_case(WorldStateError::PropertyPermissionDenied, ErrorCode::E_PERM)]
    #[test_case(WorldStateError::RecursiveParent(Obj::mk_id(1), Obj::mk_id(2)), ErrorCode::E_RECMOVE)]
    #[test_case(WorldStateError::ChparentPropertyNameConflict(Obj::mk_id(1), Obj::mk_id(2), "p".into()), ErrorCode::E_INVARG)]
    #[test_case(WorldStateError::PropertyDefinitionNotFound(Obj::mk_id(1), "p".into()), ErrorCode::E_PROPNF)]
    #[test_case(WorldStateError::VerbNotFound(Obj::mk_id(1), "look".into()), ErrorCode::E_VERBNF)]
    fn test_to_error(err: WorldStateError, code: ErrorCode) {
        let e = err.to_error();
        assert_eq!(e.err_type, code);
        assert_eq!(e.msg, Some(err.to_string()));
    }
}
