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

pub use crate::model::errors::WorldStateError;
pub use crate::model::r#match::{ArgSpec, PrepSpec, Preposition, VerbArgsSpec};
pub use crate::model::objects::{ObjFlag, obj_flags_string};
pub use crate::model::permissions::Perms;
pub use crate::model::props::{PropFlag, PropPerms, prop_flags_string};
pub use crate::model::verbs::{BinaryType, VerbFlag, VerbProgram, verb_perms_string};

mod errors;
mod r#match;
mod objects;
mod permissions;
mod props;
mod verbs;
