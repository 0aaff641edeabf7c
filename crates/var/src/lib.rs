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

mod error;
mod obj;
mod symbol;
#[allow(clippy::module_inception)]
mod var;
mod variant;

pub use error::{DecodingError, Error, ErrorCode, ErrorCode::*};
pub use obj::{NOTHING, Obj, SYSTEM_OBJECT};
pub use symbol::Symbol;
pub use var::{
    Var, v_bool, v_empty_list, v_err, v_float, v_int, v_list, v_list_iter, v_none, v_obj, v_str,
    v_string, v_sym,
};
pub use variant::Variant;
