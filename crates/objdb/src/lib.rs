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

//! In-memory object storage for a MOO-style server: the object table, the inheritance and
//! containment resolver, per-object property layout, the verb store and its resolution cache,
//! and the permission-checked `WorldState` facade over all of it.

pub mod ancestry;
mod config;
mod dispatch;
pub mod fatal;
mod graph;
mod invariants;
mod layout;
#[cfg(test)]
mod layout_tests;
mod object_table;
mod propdefs;
mod store;
mod verb_cache;
#[cfg(test)]
mod verb_tests;
mod verbdefs;
mod verbs;
pub mod world_state;

pub use ancestry::Traversal;
pub use config::{
    DEFAULT_INITIAL_OBJECT_CAPACITY, DEFAULT_VERB_CACHE_BUCKETS,
    DEFAULT_VERB_CACHE_MAX_ENTRIES_PER_BUCKET, ObjDbConfig,
};
pub use invariants::LayoutViolation;
pub use layout::PropInfoUpdate;
pub use object_table::{ObjectRecord, ObjectTable, ParentSpec};
pub use propdefs::{PropDef, PropSlot, PropValue};
pub use store::ObjectStore;
pub use verb_cache::CacheStats;
pub use verbdefs::{VerbDef, VerbDefs};
pub use verbs::{VerbAttrs, VerbDescriptor};
pub use world_state::{DbWorldState, WorldState};
