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

use crate::ancestry::{self, Traversal};
use crate::config::ObjDbConfig;
use crate::graph;
use crate::object_table::{ObjectRecord, ObjectTable, ParentSpec};
use crate::verb_cache::{CacheStats, VerbResolutionCache};
use moor_common::model::{ObjFlag, WorldStateError};
use moor_common::util::BitEnum;
use moor_var::{NOTHING, Obj};
use tracing::debug;

/// The object database: object table, inheritance graph, property layouts, verbs, and the verb
/// resolution cache.
///
/// Mutating operations take `&mut self` and run to completion, so readers never observe a
/// half-updated layout.
pub struct ObjectStore {
    pub(crate) table: ObjectTable,
    pub(crate) verb_cache: VerbResolutionCache,
    pub(crate) config: ObjDbConfig,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new(ObjDbConfig::default())
    }
}

impl ObjectStore {
    #[must_use]
    pub fn new(config: ObjDbConfig) -> Self {
        let config = config.normalized();
        Self {
            table: ObjectTable::with_capacity(config.initial_object_capacity),
            verb_cache: VerbResolutionCache::new(&config),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ObjDbConfig {
        &self.config
    }

    /// Read-only access to the raw records, e.g. for persistence.
    #[must_use]
    pub fn table(&self) -> &ObjectTable {
        &self.table
    }

    #[must_use]
    pub fn verb_cache_stats(&self) -> CacheStats {
        self.verb_cache.stats()
    }

    pub fn flush_verb_cache(&mut self) {
        self.verb_cache.flush();
    }

    /// The record for a valid object, or `ObjectNotFound`.
    pub(crate) fn record(&self, obj: Obj) -> Result<&ObjectRecord, WorldStateError> {
        if !self.valid(obj) {
            return Err(WorldStateError::ObjectNotFound(obj));
        }
        self.table
            .get(obj)
            .ok_or(WorldStateError::ObjectNotFound(obj))
    }

    pub(crate) fn record_mut(&mut self, obj: Obj) -> Result<&mut ObjectRecord, WorldStateError> {
        if !self.valid(obj) {
            return Err(WorldStateError::ObjectNotFound(obj));
        }
        self.table
            .get_mut(obj)
            .ok_or(WorldStateError::ObjectNotFound(obj))
    }

    /// Numbered objects are valid when present and not flagged invalid or recycled. Anonymous
    /// objects must also be no older than any of their ancestors: an ancestor with a newer
    /// generation has re-laid-out its properties since this object's layout was built.
    #[must_use]
    pub fn valid(&self, obj: Obj) -> bool {
        let Some(record) = self.table.get(obj) else {
            return false;
        };
        if !record.is_live() {
            return false;
        }
        if obj.is_numbered() {
            return true;
        }
        let generation = record.generation;
        record.parents.as_slice().iter().all(|p| self.valid(*p))
            && ancestry::ancestors(&self.table, obj, false)
                .into_iter()
                .all(|a| self.table.get(a).is_some_and(|r| r.generation <= generation))
    }

    #[must_use]
    pub fn max_object(&self) -> Obj {
        self.table.max_object()
    }

    /// Every valid numbered object, ascending.
    #[must_use]
    pub fn objects(&self) -> Vec<Obj> {
        self.table
            .numbered_ids()
            .filter(|o| self.valid(*o))
            .collect()
    }

    #[must_use]
    pub fn players(&self) -> Vec<Obj> {
        self.table
            .records()
            .filter(|r| r.flags.contains(ObjFlag::User) && self.valid(r.id))
            .map(|r| r.id)
            .collect()
    }

    /// Retire `obj` without releasing its id. Used by the object allocator for objects it has
    /// stopped handing out; the record stays in place but no longer resolves.
    pub fn invalidate(&mut self, obj: Obj) -> Result<(), WorldStateError> {
        let Some(record) = self.table.get_mut(obj) else {
            return Err(WorldStateError::ObjectNotFound(obj));
        };
        record.flags.set(ObjFlag::Invalid);
        self.verb_cache.flush();
        debug!(?obj, "invalidated object");
        Ok(())
    }

    pub fn owner_of(&self, obj: Obj) -> Result<Obj, WorldStateError> {
        Ok(self.record(obj)?.owner)
    }

    pub fn set_owner(&mut self, obj: Obj, owner: Obj) -> Result<(), WorldStateError> {
        self.record_mut(obj)?.owner = owner;
        Ok(())
    }

    pub fn name_of(&self, obj: Obj) -> Result<String, WorldStateError> {
        Ok(self.record(obj)?.name.clone())
    }

    pub fn set_name(&mut self, obj: Obj, name: &str) -> Result<(), WorldStateError> {
        self.record_mut(obj)?.name = name.to_string();
        Ok(())
    }

    pub fn flags_of(&self, obj: Obj) -> Result<BitEnum<ObjFlag>, WorldStateError> {
        Ok(self.record(obj)?.flags)
    }

    /// Replace the script-settable flags. `Anonymous`, `Invalid` and `Recycled` are kept as the
    /// database maintains them.
    pub fn set_flags(&mut self, obj: Obj, flags: BitEnum<ObjFlag>) -> Result<(), WorldStateError> {
        let settable = ObjFlag::user_settable().to_u16();
        let record = self.record_mut(obj)?;
        let kept = record.flags.to_u16() & !settable;
        record.flags = BitEnum::from_u16(kept | (flags.to_u16() & settable));
        Ok(())
    }

    pub fn parents_of(&self, obj: Obj) -> Result<ParentSpec, WorldStateError> {
        Ok(self.record(obj)?.parents.clone())
    }

    pub fn children_of(&self, obj: Obj) -> Result<Vec<Obj>, WorldStateError> {
        Ok(self.record(obj)?.children.clone())
    }

    pub fn location_of(&self, obj: Obj) -> Result<Obj, WorldStateError> {
        Ok(self.record(obj)?.location)
    }

    pub fn contents_of(&self, obj: Obj) -> Result<Vec<Obj>, WorldStateError> {
        Ok(self.record(obj)?.contents.clone())
    }

    fn resolve(&self, obj: Obj, traversal: Traversal, include_self: bool) -> Vec<Obj> {
        if !self.valid(obj) {
            return Vec::new();
        }
        ancestry::resolve(&self.table, obj, traversal, include_self)
    }

    /// Inheritance ancestors in lookup order. Empty for an invalid object.
    #[must_use]
    pub fn ancestors(&self, obj: Obj, include_self: bool) -> Vec<Obj> {
        self.resolve(obj, Traversal::Ancestors, include_self)
    }

    #[must_use]
    pub fn descendants(&self, obj: Obj, include_self: bool) -> Vec<Obj> {
        self.resolve(obj, Traversal::Descendants, include_self)
    }

    #[must_use]
    pub fn all_locations(&self, obj: Obj, include_self: bool) -> Vec<Obj> {
        self.resolve(obj, Traversal::Locations, include_self)
    }

    #[must_use]
    pub fn all_contents(&self, obj: Obj, include_self: bool) -> Vec<Obj> {
        self.resolve(obj, Traversal::Contents, include_self)
    }

    /// False whenever `obj` is invalid.
    #[must_use]
    pub fn isa(&self, obj: Obj, ancestor: Obj) -> bool {
        self.valid(obj) && ancestry::isa(&self.table, obj, ancestor)
    }

    #[must_use]
    pub fn ancestor_count(&self, obj: Obj) -> usize {
        if !self.valid(obj) {
            return 0;
        }
        ancestry::ancestor_count(&self.table, obj)
    }

    /// Allocate the next numbered object and lay it out under `parents`. An `owner` of `#-1`
    /// makes the object its own owner.
    pub fn create_object(
        &mut self,
        owner: Obj,
        name: &str,
        flags: BitEnum<ObjFlag>,
        parents: ParentSpec,
    ) -> Result<Obj, WorldStateError> {
        let settable = BitEnum::from_u16(flags.to_u16() & ObjFlag::user_settable().to_u16());
        let obj = self.table.insert_numbered(owner, name, settable);
        if let Err(e) = self.change_parents(obj, parents) {
            debug!(?obj, error = ?e, "object creation rejected");
            self.table.abandon(obj);
            return Err(e);
        }
        debug!(?obj, ?owner, name, "created object");
        Ok(obj)
    }

    /// Create an anonymous object. It records its parents but is not linked into their child
    /// lists, and goes invalid as soon as any ancestor's layout changes.
    pub fn create_anonymous(
        &mut self,
        owner: Obj,
        parents: ParentSpec,
    ) -> Result<Obj, WorldStateError> {
        let obj = self.table.insert_anonymous(owner, BitEnum::new());
        if let Err(e) = self.change_parents(obj, parents) {
            debug!(?obj, error = ?e, "anonymous object creation rejected");
            self.table.abandon(obj);
            return Err(e);
        }
        debug!(?obj, ?owner, "created anonymous object");
        Ok(obj)
    }

    /// Release a barren orphan: no children, no contents, no parents.
    pub fn destroy_object(&mut self, obj: Obj) -> Result<(), WorldStateError> {
        let Some(record) = self.table.get(obj) else {
            return Err(WorldStateError::ObjectNotFound(obj));
        };
        let linked_parents = obj.is_numbered() && !record.parents.is_nothing();
        if !record.children.is_empty() || !record.contents.is_empty() || linked_parents {
            debug!(?obj, "destroy rejected: object is not a barren orphan");
            return Err(WorldStateError::ObjectNotBarren(obj));
        }
        let had_verbs = !record.verbs.is_empty();
        if record.location != NOTHING {
            graph::set_location(&mut self.table, obj, NOTHING);
        }
        self.table.remove(obj);
        if had_verbs {
            self.verb_cache.flush();
        }
        debug!(?obj, "destroyed object");
        Ok(())
    }

    /// Tear down an object: contents go to `#-1`, children are reparented onto its parents,
    /// it is detached from everything and destroyed.
    #[tracing::instrument(skip(self))]
    pub fn recycle_object(&mut self, obj: Obj) -> Result<(), WorldStateError> {
        let record = self.record(obj)?;
        let parents = record.parents.clone();
        let children = record.children.clone();
        let contents = record.contents.clone();

        // Validate every child's new parent set before touching anything.
        let reparented: Vec<(Obj, ParentSpec)> = children
            .iter()
            .map(|c| {
                let spec = self.record(*c)?.parents.replacing(obj, parents.as_slice());
                Ok((*c, spec))
            })
            .collect::<Result<_, WorldStateError>>()?;
        for (child, spec) in &reparented {
            self.validate_reparent(*child, spec.as_slice(), &[])?;
        }

        for content in contents {
            graph::set_location(&mut self.table, content, NOTHING);
        }
        for (child, spec) in reparented {
            self.change_parents(child, spec)?;
        }
        self.change_parents(obj, ParentSpec::Nothing)?;
        graph::set_location(&mut self.table, obj, NOTHING);
        if let Some(record) = self.table.get_mut(obj) {
            record.flags.set(ObjFlag::Recycled);
        }
        self.verb_cache.flush();
        self.table.remove(obj);
        debug!(?obj, "recycled object");
        Ok(())
    }

    /// Move `obj` into `new_location` (`#-1` for nowhere).
    pub fn move_object(&mut self, obj: Obj, new_location: Obj) -> Result<(), WorldStateError> {
        self.record(obj)?;
        if new_location != NOTHING {
            self.record(new_location)?;
            if new_location == obj || self.all_locations(new_location, false).contains(&obj) {
                debug!(?obj, ?new_location, "move rejected: recursive");
                return Err(WorldStateError::RecursiveMove(obj, new_location));
            }
        }
        let old = graph::set_location(&mut self.table, obj, new_location);
        debug!(?obj, from = ?old, to = ?new_location, "moved object");
        Ok(())
    }
}
