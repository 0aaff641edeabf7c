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

//! Property layout.
//!
//! Each object holds one value slot for every property visible on it. The slots are the
//! concatenation of each ancestor's own definitions, visited in the same order as
//! `ancestors(obj, true)`: the object's own block first, then its first parent's, and so on.
//! Block offsets are not stored; they are recomputed by walking the ancestors and summing
//! definition counts. Every operation here that changes definitions or parents rewrites the
//! slot arrays of all affected objects so that this stays true.

use crate::ancestry::{self, Edges, Traversal, Walk};
use crate::fatal::invariant_violation;
use crate::graph;
use crate::object_table::{ObjectTable, ParentSpec};
use crate::propdefs::{PropDef, PropSlot, PropValue};
use crate::store::ObjectStore;
use ahash::AHashMap;
use moor_common::model::{PropFlag, PropPerms, WorldStateError};
use moor_common::util::BitEnum;
use moor_var::{Obj, Symbol, Var};
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::debug;

/// One ancestor's run of slots within an object's value array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Block {
    pub(crate) definer: Obj,
    pub(crate) start: usize,
    pub(crate) len: usize,
}

/// Where a property visible on some object lives.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SlotRef {
    pub(crate) definer: Obj,
    /// Index within the definer's own definitions.
    pub(crate) def_index: usize,
    /// Index within the object's value array.
    pub(crate) slot: usize,
}

fn ancestors_walk(table: &ObjectTable, obj: Obj) -> Walk<'_> {
    Walk::new(Edges::new(table, Traversal::Ancestors), obj, true)
}

fn definition_count(table: &ObjectTable, obj: Obj) -> usize {
    table.get(obj).map_or(0, |r| r.propdefs.len())
}

/// The blocks making up `obj`'s value array, in order. Reads only definitions, so it can be
/// used while value arrays are being rebuilt.
pub(crate) fn layout_of(table: &ObjectTable, obj: Obj) -> Vec<Block> {
    let mut start = 0;
    ancestors_walk(table, obj)
        .map(|definer| {
            let len = definition_count(table, definer);
            let block = Block {
                definer,
                start,
                len,
            };
            start += len;
            block
        })
        .collect()
}

/// Offset of `definer`'s block within `obj`'s value array, if `definer` is an ancestor.
pub(crate) fn block_offset(table: &ObjectTable, obj: Obj, definer: Obj) -> Option<usize> {
    let mut offset = 0;
    for ancestor in ancestors_walk(table, obj) {
        if ancestor == definer {
            return Some(offset);
        }
        offset += definition_count(table, ancestor);
    }
    None
}

/// Locate the property `name` as seen from `obj`.
pub(crate) fn find_slot(table: &ObjectTable, obj: Obj, name: Symbol) -> Option<SlotRef> {
    let mut offset = 0;
    for definer in ancestors_walk(table, obj) {
        let defs = &table.get(definer)?.propdefs;
        if let Some(def_index) = defs.iter().position(|d| d.matches(name)) {
            return Some(SlotRef {
                definer,
                def_index,
                slot: offset + def_index,
            });
        }
        offset += defs.len();
    }
    None
}

fn slot_at(table: &ObjectTable, obj: Obj, index: usize, context: &str) -> PropSlot {
    match table.get(obj).and_then(|r| r.propvals.get(index)) {
        Some(slot) => slot.clone(),
        None => invariant_violation(
            context,
            &format!("{obj} has no property slot at index {index}"),
        ),
    }
}

/// Follow a cleared slot toward its definer until some object on the way has a value.
///
/// At each step we move to the first parent, in parent-list order, that descends from (or is)
/// the definer. The definer's own slot is never clear, so reaching it without a value means the
/// layout is corrupt.
fn resolve_inherited(table: &ObjectTable, obj: Obj, at: SlotRef) -> Var {
    let mut current = obj;
    loop {
        if current == at.definer {
            invariant_violation(
                "property lookup",
                &format!("definer {} has a cleared slot for its own property", at.definer),
            );
        }
        let parents = table
            .get(current)
            .map(|r| r.parents.as_slice())
            .unwrap_or_default();
        let Some(next) = parents
            .iter()
            .copied()
            .find(|p| ancestry::isa(table, *p, at.definer))
        else {
            invariant_violation(
                "property lookup",
                &format!("no parent of {current} leads to definer {}", at.definer),
            );
        };
        let Some(offset) = block_offset(table, next, at.definer) else {
            invariant_violation(
                "property lookup",
                &format!("{next} descends from {} but has no block for it", at.definer),
            );
        };
        if let PropValue::Set(value) =
            slot_at(table, next, offset + at.def_index, "property lookup").value
        {
            return value;
        }
        current = next;
    }
}

/// Kahn's algorithm over the parent edges among `objs`, so that every object comes after any
/// of its parents that are also in the set.
fn parents_first(table: &ObjectTable, objs: &[Obj]) -> Vec<Obj> {
    let index: AHashMap<Obj, usize> = objs.iter().enumerate().map(|(i, o)| (*o, i)).collect();
    let mut pending = vec![0usize; objs.len()];
    let mut dependents: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); objs.len()];
    for (i, obj) in objs.iter().enumerate() {
        let parents = table
            .get(*obj)
            .map(|r| r.parents.as_slice())
            .unwrap_or_default();
        for p in parents {
            if let Some(&j) = index.get(p) {
                pending[i] += 1;
                dependents[j].push(i);
            }
        }
    }
    let mut ready: VecDeque<usize> = (0..objs.len()).filter(|i| pending[*i] == 0).collect();
    let mut order = Vec::with_capacity(objs.len());
    while let Some(i) = ready.pop_front() {
        order.push(objs[i]);
        for &d in &dependents[i] {
            pending[d] -= 1;
            if pending[d] == 0 {
                ready.push_back(d);
            }
        }
    }
    if order.len() != objs.len() {
        invariant_violation("chparent", "parent edges among affected objects form a cycle");
    }
    order
}

/// Changes to a property's definition and its slot on one object.
#[derive(Clone, Debug, Default)]
pub struct PropInfoUpdate {
    pub owner: Option<Obj>,
    pub flags: Option<BitEnum<PropFlag>>,
    pub name: Option<Symbol>,
}

impl ObjectStore {
    /// Define `name` on `obj` with an initial value. Every descendant gets an inherited slot;
    /// with `Chown` set its owner is the descendant's owner, otherwise `owner`.
    #[tracing::instrument(skip(self, value))]
    pub fn define_property(
        &mut self,
        obj: Obj,
        name: Symbol,
        owner: Obj,
        flags: BitEnum<PropFlag>,
        value: Var,
    ) -> Result<(), WorldStateError> {
        self.record(obj)?;
        let affected = ancestry::descendants(&self.table, obj, true);
        for d in &affected {
            if let Some(existing) = find_slot(&self.table, *d, name) {
                return Err(WorldStateError::DuplicatePropertyDefinition(
                    existing.definer,
                    name.to_string(),
                ));
            }
        }

        let own_count = definition_count(&self.table, obj);
        let mut targets = Vec::with_capacity(affected.len());
        for d in &affected {
            let Some(offset) = block_offset(&self.table, *d, obj) else {
                invariant_violation("define_property", &format!("{d} has no block for {obj}"));
            };
            targets.push((*d, offset + own_count));
        }

        let chown = flags.contains(PropFlag::Chown);
        for (d, at) in targets {
            let generation = self.table.next_generation();
            let Some(record) = self.table.get_mut(d) else {
                invariant_violation("define_property", &format!("{d} vanished"));
            };
            if at > record.propvals.len() {
                invariant_violation(
                    "define_property",
                    &format!("insertion point {at} past the end of {d}'s slots"),
                );
            }
            let slot = if d == obj {
                PropSlot::set(value.clone(), PropPerms::new(owner, flags))
            } else {
                let slot_owner = if chown { record.owner } else { owner };
                PropSlot::inherited(PropPerms::new(slot_owner, flags))
            };
            record.propvals.insert(at, slot);
            if d == obj {
                record.propdefs.push(PropDef::new(obj, name));
            }
            record.generation = generation;
        }
        debug!(?obj, %name, descendants = affected.len() - 1, "defined property");
        self.verify_after_mutation("define_property", &affected);
        Ok(())
    }

    /// Remove a property defined on `obj`, and its slot on every descendant.
    #[tracing::instrument(skip(self))]
    pub fn delete_property(&mut self, obj: Obj, name: Symbol) -> Result<(), WorldStateError> {
        let record = self.record(obj)?;
        let Some(def_index) = record.propdefs.iter().position(|d| d.matches(name)) else {
            return Err(WorldStateError::PropertyDefinitionNotFound(
                obj,
                name.to_string(),
            ));
        };
        let affected = ancestry::descendants(&self.table, obj, true);
        let mut targets = Vec::with_capacity(affected.len());
        for d in &affected {
            let Some(offset) = block_offset(&self.table, *d, obj) else {
                invariant_violation("delete_property", &format!("{d} has no block for {obj}"));
            };
            targets.push((*d, offset + def_index));
        }
        for (d, at) in targets {
            let generation = self.table.next_generation();
            let Some(record) = self.table.get_mut(d) else {
                invariant_violation("delete_property", &format!("{d} vanished"));
            };
            if at >= record.propvals.len() {
                invariant_violation(
                    "delete_property",
                    &format!("slot {at} past the end of {d}'s slots"),
                );
            }
            record.propvals.remove(at);
            if d == obj {
                record.propdefs.remove(def_index);
            }
            record.generation = generation;
        }
        debug!(?obj, %name, "deleted property");
        self.verify_after_mutation("delete_property", &affected);
        Ok(())
    }

    /// Rename a property defined on `obj`. Slots do not move.
    pub fn rename_property(
        &mut self,
        obj: Obj,
        old: Symbol,
        new: Symbol,
    ) -> Result<(), WorldStateError> {
        let record = self.record(obj)?;
        let Some(def_index) = record.propdefs.iter().position(|d| d.matches(old)) else {
            return Err(WorldStateError::PropertyDefinitionNotFound(
                obj,
                old.to_string(),
            ));
        };
        if new != old {
            for d in ancestry::descendants(&self.table, obj, true) {
                if let Some(existing) = find_slot(&self.table, d, new) {
                    return Err(WorldStateError::DuplicatePropertyDefinition(
                        existing.definer,
                        new.to_string(),
                    ));
                }
            }
        }
        let record = self.record_mut(obj)?;
        record.propdefs[def_index] = record.propdefs[def_index].renamed(new);
        debug!(?obj, %old, %new, "renamed property");
        Ok(())
    }

    /// Properties defined directly on `obj`, in definition order.
    pub fn properties(&self, obj: Obj) -> Result<Vec<PropDef>, WorldStateError> {
        Ok(self.record(obj)?.propdefs.clone())
    }

    /// Every property visible on `obj`, in slot order.
    pub fn all_properties(&self, obj: Obj) -> Result<Vec<PropDef>, WorldStateError> {
        self.record(obj)?;
        let mut defs = Vec::new();
        for definer in ancestors_walk(&self.table, obj) {
            defs.extend(self.table.get(definer).into_iter().flat_map(|r| r.propdefs.iter()));
        }
        Ok(defs)
    }

    fn visible_slot(&self, obj: Obj, name: Symbol) -> Result<SlotRef, WorldStateError> {
        self.record(obj)?;
        find_slot(&self.table, obj, name)
            .ok_or_else(|| WorldStateError::PropertyNotFound(obj, name.to_string()))
    }

    /// The effective value and slot permissions of `name` on `obj`.
    pub fn get_property(
        &self,
        obj: Obj,
        name: Symbol,
    ) -> Result<(Var, PropPerms), WorldStateError> {
        let at = self.visible_slot(obj, name)?;
        let slot = slot_at(&self.table, obj, at.slot, "get_property");
        let value = match slot.value {
            PropValue::Set(value) => value,
            PropValue::Inherited => resolve_inherited(&self.table, obj, at),
        };
        Ok((value, slot.perms))
    }

    pub fn set_property(
        &mut self,
        obj: Obj,
        name: Symbol,
        value: Var,
    ) -> Result<(), WorldStateError> {
        let at = self.visible_slot(obj, name)?;
        let record = self.record_mut(obj)?;
        match record.propvals.get_mut(at.slot) {
            Some(slot) => slot.value = PropValue::Set(value),
            None => invariant_violation(
                "set_property",
                &format!("{obj} is missing slot {}", at.slot),
            ),
        }
        Ok(())
    }

    /// Drop the local value so the inherited one shows through. Not allowed on the definer.
    pub fn clear_property(&mut self, obj: Obj, name: Symbol) -> Result<(), WorldStateError> {
        let at = self.visible_slot(obj, name)?;
        if at.definer == obj {
            return Err(WorldStateError::CannotClearDefiner(obj, name.to_string()));
        }
        let record = self.record_mut(obj)?;
        match record.propvals.get_mut(at.slot) {
            Some(slot) => slot.value = PropValue::Inherited,
            None => invariant_violation(
                "clear_property",
                &format!("{obj} is missing slot {}", at.slot),
            ),
        }
        Ok(())
    }

    pub fn is_property_clear(&self, obj: Obj, name: Symbol) -> Result<bool, WorldStateError> {
        let at = self.visible_slot(obj, name)?;
        Ok(slot_at(&self.table, obj, at.slot, "is_property_clear")
            .value
            .is_inherited())
    }

    /// The definition of `name` as seen from `obj`, with `obj`'s slot permissions.
    pub fn property_info(
        &self,
        obj: Obj,
        name: Symbol,
    ) -> Result<(PropDef, PropPerms), WorldStateError> {
        let at = self.visible_slot(obj, name)?;
        let Some(def) = self
            .table
            .get(at.definer)
            .and_then(|r| r.propdefs.get(at.def_index))
        else {
            invariant_violation(
                "property_info",
                &format!("definer {} lost a definition", at.definer),
            );
        };
        let slot = slot_at(&self.table, obj, at.slot, "property_info");
        Ok((*def, slot.perms))
    }

    /// Change the slot owner and flags on `obj`, and optionally rename the definition. Renaming
    /// is only possible on the definer.
    pub fn set_property_info(
        &mut self,
        obj: Obj,
        name: Symbol,
        update: PropInfoUpdate,
    ) -> Result<(), WorldStateError> {
        let at = self.visible_slot(obj, name)?;
        if let Some(new_name) = update.name {
            if at.definer != obj {
                return Err(WorldStateError::PropertyDefinitionNotFound(obj, name.to_string()));
            }
            self.rename_property(obj, name, new_name)?;
        }
        let record = self.record_mut(obj)?;
        let Some(slot) = record.propvals.get_mut(at.slot) else {
            invariant_violation("set_property_info", &format!("{obj} is missing slot {}", at.slot));
        };
        let mut perms = slot.perms;
        if let Some(owner) = update.owner {
            perms = perms.with_owner(owner);
        }
        if let Some(flags) = update.flags {
            perms = perms.with_flags(flags);
        }
        slot.perms = perms;
        Ok(())
    }

    /// Check that reparenting `obj` onto `parents` is allowed and leaves every affected object
    /// with unique property names.
    pub(crate) fn validate_reparent(
        &self,
        obj: Obj,
        parents: &[Obj],
        anonymous_children: &[Obj],
    ) -> Result<(), WorldStateError> {
        self.record(obj)?;
        for (i, p) in parents.iter().enumerate() {
            if parents[..i].contains(p) {
                return Err(WorldStateError::DuplicateParent(*p));
            }
            if p.is_anonymous() || !self.valid(*p) {
                return Err(WorldStateError::InvalidParent(*p));
            }
            if *p == obj || ancestry::isa(&self.table, *p, obj) {
                return Err(WorldStateError::RecursiveParent(obj, *p));
            }
        }
        for child in anonymous_children {
            let is_child = child.is_anonymous()
                && self
                    .table
                    .get(*child)
                    .is_some_and(|r| r.parents.contains(obj));
            if !is_child {
                return Err(WorldStateError::InvalidArgument(format!(
                    "{child} is not an anonymous child of {obj}"
                )));
            }
            // A stale child's slots no longer match its ancestors and cannot be carried over.
            if !self.valid(*child) {
                return Err(WorldStateError::ObjectNotFound(*child));
            }
        }

        let edges = Edges::with_parents_override(&self.table, obj, parents);
        let affected = ancestry::descendants(&self.table, obj, true);
        for x in affected.iter().chain(anonymous_children) {
            let mut seen: AHashMap<Symbol, Obj> = AHashMap::new();
            for definer in Walk::new(edges, *x, true) {
                for def in self.table.get(definer).into_iter().flat_map(|r| r.propdefs.iter()) {
                    if let Some(first) = seen.insert(def.name(), definer) {
                        return Err(WorldStateError::ChparentPropertyNameConflict(
                            first,
                            definer,
                            def.name().to_string(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Replace `obj`'s parents and re-lay-out it and every descendant.
    pub fn change_parents(&mut self, obj: Obj, parents: ParentSpec) -> Result<(), WorldStateError> {
        self.change_parents_with_anonymous(obj, parents, &[])
    }

    /// As `change_parents`, also re-laying-out the given anonymous children of `obj`, which are
    /// not reachable through child lists.
    #[tracing::instrument(skip(self))]
    pub fn change_parents_with_anonymous(
        &mut self,
        obj: Obj,
        parents: ParentSpec,
        anonymous_children: &[Obj],
    ) -> Result<(), WorldStateError> {
        self.validate_reparent(obj, parents.as_slice(), anonymous_children)?;

        let record = self.record(obj)?;
        let keep_cache =
            record.children.is_empty() && record.verbs.is_empty() && anonymous_children.is_empty();

        let mut affected = ancestry::descendants(&self.table, obj, true);
        for child in anonymous_children {
            if !affected.contains(child) {
                affected.push(*child);
            }
        }

        // Capture the current layout of everything affected, checking all of it before any
        // values are taken.
        let mut layouts: Vec<(Obj, Vec<Block>)> = Vec::with_capacity(affected.len());
        for x in &affected {
            let blocks = layout_of(&self.table, *x);
            let Some(record) = self.table.get(*x) else {
                invariant_violation("chparent", &format!("affected object {x} vanished"));
            };
            let expected: usize = blocks.iter().map(|b| b.len).sum();
            if record.propvals.len() != expected {
                invariant_violation(
                    "chparent",
                    &format!(
                        "{x} has {} slots, its ancestors define {expected}",
                        record.propvals.len()
                    ),
                );
            }
            layouts.push((*x, blocks));
        }
        let mut snapshots: AHashMap<Obj, (Vec<Block>, Vec<PropSlot>)> =
            AHashMap::with_capacity(layouts.len());
        for (x, blocks) in layouts {
            let Some(record) = self.table.get_mut(x) else {
                invariant_violation("chparent", &format!("affected object {x} vanished"));
            };
            let values = std::mem::take(&mut record.propvals);
            snapshots.insert(x, (blocks, values));
        }

        graph::set_parents(&mut self.table, obj, parents);

        for x in parents_first(&self.table, &affected) {
            let Some((old_blocks, old_values)) = snapshots.remove(&x) else {
                invariant_violation("chparent", &format!("no snapshot for {x}"));
            };
            let new_values = self.rebuild_values(x, &old_blocks, &old_values);
            let generation = self.table.next_generation();
            let Some(record) = self.table.get_mut(x) else {
                invariant_violation("chparent", &format!("affected object {x} vanished"));
            };
            record.propvals = new_values;
            record.generation = generation;
        }

        if !keep_cache {
            self.verb_cache.flush();
        }
        debug!(?obj, affected = affected.len(), "changed parents");
        self.verify_after_mutation("chparent", &affected);
        Ok(())
    }

    /// New value array for `x` under its current parents. Blocks for ancestors it already had
    /// are carried over; blocks for new ancestors are cleared slots whose permissions come from
    /// the parent they are inherited through.
    fn rebuild_values(
        &self,
        x: Obj,
        old_blocks: &[Block],
        old_values: &[PropSlot],
    ) -> Vec<PropSlot> {
        let Some(record) = self.table.get(x) else {
            invariant_violation("chparent", &format!("affected object {x} vanished"));
        };
        let new_blocks = layout_of(&self.table, x);
        let mut values = Vec::with_capacity(new_blocks.iter().map(|b| b.len).sum());
        for block in new_blocks {
            if let Some(old) = old_blocks.iter().find(|b| b.definer == block.definer) {
                values.extend_from_slice(&old_values[old.start..old.start + old.len]);
                continue;
            }
            let Some(source) = record
                .parents
                .as_slice()
                .iter()
                .copied()
                .find(|p| ancestry::isa(&self.table, *p, block.definer))
            else {
                invariant_violation(
                    "chparent",
                    &format!("no parent of {x} leads to new ancestor {}", block.definer),
                );
            };
            let Some(offset) = block_offset(&self.table, source, block.definer) else {
                invariant_violation(
                    "chparent",
                    &format!("{source} has no block for {}", block.definer),
                );
            };
            for i in 0..block.len {
                let from = slot_at(&self.table, source, offset + i, "chparent");
                let flags = from.perms.flags();
                let owner = if flags.contains(PropFlag::Chown) {
                    record.owner
                } else {
                    from.perms.owner()
                };
                values.push(PropSlot::inherited(PropPerms::new(owner, flags)));
            }
        }
        values
    }
}
