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

use crate::propdefs::{PropDef, PropSlot};
use crate::verbdefs::VerbDefs;
use ahash::AHashMap;
use moor_common::model::ObjFlag;
use moor_common::util::BitEnum;
use moor_var::{NOTHING, Obj};

/// An object's parents. Either absent, one object, or an ordered list (multiple inheritance).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParentSpec {
    #[default]
    Nothing,
    Single(Obj),
    List(Vec<Obj>),
}

impl ParentSpec {
    /// `#-1` normalizes to `Nothing`.
    #[must_use]
    pub fn single(parent: Obj) -> Self {
        if parent == NOTHING {
            ParentSpec::Nothing
        } else {
            ParentSpec::Single(parent)
        }
    }

    /// An empty list normalizes to `Nothing`; a one-element list stays a list.
    #[must_use]
    pub fn list(parents: Vec<Obj>) -> Self {
        if parents.is_empty() {
            ParentSpec::Nothing
        } else {
            ParentSpec::List(parents)
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Obj] {
        match self {
            ParentSpec::Nothing => &[],
            ParentSpec::Single(p) => std::slice::from_ref(p),
            ParentSpec::List(ps) => ps,
        }
    }

    #[must_use]
    pub fn is_nothing(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[must_use]
    pub fn contains(&self, obj: Obj) -> bool {
        self.as_slice().contains(&obj)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_nothing()
    }

    /// This spec with `old` replaced in place by `replacements`, skipping any already present.
    #[must_use]
    pub fn replacing(&self, old: Obj, replacements: &[Obj]) -> Self {
        let mut out: Vec<Obj> = Vec::with_capacity(self.len() + replacements.len());
        for p in self.as_slice() {
            if *p == old {
                for r in replacements {
                    if !out.contains(r) && !self.contains(*r) {
                        out.push(*r);
                    }
                }
            } else if !out.contains(p) {
                out.push(*p);
            }
        }
        match (self, out.len()) {
            (_, 0) => ParentSpec::Nothing,
            (ParentSpec::Single(_), 1) => ParentSpec::Single(out[0]),
            _ => ParentSpec::List(out),
        }
    }
}

impl From<Obj> for ParentSpec {
    fn from(parent: Obj) -> Self {
        ParentSpec::single(parent)
    }
}

impl From<&[Obj]> for ParentSpec {
    fn from(parents: &[Obj]) -> Self {
        ParentSpec::list(parents.to_vec())
    }
}

/// Everything the database holds about one object.
#[derive(Clone, Debug)]
pub struct ObjectRecord {
    pub(crate) id: Obj,
    pub(crate) owner: Obj,
    pub(crate) name: String,
    pub(crate) flags: BitEnum<ObjFlag>,
    pub(crate) parents: ParentSpec,
    /// Numbered children only; anonymous objects are never linked here.
    pub(crate) children: Vec<Obj>,
    pub(crate) location: Obj,
    pub(crate) contents: Vec<Obj>,
    pub(crate) propdefs: Vec<PropDef>,
    pub(crate) propvals: Vec<PropSlot>,
    pub(crate) verbs: VerbDefs,
    /// Changes whenever this object's property layout is invalidated.
    pub(crate) generation: u64,
}

impl ObjectRecord {
    pub(crate) fn new(id: Obj, owner: Obj, name: &str, flags: BitEnum<ObjFlag>) -> Self {
        Self {
            id,
            owner,
            name: name.to_string(),
            flags,
            parents: ParentSpec::Nothing,
            children: vec![],
            location: NOTHING,
            contents: vec![],
            propdefs: vec![],
            propvals: vec![],
            verbs: VerbDefs::new(),
            generation: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> Obj {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> Obj {
        self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn flags(&self) -> BitEnum<ObjFlag> {
        self.flags
    }

    #[must_use]
    pub fn parents(&self) -> &ParentSpec {
        &self.parents
    }

    #[must_use]
    pub fn children(&self) -> &[Obj] {
        &self.children
    }

    #[must_use]
    pub fn location(&self) -> Obj {
        self.location
    }

    #[must_use]
    pub fn contents(&self) -> &[Obj] {
        &self.contents
    }

    #[must_use]
    pub fn propdefs(&self) -> &[PropDef] {
        &self.propdefs
    }

    #[must_use]
    pub fn propvals(&self) -> &[PropSlot] {
        &self.propvals
    }

    #[must_use]
    pub fn verbs(&self) -> &VerbDefs {
        &self.verbs
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Not flagged invalid or recycled. Staleness of anonymous objects is checked by the store.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.flags.contains(ObjFlag::Invalid) && !self.flags.contains(ObjFlag::Recycled)
    }
}

/// Dense table of numbered objects plus a side table of anonymous ones.
#[derive(Debug)]
pub struct ObjectTable {
    numbered: Vec<Option<ObjectRecord>>,
    anonymous: AHashMap<u32, ObjectRecord>,
    next_anonymous: u32,
    generation: u64,
}

impl ObjectTable {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            numbered: Vec::with_capacity(capacity),
            anonymous: AHashMap::new(),
            next_anonymous: 0,
            generation: 0,
        }
    }

    /// Number of numbered slots, allocated or not. Sizes per-call visited sets.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.numbered.len()
    }

    #[must_use]
    pub fn anonymous_count(&self) -> usize {
        self.anonymous.len()
    }

    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    #[must_use]
    pub fn get(&self, obj: Obj) -> Option<&ObjectRecord> {
        if let Some(idx) = obj.index() {
            return self.numbered.get(idx).and_then(Option::as_ref);
        }
        obj.anonymous_id().and_then(|id| self.anonymous.get(&id))
    }

    pub(crate) fn get_mut(&mut self, obj: Obj) -> Option<&mut ObjectRecord> {
        if let Some(idx) = obj.index() {
            return self.numbered.get_mut(idx).and_then(Option::as_mut);
        }
        obj.anonymous_id()
            .and_then(|id| self.anonymous.get_mut(&id))
    }

    #[must_use]
    pub fn contains(&self, obj: Obj) -> bool {
        self.get(obj).is_some()
    }

    /// Highest numbered id ever allocated and not trimmed, or `#-1` for an empty table.
    #[must_use]
    pub fn max_object(&self) -> Obj {
        Obj::mk_id(self.numbered.len() as i32 - 1)
    }

    pub(crate) fn insert_numbered(
        &mut self,
        owner: Obj,
        name: &str,
        flags: BitEnum<ObjFlag>,
    ) -> Obj {
        let id = Obj::mk_id(self.numbered.len() as i32);
        let owner = if owner == NOTHING { id } else { owner };
        let mut record = ObjectRecord::new(id, owner, name, flags);
        record.generation = self.next_generation();
        self.numbered.push(Some(record));
        id
    }

    pub(crate) fn insert_anonymous(&mut self, owner: Obj, flags: BitEnum<ObjFlag>) -> Obj {
        let anon_id = self.next_anonymous;
        self.next_anonymous += 1;
        let id = Obj::mk_anonymous(anon_id);
        let owner = if owner == NOTHING { id } else { owner };
        let mut record = ObjectRecord::new(id, owner, "", flags | ObjFlag::Anonymous);
        record.generation = self.next_generation();
        self.anonymous.insert(anon_id, record);
        id
    }

    /// Drop the record for `obj`. Numbered ids are not reused.
    pub(crate) fn remove(&mut self, obj: Obj) -> Option<ObjectRecord> {
        if let Some(idx) = obj.index() {
            return self.numbered.get_mut(idx)?.take();
        }
        obj.anonymous_id()
            .and_then(|id| self.anonymous.remove(&id))
    }

    /// Undo an allocation whose setup failed. A numbered id at the end of the table is given
    /// back, so `max_object` is left where it was.
    pub(crate) fn abandon(&mut self, obj: Obj) {
        if let Some(idx) = obj.index()
            && idx + 1 == self.numbered.len()
        {
            self.numbered.pop();
            return;
        }
        self.remove(obj);
    }

    /// Ids of every numbered object present, ascending.
    pub fn numbered_ids(&self) -> impl Iterator<Item = Obj> + '_ {
        self.numbered
            .iter()
            .filter_map(|r| r.as_ref().map(|r| r.id))
    }

    pub fn anonymous_ids(&self) -> impl Iterator<Item = Obj> + '_ {
        self.anonymous.values().map(|r| r.id)
    }

    pub fn records(&self) -> impl Iterator<Item = &ObjectRecord> + '_ {
        self.numbered
            .iter()
            .filter_map(Option::as_ref)
            .chain(self.anonymous.values())
    }
}
