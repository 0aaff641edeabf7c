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

use crate::store::ObjectStore;
use crate::verbdefs::{VerbDef, VerbDefEdit, VerbDefs};
use moor_common::model::{VerbArgsSpec, VerbFlag, VerbProgram, WorldStateError};
use moor_common::util::BitEnum;
use moor_var::{Obj, Symbol};
use tracing::debug;

/// Names a verb on one object: by (possibly wildcarded) name, or by its 0-based position in
/// the object's verb list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerbDescriptor {
    Name(Symbol),
    Index(usize),
}

impl From<Symbol> for VerbDescriptor {
    fn from(name: Symbol) -> Self {
        VerbDescriptor::Name(name)
    }
}

/// A batch of changes to one verb definition. `None` leaves the attribute alone.
#[derive(Clone, Debug, Default)]
pub struct VerbAttrs {
    pub owner: Option<Obj>,
    pub names: Option<Vec<Symbol>>,
    pub flags: Option<BitEnum<VerbFlag>>,
    pub args: Option<VerbArgsSpec>,
    pub program: Option<VerbProgram>,
}

fn check_names(names: &[Symbol]) -> Result<(), WorldStateError> {
    if names.is_empty() {
        return Err(WorldStateError::InvalidArgument(
            "a verb needs at least one name".to_string(),
        ));
    }
    Ok(())
}

impl ObjectStore {
    fn verb_index(&self, obj: Obj, verb: VerbDescriptor) -> Result<usize, WorldStateError> {
        let verbs = &self.record(obj)?.verbs;
        match verb {
            VerbDescriptor::Name(name) => {
                let word = name.as_arc_str();
                verbs
                    .iter()
                    .position(|v| v.matches_name(&word))
                    .ok_or_else(|| WorldStateError::VerbNotFound(obj, name.to_string()))
            }
            VerbDescriptor::Index(index) if index < verbs.len() => Ok(index),
            VerbDescriptor::Index(index) => Err(WorldStateError::InvalidVerbDescriptor(
                obj,
                index.to_string(),
            )),
        }
    }

    fn edit_verb<F>(&mut self, obj: Obj, verb: VerbDescriptor, f: F) -> Result<(), WorldStateError>
    where
        F: FnOnce(&mut VerbDefEdit<'_>),
    {
        let index = self.verb_index(obj, verb)?;
        let record = self.record_mut(obj)?;
        let Some(verbdef) = record.verbs.get_mut(index) else {
            return Err(WorldStateError::InvalidVerbDescriptor(obj, index.to_string()));
        };
        f(&mut verbdef.edit());
        self.verb_cache.flush();
        debug!(?obj, ?verb, "updated verb");
        Ok(())
    }

    /// Verbs defined directly on `obj`, in definition order.
    pub fn verbs(&self, obj: Obj) -> Result<VerbDefs, WorldStateError> {
        Ok(self.record(obj)?.verbs.clone())
    }

    #[tracing::instrument(skip(self, program))]
    pub fn add_verb(
        &mut self,
        obj: Obj,
        owner: Obj,
        names: &[Symbol],
        flags: BitEnum<VerbFlag>,
        args: VerbArgsSpec,
        program: VerbProgram,
    ) -> Result<VerbDef, WorldStateError> {
        check_names(names)?;
        let verbdef = VerbDef::new(obj, owner, names, flags, args, program);
        self.record_mut(obj)?.verbs.push_back(verbdef.clone());
        self.verb_cache.flush();
        debug!(?obj, verb = %verbdef, "added verb");
        Ok(verbdef)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_verb(
        &mut self,
        obj: Obj,
        verb: VerbDescriptor,
    ) -> Result<VerbDef, WorldStateError> {
        let index = self.verb_index(obj, verb)?;
        let removed = self.record_mut(obj)?.verbs.remove(index);
        self.verb_cache.flush();
        debug!(?obj, verb = %removed, "deleted verb");
        Ok(removed)
    }

    pub fn rename_verb(
        &mut self,
        obj: Obj,
        verb: VerbDescriptor,
        names: &[Symbol],
    ) -> Result<(), WorldStateError> {
        check_names(names)?;
        self.edit_verb(obj, verb, |e| {
            e.names(names);
        })
    }

    /// Apply every attribute present in `attrs` in one edit.
    pub fn update_verb(
        &mut self,
        obj: Obj,
        verb: VerbDescriptor,
        attrs: VerbAttrs,
    ) -> Result<(), WorldStateError> {
        if let Some(names) = &attrs.names {
            check_names(names)?;
        }
        self.edit_verb(obj, verb, |e| {
            if let Some(owner) = attrs.owner {
                e.owner(owner);
            }
            if let Some(names) = &attrs.names {
                e.names(names);
            }
            if let Some(flags) = attrs.flags {
                e.flags(flags);
            }
            if let Some(args) = attrs.args {
                e.args(args);
            }
            if let Some(program) = attrs.program {
                e.program(program);
            }
        })
    }

    pub fn set_verb_flags(
        &mut self,
        obj: Obj,
        verb: VerbDescriptor,
        flags: BitEnum<VerbFlag>,
    ) -> Result<(), WorldStateError> {
        self.edit_verb(obj, verb, |e| {
            e.flags(flags);
        })
    }

    pub fn set_verb_owner(
        &mut self,
        obj: Obj,
        verb: VerbDescriptor,
        owner: Obj,
    ) -> Result<(), WorldStateError> {
        self.edit_verb(obj, verb, |e| {
            e.owner(owner);
        })
    }

    pub fn set_verb_args(
        &mut self,
        obj: Obj,
        verb: VerbDescriptor,
        args: VerbArgsSpec,
    ) -> Result<(), WorldStateError> {
        self.edit_verb(obj, verb, |e| {
            e.args(args);
        })
    }

    pub fn set_verb_program(
        &mut self,
        obj: Obj,
        verb: VerbDescriptor,
        program: VerbProgram,
    ) -> Result<(), WorldStateError> {
        self.edit_verb(obj, verb, |e| {
            e.program(program);
        })
    }

    pub fn get_verb(&self, obj: Obj, verb: VerbDescriptor) -> Result<VerbDef, WorldStateError> {
        let index = self.verb_index(obj, verb)?;
        self.record(obj)?
            .verbs
            .get(index)
            .cloned()
            .ok_or_else(|| WorldStateError::InvalidVerbDescriptor(obj, index.to_string()))
    }

    pub fn get_verb_program(
        &self,
        obj: Obj,
        verb: VerbDescriptor,
    ) -> Result<VerbProgram, WorldStateError> {
        Ok(self.get_verb(obj, verb)?.program().clone())
    }
}
