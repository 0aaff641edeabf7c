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

//! The permission-checked view of the object database handed to the VM and builtins.

use crate::layout::PropInfoUpdate;
use crate::object_table::ParentSpec;
use crate::propdefs::PropDef;
use crate::store::ObjectStore;
use crate::verbdefs::{VerbDef, VerbDefs};
use crate::verbs::{VerbAttrs, VerbDescriptor};
use moor_common::model::{
    ObjFlag, Perms, PropFlag, PropPerms, VerbArgsSpec, VerbFlag, VerbProgram, WorldStateError,
};
use moor_common::util::BitEnum;
use moor_var::{Obj, Symbol, Var};

/// A world state is a view of the objects in the world, their properties and verbs, as seen by
/// a particular principal. Every method taking `perms` applies the permission rules for that
/// principal before reading or changing anything.
///
/// Verb indexes in `VerbDescriptor::Index` are 1-based here, as they are to MOO code.
pub trait WorldState {
    /// All objects flagged as players.
    fn players(&self) -> Result<Vec<Obj>, WorldStateError>;

    fn owner_of(&self, obj: &Obj) -> Result<Obj, WorldStateError>;

    /// Whether `who` is a wizard or owns `what`.
    fn controls(&self, who: &Obj, what: &Obj) -> Result<bool, WorldStateError>;

    /// Flags of an object. Takes no permission context, because it is used to *determine*
    /// permissions.
    fn flags_of(&self, obj: &Obj) -> Result<BitEnum<ObjFlag>, WorldStateError>;

    fn set_flags_of(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        flags: BitEnum<ObjFlag>,
    ) -> Result<(), WorldStateError>;

    fn name_of(&self, perms: &Obj, obj: &Obj) -> Result<String, WorldStateError>;

    fn set_name_of(&mut self, perms: &Obj, obj: &Obj, name: &str) -> Result<(), WorldStateError>;

    fn set_owner_of(&mut self, perms: &Obj, obj: &Obj, owner: &Obj) -> Result<(), WorldStateError>;

    fn location_of(&self, perms: &Obj, obj: &Obj) -> Result<Obj, WorldStateError>;

    fn contents_of(&self, perms: &Obj, obj: &Obj) -> Result<Vec<Obj>, WorldStateError>;

    /// Create a numbered object. An `owner` of `#-1` makes the object its own owner.
    fn create_object(
        &mut self,
        perms: &Obj,
        parents: &ParentSpec,
        owner: &Obj,
        name: &str,
        flags: BitEnum<ObjFlag>,
    ) -> Result<Obj, WorldStateError>;

    fn create_anonymous(
        &mut self,
        perms: &Obj,
        parents: &ParentSpec,
        owner: &Obj,
    ) -> Result<Obj, WorldStateError>;

    /// Destroy `obj`, moving its contents to `#-1` and reparenting its children onto its
    /// parents.
    fn recycle_object(&mut self, perms: &Obj, obj: &Obj) -> Result<(), WorldStateError>;

    fn max_object(&self, perms: &Obj) -> Result<Obj, WorldStateError>;

    /// Move an object to a new location. Running `:accept`, `:enterfunc` and `:exitfunc` is
    /// the caller's business.
    fn move_object(&mut self, perms: &Obj, obj: &Obj, new_loc: &Obj)
    -> Result<(), WorldStateError>;

    fn verbs(&self, perms: &Obj, obj: &Obj) -> Result<VerbDefs, WorldStateError>;

    /// Properties defined directly on `obj`, not inherited.
    fn properties(&self, perms: &Obj, obj: &Obj) -> Result<Vec<PropDef>, WorldStateError>;

    /// The effective value of a property, following cleared slots up the inheritance chain.
    fn retrieve_property(
        &self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<Var, WorldStateError>;

    fn get_property_info(
        &self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<(PropDef, PropPerms), WorldStateError>;

    fn set_property_info(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
        update: PropInfoUpdate,
    ) -> Result<(), WorldStateError>;

    fn update_property(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
        value: &Var,
    ) -> Result<(), WorldStateError>;

    fn is_property_clear(
        &self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<bool, WorldStateError>;

    /// Drop the local value of a property so the inherited one shows through.
    fn clear_property(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<(), WorldStateError>;

    #[allow(clippy::too_many_arguments)]
    fn define_property(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
        owner: &Obj,
        flags: BitEnum<PropFlag>,
        value: Var,
    ) -> Result<(), WorldStateError>;

    fn delete_property(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<(), WorldStateError>;

    #[allow(clippy::too_many_arguments)]
    fn add_verb(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        names: &[Symbol],
        owner: &Obj,
        flags: BitEnum<VerbFlag>,
        args: VerbArgsSpec,
        program: VerbProgram,
    ) -> Result<(), WorldStateError>;

    fn remove_verb(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        verb: &VerbDescriptor,
    ) -> Result<(), WorldStateError>;

    fn update_verb(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        verb: &VerbDescriptor,
        attrs: VerbAttrs,
    ) -> Result<(), WorldStateError>;

    /// A verb defined directly on `obj`, without inheritance.
    fn get_verb(
        &self,
        perms: &Obj,
        obj: &Obj,
        verb: &VerbDescriptor,
    ) -> Result<VerbDef, WorldStateError>;

    fn retrieve_verb(
        &self,
        perms: &Obj,
        obj: &Obj,
        verb: &VerbDescriptor,
    ) -> Result<(VerbProgram, VerbDef), WorldStateError>;

    /// Resolve a method call on `obj` or its ancestors.
    fn find_method_verb_on(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        vname: Symbol,
    ) -> Result<(VerbProgram, VerbDef), WorldStateError>;

    /// Seek the verb a parsed command refers to on `obj` or its ancestors.
    fn find_command_verb_on(
        &self,
        perms: &Obj,
        obj: &Obj,
        command_verb: Symbol,
        args: VerbArgsSpec,
    ) -> Result<Option<(VerbProgram, VerbDef)>, WorldStateError>;

    fn parents_of(&self, perms: &Obj, obj: &Obj) -> Result<ParentSpec, WorldStateError>;

    /// Replace the parents of `obj`, moving property definitions along.
    fn change_parents(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        new_parents: &ParentSpec,
    ) -> Result<(), WorldStateError>;

    fn children_of(&self, perms: &Obj, obj: &Obj) -> Result<Vec<Obj>, WorldStateError>;

    fn descendants_of(
        &self,
        perms: &Obj,
        obj: &Obj,
        include_self: bool,
    ) -> Result<Vec<Obj>, WorldStateError>;

    fn ancestors_of(
        &self,
        perms: &Obj,
        obj: &Obj,
        include_self: bool,
    ) -> Result<Vec<Obj>, WorldStateError>;

    fn valid(&self, obj: &Obj) -> Result<bool, WorldStateError>;
}

/// `WorldState` over an exclusively borrowed `ObjectStore`. Each mutation runs to completion
/// under that borrow.
pub struct DbWorldState<'a> {
    store: &'a mut ObjectStore,
}

impl<'a> DbWorldState<'a> {
    pub fn new(store: &'a mut ObjectStore) -> Self {
        Self { store }
    }

    fn perms(&self, who: &Obj) -> Result<Perms, WorldStateError> {
        let flags = self.flags_of(who)?;
        Ok(Perms::new(*who, flags))
    }

    fn owner_and_flags(&self, obj: &Obj) -> Result<(Obj, BitEnum<ObjFlag>), WorldStateError> {
        Ok((self.store.owner_of(*obj)?, self.store.flags_of(*obj)?))
    }

    fn check_object(&self, perms: &Obj, obj: &Obj, allows: ObjFlag) -> Result<(), WorldStateError> {
        let (owner, flags) = self.owner_and_flags(obj)?;
        self.perms(perms)?
            .check_object_allows(owner, flags, BitEnum::new_with(allows))
    }

    /// New parents must be fertile, or controlled by the principal.
    fn check_parents(&self, perms: &Obj, parents: &ParentSpec) -> Result<(), WorldStateError> {
        let who = self.perms(perms)?;
        for parent in parents.as_slice() {
            let (owner, flags) = self.owner_and_flags(parent)?;
            who.check_object_allows(owner, flags, BitEnum::new_with(ObjFlag::Fertile))?;
        }
        Ok(())
    }

    fn check_verb(
        &self,
        perms: &Obj,
        obj: &Obj,
        verb: VerbDescriptor,
        allows: VerbFlag,
    ) -> Result<VerbDef, WorldStateError> {
        let verbdef = self.store.get_verb(*obj, verb)?;
        self.perms(perms)?
            .check_verb_allows(verbdef.owner(), verbdef.flags(), allows)?;
        Ok(verbdef)
    }
}

/// Convert a 1-based verb index to the store's 0-based one.
fn store_descriptor(obj: &Obj, verb: &VerbDescriptor) -> Result<VerbDescriptor, WorldStateError> {
    match verb {
        VerbDescriptor::Name(name) => Ok(VerbDescriptor::Name(*name)),
        VerbDescriptor::Index(0) => Err(WorldStateError::InvalidVerbDescriptor(
            *obj,
            "0".to_string(),
        )),
        VerbDescriptor::Index(i) => Ok(VerbDescriptor::Index(i - 1)),
    }
}

impl WorldState for DbWorldState<'_> {
    fn players(&self) -> Result<Vec<Obj>, WorldStateError> {
        Ok(self.store.players())
    }

    fn owner_of(&self, obj: &Obj) -> Result<Obj, WorldStateError> {
        self.store.owner_of(*obj)
    }

    fn controls(&self, who: &Obj, what: &Obj) -> Result<bool, WorldStateError> {
        let owner = self.owner_of(what)?;
        Ok(self.perms(who)?.controls(owner))
    }

    fn flags_of(&self, obj: &Obj) -> Result<BitEnum<ObjFlag>, WorldStateError> {
        self.store.flags_of(*obj)
    }

    #[tracing::instrument(skip(self))]
    fn set_flags_of(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        flags: BitEnum<ObjFlag>,
    ) -> Result<(), WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Write)?;
        // Only wizards hand out programmer and wizard bits.
        let current = self.store.flags_of(*obj)?;
        for privileged in [ObjFlag::Programmer, ObjFlag::Wizard] {
            if flags.contains(privileged) != current.contains(privileged) {
                self.perms(perms)?.check_wizard()?;
            }
        }
        self.store.set_flags(*obj, flags)
    }

    fn name_of(&self, _perms: &Obj, obj: &Obj) -> Result<String, WorldStateError> {
        // Names are readable regardless of the object's read bit.
        self.store.name_of(*obj)
    }

    #[tracing::instrument(skip(self))]
    fn set_name_of(&mut self, perms: &Obj, obj: &Obj, name: &str) -> Result<(), WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Write)?;
        self.store.set_name(*obj, name)
    }

    #[tracing::instrument(skip(self))]
    fn set_owner_of(&mut self, perms: &Obj, obj: &Obj, owner: &Obj) -> Result<(), WorldStateError> {
        self.perms(perms)?.check_wizard()?;
        self.store.set_owner(*obj, *owner)
    }

    fn location_of(&self, _perms: &Obj, obj: &Obj) -> Result<Obj, WorldStateError> {
        // MOO permits location query even if the object is unreadable.
        self.store.location_of(*obj)
    }

    fn contents_of(&self, _perms: &Obj, obj: &Obj) -> Result<Vec<Obj>, WorldStateError> {
        self.store.contents_of(*obj)
    }

    #[tracing::instrument(skip(self))]
    fn create_object(
        &mut self,
        perms: &Obj,
        parents: &ParentSpec,
        owner: &Obj,
        name: &str,
        flags: BitEnum<ObjFlag>,
    ) -> Result<Obj, WorldStateError> {
        self.check_parents(perms, parents)?;
        // Non-wizards may only create objects they will own; only wizards make self-owned ones.
        self.perms(perms)?.check_obj_owner_perms(*owner)?;
        self.store
            .create_object(*owner, name, flags, parents.clone())
    }

    #[tracing::instrument(skip(self))]
    fn create_anonymous(
        &mut self,
        perms: &Obj,
        parents: &ParentSpec,
        owner: &Obj,
    ) -> Result<Obj, WorldStateError> {
        self.check_parents(perms, parents)?;
        self.perms(perms)?.check_obj_owner_perms(*owner)?;
        self.store.create_anonymous(*owner, parents.clone())
    }

    #[tracing::instrument(skip(self))]
    fn recycle_object(&mut self, perms: &Obj, obj: &Obj) -> Result<(), WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Write)?;
        self.store.recycle_object(*obj)
    }

    fn max_object(&self, _perms: &Obj) -> Result<Obj, WorldStateError> {
        Ok(self.store.max_object())
    }

    #[tracing::instrument(skip(self))]
    fn move_object(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        new_loc: &Obj,
    ) -> Result<(), WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Write)?;
        self.store.move_object(*obj, *new_loc)
    }

    fn verbs(&self, perms: &Obj, obj: &Obj) -> Result<VerbDefs, WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Read)?;
        self.store.verbs(*obj)
    }

    fn properties(&self, perms: &Obj, obj: &Obj) -> Result<Vec<PropDef>, WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Read)?;
        self.store.properties(*obj)
    }

    fn retrieve_property(
        &self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<Var, WorldStateError> {
        let (value, prop_perms) = self.store.get_property(*obj, pname)?;
        self.perms(perms)?
            .check_property_allows(&prop_perms, PropFlag::Read)?;
        Ok(value)
    }

    fn get_property_info(
        &self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<(PropDef, PropPerms), WorldStateError> {
        let (propdef, prop_perms) = self.store.property_info(*obj, pname)?;
        self.perms(perms)?
            .check_property_allows(&prop_perms, PropFlag::Read)?;
        Ok((propdef, prop_perms))
    }

    #[tracing::instrument(skip(self))]
    fn set_property_info(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
        update: PropInfoUpdate,
    ) -> Result<(), WorldStateError> {
        let (_, prop_perms) = self.store.property_info(*obj, pname)?;
        let who = self.perms(perms)?;
        who.check_property_allows(&prop_perms, PropFlag::Write)?;
        if let Some(new_owner) = update.owner {
            who.check_obj_owner_perms(new_owner)?;
        }
        self.store.set_property_info(*obj, pname, update)
    }

    #[tracing::instrument(skip(self))]
    fn update_property(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
        value: &Var,
    ) -> Result<(), WorldStateError> {
        let (_, prop_perms) = self.store.property_info(*obj, pname)?;
        self.perms(perms)?
            .check_property_allows(&prop_perms, PropFlag::Write)?;
        self.store.set_property(*obj, pname, value.clone())
    }

    fn is_property_clear(
        &self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<bool, WorldStateError> {
        let (_, prop_perms) = self.store.property_info(*obj, pname)?;
        self.perms(perms)?
            .check_property_allows(&prop_perms, PropFlag::Read)?;
        self.store.is_property_clear(*obj, pname)
    }

    #[tracing::instrument(skip(self))]
    fn clear_property(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<(), WorldStateError> {
        let (_, prop_perms) = self.store.property_info(*obj, pname)?;
        self.perms(perms)?
            .check_property_allows(&prop_perms, PropFlag::Write)?;
        self.store.clear_property(*obj, pname)
    }

    #[tracing::instrument(skip(self))]
    fn define_property(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
        owner: &Obj,
        flags: BitEnum<PropFlag>,
        value: Var,
    ) -> Result<(), WorldStateError> {
        // Wizard, or write permission on the object *and* being the property's owner.
        self.check_object(perms, obj, ObjFlag::Write)?;
        self.perms(perms)?.check_obj_owner_perms(*owner)?;
        self.store
            .define_property(*obj, pname, *owner, flags, value)
    }

    #[tracing::instrument(skip(self))]
    fn delete_property(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        pname: Symbol,
    ) -> Result<(), WorldStateError> {
        let (_, prop_perms) = self.store.property_info(*obj, pname)?;
        self.perms(perms)?
            .check_property_allows(&prop_perms, PropFlag::Write)?;
        self.store.delete_property(*obj, pname)
    }

    #[tracing::instrument(skip(self, program))]
    fn add_verb(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        names: &[Symbol],
        owner: &Obj,
        flags: BitEnum<VerbFlag>,
        args: VerbArgsSpec,
        program: VerbProgram,
    ) -> Result<(), WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Write)?;
        self.perms(perms)?.check_obj_owner_perms(*owner)?;
        self.store
            .add_verb(*obj, *owner, names, flags, args, program)?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn remove_verb(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        verb: &VerbDescriptor,
    ) -> Result<(), WorldStateError> {
        let verb = store_descriptor(obj, verb)?;
        self.check_verb(perms, obj, verb, VerbFlag::Write)?;
        self.store.delete_verb(*obj, verb)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, attrs))]
    fn update_verb(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        verb: &VerbDescriptor,
        attrs: VerbAttrs,
    ) -> Result<(), WorldStateError> {
        let verb = store_descriptor(obj, verb)?;
        self.check_verb(perms, obj, verb, VerbFlag::Write)?;
        if let Some(new_owner) = attrs.owner {
            self.perms(perms)?.check_obj_owner_perms(new_owner)?;
        }
        self.store.update_verb(*obj, verb, attrs)
    }

    fn get_verb(
        &self,
        perms: &Obj,
        obj: &Obj,
        verb: &VerbDescriptor,
    ) -> Result<VerbDef, WorldStateError> {
        let verb = store_descriptor(obj, verb)?;
        self.check_verb(perms, obj, verb, VerbFlag::Read)
    }

    fn retrieve_verb(
        &self,
        perms: &Obj,
        obj: &Obj,
        verb: &VerbDescriptor,
    ) -> Result<(VerbProgram, VerbDef), WorldStateError> {
        let verb = store_descriptor(obj, verb)?;
        let verbdef = self.check_verb(perms, obj, verb, VerbFlag::Read)?;
        Ok((verbdef.program().clone(), verbdef))
    }

    fn find_method_verb_on(
        &mut self,
        _perms: &Obj,
        obj: &Obj,
        vname: Symbol,
    ) -> Result<(VerbProgram, VerbDef), WorldStateError> {
        if !self.store.valid(*obj) {
            return Err(WorldStateError::ObjectNotFound(*obj));
        }
        // Calling a verb needs only its execute bit, which the lookup itself enforces.
        let verbdef = self
            .store
            .find_callable_verb(*obj, vname)
            .ok_or_else(|| WorldStateError::VerbNotFound(*obj, vname.to_string()))?;
        Ok((verbdef.program().clone(), verbdef))
    }

    fn find_command_verb_on(
        &self,
        _perms: &Obj,
        obj: &Obj,
        command_verb: Symbol,
        args: VerbArgsSpec,
    ) -> Result<Option<(VerbProgram, VerbDef)>, WorldStateError> {
        if !self.store.valid(*obj) {
            return Err(WorldStateError::ObjectNotFound(*obj));
        }
        Ok(self
            .store
            .find_command_verb(*obj, command_verb, args)
            .map(|v| (v.program().clone(), v)))
    }

    fn parents_of(&self, _perms: &Obj, obj: &Obj) -> Result<ParentSpec, WorldStateError> {
        self.store.parents_of(*obj)
    }

    #[tracing::instrument(skip(self))]
    fn change_parents(
        &mut self,
        perms: &Obj,
        obj: &Obj,
        new_parents: &ParentSpec,
    ) -> Result<(), WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Write)?;
        self.check_parents(perms, new_parents)?;
        self.store.change_parents(*obj, new_parents.clone())
    }

    fn children_of(&self, perms: &Obj, obj: &Obj) -> Result<Vec<Obj>, WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Read)?;
        self.store.children_of(*obj)
    }

    fn descendants_of(
        &self,
        perms: &Obj,
        obj: &Obj,
        include_self: bool,
    ) -> Result<Vec<Obj>, WorldStateError> {
        self.check_object(perms, obj, ObjFlag::Read)?;
        Ok(self.store.descendants(*obj, include_self))
    }

    fn ancestors_of(
        &self,
        _perms: &Obj,
        obj: &Obj,
        include_self: bool,
    ) -> Result<Vec<Obj>, WorldStateError> {
        if !self.store.valid(*obj) {
            return Err(WorldStateError::ObjectNotFound(*obj));
        }
        Ok(self.store.ancestors(*obj, include_self))
    }

    fn valid(&self, obj: &Obj) -> Result<bool, WorldStateError> {
        Ok(self.store.valid(*obj))
    }
}
