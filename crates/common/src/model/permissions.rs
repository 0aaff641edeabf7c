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

use crate::model::objects::ObjFlag;
use crate::model::props::{PropFlag, PropPerms};
use crate::model::verbs::VerbFlag;
use crate::model::WorldStateError;
use crate::util::BitEnum;
use moor_var::Obj;

/// Combination of who a set of permissions is for, and what permissions they have.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Perms {
    // "Who" the permissions are for
    pub who: Obj,
    // What flags apply for those permissions.
    pub flags: BitEnum<ObjFlag>,
}

impl Perms {
    #[must_use]
    pub fn new(who: Obj, flags: BitEnum<ObjFlag>) -> Self {
        Self { who, flags }
    }

    #[must_use]
    pub fn is_wizard(&self) -> bool {
        self.flags.contains(ObjFlag::Wizard)
    }

    #[must_use]
    pub fn controls(&self, owner: Obj) -> bool {
        self.who == owner || self.is_wizard()
    }

    pub fn check_property_allows(
        &self,
        property_permissions: &PropPerms,
        allows: PropFlag,
    ) -> Result<(), WorldStateError> {
        if self.controls(property_permissions.owner()) {
            return Ok(());
        }
        if !property_permissions.flags().contains(allows) {
            return Err(WorldStateError::PropertyPermissionDenied);
        }
        Ok(())
    }

    pub fn check_verb_allows(
        &self,
        verb_owner: Obj,
        verb_flags: BitEnum<VerbFlag>,
        allows: VerbFlag,
    ) -> Result<(), WorldStateError> {
        if self.controls(verb_owner) {
            return Ok(());
        }
        if !verb_flags.contains(allows) {
            return Err(WorldStateError::VerbPermissionDenied);
        }
        Ok(())
    }

    pub fn check_object_allows(
        &self,
        object_owner: Obj,
        object_flags: BitEnum<ObjFlag>,
        allows: BitEnum<ObjFlag>,
    ) -> Result<(), WorldStateError> {
        if self.controls(object_owner) {
            return Ok(());
        }
        if !object_flags.contains_all(allows) {
            return Err(WorldStateError::ObjectPermissionDenied);
        }
        Ok(())
    }

    pub fn check_obj_owner_perms(&self, object_owner: Obj) -> Result<(), WorldStateError> {
        if self.controls(object_owner) {
            return Ok(());
        }
        Err(WorldStateError::ObjectPermissionDenied)
    }

    pub fn check_wizard(&self) -> Result<(), WorldStateError> {
        if self.is_wizard() {
            return Ok(());
        }
        Err(WorldStateError::ObjectPermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard() -> Perms {
        Perms::new(Obj::mk_id(2), BitEnum::new_with(ObjFlag::Wizard))
    }

    fn player(id: i32) -> Perms {
        Perms::new(Obj::mk_id(id), BitEnum::new_with(ObjFlag::User))
    }

    #[test]
    fn test_owner_and_wizard_bypass() {
        let perms = PropPerms::new(Obj::mk_id(5), BitEnum::new());
        assert!(player(5).check_property_allows(&perms, PropFlag::Write).is_ok());
        assert!(wizard().check_property_allows(&perms, PropFlag::Write).is_ok());
        assert_eq!(
            player(6).check_property_allows(&perms, PropFlag::Read),
            Err(WorldStateError::PropertyPermissionDenied)
        );
    }

    #[test]
    fn test_flag_grants() {
        let perms = PropPerms::new(Obj::mk_id(5), PropFlag::r());
        assert!(player(6).check_property_allows(&perms, PropFlag::Read).is_ok());
        assert!(player(6).check_property_allows(&perms, PropFlag::Write).is_err());

        let fertile = BitEnum::new_with(ObjFlag::Fertile);
        assert!(
            player(6)
                .check_object_allows(Obj::mk_id(5), fertile, BitEnum::new_with(ObjFlag::Fertile))
                .is_ok()
        );
        assert_eq!(
            player(6).check_object_allows(Obj::mk_id(5), fertile, BitEnum::new_with(ObjFlag::Write)),
            Err(WorldStateError::ObjectPermissionDenied)
        );
        assert_eq!(
            player(6).check_verb_allows(Obj::mk_id(5), VerbFlag::rx(), VerbFlag::Write),
            Err(WorldStateError::VerbPermissionDenied)
        );
    }
}
