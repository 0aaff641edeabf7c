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

use crate::fatal::invariant_violation;
use crate::layout::layout_of;
use crate::propdefs::PropValue;
use crate::store::ObjectStore;
use moor_var::Obj;
use thiserror::Error;

/// A way in which an object's property slots disagree with its ancestors' definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    #[error("{0} is not in the object table")]
    Missing(Obj),
    #[error("{obj} has {actual} property slots but its ancestors define {expected}")]
    SlotCount {
        obj: Obj,
        expected: usize,
        actual: usize,
    },
    #[error("{obj} has a cleared slot for its own property {name}")]
    ClearedDefinerSlot { obj: Obj, name: String },
}

impl ObjectStore {
    /// Verify that `obj`'s slot count matches the definitions along its ancestors, and that
    /// none of its own properties are cleared.
    pub fn check_layout(&self, obj: Obj) -> Result<(), LayoutViolation> {
        let Some(record) = self.table.get(obj) else {
            return Err(LayoutViolation::Missing(obj));
        };
        let expected: usize = layout_of(&self.table, obj).iter().map(|b| b.len).sum();
        if record.propvals.len() != expected {
            return Err(LayoutViolation::SlotCount {
                obj,
                expected,
                actual: record.propvals.len(),
            });
        }
        // An object's own block always comes first.
        for (def, slot) in record.propdefs.iter().zip(&record.propvals) {
            if slot.value == PropValue::Inherited {
                return Err(LayoutViolation::ClearedDefinerSlot {
                    obj,
                    name: def.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// `check_layout` over every valid object. Stale anonymous objects are skipped; their
    /// layout is expected to lag behind their ancestors'.
    pub fn check_all_layouts(&self) -> Result<(), LayoutViolation> {
        let ids: Vec<Obj> = self
            .table
            .numbered_ids()
            .chain(self.table.anonymous_ids())
            .filter(|o| self.valid(*o))
            .collect();
        ids.into_iter().try_for_each(|o| self.check_layout(o))
    }

    pub(crate) fn verify_after_mutation(&self, context: &str, objs: &[Obj]) {
        if !self.config.verify_layout_after_mutation {
            return;
        }
        for obj in objs {
            if let Err(violation) = self.check_layout(*obj) {
                invariant_violation(context, &violation.to_string());
            }
        }
    }
}
