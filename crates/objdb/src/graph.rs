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

//! The only place parent/child and location/contents edges are edited. Both directions of an
//! edge change together; callers never see a one-sided link.

use crate::fatal::invariant_violation;
use crate::object_table::{ObjectRecord, ObjectTable, ParentSpec};
use moor_var::{NOTHING, Obj};

fn record_mut<'a>(
    table: &'a mut ObjectTable,
    obj: Obj,
    context: &str,
) -> &'a mut ObjectRecord {
    match table.get_mut(obj) {
        Some(r) => r,
        None => invariant_violation(context, &format!("edge endpoint {obj} is not in the table")),
    }
}

/// Install `new_parents` on `obj`, returning the old spec.
///
/// Numbered objects are unlinked from each old parent's children and linked into each new
/// parent's. Anonymous objects only record their parents.
pub(crate) fn set_parents(
    table: &mut ObjectTable,
    obj: Obj,
    new_parents: ParentSpec,
) -> ParentSpec {
    let linked = obj.is_numbered();
    let old = std::mem::replace(
        &mut record_mut(table, obj, "set_parents").parents,
        new_parents.clone(),
    );
    if !linked {
        return old;
    }
    for p in old.as_slice() {
        record_mut(table, *p, "set_parents unlink")
            .children
            .retain(|c| *c != obj);
    }
    for p in new_parents.as_slice() {
        let children = &mut record_mut(table, *p, "set_parents link").children;
        if !children.contains(&obj) {
            children.push(obj);
        }
    }
    old
}

/// Move `obj` into `new_location` (`#-1` for nowhere), returning the old location.
pub(crate) fn set_location(table: &mut ObjectTable, obj: Obj, new_location: Obj) -> Obj {
    let old = std::mem::replace(
        &mut record_mut(table, obj, "set_location").location,
        new_location,
    );
    if old != NOTHING {
        record_mut(table, old, "set_location unlink")
            .contents
            .retain(|c| *c != obj);
    }
    if new_location != NOTHING {
        let contents = &mut record_mut(table, new_location, "set_location link").contents;
        if !contents.contains(&obj) {
            contents.push(obj);
        }
    }
    old
}

#[cfg(test)]
mod tests {
    use super::*;
    use moor_common::util::BitEnum;

    #[test]
    fn test_parent_edges_are_symmetric() {
        let mut table = ObjectTable::with_capacity(8);
        let a = table.insert_numbered(NOTHING, "a", BitEnum::new());
        let b = table.insert_numbered(NOTHING, "b", BitEnum::new());
        let c = table.insert_numbered(NOTHING, "c", BitEnum::new());

        set_parents(&mut table, c, ParentSpec::List(vec![a, b]));
        assert_eq!(table.get(a).unwrap().children(), &[c]);
        assert_eq!(table.get(b).unwrap().children(), &[c]);

        let old = set_parents(&mut table, c, ParentSpec::Single(b));
        assert_eq!(old, ParentSpec::List(vec![a, b]));
        assert!(table.get(a).unwrap().children().is_empty());
        assert_eq!(table.get(b).unwrap().children(), &[c]);
    }

    #[test]
    fn test_anonymous_not_linked() {
        let mut table = ObjectTable::with_capacity(8);
        let a = table.insert_numbered(NOTHING, "a", BitEnum::new());
        let anon = table.insert_anonymous(a, BitEnum::new());
        set_parents(&mut table, anon, ParentSpec::Single(a));
        assert!(table.get(a).unwrap().children().is_empty());
        assert_eq!(table.get(anon).unwrap().parents(), &ParentSpec::Single(a));
    }

    #[test]
    fn test_location_edges_are_symmetric() {
        let mut table = ObjectTable::with_capacity(8);
        let room = table.insert_numbered(NOTHING, "room", BitEnum::new());
        let box_ = table.insert_numbered(NOTHING, "box", BitEnum::new());
        let thing = table.insert_numbered(NOTHING, "thing", BitEnum::new());
        set_location(&mut table, thing, room);
        assert_eq!(table.get(room).unwrap().contents(), &[thing]);
        assert_eq!(set_location(&mut table, thing, box_), room);
        assert!(table.get(room).unwrap().contents().is_empty());
        assert_eq!(table.get(box_).unwrap().contents(), &[thing]);
        set_location(&mut table, thing, NOTHING);
        assert!(table.get(box_).unwrap().contents().is_empty());
    }
}
