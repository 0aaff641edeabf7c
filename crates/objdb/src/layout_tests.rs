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

//! Property layout and chparent behaviour.

use crate::{ObjDbConfig, ObjectStore, ParentSpec, PropInfoUpdate};
use moor_common::model::{ObjFlag, PropFlag, WorldStateError};
use moor_common::util::BitEnum;
use moor_var::{NOTHING, Obj, Symbol, v_int, v_str};

fn store() -> ObjectStore {
    ObjectStore::new(ObjDbConfig {
        verify_layout_after_mutation: true,
        ..ObjDbConfig::default()
    })
}

fn mk(store: &mut ObjectStore, name: &str, parents: &[Obj]) -> Obj {
    store
        .create_object(NOTHING, name, BitEnum::new(), ParentSpec::list(parents.to_vec()))
        .unwrap()
}

fn mk_owned(store: &mut ObjectStore, owner: Obj, parents: &[Obj]) -> Obj {
    store
        .create_object(owner, "thing", BitEnum::new(), ParentSpec::list(parents.to_vec()))
        .unwrap()
}

fn define(store: &mut ObjectStore, obj: Obj, name: &str, value: i64) {
    let owner = store.owner_of(obj).unwrap();
    store
        .define_property(obj, Symbol::mk(name), owner, PropFlag::rw(), v_int(value))
        .unwrap();
}

fn get(store: &ObjectStore, obj: Obj, name: &str) -> Result<i64, WorldStateError> {
    store
        .get_property(obj, Symbol::mk(name))
        .map(|(v, _)| v.as_integer().unwrap())
}

#[test]
fn test_define_propagates_to_descendants() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let b = mk(&mut s, "b", &[a]);
    let c = mk(&mut s, "c", &[b]);
    define(&mut s, a, "color", 1);

    assert_eq!(get(&s, a, "color"), Ok(1));
    assert_eq!(get(&s, b, "color"), Ok(1));
    assert_eq!(get(&s, c, "color"), Ok(1));
    assert!(s.is_property_clear(c, Symbol::mk("color")).unwrap());
    assert!(!s.is_property_clear(a, Symbol::mk("color")).unwrap());

    s.set_property(b, Symbol::mk("color"), v_int(7)).unwrap();
    assert_eq!(get(&s, b, "color"), Ok(7));
    assert_eq!(get(&s, c, "color"), Ok(7));
    assert_eq!(get(&s, a, "color"), Ok(1));

    s.clear_property(b, Symbol::mk("color")).unwrap();
    assert_eq!(get(&s, c, "color"), Ok(1));
    s.check_all_layouts().unwrap();
}

#[test]
fn test_define_after_children_exist_keeps_existing_values() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let b = mk(&mut s, "b", &[a]);
    define(&mut s, a, "first", 1);
    define(&mut s, b, "own", 2);
    s.set_property(b, Symbol::mk("first"), v_int(10)).unwrap();

    // A new definition on `a` lands after `a`'s existing block in `b`.
    define(&mut s, a, "second", 3);
    assert_eq!(get(&s, b, "first"), Ok(10));
    assert_eq!(get(&s, b, "own"), Ok(2));
    assert_eq!(get(&s, b, "second"), Ok(3));
    let names: Vec<String> = s
        .all_properties(b)
        .unwrap()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    assert_eq!(names, vec!["own", "first", "second"]);
}

#[test]
fn test_duplicate_definition_rejected() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let b = mk(&mut s, "b", &[a]);
    define(&mut s, b, "size", 1);

    // Visible on a descendant.
    let err = s
        .define_property(a, Symbol::mk("SIZE"), a, PropFlag::rw(), v_int(0))
        .unwrap_err();
    assert_eq!(
        err,
        WorldStateError::DuplicatePropertyDefinition(b, "SIZE".to_string())
    );

    // Visible through an ancestor.
    define(&mut s, a, "weight", 1);
    let err = s
        .define_property(b, Symbol::mk("weight"), b, PropFlag::rw(), v_int(0))
        .unwrap_err();
    assert_eq!(
        err,
        WorldStateError::DuplicatePropertyDefinition(a, "weight".to_string())
    );
}

#[test]
fn test_delete_property() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let b = mk(&mut s, "b", &[a]);
    define(&mut s, a, "x", 1);
    define(&mut s, a, "y", 2);
    s.set_property(b, Symbol::mk("y"), v_int(20)).unwrap();

    assert_eq!(
        s.delete_property(b, Symbol::mk("x")),
        Err(WorldStateError::PropertyDefinitionNotFound(
            b,
            "x".to_string()
        ))
    );

    s.delete_property(a, Symbol::mk("x")).unwrap();
    assert_eq!(
        get(&s, b, "x"),
        Err(WorldStateError::PropertyNotFound(b, "x".to_string()))
    );
    assert_eq!(get(&s, b, "y"), Ok(20));
    assert_eq!(s.table().get(b).unwrap().propvals().len(), 1);
}

#[test]
fn test_clear_on_definer_rejected() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    define(&mut s, a, "x", 1);
    assert_eq!(
        s.clear_property(a, Symbol::mk("x")),
        Err(WorldStateError::CannotClearDefiner(a, "x".to_string()))
    );
}

#[test]
fn test_chown_decides_descendant_slot_owner() {
    let mut s = store();
    let alice = mk(&mut s, "alice", &[]);
    let bob = mk(&mut s, "bob", &[]);
    let a = mk_owned(&mut s, alice, &[]);
    let b = mk_owned(&mut s, bob, &[a]);

    s.define_property(a, Symbol::mk("notes"), alice, PropFlag::rc(), v_str(""))
        .unwrap();
    s.define_property(a, Symbol::mk("title"), alice, PropFlag::r(), v_str(""))
        .unwrap();
    let (_, notes) = s.property_info(b, Symbol::mk("notes")).unwrap();
    let (_, title) = s.property_info(b, Symbol::mk("title")).unwrap();
    assert_eq!(notes.owner(), bob);
    assert_eq!(title.owner(), alice);

    // The same rule applies to slots created by reparenting.
    let c = mk_owned(&mut s, bob, &[]);
    s.change_parents(c, ParentSpec::single(a)).unwrap();
    assert_eq!(s.property_info(c, Symbol::mk("notes")).unwrap().1.owner(), bob);
    assert_eq!(s.property_info(c, Symbol::mk("title")).unwrap().1.owner(), alice);
}

#[test]
fn test_chparent_moves_properties() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    define(&mut s, a, "p", 1);
    define(&mut s, a, "q", 2);
    let b = mk(&mut s, "b", &[a]);
    s.set_property(b, Symbol::mk("p"), v_int(5)).unwrap();
    let c = mk(&mut s, "c", &[]);
    define(&mut s, c, "r", 3);

    s.change_parents(b, ParentSpec::single(c)).unwrap();
    assert_eq!(
        get(&s, b, "p"),
        Err(WorldStateError::PropertyNotFound(b, "p".to_string()))
    );
    assert_eq!(get(&s, b, "r"), Ok(3));
    assert!(s.is_property_clear(b, Symbol::mk("r")).unwrap());
    assert_eq!(s.children_of(a).unwrap(), Vec::<Obj>::new());
    assert_eq!(s.children_of(c).unwrap(), vec![b]);

    // Coming back gives fresh, cleared slots: the old override is gone.
    s.change_parents(b, ParentSpec::single(a)).unwrap();
    assert_eq!(get(&s, b, "p"), Ok(1));
    assert!(s.is_property_clear(b, Symbol::mk("p")).unwrap());
}

#[test]
fn test_chparent_preserves_values_of_surviving_ancestors() {
    let mut s = store();
    let root = mk(&mut s, "root", &[]);
    define(&mut s, root, "shared", 0);
    let a = mk(&mut s, "a", &[root]);
    let c = mk(&mut s, "c", &[root]);
    define(&mut s, c, "extra", 9);
    let b = mk(&mut s, "b", &[a]);
    let kid = mk(&mut s, "kid", &[b]);
    s.set_property(b, Symbol::mk("shared"), v_int(42)).unwrap();
    s.set_property(kid, Symbol::mk("shared"), v_int(43)).unwrap();

    s.change_parents(b, ParentSpec::single(c)).unwrap();
    assert_eq!(get(&s, b, "shared"), Ok(42));
    assert_eq!(get(&s, kid, "shared"), Ok(43));
    assert_eq!(get(&s, kid, "extra"), Ok(9));
    assert_eq!(s.ancestors(kid, false), vec![b, c, root]);
}

#[test]
fn test_diamond_has_one_slot_per_property() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    define(&mut s, a, "x", 1);
    let b = mk(&mut s, "b", &[a]);
    let c = mk(&mut s, "c", &[a]);
    let d = mk(&mut s, "d", &[b, c]);

    assert_eq!(s.table().get(d).unwrap().propvals().len(), 1);
    assert_eq!(s.ancestor_count(d), 3);

    s.set_property(d, Symbol::mk("x"), v_int(11)).unwrap();
    s.change_parents(d, ParentSpec::list(vec![c])).unwrap();
    assert_eq!(get(&s, d, "x"), Ok(11));
}

#[test]
fn test_cleared_slot_resolves_through_first_path_to_definer() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    define(&mut s, a, "x", 1);
    let b = mk(&mut s, "b", &[a]);
    let c = mk(&mut s, "c", &[a]);
    let d = mk(&mut s, "d", &[b, c]);

    // `c` overrides, but `d` reaches `a` through `b` first.
    s.set_property(c, Symbol::mk("x"), v_int(3)).unwrap();
    assert_eq!(get(&s, d, "x"), Ok(1));
    s.set_property(b, Symbol::mk("x"), v_int(2)).unwrap();
    assert_eq!(get(&s, d, "x"), Ok(2));
}

#[test]
fn test_chparent_name_conflict_rejected() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let c = mk(&mut s, "c", &[]);
    define(&mut s, a, "title", 1);
    define(&mut s, c, "title", 2);
    let b = mk(&mut s, "b", &[a]);
    let kid = mk(&mut s, "kid", &[b]);
    define(&mut s, kid, "size", 1);

    assert_eq!(
        s.change_parents(b, ParentSpec::list(vec![a, c])),
        Err(WorldStateError::ChparentPropertyNameConflict(
            a,
            c,
            "title".to_string()
        ))
    );
    // A descendant's own definitions count too.
    let other = mk(&mut s, "other", &[]);
    define(&mut s, other, "size", 5);
    assert!(matches!(
        s.change_parents(b, ParentSpec::single(other)),
        Err(WorldStateError::ChparentPropertyNameConflict(_, _, _))
    ));
    // Nothing moved.
    assert_eq!(s.parents_of(b).unwrap(), ParentSpec::List(vec![a]));
    assert_eq!(get(&s, kid, "title"), Ok(1));
}

#[test]
fn test_chparent_rejects_bad_parents() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let b = mk(&mut s, "b", &[a]);
    let c = mk(&mut s, "c", &[]);

    assert_eq!(
        s.change_parents(a, ParentSpec::single(b)),
        Err(WorldStateError::RecursiveParent(a, b))
    );
    assert_eq!(
        s.change_parents(a, ParentSpec::single(a)),
        Err(WorldStateError::RecursiveParent(a, a))
    );
    assert_eq!(
        s.change_parents(b, ParentSpec::list(vec![c, c])),
        Err(WorldStateError::DuplicateParent(c))
    );
    let missing = Obj::mk_id(99);
    assert_eq!(
        s.change_parents(b, ParentSpec::single(missing)),
        Err(WorldStateError::InvalidParent(missing))
    );
    let anon = s.create_anonymous(a, ParentSpec::single(a)).unwrap();
    assert_eq!(
        s.change_parents(b, ParentSpec::single(anon)),
        Err(WorldStateError::InvalidParent(anon))
    );
}

#[test]
fn test_rename_property() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let b = mk(&mut s, "b", &[a]);
    define(&mut s, a, "old", 1);
    define(&mut s, b, "taken", 2);

    assert_eq!(
        s.rename_property(a, Symbol::mk("old"), Symbol::mk("taken")),
        Err(WorldStateError::DuplicatePropertyDefinition(
            b,
            "taken".to_string()
        ))
    );
    s.rename_property(a, Symbol::mk("old"), Symbol::mk("new"))
        .unwrap();
    assert_eq!(get(&s, b, "new"), Ok(1));
    assert!(get(&s, b, "old").is_err());
}

#[test]
fn test_set_property_info() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let b = mk(&mut s, "b", &[a]);
    define(&mut s, a, "x", 1);

    s.set_property_info(
        b,
        Symbol::mk("x"),
        PropInfoUpdate {
            owner: Some(b),
            flags: Some(PropFlag::r()),
            name: None,
        },
    )
    .unwrap();
    let (def, perms) = s.property_info(b, Symbol::mk("x")).unwrap();
    assert_eq!(def.definer(), a);
    assert_eq!(perms.owner(), b);
    assert_eq!(perms.flags(), PropFlag::r());
    // Only the target slot changed.
    assert_eq!(s.property_info(a, Symbol::mk("x")).unwrap().1.owner(), a);

    let rename = PropInfoUpdate {
        name: Some(Symbol::mk("y")),
        ..PropInfoUpdate::default()
    };
    assert_eq!(
        s.set_property_info(b, Symbol::mk("x"), rename.clone()),
        Err(WorldStateError::PropertyDefinitionNotFound(
            b,
            "x".to_string()
        ))
    );
    s.set_property_info(a, Symbol::mk("x"), rename).unwrap();
    assert_eq!(get(&s, b, "y"), Ok(1));
}

#[test]
fn test_anonymous_object_goes_stale() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    define(&mut s, a, "x", 1);
    let anon = s.create_anonymous(a, ParentSpec::single(a)).unwrap();

    assert!(s.valid(anon));
    assert_eq!(get(&s, anon, "x"), Ok(1));
    assert!(s.children_of(a).unwrap().is_empty());
    assert!(s.flags_of(anon).unwrap().contains(ObjFlag::Anonymous));

    // Unrelated objects don't disturb it.
    mk(&mut s, "sibling", &[a]);
    assert!(s.valid(anon));

    define(&mut s, a, "y", 2);
    assert!(!s.valid(anon));
    assert_eq!(
        get(&s, anon, "x"),
        Err(WorldStateError::ObjectNotFound(anon))
    );
}

#[test]
fn test_anonymous_children_are_relaid_out() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let c = mk(&mut s, "c", &[]);
    define(&mut s, c, "z", 4);
    let b = mk(&mut s, "b", &[a]);
    let anon = s.create_anonymous(b, ParentSpec::single(b)).unwrap();

    s.change_parents_with_anonymous(b, ParentSpec::single(c), &[anon])
        .unwrap();
    assert!(s.valid(anon));
    assert_eq!(get(&s, anon, "z"), Ok(4));
    s.check_layout(anon).unwrap();

    assert!(matches!(
        s.change_parents_with_anonymous(b, ParentSpec::single(a), &[a]),
        Err(WorldStateError::InvalidArgument(_))
    ));
}

#[test]
fn test_stale_anonymous_child_is_rejected() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let c = mk(&mut s, "c", &[]);
    let b = mk(&mut s, "b", &[a]);
    define(&mut s, b, "w", 3);
    let anon = s.create_anonymous(b, ParentSpec::single(b)).unwrap();
    define(&mut s, b, "x", 7);
    assert!(!s.valid(anon));

    assert_eq!(
        s.change_parents_with_anonymous(b, ParentSpec::single(c), &[anon]),
        Err(WorldStateError::ObjectNotFound(anon))
    );

    // Nothing moved and b's values are intact.
    assert_eq!(s.parents_of(b).unwrap().as_slice(), &[a]);
    assert_eq!(get(&s, b, "w"), Ok(3));
    assert_eq!(get(&s, b, "x"), Ok(7));
    s.check_layout(b).unwrap();
}

#[test]
fn test_create_failure_leaves_no_object() {
    let mut s = store();
    let a = mk(&mut s, "a", &[]);
    let before = s.max_object();
    assert!(
        s.create_object(NOTHING, "bad", BitEnum::new(), ParentSpec::list(vec![a, a]))
            .is_err()
    );
    assert_eq!(s.max_object(), before);
    assert_eq!(s.objects(), vec![a]);
}
