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

//! Verb store, dispatch, and resolution cache behaviour.

use crate::{ObjDbConfig, ObjectStore, ParentSpec, VerbAttrs, VerbDef, VerbDescriptor};
use moor_common::model::{
    ArgSpec, BinaryType, PrepSpec, Preposition, VerbArgsSpec, VerbFlag, VerbProgram,
    WorldStateError,
};
use moor_common::util::BitEnum;
use moor_var::{NOTHING, Obj, Symbol};
use test_case::test_case;

fn store(cache: bool) -> ObjectStore {
    ObjectStore::new(ObjDbConfig {
        verb_cache_enabled: cache,
        verify_layout_after_mutation: true,
        ..ObjDbConfig::default()
    })
}

fn mk(store: &mut ObjectStore, parents: &[Obj]) -> Obj {
    store
        .create_object(NOTHING, "obj", BitEnum::new(), ParentSpec::list(parents.to_vec()))
        .unwrap()
}

fn program(text: &str) -> VerbProgram {
    VerbProgram::new(BinaryType::LambdaMoo18X, text.as_bytes())
}

fn add(store: &mut ObjectStore, obj: Obj, names: &str) -> VerbDef {
    add_with(store, obj, names, VerbFlag::rxd(), VerbArgsSpec::this_none_this())
}

fn add_with(
    store: &mut ObjectStore,
    obj: Obj,
    names: &str,
    flags: BitEnum<VerbFlag>,
    args: VerbArgsSpec,
) -> VerbDef {
    let names: Vec<Symbol> = names.split_whitespace().map(Symbol::mk).collect();
    store
        .add_verb(obj, obj, &names, flags, args, program(names[0].as_arc_str().as_str()))
        .unwrap()
}

fn call(store: &mut ObjectStore, receiver: Obj, name: &str) -> Option<Obj> {
    store
        .find_callable_verb(receiver, Symbol::mk(name))
        .map(|v| v.location())
}

#[test]
fn test_verb_descriptors() {
    let mut s = store(true);
    let o = mk(&mut s, &[]);
    add(&mut s, o, "l*ook examine");
    add(&mut s, o, "get take");

    let look = s.get_verb(o, VerbDescriptor::Name(Symbol::mk("lo"))).unwrap();
    assert_eq!(look.names()[1], Symbol::mk("examine"));
    let get = s.get_verb(o, VerbDescriptor::Index(1)).unwrap();
    assert_eq!(get.names()[0], Symbol::mk("get"));

    assert_eq!(
        s.get_verb(o, VerbDescriptor::Index(2)),
        Err(WorldStateError::InvalidVerbDescriptor(o, "2".to_string()))
    );
    assert_eq!(
        s.get_verb(o, VerbDescriptor::Name(Symbol::mk("drop"))),
        Err(WorldStateError::VerbNotFound(o, "drop".to_string()))
    );
    assert_eq!(
        s.get_verb_program(o, VerbDescriptor::Name(Symbol::mk("take")))
            .unwrap()
            .bytes(),
        b"get"
    );
}

#[test]
fn test_edit_and_delete() {
    let mut s = store(true);
    let o = mk(&mut s, &[]);
    let original = add(&mut s, o, "look");

    s.rename_verb(
        o,
        VerbDescriptor::Name(Symbol::mk("look")),
        &[Symbol::mk("peer")],
    )
    .unwrap();
    s.set_verb_flags(o, VerbDescriptor::Index(0), VerbFlag::r())
        .unwrap();
    s.set_verb_args(o, VerbDescriptor::Index(0), VerbArgsSpec::none_none_none())
        .unwrap();
    s.set_verb_owner(o, VerbDescriptor::Index(0), NOTHING).unwrap();
    s.set_verb_program(o, VerbDescriptor::Index(0), program("peer harder"))
        .unwrap();

    let edited = s.get_verb(o, VerbDescriptor::Name(Symbol::mk("peer"))).unwrap();
    assert_eq!(edited.uuid(), original.uuid());
    assert_eq!(edited.flags(), VerbFlag::r());
    assert_eq!(edited.args(), VerbArgsSpec::none_none_none());
    assert_eq!(edited.owner(), NOTHING);
    assert_eq!(edited.program().bytes(), b"peer harder");
    // The definition handed out earlier is untouched.
    assert_eq!(original.names(), &[Symbol::mk("look")]);

    assert!(matches!(
        s.rename_verb(o, VerbDescriptor::Index(0), &[]),
        Err(WorldStateError::InvalidArgument(_))
    ));

    let removed = s
        .delete_verb(o, VerbDescriptor::Name(Symbol::mk("peer")))
        .unwrap();
    assert_eq!(removed.uuid(), original.uuid());
    assert!(s.verbs(o).unwrap().is_empty());
}

#[test]
fn test_update_verb_applies_all_attributes() {
    let mut s = store(true);
    let o = mk(&mut s, &[]);
    add(&mut s, o, "look");
    s.update_verb(
        o,
        VerbDescriptor::Index(0),
        VerbAttrs {
            names: Some(vec![Symbol::mk("l*ook"), Symbol::mk("gaze")]),
            flags: Some(VerbFlag::rx()),
            ..VerbAttrs::default()
        },
    )
    .unwrap();
    let v = s.get_verb(o, VerbDescriptor::Name(Symbol::mk("gaze"))).unwrap();
    assert_eq!(v.flags(), VerbFlag::rx());
    assert_eq!(v.names().len(), 2);
}

#[test_case(true; "cached")]
#[test_case(false; "uncached")]
fn test_inheritance_and_override(cache: bool) {
    let mut s = store(cache);
    let root = mk(&mut s, &[]);
    let mid = mk(&mut s, &[root]);
    let leaf = mk(&mut s, &[mid]);
    add(&mut s, root, "look");
    add(&mut s, root, "g*et");

    assert_eq!(call(&mut s, leaf, "look"), Some(root));
    assert_eq!(call(&mut s, leaf, "ge"), Some(root));
    assert_eq!(call(&mut s, leaf, "smell"), None);

    add(&mut s, mid, "look");
    assert_eq!(call(&mut s, leaf, "look"), Some(mid));
    assert_eq!(call(&mut s, root, "look"), Some(root));

    s.delete_verb(mid, VerbDescriptor::Index(0)).unwrap();
    assert_eq!(call(&mut s, leaf, "look"), Some(root));
}

#[test_case(true; "cached")]
#[test_case(false; "uncached")]
fn test_callable_requires_exec(cache: bool) {
    let mut s = store(cache);
    let root = mk(&mut s, &[]);
    let kid = mk(&mut s, &[root]);
    add(&mut s, root, "look");
    add_with(&mut s, kid, "look", VerbFlag::r(), VerbArgsSpec::this_none_this());

    // The non-executable override is skipped, not fatal.
    assert_eq!(call(&mut s, kid, "look"), Some(root));
    s.set_verb_flags(kid, VerbDescriptor::Index(0), VerbFlag::rx())
        .unwrap();
    assert_eq!(call(&mut s, kid, "look"), Some(kid));
}

#[test]
fn test_receivers_share_first_verb_bearer_entries() {
    let mut s = store(true);
    let root = mk(&mut s, &[]);
    add(&mut s, root, "look");
    let a = mk(&mut s, &[root]);
    let b = mk(&mut s, &[root]);

    let base = s.verb_cache_stats();
    assert_eq!(call(&mut s, a, "look"), Some(root));
    assert_eq!(call(&mut s, b, "look"), Some(root));
    assert_eq!(call(&mut s, a, "smell"), None);
    assert_eq!(call(&mut s, b, "smell"), None);
    let stats = s.verb_cache_stats();
    assert_eq!(stats.misses - base.misses, 2);
    assert_eq!(stats.hits - base.hits, 2);
}

#[test_case(true; "cached")]
#[test_case(false; "uncached")]
fn test_multiple_parents(cache: bool) {
    let mut s = store(cache);
    let a = mk(&mut s, &[]);
    let c = mk(&mut s, &[]);
    let b = mk(&mut s, &[a, c]);
    add(&mut s, a, "look");
    add(&mut s, c, "smell");

    // The verb bearer for `b` is `a`, but `smell` lives on the second branch.
    assert_eq!(call(&mut s, b, "look"), Some(a));
    assert_eq!(call(&mut s, b, "smell"), Some(c));
    assert_eq!(call(&mut s, b, "smell"), Some(c));

    // A single-parent receiver of `a` shares the same entry, and really has no `smell`.
    let only_a = mk(&mut s, &[a]);
    assert_eq!(call(&mut s, only_a, "smell"), None);
    assert_eq!(call(&mut s, b, "smell"), Some(c));

    add(&mut s, c, "look");
    assert_eq!(call(&mut s, b, "look"), Some(a));
    s.change_parents(b, ParentSpec::list(vec![c, a])).unwrap();
    assert_eq!(call(&mut s, b, "look"), Some(c));
}

#[test]
fn test_no_verb_bearer_skips_cache() {
    let mut s = store(true);
    let a = mk(&mut s, &[]);
    let b = mk(&mut s, &[a]);
    let before = s.verb_cache_stats();
    assert_eq!(call(&mut s, b, "look"), None);
    assert_eq!(s.verb_cache_stats(), before);
    assert_eq!(call(&mut s, Obj::mk_id(77), "look"), None);
}

#[test]
fn test_mutations_flush() {
    let mut s = store(true);
    let a = mk(&mut s, &[]);
    let flushes = |s: &ObjectStore| s.verb_cache_stats().flushes;

    let n = flushes(&s);
    add(&mut s, a, "look");
    assert_eq!(flushes(&s), n + 1);
    s.set_verb_flags(a, VerbDescriptor::Index(0), VerbFlag::rx())
        .unwrap();
    assert_eq!(flushes(&s), n + 2);

    // Reparenting a leaf with no verbs of its own cannot change any cached resolution.
    let leaf = mk(&mut s, &[a]);
    let n = flushes(&s);
    s.change_parents(leaf, ParentSpec::Nothing).unwrap();
    assert_eq!(flushes(&s), n);

    // Once it has children, it must.
    let kid = mk(&mut s, &[leaf]);
    let n = flushes(&s);
    s.change_parents(leaf, ParentSpec::single(a)).unwrap();
    assert_eq!(flushes(&s), n + 1);
    assert_eq!(call(&mut s, kid, "look"), Some(a));
}

#[test]
fn test_find_command_verb() {
    let mut s = store(true);
    let root = mk(&mut s, &[]);
    let thing = mk(&mut s, &[root]);
    let put_in = VerbArgsSpec {
        dobj: ArgSpec::Any,
        prep: PrepSpec::Other(Preposition::IntoIn),
        iobj: ArgSpec::This,
    };
    add_with(&mut s, root, "put", VerbFlag::rxd(), put_in);
    add_with(
        &mut s,
        root,
        "put",
        VerbFlag::rxd(),
        VerbArgsSpec {
            dobj: ArgSpec::This,
            prep: PrepSpec::Any,
            iobj: ArgSpec::Any,
        },
    );

    let parsed = VerbArgsSpec {
        dobj: ArgSpec::Any,
        prep: PrepSpec::Other(Preposition::IntoIn),
        iobj: ArgSpec::This,
    };
    let found = s
        .find_command_verb(thing, Symbol::mk("put"), parsed)
        .unwrap();
    assert_eq!(found.args(), put_in);

    let parsed = VerbArgsSpec {
        dobj: ArgSpec::This,
        prep: PrepSpec::Other(Preposition::OnTopOfOn),
        iobj: ArgSpec::None,
    };
    let found = s
        .find_command_verb(thing, Symbol::mk("put"), parsed)
        .unwrap();
    assert_eq!(found.args().prep, PrepSpec::Any);

    let parsed = VerbArgsSpec {
        dobj: ArgSpec::None,
        prep: PrepSpec::None,
        iobj: ArgSpec::None,
    };
    assert!(s.find_command_verb(thing, Symbol::mk("put"), parsed).is_none());
}
