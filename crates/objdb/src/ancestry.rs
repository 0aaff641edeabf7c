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

//! Ancestor/descendant resolution over the multi-parent inheritance graph, and the same walk
//! over the single-parent containment hierarchy.
//!
//! Results are ordered depth-first from the start object, parents (or children) visited in list
//! order, each object emitted once at its first reach. Diamonds therefore contribute shared
//! ancestors exactly once. Every query is total: unknown objects resolve to nothing.

use crate::object_table::ObjectTable;
use ahash::AHashSet;
use moor_common::util::DenseBitSet;
use moor_var::{NOTHING, Obj};
use smallvec::{SmallVec, smallvec};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Parent edges.
    Ancestors,
    /// Child edges.
    Descendants,
    /// Location edges, outward to the outermost container.
    Locations,
    /// Contents edges, inward.
    Contents,
}

/// Edge lookup for one traversal kind, optionally pretending one object has a different parent
/// list. The override lets chparent validation look at the graph it is about to create.
#[derive(Clone, Copy)]
pub(crate) struct Edges<'a> {
    table: &'a ObjectTable,
    kind: Traversal,
    parents_override: Option<(Obj, &'a [Obj])>,
}

impl<'a> Edges<'a> {
    pub(crate) fn new(table: &'a ObjectTable, kind: Traversal) -> Self {
        Self {
            table,
            kind,
            parents_override: None,
        }
    }

    pub(crate) fn with_parents_override(
        table: &'a ObjectTable,
        obj: Obj,
        parents: &'a [Obj],
    ) -> Self {
        Self {
            table,
            kind: Traversal::Ancestors,
            parents_override: Some((obj, parents)),
        }
    }

    #[inline]
    pub(crate) fn of(&self, obj: Obj) -> &'a [Obj] {
        if let Some((o, parents)) = self.parents_override
            && o == obj
        {
            return parents;
        }
        let Some(record) = self.table.get(obj) else {
            return &[];
        };
        match self.kind {
            Traversal::Ancestors => record.parents.as_slice(),
            Traversal::Descendants => &record.children,
            Traversal::Locations if record.location == NOTHING => &[],
            Traversal::Locations => std::slice::from_ref(&record.location),
            Traversal::Contents => &record.contents,
        }
    }
}

/// Objects already emitted in one resolver call.
struct Visited {
    numbered: DenseBitSet,
    anonymous: AHashSet<u32>,
}

impl Visited {
    fn new(capacity: usize) -> Self {
        Self {
            numbered: DenseBitSet::with_capacity(capacity),
            anonymous: AHashSet::new(),
        }
    }

    /// Returns false if `obj` was already marked.
    #[inline]
    fn insert(&mut self, obj: Obj) -> bool {
        if let Some(idx) = obj.index() {
            return self.numbered.insert(idx);
        }
        match obj.anonymous_id() {
            Some(id) => self.anonymous.insert(id),
            None => false,
        }
    }
}

/// Lazy, deduplicated depth-first walk. Marks on pop, so the emission order is the same as a
/// recursive preorder walk that skips already-seen objects.
pub(crate) struct Walk<'a> {
    edges: Edges<'a>,
    start: Obj,
    include_self: bool,
    stack: SmallVec<[Obj; 16]>,
    visited: Visited,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(edges: Edges<'a>, start: Obj, include_self: bool) -> Self {
        let stack = if edges.table.contains(start) {
            smallvec![start]
        } else {
            SmallVec::new()
        };
        Self {
            edges,
            start,
            include_self,
            stack,
            visited: Visited::new(edges.table.capacity()),
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = Obj;

    fn next(&mut self) -> Option<Obj> {
        while let Some(obj) = self.stack.pop() {
            if !self.visited.insert(obj) {
                continue;
            }
            self.stack.extend(self.edges.of(obj).iter().rev().copied());
            if obj != self.start || self.include_self {
                return Some(obj);
            }
        }
        None
    }
}

/// First pass: count reachable objects, duplicates included, to size the result. The count can
/// never usefully exceed the table's population, so the walk stops there.
fn count_reachable(edges: &Edges<'_>, start: Obj) -> usize {
    let cap = edges.table.capacity() + edges.table.anonymous_count() + 1;
    let mut count = 0;
    let mut stack: SmallVec<[Obj; 16]> = smallvec![start];
    while let Some(obj) = stack.pop() {
        count += 1;
        if count >= cap {
            return cap;
        }
        stack.extend(edges.of(obj).iter().copied());
    }
    count
}

pub(crate) fn resolve_with(edges: Edges<'_>, obj: Obj, include_self: bool) -> Vec<Obj> {
    if !edges.table.contains(obj) {
        return vec![];
    }
    let mut result = Vec::with_capacity(count_reachable(&edges, obj));
    result.extend(Walk::new(edges, obj, include_self));
    result
}

/// The ordered, deduplicated set of objects reachable from `obj` along `kind` edges.
#[must_use]
pub fn resolve(table: &ObjectTable, obj: Obj, kind: Traversal, include_self: bool) -> Vec<Obj> {
    resolve_with(Edges::new(table, kind), obj, include_self)
}

#[must_use]
pub fn ancestors(table: &ObjectTable, obj: Obj, include_self: bool) -> Vec<Obj> {
    resolve(table, obj, Traversal::Ancestors, include_self)
}

#[must_use]
pub fn descendants(table: &ObjectTable, obj: Obj, include_self: bool) -> Vec<Obj> {
    resolve(table, obj, Traversal::Descendants, include_self)
}

#[must_use]
pub fn all_locations(table: &ObjectTable, obj: Obj, include_self: bool) -> Vec<Obj> {
    resolve(table, obj, Traversal::Locations, include_self)
}

#[must_use]
pub fn all_contents(table: &ObjectTable, obj: Obj, include_self: bool) -> Vec<Obj> {
    resolve(table, obj, Traversal::Contents, include_self)
}

#[must_use]
pub fn ancestor_count(table: &ObjectTable, obj: Obj) -> usize {
    Walk::new(Edges::new(table, Traversal::Ancestors), obj, false).count()
}

/// Whether `ancestor` is `obj` or one of its ancestors. Stops at the first hit.
#[must_use]
pub fn isa(table: &ObjectTable, obj: Obj, ancestor: Obj) -> bool {
    if !table.contains(obj) {
        return false;
    }
    Walk::new(Edges::new(table, Traversal::Ancestors), obj, true).any(|o| o == ancestor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{set_location, set_parents};
    use crate::object_table::ParentSpec;
    use moor_common::util::BitEnum;

    /// ```text
    ///        root
    ///       /    \
    ///      a      b
    ///       \    / \
    ///         d     e
    /// ```
    fn diamond() -> (ObjectTable, [Obj; 5]) {
        let mut t = ObjectTable::with_capacity(8);
        let root = t.insert_numbered(NOTHING, "root", BitEnum::new());
        let a = t.insert_numbered(NOTHING, "a", BitEnum::new());
        let b = t.insert_numbered(NOTHING, "b", BitEnum::new());
        let d = t.insert_numbered(NOTHING, "d", BitEnum::new());
        let e = t.insert_numbered(NOTHING, "e", BitEnum::new());
        set_parents(&mut t, a, ParentSpec::Single(root));
        set_parents(&mut t, b, ParentSpec::Single(root));
        set_parents(&mut t, d, ParentSpec::List(vec![a, b]));
        set_parents(&mut t, e, ParentSpec::Single(b));
        (t, [root, a, b, d, e])
    }

    #[test]
    fn test_ancestors_dedup_diamond() {
        let (t, [root, a, b, d, _]) = diamond();
        assert_eq!(ancestors(&t, d, false), vec![a, root, b]);
        assert_eq!(ancestors(&t, d, true), vec![d, a, root, b]);
        assert_eq!(ancestor_count(&t, d), 3);
    }

    #[test]
    fn test_descendants_dedup_diamond() {
        let (t, [root, a, b, d, e]) = diamond();
        assert_eq!(descendants(&t, root, false), vec![a, d, b, e]);
        assert_eq!(descendants(&t, b, true), vec![b, d, e]);
    }

    #[test]
    fn test_unknown_and_parentless() {
        let (t, [root, ..]) = diamond();
        assert!(ancestors(&t, root, false).is_empty());
        assert_eq!(ancestors(&t, root, true), vec![root]);
        assert!(ancestors(&t, Obj::mk_id(99), true).is_empty());
        assert!(ancestors(&t, NOTHING, true).is_empty());
    }

    #[test]
    fn test_isa() {
        let (t, [root, a, b, d, e]) = diamond();
        assert!(isa(&t, d, d));
        assert!(isa(&t, d, root));
        assert!(isa(&t, d, b));
        assert!(!isa(&t, e, a));
        assert!(!isa(&t, root, d));
    }

    #[test]
    fn test_parents_override() {
        let (t, [root, a, b, d, _]) = diamond();
        let new_parents = [b];
        let edges = Edges::with_parents_override(&t, d, &new_parents);
        assert_eq!(resolve_with(edges, d, true), vec![d, b, root]);
        // Descendant of the overridden object sees the change too.
        let edges = Edges::with_parents_override(&t, a, &[]);
        assert_eq!(resolve_with(edges, d, false), vec![a, b, root]);
    }

    #[test]
    fn test_containment() {
        let (mut t, [root, a, b, d, _]) = diamond();
        set_location(&mut t, d, b);
        set_location(&mut t, b, a);
        assert_eq!(all_locations(&t, d, false), vec![b, a]);
        assert_eq!(all_contents(&t, a, false), vec![b, d]);
        assert!(all_locations(&t, root, false).is_empty());
    }
}
