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

//! Verb lookup along the ancestor chain.

use crate::ancestry::{Edges, Traversal, Walk};
use crate::store::ObjectStore;
use crate::verbdefs::VerbDef;
use moor_common::model::{VerbArgsSpec, VerbFlag};
use moor_var::{Obj, Symbol};
use tracing::trace;

impl ObjectStore {
    fn ancestors_walk(&self, obj: Obj) -> Walk<'_> {
        Walk::new(Edges::new(&self.table, Traversal::Ancestors), obj, true)
    }

    /// The nearest object, `receiver` included, that defines any verb. The flag reports whether
    /// some verbless object on the way had more than one parent, in which case branches beyond
    /// the verb bearer's own ancestry are still unexplored.
    fn first_verb_bearer(&self, receiver: Obj) -> Option<(Obj, bool)> {
        let mut branched = false;
        for obj in self.ancestors_walk(receiver) {
            let record = self.table.get(obj)?;
            if !record.verbs.is_empty() {
                return Some((obj, branched));
            }
            branched |= record.parents.len() > 1;
        }
        None
    }

    fn search_callable(&self, start: Obj, word: &str) -> Option<VerbDef> {
        self.ancestors_walk(start).find_map(|obj| {
            self.table.get(obj)?.verbs.iter().find_map(|v| {
                (v.flags().contains(VerbFlag::Exec) && v.matches_name(word)).then(|| v.clone())
            })
        })
    }

    /// Resolve `name` for a method call on `receiver`: the first executable verb with a matching
    /// alias on `receiver` or its ancestors, in ancestor order.
    ///
    /// Results are cached under the receiver's first verb-bearing ancestor. Every object between
    /// the two is verbless, so a hit there is a hit for the receiver too. A recorded miss only
    /// stands for the receiver if nothing branched on the way.
    pub fn find_callable_verb(&mut self, receiver: Obj, name: Symbol) -> Option<VerbDef> {
        if !self.valid(receiver) {
            return None;
        }
        let (bearer, branched) = self.first_verb_bearer(receiver)?;
        let word = name.as_arc_str();
        if !self.verb_cache.is_enabled() {
            return self.search_callable(receiver, &word);
        }
        match self.verb_cache.lookup(bearer, name) {
            Some(Some(verb)) => Some(verb),
            Some(None) if !branched => None,
            Some(None) => self.search_callable(receiver, &word),
            None => {
                let found = self.search_callable(bearer, &word);
                trace!(?receiver, ?bearer, %name, hit = found.is_some(), "filled verb cache");
                self.verb_cache.fill(bearer, name, found.clone());
                match found {
                    None if branched => self.search_callable(receiver, &word),
                    found => found,
                }
            }
        }
    }

    /// Resolve a command-line verb on `obj`: the first verb, in ancestor order, with a matching
    /// alias whose argument specifiers accept `args`. Not cached.
    pub fn find_command_verb(&self, obj: Obj, name: Symbol, args: VerbArgsSpec) -> Option<VerbDef> {
        if !self.valid(obj) {
            return None;
        }
        let word = name.as_arc_str();
        self.ancestors_walk(obj).find_map(|o| {
            self.table
                .get(o)?
                .verbs
                .iter()
                .find(|v| v.matches_name(&word) && v.args().matches(&args))
                .cloned()
        })
    }
}
