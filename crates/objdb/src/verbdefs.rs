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

use itertools::Itertools;
use moor_common::model::{VerbArgsSpec, VerbFlag, VerbProgram};
use moor_common::util::{BitEnum, verbcasecmp};
use moor_var::{Obj, Symbol};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// The verbs defined directly on one object, in definition order.
pub type VerbDefs = imbl::Vector<VerbDef>;

/// A verb definition. Cheap to clone: the resolution cache and callers share the same body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerbDef {
    inner: Arc<VerbDefInner>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct VerbDefInner {
    uuid: Uuid,
    location: Obj,
    owner: Obj,
    names: Vec<Symbol>,
    flags: BitEnum<VerbFlag>,
    args: VerbArgsSpec,
    program: VerbProgram,
}

impl VerbDef {
    #[must_use]
    pub fn new(
        location: Obj,
        owner: Obj,
        names: &[Symbol],
        flags: BitEnum<VerbFlag>,
        args: VerbArgsSpec,
        program: VerbProgram,
    ) -> Self {
        Self {
            inner: Arc::new(VerbDefInner {
                uuid: Uuid::new_v4(),
                location,
                owner,
                names: names.to_vec(),
                flags,
                args,
                program,
            }),
        }
    }

    /// Stable identity, unchanged by renames and attribute edits.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.inner.uuid
    }

    /// The object this verb is defined on.
    #[must_use]
    pub fn location(&self) -> Obj {
        self.inner.location
    }

    #[must_use]
    pub fn owner(&self) -> Obj {
        self.inner.owner
    }

    #[must_use]
    pub fn names(&self) -> &[Symbol] {
        &self.inner.names
    }

    #[must_use]
    pub fn flags(&self) -> BitEnum<VerbFlag> {
        self.inner.flags
    }

    #[must_use]
    pub fn args(&self) -> VerbArgsSpec {
        self.inner.args
    }

    #[must_use]
    pub fn program(&self) -> &VerbProgram {
        &self.inner.program
    }

    /// Whether any alias matches `word`, with wildcard rules.
    #[must_use]
    pub fn matches_name(&self, word: &str) -> bool {
        self.names()
            .iter()
            .any(|alias| verbcasecmp(&alias.as_arc_str(), word))
    }

    pub(crate) fn edit(&mut self) -> VerbDefEdit<'_> {
        VerbDefEdit {
            inner: Arc::make_mut(&mut self.inner),
        }
    }
}

impl Display for VerbDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:\"{}\"",
            self.location(),
            self.names().iter().map(|n| n.to_string()).join(" ")
        )
    }
}

/// In-place mutation of a verb definition held in a verb list.
pub(crate) struct VerbDefEdit<'a> {
    inner: &'a mut VerbDefInner,
}

impl VerbDefEdit<'_> {
    pub(crate) fn names(&mut self, names: &[Symbol]) -> &mut Self {
        self.inner.names = names.to_vec();
        self
    }

    pub(crate) fn owner(&mut self, owner: Obj) -> &mut Self {
        self.inner.owner = owner;
        self
    }

    pub(crate) fn flags(&mut self, flags: BitEnum<VerbFlag>) -> &mut Self {
        self.inner.flags = flags;
        self
    }

    pub(crate) fn args(&mut self, args: VerbArgsSpec) -> &mut Self {
        self.inner.args = args;
        self
    }

    pub(crate) fn program(&mut self, program: VerbProgram) -> &mut Self {
        self.inner.program = program;
        self
    }
}
