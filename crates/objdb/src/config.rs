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

use figment::Figment;
use figment::providers::{Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_VERB_CACHE_BUCKETS: usize = 4096;
pub const DEFAULT_VERB_CACHE_MAX_ENTRIES_PER_BUCKET: usize = 8;
pub const DEFAULT_INITIAL_OBJECT_CAPACITY: usize = 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObjDbConfig {
    /// Whether `find_callable_verb` consults and fills the resolution cache at all.
    pub verb_cache_enabled: bool,
    /// Number of hash buckets in the verb resolution cache. Rounded up to a power of two.
    pub verb_cache_buckets: usize,
    /// Entries held per bucket before the oldest is evicted.
    pub verb_cache_max_entries_per_bucket: usize,
    /// Re-check the property layout invariant after every add/delete/chparent, aborting on a
    /// violation. Expensive; meant for tests and debugging.
    pub verify_layout_after_mutation: bool,
    /// Slots reserved up front in the numbered object table.
    pub initial_object_capacity: usize,
}

impl Default for ObjDbConfig {
    fn default() -> Self {
        Self {
            verb_cache_enabled: true,
            verb_cache_buckets: DEFAULT_VERB_CACHE_BUCKETS,
            verb_cache_max_entries_per_bucket: DEFAULT_VERB_CACHE_MAX_ENTRIES_PER_BUCKET,
            verify_layout_after_mutation: false,
            initial_object_capacity: DEFAULT_INITIAL_OBJECT_CAPACITY,
        }
    }
}

impl ObjDbConfig {
    /// Layer the defaults under an optional YAML file.
    pub fn load(path: Option<&Path>) -> Result<Self, eyre::Report> {
        let mut figment = Figment::from(Serialized::defaults(ObjDbConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: ObjDbConfig = figment.extract()?;
        Ok(config.normalized())
    }

    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            verb_cache_buckets: self.verb_cache_buckets.max(1).next_power_of_two(),
            verb_cache_max_entries_per_bucket: self.verb_cache_max_entries_per_bucket.max(1),
            ..self
        }
    }
}
