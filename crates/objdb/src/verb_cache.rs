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

//! Verb resolution cache.
//!
//! Entries are keyed by the name being looked up and the receiver's first verb-bearing ancestor
//! (FVBA), not by the receiver itself: every object between a receiver and its FVBA has no
//! verbs, so all receivers sharing an FVBA resolve a name the same way and share one entry.
//!
//! Invalidation is coarse. Any change that could alter a resolution bumps the generation and
//! drops every entry.

use crate::config::ObjDbConfig;
use crate::verbdefs::VerbDef;
use moor_var::{Obj, Symbol};
use smallvec::SmallVec;

/// Counters exposed for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub flushes: u64,
    pub generation: u64,
}

#[derive(Clone, Debug)]
struct Entry {
    name: Symbol,
    fvba: Obj,
    /// `None` records that the search from `fvba` found nothing.
    verb: Option<VerbDef>,
}

pub(crate) struct VerbResolutionCache {
    enabled: bool,
    mask: u64,
    max_per_bucket: usize,
    buckets: Vec<SmallVec<[Entry; 4]>>,
    stats: CacheStats,
}

impl VerbResolutionCache {
    pub(crate) fn new(config: &ObjDbConfig) -> Self {
        let config = config.clone().normalized();
        let bucket_count = if config.verb_cache_enabled {
            config.verb_cache_buckets
        } else {
            0
        };
        Self {
            enabled: config.verb_cache_enabled,
            mask: (config.verb_cache_buckets as u64).saturating_sub(1),
            max_per_bucket: config.verb_cache_max_entries_per_bucket,
            buckets: (0..bucket_count).map(|_| SmallVec::new()).collect(),
            stats: CacheStats::default(),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    fn bucket_of(&self, fvba: Obj, name: Symbol) -> usize {
        let key = name.hash_u64() ^ fvba.as_u64();
        ((key ^ (key >> 32)) & self.mask) as usize
    }

    /// `Some(entry)` on a hit, where the entry itself may be a recorded miss.
    pub(crate) fn lookup(&mut self, fvba: Obj, name: Symbol) -> Option<Option<VerbDef>> {
        if !self.enabled {
            return None;
        }
        let bucket = self.bucket_of(fvba, name);
        let found = self.buckets[bucket]
            .iter()
            .find(|e| e.fvba == fvba && e.name == name)
            .map(|e| e.verb.clone());
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    /// Record the result of a search from `fvba`. A full bucket loses its oldest entry.
    pub(crate) fn fill(&mut self, fvba: Obj, name: Symbol, verb: Option<VerbDef>) {
        if !self.enabled {
            return;
        }
        let bucket = self.bucket_of(fvba, name);
        let max = self.max_per_bucket;
        let entries = &mut self.buckets[bucket];
        if let Some(existing) = entries.iter_mut().find(|e| e.fvba == fvba && e.name == name) {
            existing.verb = verb;
            return;
        }
        if entries.len() >= max {
            entries.remove(0);
        }
        entries.push(Entry { name, fvba, verb });
    }

    pub(crate) fn flush(&mut self) {
        self.stats.generation += 1;
        self.stats.flushes += 1;
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.buckets.iter().map(SmallVec::len).sum()
    }
}
