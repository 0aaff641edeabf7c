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

const WORD_BITS: usize = u64::BITS as usize;
const BIT_SHIFT: usize = WORD_BITS.trailing_zeros() as usize;

/// A growable bitset over dense integer keys (object indexes).
///
/// Sized up front to the capacity it will be probed with; positions past the end read as unset
/// and setting one grows the storage.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct DenseBitSet {
    words: Vec<u64>,
}

impl DenseBitSet {
    #[must_use]
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(WORD_BITS)],
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    #[inline]
    pub fn set(&mut self, pos: usize) {
        let word = pos >> BIT_SHIFT;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (pos % WORD_BITS);
    }

    /// Set `pos`, returning whether it was previously unset.
    #[inline]
    pub fn insert(&mut self, pos: usize) -> bool {
        if self.check(pos) {
            return false;
        }
        self.set(pos);
        true
    }

    #[inline]
    pub fn unset(&mut self, pos: usize) {
        if let Some(w) = self.words.get_mut(pos >> BIT_SHIFT) {
            *w &= !(1 << (pos % WORD_BITS));
        }
    }

    #[inline]
    #[must_use]
    pub fn check(&self, pos: usize) -> bool {
        self.words
            .get(pos >> BIT_SHIFT)
            .is_some_and(|w| w & (1 << (pos % WORD_BITS)) != 0)
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, w)| {
            let w = *w;
            (0..WORD_BITS).filter_map(move |j| {
                if w & (1 << j) != 0 {
                    Some((i << BIT_SHIFT) + j)
                } else {
                    None
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DenseBitSet;

    #[test]
    fn test_set_check_unset() {
        let mut bs = DenseBitSet::with_capacity(100);
        assert!(bs.is_empty());
        bs.set(0);
        bs.set(63);
        bs.set(64);
        bs.set(99);
        assert!(bs.check(0));
        assert!(bs.check(63));
        assert!(bs.check(64));
        assert!(bs.check(99));
        assert!(!bs.check(1));
        assert_eq!(bs.size(), 4);
        bs.unset(63);
        assert!(!bs.check(63));
        assert_eq!(bs.iter().collect::<Vec<_>>(), vec![0, 64, 99]);
    }

    #[test]
    fn test_grows_on_demand() {
        let mut bs = DenseBitSet::with_capacity(8);
        assert!(!bs.check(1000));
        assert!(bs.insert(1000));
        assert!(!bs.insert(1000));
        assert!(bs.capacity() > 1000);
        bs.clear();
        assert!(bs.is_empty());
    }
}
