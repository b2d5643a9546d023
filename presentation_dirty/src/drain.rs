// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rank-ordered draining of a dirty channel.

use alloc::vec::Vec;
use core::hash::Hash;

use crate::channel::Channel;
use crate::set::DirtySet;

/// Drains `channel` from `set` and yields the keys in ascending rank.
///
/// `rank` is usually the tree depth of the key, which makes parents come out
/// before their children. Keys whose rank is `None` (for example destroyed
/// objects) are dropped. Ties are broken by key order so the result is
/// deterministic.
pub fn drain_ordered<K, F>(set: &mut DirtySet<K>, channel: Channel, rank: F) -> DrainOrdered<K>
where
    K: Copy + Eq + Hash + Ord,
    F: Fn(K) -> Option<u32>,
{
    let mut ranked: Vec<(u32, K)> = set
        .drain(channel)
        .filter_map(|key| rank(key).map(|r| (r, key)))
        .collect();
    ranked.sort_unstable();
    DrainOrdered {
        inner: ranked.into_iter(),
    }
}

/// Iterator returned by [`drain_ordered`].
#[derive(Debug)]
pub struct DrainOrdered<K> {
    inner: alloc::vec::IntoIter<(u32, K)>,
}

impl<K> Iterator for DrainOrdered<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, key)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for DrainOrdered<K> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn parents_first() {
        // Depth table: 10 is root, 20 and 21 its children, 30 a grandchild.
        let depth = |key: u32| match key {
            10 => Some(0),
            20 | 21 => Some(1),
            30 => Some(2),
            _ => None,
        };
        let mut dirty = DirtySet::new();
        for key in [30, 21, 10, 20] {
            dirty.mark(key, Channel::DIGEST);
        }
        let order: Vec<_> = drain_ordered(&mut dirty, Channel::DIGEST, depth).collect();
        assert_eq!(order, vec![10, 20, 21, 30]);
        assert!(!dirty.has_dirty(Channel::DIGEST));
    }

    #[test]
    fn unranked_keys_are_dropped() {
        let mut dirty = DirtySet::new();
        dirty.mark(1_u32, Channel::MEASURE);
        dirty.mark(2, Channel::MEASURE);
        let order: Vec<_> =
            drain_ordered(&mut dirty, Channel::MEASURE, |k| (k == 2).then_some(0)).collect();
        assert_eq!(order, vec![2]);
        // The dropped key does not come back either.
        assert!(!dirty.is_dirty(1, Channel::MEASURE));
    }

    #[test]
    fn empty_channel() {
        let mut dirty = DirtySet::<u32>::new();
        dirty.mark(1, Channel::RENDER);
        let mut iter = drain_ordered(&mut dirty, Channel::ARRANGE, |_| Some(0));
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert!(dirty.is_dirty(1, Channel::RENDER));
    }
}
