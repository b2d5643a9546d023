// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty set: accumulated dirty keys per channel.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::channel::{Channel, ChannelSet};

/// Accumulated dirty keys, each with the set of channels it is dirty in.
///
/// Marking is idempotent: marking the same key in the same channel twice
/// leaves a single entry, which is what gives the digest its
/// "one notification per property per pass" behavior.
///
/// A generation counter increments on every mutation so consumers can detect
/// whether anything happened since they last looked.
///
/// ```
/// use presentation_dirty::{Channel, DirtySet};
///
/// let mut dirty = DirtySet::<u32>::new();
/// assert!(dirty.mark(7, Channel::MEASURE));
/// assert!(!dirty.mark(7, Channel::MEASURE));
/// dirty.mark(7, Channel::RENDER);
///
/// assert_eq!(dirty.channels_of(7).len(), 2);
/// let measured: Vec<u32> = dirty.drain(Channel::MEASURE).collect();
/// assert_eq!(measured, vec![7]);
/// assert!(dirty.is_dirty(7, Channel::RENDER));
/// ```
#[derive(Clone, Debug)]
pub struct DirtySet<K>
where
    K: Copy + Eq + Hash,
{
    entries: HashMap<K, ChannelSet>,
    generation: u64,
}

impl<K> Default for DirtySet<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DirtySet<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a new empty dirty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
        }
    }

    /// Returns the current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks a key dirty in the given channel.
    ///
    /// Returns `true` if the key was not already dirty in that channel.
    pub fn mark(&mut self, key: K, channel: Channel) -> bool {
        self.generation = self.generation.wrapping_add(1);
        let set = self.entries.entry(key).or_default();
        let fresh = !set.contains(channel);
        set.insert(channel);
        fresh
    }

    /// Marks a key dirty in every channel of `channels`.
    pub fn mark_all(&mut self, key: K, channels: ChannelSet) {
        if channels.is_empty() {
            return;
        }
        self.generation = self.generation.wrapping_add(1);
        *self.entries.entry(key).or_default() |= channels;
    }

    /// Returns `true` if the key is dirty in the given channel.
    #[must_use]
    pub fn is_dirty(&self, key: K, channel: Channel) -> bool {
        self.entries.get(&key).is_some_and(|set| set.contains(channel))
    }

    /// Returns the channels a key is dirty in.
    #[must_use]
    pub fn channels_of(&self, key: K) -> ChannelSet {
        self.entries.get(&key).copied().unwrap_or_default()
    }

    /// Returns `true` if any key is dirty in the given channel.
    #[must_use]
    pub fn has_dirty(&self, channel: Channel) -> bool {
        self.entries.values().any(|set| set.contains(channel))
    }

    /// Returns `true` if nothing is dirty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of keys dirty in the given channel.
    #[must_use]
    pub fn len(&self, channel: Channel) -> usize {
        self.entries
            .values()
            .filter(|set| set.contains(channel))
            .count()
    }

    /// Returns the keys dirty in the given channel without clearing them.
    pub fn iter(&self, channel: Channel) -> impl Iterator<Item = K> + '_ {
        self.entries
            .iter()
            .filter(move |(_, set)| set.contains(channel))
            .map(|(key, _)| *key)
    }

    /// Removes and returns the keys dirty in the given channel.
    ///
    /// Keys stay in the set for their other channels.
    pub fn drain(&mut self, channel: Channel) -> alloc::vec::IntoIter<K> {
        self.generation = self.generation.wrapping_add(1);
        let mut drained = Vec::new();
        self.entries.retain(|key, set| {
            if set.contains(channel) {
                drained.push(*key);
                set.remove(channel);
            }
            !set.is_empty()
        });
        drained.into_iter()
    }

    /// Clears one channel for one key.
    ///
    /// Returns `true` if the key was dirty in that channel.
    pub fn unmark(&mut self, key: K, channel: Channel) -> bool {
        let Some(set) = self.entries.get_mut(&key) else {
            return false;
        };
        if !set.contains(channel) {
            return false;
        }
        self.generation = self.generation.wrapping_add(1);
        set.remove(channel);
        if set.is_empty() {
            self.entries.remove(&key);
        }
        true
    }

    /// Clears every key in every channel.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.entries.clear();
    }

    /// Removes a key from all channels.
    ///
    /// Used when an object is destroyed; its digest membership ends here.
    pub fn remove_key(&mut self, key: K) {
        if self.entries.remove(&key).is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn mark_and_query() {
        let mut dirty = DirtySet::<u32>::new();
        dirty.mark(1, Channel::MEASURE);
        dirty.mark(2, Channel::MEASURE);
        dirty.mark(1, Channel::RENDER);

        assert!(dirty.is_dirty(1, Channel::MEASURE));
        assert!(dirty.is_dirty(2, Channel::MEASURE));
        assert!(dirty.is_dirty(1, Channel::RENDER));
        assert!(!dirty.is_dirty(2, Channel::RENDER));
        assert_eq!(dirty.len(Channel::MEASURE), 2);
        assert!(dirty.has_dirty(Channel::RENDER));
        assert!(!dirty.has_dirty(Channel::ARRANGE));
    }

    #[test]
    fn mark_twice_keeps_one_entry() {
        let mut dirty = DirtySet::<u32>::new();
        assert!(dirty.mark(1, Channel::DIGEST));
        assert!(!dirty.mark(1, Channel::DIGEST));
        assert_eq!(dirty.len(Channel::DIGEST), 1);
    }

    #[test]
    fn drain_keeps_other_channels() {
        let mut dirty = DirtySet::<u32>::new();
        dirty.mark_all(1, ChannelSet::LAYOUT);
        dirty.mark(2, Channel::MEASURE);

        let mut measured: Vec<_> = dirty.drain(Channel::MEASURE).collect();
        measured.sort_unstable();
        assert_eq!(measured, vec![1, 2]);

        assert!(!dirty.is_dirty(1, Channel::MEASURE));
        assert!(dirty.is_dirty(1, Channel::ARRANGE));
        // Key 2 had nothing else, so it is gone entirely.
        assert_eq!(dirty.channels_of(2), ChannelSet::empty());
    }

    #[test]
    fn unmark_and_remove_key() {
        let mut dirty = DirtySet::<u32>::new();
        dirty.mark_all(1, ChannelSet::LAYOUT | Channel::DIGEST.into_set());

        assert!(dirty.unmark(1, Channel::DIGEST));
        assert!(!dirty.unmark(1, Channel::DIGEST));
        assert!(dirty.is_dirty(1, Channel::MEASURE));

        dirty.remove_key(1);
        assert!(dirty.is_empty());
    }

    #[test]
    fn generation_tracks_mutation() {
        let mut dirty = DirtySet::<u32>::new();
        let g0 = dirty.generation();
        dirty.mark(1, Channel::RENDER);
        let g1 = dirty.generation();
        assert!(g1 > g0);

        // Removing a missing key is not a mutation.
        dirty.remove_key(99);
        assert_eq!(dirty.generation(), g1);

        dirty.clear();
        assert!(dirty.generation() > g1);
        assert!(dirty.is_empty());
    }
}
