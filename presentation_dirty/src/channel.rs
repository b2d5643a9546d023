// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation channels and channel sets.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Identifies an invalidation domain (measure, arrange, render, ...).
///
/// A channel is a single `u8` index below 64. Properties list the channels
/// they affect in their metadata; the digest marks owners dirty in exactly
/// those channels when the effective value changes.
///
/// Applications may define extra channels with [`Channel::new`], starting at
/// [`Channel::FIRST_CUSTOM`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
    /// The object is scheduled for the next digest pass.
    pub const DIGEST: Self = Self(0);
    /// A change requires the element to be measured again.
    pub const MEASURE: Self = Self(1);
    /// A change requires the element to be arranged again.
    pub const ARRANGE: Self = Self(2);
    /// A change requires the element to be redrawn.
    pub const RENDER: Self = Self(3);
    /// The first index not reserved by this crate.
    pub const FIRST_CUSTOM: u8 = 8;

    /// Creates a channel with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 64`.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!(index < 64, "Channel index must be less than 64");
        Self(index)
    }

    /// Returns the index of this channel.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Converts this channel into a single-element [`ChannelSet`].
    #[must_use]
    pub const fn into_set(self) -> ChannelSet {
        ChannelSet(1_u64 << self.0)
    }

    fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Digest"),
            1 => Some("Measure"),
            2 => Some("Arrange"),
            3 => Some("Render"),
            _ => None,
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.debug_tuple("Channel").field(&self.0).finish(),
        }
    }
}

/// A compact set of up to 64 channels.
///
/// This is the `affects` field of a property descriptor.
///
/// ```
/// use presentation_dirty::{Channel, ChannelSet};
///
/// let affects = ChannelSet::LAYOUT | Channel::RENDER.into_set();
/// assert!(affects.contains(Channel::MEASURE));
/// assert!(affects.contains(Channel::ARRANGE));
/// assert!(affects.contains(Channel::RENDER));
/// assert!(!affects.contains(Channel::DIGEST));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct ChannelSet(u64);

impl ChannelSet {
    /// An empty channel set.
    pub const EMPTY: Self = Self(0);
    /// Measure and arrange together.
    pub const LAYOUT: Self = Self((1 << 1) | (1 << 2));

    /// Creates an empty channel set.
    #[must_use]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Returns `true` if this set contains no channels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if this set contains the given channel.
    #[must_use]
    pub const fn contains(self, channel: Channel) -> bool {
        (self.0 & (1_u64 << channel.0)) != 0
    }

    /// Inserts a channel into the set.
    pub fn insert(&mut self, channel: Channel) {
        self.0 |= 1_u64 << channel.0;
    }

    /// Removes a channel from the set.
    pub fn remove(&mut self, channel: Channel) {
        self.0 &= !(1_u64 << channel.0);
    }

    /// Returns the number of channels in the set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns an iterator over the channels in this set, lowest index first.
    #[must_use]
    pub const fn iter(self) -> ChannelSetIter {
        ChannelSetIter { bits: self.0 }
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOr for ChannelSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChannelSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<Channel> for ChannelSet {
    fn from(channel: Channel) -> Self {
        channel.into_set()
    }
}

impl IntoIterator for ChannelSet {
    type Item = Channel;
    type IntoIter = ChannelSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the channels in a [`ChannelSet`].
#[derive(Clone, Debug)]
pub struct ChannelSetIter {
    bits: u64,
}

impl Iterator for ChannelSetIter {
    type Item = Channel;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation, reason = "trailing_zeros <= 63")]
        let index = self.bits.trailing_zeros() as u8;
        self.bits &= self.bits - 1;
        Some(Channel(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.bits.count_ones() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for ChannelSetIter {}
