// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root-to-holder paths for keyboard focus and mouse capture.
//!
//! [`FocusPath`] remembers the path from the root to the current holder and,
//! when the holder moves, yields the minimal set of transitions. The tree
//! turns `Leave` into clearing the `...Within` flag and `Enter` into setting
//! it, so only the elements whose flag actually flips are touched.
//!
//! ```
//! use presentation_tree::{FocusPath, FocusTransition};
//!
//! let mut path: FocusPath<u32> = FocusPath::new();
//! assert_eq!(
//!     path.update(&[1, 2]),
//!     vec![FocusTransition::Enter(1), FocusTransition::Enter(2)]
//! );
//! assert_eq!(
//!     path.update(&[1, 3]),
//!     vec![FocusTransition::Leave(2), FocusTransition::Enter(3)]
//! );
//! assert_eq!(path.holder(), Some(3));
//! ```

use alloc::vec::Vec;

/// Root-to-holder path plus transition computation.
///
/// Leaves are emitted innermost first, enters outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusPath<K: Copy + Eq> {
    current: Vec<K>,
}

/// One element entering or leaving a focus path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusTransition<K> {
    /// The element is now on the path.
    Enter(K),
    /// The element is no longer on the path.
    Leave(K),
}

impl<K: Copy + Eq> FocusPath<K> {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
        }
    }

    /// Returns the current root-to-holder path.
    #[must_use]
    pub fn current(&self) -> &[K] {
        &self.current
    }

    /// Returns the holder, the last element of the path.
    #[must_use]
    pub fn holder(&self) -> Option<K> {
        self.current.last().copied()
    }

    /// Returns `true` if `key` is on the path.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.current.contains(&key)
    }

    /// Empties the path, leaving every element innermost first.
    pub fn clear(&mut self) -> Vec<FocusTransition<K>> {
        let out = self
            .current
            .iter()
            .rev()
            .map(|&k| FocusTransition::Leave(k))
            .collect();
        self.current.clear();
        out
    }

    /// Moves the path to `new_path` and returns the transitions.
    pub fn update(&mut self, new_path: &[K]) -> Vec<FocusTransition<K>> {
        let shared = self
            .current
            .iter()
            .zip(new_path)
            .take_while(|(a, b)| a == b)
            .count();

        let mut out: Vec<_> = self.current[shared..]
            .iter()
            .rev()
            .map(|&k| FocusTransition::Leave(k))
            .collect();
        out.extend(new_path[shared..].iter().map(|&k| FocusTransition::Enter(k)));
        self.current.clear();
        self.current.extend_from_slice(new_path);
        out
    }
}
