// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layered storage for one property on one object.
//!
//! A [`ValueSlot`] holds the value sources an object owns for a property
//! (local, animated, styled) and the effective value as of the last digest.
//! Inherited and default values are not stored here; they are resolved by
//! whoever owns the slot, then passed to [`ValueSlot::digest`].

use crate::value::ErasedValue;

/// Which value source produced an object's own value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueSource {
    /// Set through the public setter or an internal key.
    Local,
    /// Pushed by the animation feed.
    Animated,
    /// Pushed by the styling engine.
    Styled,
}

/// Per-object storage for a single property.
///
/// The owner's own value resolves as local > animated > styled. A slot is
/// dirty after any source changed and clean after [`digest`](Self::digest).
///
/// ```rust
/// use presentation_property::{ErasedValue, ValueSlot};
///
/// let mut slot = ValueSlot::new(ErasedValue::new(0_i32));
/// slot.set_local(ErasedValue::new(5_i32));
/// assert!(slot.is_dirty());
///
/// let effective = slot.own_value().cloned().unwrap();
/// let old = slot.digest(effective.clone()).unwrap();
/// assert_eq!(old.downcast_ref::<i32>(), Some(&0));
///
/// // A second digest of the same value reports nothing.
/// assert!(slot.digest(effective).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct ValueSlot {
    local: Option<ErasedValue>,
    animated: Option<ErasedValue>,
    styled: Option<ErasedValue>,
    previous: ErasedValue,
    dirty: bool,
}

impl ValueSlot {
    /// Creates a clean slot whose last digested value is `previous`.
    ///
    /// `previous` must be the effective value the object had before the slot
    /// existed, so the first digest compares against what observers saw.
    #[must_use]
    pub fn new(previous: ErasedValue) -> Self {
        Self {
            local: None,
            animated: None,
            styled: None,
            previous,
            dirty: false,
        }
    }

    /// Returns the local value, if any.
    #[must_use]
    pub fn local(&self) -> Option<&ErasedValue> {
        self.local.as_ref()
    }

    /// Returns the animated value, if any.
    #[must_use]
    pub fn animated(&self) -> Option<&ErasedValue> {
        self.animated.as_ref()
    }

    /// Returns the styled value, if any.
    #[must_use]
    pub fn styled(&self) -> Option<&ErasedValue> {
        self.styled.as_ref()
    }

    /// Returns `true` if a local value is set.
    #[must_use]
    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// Returns the object's own value and where it came from.
    #[must_use]
    pub fn own_source(&self) -> Option<(ValueSource, &ErasedValue)> {
        if let Some(v) = &self.local {
            return Some((ValueSource::Local, v));
        }
        if let Some(v) = &self.animated {
            return Some((ValueSource::Animated, v));
        }
        self.styled.as_ref().map(|v| (ValueSource::Styled, v))
    }

    /// Returns the object's own value: local, then animated, then styled.
    #[must_use]
    pub fn own_value(&self) -> Option<&ErasedValue> {
        self.own_source().map(|(_, v)| v)
    }

    /// Returns the effective value as of the last digest.
    #[must_use]
    pub fn previous(&self) -> &ErasedValue {
        &self.previous
    }

    /// Sets the local value. Always succeeds.
    pub fn set_local(&mut self, value: ErasedValue) {
        self.local = Some(value);
        self.dirty = true;
    }

    /// Removes the local value, returning `true` if there was one.
    pub fn clear_local(&mut self) -> bool {
        let removed = self.local.take().is_some();
        self.dirty |= removed;
        removed
    }

    /// Stores a value pushed by the styling engine.
    pub fn apply_styled_value(&mut self, value: ErasedValue) {
        self.styled = Some(value);
        self.dirty = true;
    }

    /// Stores a value pushed by the animation feed.
    pub fn apply_animated_value(&mut self, value: ErasedValue) {
        self.animated = Some(value);
        self.dirty = true;
    }

    /// Drops the styled value, returning `true` if there was one.
    pub fn revert_styled_value(&mut self) -> bool {
        let removed = self.styled.take().is_some();
        self.dirty |= removed;
        removed
    }

    /// Drops the animated value, returning `true` if there was one.
    pub fn revert_animated_value(&mut self) -> bool {
        let removed = self.animated.take().is_some();
        self.dirty |= removed;
        removed
    }

    /// Returns `true` if a source changed since the last digest.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next digest to compare this slot, for example because an
    /// ancestor's inherited value changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Records `effective` as the digested value.
    ///
    /// Returns the old value if it differs from `effective` under
    /// [`ErasedValue::same_value`], `None` otherwise. Cleans the slot either
    /// way, so digesting twice reports a change at most once.
    pub fn digest(&mut self, effective: ErasedValue) -> Option<ErasedValue> {
        self.dirty = false;
        if self.previous.same_value(&effective) {
            return None;
        }
        Some(core::mem::replace(&mut self.previous, effective))
    }

    /// Returns `true` if the slot holds no value source of its own.
    #[must_use]
    pub fn is_vacant(&self) -> bool {
        self.local.is_none() && self.animated.is_none() && self.styled.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(previous: i32) -> ValueSlot {
        ValueSlot::new(ErasedValue::new(previous))
    }

    fn int(value: Option<&ErasedValue>) -> Option<i32> {
        value.and_then(|v| v.downcast_ref::<i32>()).copied()
    }

    #[test]
    fn new_slot_is_clean_and_vacant() {
        let s = slot(3);
        assert!(!s.is_dirty());
        assert!(s.is_vacant());
        assert_eq!(int(Some(s.previous())), Some(3));
    }

    #[test]
    fn local_beats_animated_beats_styled() {
        let mut s = slot(0);
        s.apply_styled_value(ErasedValue::new(1));
        assert_eq!(s.own_source().map(|(src, _)| src), Some(ValueSource::Styled));

        s.apply_animated_value(ErasedValue::new(2));
        assert_eq!(int(s.own_value()), Some(2));

        s.set_local(ErasedValue::new(3));
        assert_eq!(s.own_source().map(|(src, _)| src), Some(ValueSource::Local));
        assert_eq!(int(s.own_value()), Some(3));

        // Clearing local falls back to the next source.
        assert!(s.clear_local());
        assert_eq!(int(s.own_value()), Some(2));
        assert!(s.revert_animated_value());
        assert_eq!(int(s.own_value()), Some(1));
        assert!(s.revert_styled_value());
        assert!(s.own_value().is_none());
    }

    #[test]
    fn clear_without_value_does_not_dirty() {
        let mut s = slot(0);
        assert!(!s.clear_local());
        assert!(!s.revert_styled_value());
        assert!(!s.revert_animated_value());
        assert!(!s.is_dirty());
    }

    #[test]
    fn digest_reports_change_once() {
        let mut s = slot(0);
        s.set_local(ErasedValue::new(7));
        let old = s.digest(ErasedValue::new(7));
        assert_eq!(int(old.as_ref()), Some(0));
        assert!(!s.is_dirty());

        assert!(s.digest(ErasedValue::new(7)).is_none());
        assert_eq!(int(Some(s.previous())), Some(7));
    }

    #[test]
    fn digest_of_equal_value_is_silent() {
        let mut s = slot(4);
        s.set_local(ErasedValue::new(4));
        assert!(s.digest(ErasedValue::new(4)).is_none());
        assert!(!s.is_dirty());
    }

    #[test]
    fn mark_dirty_forces_comparison() {
        let mut s = slot(1);
        s.mark_dirty();
        assert!(s.is_dirty());
        assert!(s.digest(ErasedValue::new(2)).is_some());
    }
}
