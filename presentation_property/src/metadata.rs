// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata definitions.
//!
//! [`PropertyMetadata`] holds what a descriptor knows about its values:
//! default, inheritance, affected channels and callbacks.
//! [`PropertyMetadataBuilder`] builds it.

use alloc::boxed::Box;
use presentation_dirty::ChannelSet;

use crate::id::ObjectId;
use crate::value::PropertyValue;

/// Callback invoked by the digest when an effective value changes.
///
/// Receives the owning object, the previous effective value and the new one.
pub type PropertyChangedCallback<T> = Box<dyn Fn(ObjectId, &T, &T) + Send + Sync>;

/// Callback for coercing a local value before it is stored.
pub type CoerceValueCallback<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Metadata for a dependency property.
///
/// ```rust
/// use presentation_property::PropertyMetadataBuilder;
/// use presentation_dirty::{Channel, ChannelSet};
///
/// let metadata = PropertyMetadataBuilder::new(12.0_f64)
///     .inherits(true)
///     .affects(ChannelSet::LAYOUT | Channel::RENDER.into_set())
///     .build();
///
/// assert_eq!(metadata.default_value(), &12.0);
/// assert!(metadata.inherits());
/// assert!(metadata.affects().contains(Channel::MEASURE));
/// ```
pub struct PropertyMetadata<T: PropertyValue> {
    default_value: T,
    inherits: bool,
    affects: ChannelSet,
    changed_callback: Option<PropertyChangedCallback<T>>,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> PropertyMetadata<T> {
    /// Creates metadata with the given default and nothing else.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        PropertyMetadataBuilder::new(default_value).build()
    }

    /// Returns the registered default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Returns whether the property inherits along the logical tree.
    #[must_use]
    #[inline]
    pub fn inherits(&self) -> bool {
        self.inherits
    }

    /// Returns the invalidation channels a change marks dirty.
    #[must_use]
    #[inline]
    pub fn affects(&self) -> ChannelSet {
        self.affects
    }

    /// Invokes the changed callback if one is set.
    #[inline]
    pub fn on_changed(&self, owner: ObjectId, old_value: &T, new_value: &T) {
        if let Some(callback) = &self.changed_callback {
            callback(owner, old_value, new_value);
        }
    }

    /// Coerces a value using the coerce callback if one is set.
    #[inline]
    pub fn coerce(&self, value: T) -> T {
        match &self.coerce_callback {
            Some(callback) => callback(value),
            None => value,
        }
    }

    /// Returns whether a changed callback is set.
    #[must_use]
    #[inline]
    pub fn has_changed_callback(&self) -> bool {
        self.changed_callback.is_some()
    }

    /// Returns whether a coerce callback is set.
    #[must_use]
    #[inline]
    pub fn has_coerce_callback(&self) -> bool {
        self.coerce_callback.is_some()
    }
}

impl<T: PropertyValue + core::fmt::Debug> core::fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("inherits", &self.inherits)
            .field("affects", &self.affects)
            .field("has_changed_callback", &self.changed_callback.is_some())
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
///
/// ```rust
/// use presentation_property::PropertyMetadataBuilder;
/// use presentation_dirty::Channel;
///
/// let opacity = PropertyMetadataBuilder::new(1.0_f64)
///     .affects(Channel::RENDER.into_set())
///     .coerce(|v| v.clamp(0.0, 1.0))
///     .on_changed(|owner, old, new| {
///         let _ = (owner, old, new);
///     })
///     .build();
/// assert_eq!(opacity.coerce(3.0), 1.0);
/// ```
pub struct PropertyMetadataBuilder<T: PropertyValue> {
    default_value: T,
    inherits: bool,
    affects: ChannelSet,
    changed_callback: Option<PropertyChangedCallback<T>>,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue + core::fmt::Debug> core::fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyMetadataBuilder")
            .field("default_value", &self.default_value)
            .field("inherits", &self.inherits)
            .field("affects", &self.affects)
            .field("has_changed_callback", &self.changed_callback.is_some())
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

impl<T: PropertyValue> PropertyMetadataBuilder<T> {
    /// Starts a builder with the given default value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            inherits: false,
            affects: ChannelSet::empty(),
            changed_callback: None,
            coerce_callback: None,
        }
    }

    /// Sets whether the property inherits along the logical tree.
    ///
    /// An object without a value of its own then resolves to the nearest
    /// ancestor's effective value instead of the default.
    #[must_use]
    pub fn inherits(mut self, inherits: bool) -> Self {
        self.inherits = inherits;
        self
    }

    /// Sets the invalidation channels marked when the effective value changes.
    #[must_use]
    pub fn affects(mut self, channels: ChannelSet) -> Self {
        self.affects = channels;
        self
    }

    /// Sets the callback run by the digest when the effective value changes.
    #[must_use]
    pub fn on_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(ObjectId, &T, &T) + Send + Sync + 'static,
    {
        self.changed_callback = Some(Box::new(callback));
        self
    }

    /// Sets a callback that coerces local values before they are stored.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        PropertyMetadata {
            default_value: self.default_value,
            inherits: self.inherits,
            affects: self.affects,
            changed_callback: self.changed_callback,
            coerce_callback: self.coerce_callback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use presentation_dirty::Channel;
    use std::sync::Mutex;

    #[test]
    fn metadata_defaults() {
        let metadata = PropertyMetadata::new(42_i32);
        assert_eq!(metadata.default_value(), &42);
        assert!(!metadata.inherits());
        assert!(metadata.affects().is_empty());
        assert!(!metadata.has_changed_callback());
        assert!(!metadata.has_coerce_callback());
    }

    #[test]
    fn coerce_clamps() {
        let metadata = PropertyMetadataBuilder::new(0.0_f64)
            .coerce(|v| v.clamp(0.0, 100.0))
            .build();

        assert_eq!(metadata.coerce(-10.0), 0.0);
        assert_eq!(metadata.coerce(50.0), 50.0);
        assert_eq!(metadata.coerce(150.0), 100.0);
    }

    #[test]
    fn changed_callback_sees_owner_and_values() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let metadata = PropertyMetadataBuilder::new(0_i32)
            .on_changed(move |owner, old, new| {
                sink.lock().unwrap().push((owner, *old, *new));
            })
            .build();

        let owner = ObjectId::new(3, 0);
        metadata.on_changed(owner, &0, &42);
        assert_eq!(*seen.lock().unwrap(), [(owner, 0, 42)]);
    }

    #[test]
    fn debug_lists_flags() {
        let metadata = PropertyMetadataBuilder::new(42_i32)
            .inherits(true)
            .affects(Channel::RENDER.into_set())
            .build();

        let debug = format!("{metadata:?}");
        assert!(debug.contains("PropertyMetadata"));
        assert!(debug.contains("42"));
        assert!(debug.contains("Render"));
    }
}
