// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property system errors.

use crate::id::PropertyId;

/// Errors reported by the registry and by dependency object accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The name is already registered on the owner type or on a type in the
    /// same lineage. Sharing a property with a derived type goes through
    /// [`PropertyRegistry::add_owner`](crate::PropertyRegistry::add_owner).
    #[error("property `{name}` is already registered in the lineage of `{owner}`")]
    DuplicateRegistration {
        /// The conflicting property name.
        name: &'static str,
        /// The type the second registration was attempted on.
        owner: &'static str,
    },
    /// A value of the wrong type was used with a property.
    #[error("property `{name}` holds `{expected}`, not `{found}`")]
    TypeMismatch {
        /// The property name.
        name: &'static str,
        /// The registered value type.
        expected: &'static str,
        /// The type that was supplied.
        found: &'static str,
    },
    /// A read-only property was written without its key.
    #[error("property `{name}` is read-only")]
    AccessDenied {
        /// The property name.
        name: &'static str,
    },
    /// The property is unknown, or it is not attached and the host type is
    /// not one of its owners.
    #[error("{property} is not registered for `{host}`")]
    UnregisteredProperty {
        /// The property that was addressed.
        property: PropertyId,
        /// The type of the object it was used on.
        host: &'static str,
    },
}

/// Result alias for property operations.
pub type Result<T, E = PropertyError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_property() {
        let err = PropertyError::DuplicateRegistration {
            name: "Width",
            owner: "Button",
        };
        assert_eq!(
            err.to_string(),
            "property `Width` is already registered in the lineage of `Button`"
        );

        let err = PropertyError::UnregisteredProperty {
            property: PropertyId::new(7),
            host: "Panel",
        };
        assert_eq!(err.to_string(), "PropertyId(7) is not registered for `Panel`");
    }
}
