// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug overlays driven by attached properties.

use presentation_dirty::Channel;
use presentation_property::{Property, PropertyMetadataBuilder, PropertyRegistry, Result, TypeKey};

/// An RGBA color, 8 bits per channel.
pub type Rgba = [u8; 4];

/// The attached properties of the `Diagnostics` owner type.
///
/// Any element may host them. A renderer asks
/// [`Presentation::visual_bounds_overlays`](crate::Presentation::visual_bounds_overlays)
/// which elements want their bounds outlined.
#[derive(Copy, Clone, Debug)]
pub struct DiagnosticsProperties {
    /// The `Diagnostics` owner type.
    pub owner: TypeKey,
    /// Outline the element's visual bounds. Defaults to `false`.
    pub draw_visual_bounds: Property<bool>,
    /// Color of the outline. Defaults to lime.
    pub draw_visual_bounds_color: Property<Rgba>,
}

impl DiagnosticsProperties {
    /// Registers the `Diagnostics` type and its attached properties.
    pub fn register(registry: &mut PropertyRegistry) -> Result<Self> {
        let owner = registry.register_type("Diagnostics", TypeKey::OBJECT);
        let draw_visual_bounds = registry.register_attached(
            owner,
            "DrawVisualBounds",
            PropertyMetadataBuilder::new(false)
                .affects(Channel::RENDER.into_set())
                .build(),
        )?;
        let draw_visual_bounds_color = registry.register_attached(
            owner,
            "DrawVisualBoundsColor",
            PropertyMetadataBuilder::<Rgba>::new([0, 255, 0, 255])
                .affects(Channel::RENDER.into_set())
                .build(),
        )?;
        Ok(Self {
            owner,
            draw_visual_bounds,
            draw_visual_bounds_color,
        })
    }
}
