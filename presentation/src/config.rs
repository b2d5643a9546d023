// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame loop and hand-off settings.

use std::time::Duration;

/// Settings for a [`Presentation`](crate::Presentation).
///
/// Build one with [`PresentationConfig::builder`] or take the
/// [`Default`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentationConfig {
    background_timeout: Duration,
    process_graphics_in_frame: bool,
    max_continuations_per_frame: usize,
    max_graphics_items_per_frame: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        PresentationConfigBuilder::new().build()
    }
}

impl PresentationConfig {
    /// Starts a builder with the default settings.
    #[must_use]
    pub fn builder() -> PresentationConfigBuilder {
        PresentationConfigBuilder::new()
    }

    /// How long [`Presentation::wait`](crate::Presentation::wait) blocks for
    /// a background task.
    #[must_use]
    #[inline]
    pub fn background_timeout(&self) -> Duration {
        self.background_timeout
    }

    /// Whether [`Presentation::frame`](crate::Presentation::frame) runs
    /// graphics work items itself.
    ///
    /// Turn this off when the graphics context lives on another thread that
    /// drains the [`WorkQueue`](presentation_dispatch::WorkQueue) on its own.
    #[must_use]
    #[inline]
    pub fn process_graphics_in_frame(&self) -> bool {
        self.process_graphics_in_frame
    }

    /// The most UI continuations one frame runs.
    #[must_use]
    #[inline]
    pub fn max_continuations_per_frame(&self) -> usize {
        self.max_continuations_per_frame
    }

    /// The most graphics work items one frame runs.
    #[must_use]
    #[inline]
    pub fn max_graphics_items_per_frame(&self) -> usize {
        self.max_graphics_items_per_frame
    }
}

/// Builder for [`PresentationConfig`].
#[derive(Clone, Debug)]
pub struct PresentationConfigBuilder {
    background_timeout: Duration,
    process_graphics_in_frame: bool,
    max_continuations_per_frame: usize,
    max_graphics_items_per_frame: usize,
}

impl Default for PresentationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationConfigBuilder {
    /// Starts from the defaults: a 5 second background timeout, graphics
    /// work processed in the frame, 64 continuations and 256 work items per
    /// frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            background_timeout: Duration::from_secs(5),
            process_graphics_in_frame: true,
            max_continuations_per_frame: 64,
            max_graphics_items_per_frame: 256,
        }
    }

    /// Sets how long a blocking wait on a background task may take.
    #[must_use]
    pub fn background_timeout(mut self, timeout: Duration) -> Self {
        self.background_timeout = timeout;
        self
    }

    /// Sets whether the frame loop runs graphics work items.
    #[must_use]
    pub fn process_graphics_in_frame(mut self, enabled: bool) -> Self {
        self.process_graphics_in_frame = enabled;
        self
    }

    /// Caps the UI continuations run per frame. Zero is raised to one so a
    /// busy queue still drains.
    #[must_use]
    pub fn max_continuations_per_frame(mut self, max: usize) -> Self {
        self.max_continuations_per_frame = max.max(1);
        self
    }

    /// Caps the graphics work items run per frame. Zero is raised to one.
    #[must_use]
    pub fn max_graphics_items_per_frame(mut self, max: usize) -> Self {
        self.max_graphics_items_per_frame = max.max(1);
        self
    }

    /// Builds the [`PresentationConfig`].
    #[must_use]
    pub fn build(self) -> PresentationConfig {
        PresentationConfig {
            background_timeout: self.background_timeout,
            process_graphics_in_frame: self.process_graphics_in_frame,
            max_continuations_per_frame: self.max_continuations_per_frame,
            max_graphics_items_per_frame: self.max_graphics_items_per_frame,
        }
    }
}
