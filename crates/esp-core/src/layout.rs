//! Screen-space label placement.
//!
//! A label normally hangs off the lower-right of its marker. When that would
//! push it past the right or bottom edge of the viewport, it flips to the
//! other side of the marker on that axis. The axes are decided independently,
//! so a marker in the bottom-right corner gets its label above and to the left.
//!
//! Labels are only checked against the viewport, never against each other.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The drawable area of the host window in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.origin.x && point.y >= self.origin.y && point.x <= max.x && point.y <= max.y
    }
}

/// Fixed geometry shared by every marker and label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelMetrics {
    /// Radius of the circle drawn at the anchor (`R`).
    pub marker_radius: f32,
    /// Gap between the circle and the label box (`D`).
    pub label_offset: f32,
    /// Space between the label box edge and its text, per axis.
    pub padding: Vec2,
}

impl LabelMetrics {
    /// Distance from the anchor to the near corner of the label box.
    #[inline]
    fn reach(&self) -> f32 {
        self.marker_radius + self.label_offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub anchor: Vec2,
    /// Top-left of the background box.
    pub label_min: Vec2,
    /// Bottom-right of the background box.
    pub label_max: Vec2,
    /// Where the text itself starts.
    pub text_pos: Vec2,
    pub flipped_x: bool,
    pub flipped_y: bool,
}

impl LabelPlacement {
    pub fn size(&self) -> Vec2 {
        self.label_max - self.label_min
    }
}

/// Place the label for a marker at `anchor` whose text measures `text_size`.
pub fn place_label(
    anchor: Vec2,
    text_size: Vec2,
    metrics: &LabelMetrics,
    viewport: &Viewport,
) -> LabelPlacement {
    let reach = metrics.reach();
    let box_size = text_size + metrics.padding * 2.0;
    let limit = viewport.max();

    let mut offset = Vec2::splat(reach);
    let default_max = anchor + offset + box_size;

    let flipped_x = default_max.x > limit.x;
    if flipped_x {
        offset.x = -(reach + box_size.x);
    }

    let flipped_y = default_max.y > limit.y;
    if flipped_y {
        offset.y = -(reach + box_size.y);
    }

    let label_min = anchor + offset;
    let label_max = label_min + box_size;

    LabelPlacement {
        anchor,
        label_min,
        label_max,
        text_pos: label_min + metrics.padding,
        flipped_x,
        flipped_y,
    }
}
