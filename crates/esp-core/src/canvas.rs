//! Drawing capability the overlay renders into.
//!
//! Hosts implement [`Canvas`] on top of their immediate-mode UI. [`DrawList`]
//! is a recording implementation with fixed-width text metrics, used by the
//! simulator and by tests that need to inspect what a frame would draw.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::layout::Viewport;

/// Straight-alpha colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl From<[f32; 4]> for Rgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

pub trait Canvas {
    fn viewport(&self) -> Viewport;

    /// Size of `text` when drawn with the canvas' current font.
    fn measure_text(&self, text: &str) -> Vec2;

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgba, thickness: f32);

    fn draw_filled_rounded_rect(&mut self, min: Vec2, max: Vec2, color: Rgba, rounding: f32);

    fn draw_text(&mut self, pos: Vec2, color: Rgba, text: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        thickness: f32,
    },
    FilledRoundedRect {
        min: Vec2,
        max: Vec2,
        color: Rgba,
        rounding: f32,
    },
    Text {
        pos: Vec2,
        color: Rgba,
        text: String,
    },
}

/// Records draw calls in issue order.
#[derive(Debug, Clone)]
pub struct DrawList {
    viewport: Viewport,
    glyph_size: Vec2,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// `glyph_size` is the advance and line height of every character.
    pub fn new(viewport: Viewport, glyph_size: Vec2) -> Self {
        Self {
            viewport,
            glyph_size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for DrawList {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn measure_text(&self, text: &str) -> Vec2 {
        let widest_line = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_count = text.lines().count().max(1);
        Vec2::new(
            widest_line as f32 * self.glyph_size.x,
            line_count as f32 * self.glyph_size.y,
        )
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgba, thickness: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            thickness,
        });
    }

    fn draw_filled_rounded_rect(&mut self, min: Vec2, max: Vec2, color: Rgba, rounding: f32) {
        self.commands.push(DrawCommand::FilledRoundedRect {
            min,
            max,
            color,
            rounding,
        });
    }

    fn draw_text(&mut self, pos: Vec2, color: Rgba, text: &str) {
        self.commands.push(DrawCommand::Text {
            pos,
            color,
            text: text.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_fixed_width_text() {
        let list = DrawList::new(Viewport::from_size(100.0, 100.0), Vec2::new(7.0, 13.0));
        assert_eq!(list.measure_text("Goblin"), Vec2::new(42.0, 13.0));
        assert_eq!(list.measure_text(""), Vec2::new(0.0, 13.0));
        assert_eq!(list.measure_text("ab\nabcd"), Vec2::new(28.0, 26.0));
    }

    #[test]
    fn serializes_commands_with_op_tag() {
        let cmd = DrawCommand::Text {
            pos: Vec2::new(1.0, 2.0),
            color: Rgba::new(1.0, 1.0, 1.0, 1.0),
            text: "Goblin".into(),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["op"], "text");
        assert_eq!(json["text"], "Goblin");
        assert_eq!(json["color"], serde_json::json!([1.0, 1.0, 1.0, 1.0]));
    }
}
