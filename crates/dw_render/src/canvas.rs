//! The render collaborator seen by game code.
//!
//! Editor and level views only ever talk to a [`RenderTarget`]. The shipped
//! implementation is [`DrawList`], which records commands in call order; the
//! GPU side turns a finished list into quads (see `batch`). Tests read the
//! list back to assert draw order.

use dw_core::{Color, ImageRef, Rect};
use glam::Vec2;

pub trait RenderTarget {
    /// Logical size of the drawable area in pixels.
    fn viewport(&self) -> Vec2;
    fn clear(&mut self, color: Color);
    fn draw_image(&mut self, image: &ImageRef, top_left: Vec2);
    fn draw_image_faded(&mut self, image: &ImageRef, top_left: Vec2, alpha: f32);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    fn draw_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], width, color);
        }
    }
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear(Color),
    Image {
        image: ImageRef,
        top_left: Vec2,
        alpha: f32,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
}

#[derive(Debug, Clone)]
pub struct DrawList {
    viewport: Vec2,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Colour of the most recent clear, if any.
    pub fn clear_color(&self) -> Option<Color> {
        self.commands.iter().rev().find_map(|c| match c {
            DrawCommand::Clear(color) => Some(*color),
            _ => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count()
    }
}

impl RenderTarget for DrawList {
    fn viewport(&self) -> Vec2 {
        self.viewport
    }

    fn clear(&mut self, color: Color) {
        // Anything recorded before a clear would be painted over anyway.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_image(&mut self, image: &ImageRef, top_left: Vec2) {
        self.draw_image_faded(image, top_left, 1.0);
    }

    fn draw_image_faded(&mut self, image: &ImageRef, top_left: Vec2, alpha: f32) {
        self.commands.push(DrawCommand::Image {
            image: image.clone(),
            top_left,
            alpha,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }
}
