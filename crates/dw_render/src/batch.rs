//! CPU-side mesh building from a recorded [`DrawList`].
//!
//! Images become one quad per opaque span so masked placeholders keep their
//! silhouette on screen; rects are one quad; lines are one quad rotated along
//! the segment. Submission order is preserved, which is what gives the level
//! and editor their layer order.

use crate::canvas::{DrawCommand, DrawList};
use crate::vertex::ColorVertex;
use dw_core::{Color, Rect};
use glam::Vec2;

#[derive(Debug, Default)]
pub struct QuadBatch {
    pub vertices: Vec<ColorVertex>,
    pub indices: Vec<u32>,
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_draw_list(list: &DrawList) -> Self {
        let mut batch = Self::new();
        batch.extend(list);
        batch
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    pub fn extend(&mut self, list: &DrawList) {
        for command in list.commands() {
            match command {
                // The clear colour is applied by the render pass load op.
                DrawCommand::Clear(_) => {}
                DrawCommand::Image {
                    image,
                    top_left,
                    alpha,
                } => {
                    let color = image.color.with_alpha(image.color.a * alpha);
                    for &[x, y, w, h] in image.spans() {
                        self.push_rect(
                            Rect::new(
                                top_left.x + x as f32,
                                top_left.y + y as f32,
                                w as f32,
                                h as f32,
                            ),
                            color,
                        );
                    }
                }
                DrawCommand::FillRect { rect, color } => self.push_rect(*rect, *color),
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    color,
                } => self.push_line(*from, *to, *width, *color),
            }
        }
    }

    pub fn push_rect(&mut self, rect: Rect, color: Color) {
        self.push_quad(
            [
                Vec2::new(rect.left(), rect.top()),
                Vec2::new(rect.right(), rect.top()),
                Vec2::new(rect.right(), rect.bottom()),
                Vec2::new(rect.left(), rect.bottom()),
            ],
            color,
        );
    }

    pub fn push_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let along = to - from;
        if along.length_squared() == 0.0 {
            return;
        }
        let normal = along.perp().normalize() * (width.max(1.0) * 0.5);
        self.push_quad(
            [from + normal, to + normal, to - normal, from - normal],
            color,
        );
    }

    fn push_quad(&mut self, corners: [Vec2; 4], color: Color) {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(corners.map(|corner| ColorVertex::new(corner, color)));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RenderTarget;
    use dw_core::{Image, Mask};

    #[test]
    fn masked_image_emits_one_quad_per_span() {
        let mut list = DrawList::new(Vec2::new(64.0, 64.0));
        let image = Image::with_mask(Color::WHITE, Mask::from_fn(5, 1, |x, _| x != 2)).into_ref();
        list.draw_image(&image, Vec2::new(10.0, 20.0));
        let batch = QuadBatch::from_draw_list(&list);
        assert_eq!(batch.quad_count(), 2);
        assert_eq!(batch.vertices[0].position, [10.0, 20.0]);
        assert_eq!(batch.vertices[4].position, [13.0, 20.0]);
    }

    #[test]
    fn faded_image_scales_alpha() {
        let mut list = DrawList::new(Vec2::ONE);
        let image = Image::solid(2, 2, Color::WHITE).into_ref();
        list.draw_image_faded(&image, Vec2::ZERO, 0.5);
        let batch = QuadBatch::from_draw_list(&list);
        assert_eq!(batch.vertices[0].color[3], 0.5);
    }

    #[test]
    fn clear_and_degenerate_lines_emit_nothing() {
        let mut list = DrawList::new(Vec2::ONE);
        list.clear(Color::BLACK);
        list.draw_line(Vec2::ONE, Vec2::ONE, 2.0, Color::BLACK);
        assert_eq!(QuadBatch::from_draw_list(&list).quad_count(), 0);
    }

    #[test]
    fn horizontal_line_is_width_thick() {
        let mut batch = QuadBatch::new();
        batch.push_line(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0, Color::BLACK);
        let ys: Vec<f32> = batch.vertices.iter().map(|v| v.position[1]).collect();
        let span = ys.iter().cloned().fold(f32::MIN, f32::max) - ys.iter().cloned().fold(f32::MAX, f32::min);
        assert!((span - 4.0).abs() < 1e-5);
    }
}
