//! Decoded images as the game sees them: a size, a flat tint and a per-pixel
//! opacity mask.
//!
//! Real pixel data never reaches the simulation. The mask is what the
//! player's damage test compares, and what the hit silhouette is drawn from,
//! so it has to survive flipping and scaling alongside the image.

use crate::color::Color;
use glam::IVec2;
use std::sync::Arc;

/// Shared, immutable image handle. Sprites clone this freely.
pub type ImageRef = Arc<Image>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Opaque ellipse inscribed in the bounds, shrunk by `inset` pixels on
    /// every side.
    pub fn ellipse(width: u32, height: u32, inset: u32) -> Self {
        let rx = (width as f32 * 0.5 - inset as f32).max(0.5);
        let ry = (height as f32 * 0.5 - inset as f32).max(0.5);
        let cx = width as f32 * 0.5;
        let cy = height as f32 * 0.5;
        Self::from_fn(width, height, |x, y| {
            let dx = (x as f32 + 0.5 - cx) / rx;
            let dy = (y as f32 + 0.5 - cy) / ry;
            dx * dx + dy * dy <= 1.0
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// True when any opaque pixel of `self` coincides with an opaque pixel of
    /// `other`, where `offset` is `other`'s top-left relative to `self`'s.
    pub fn overlaps(&self, other: &Mask, offset: IVec2) -> bool {
        let x0 = offset.x.max(0);
        let y0 = offset.y.max(0);
        let x1 = (self.width as i32).min(offset.x + other.width as i32);
        let y1 = (self.height as i32).min(offset.y + other.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - offset.x, y - offset.y) {
                    return true;
                }
            }
        }
        false
    }

    /// Row runs of opaque pixels; vertically adjacent rows with identical
    /// runs are merged into one taller span.
    pub fn spans(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        for y in 0..self.height {
            let mut row = Vec::new();
            let mut x = 0;
            while x < self.width {
                if !self.get(x as i32, y as i32) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.width && self.get(x as i32, y as i32) {
                    x += 1;
                }
                row.push((start, x - start));
            }

            let same_as_above = row.len() == open.len()
                && row
                    .iter()
                    .zip(&open)
                    .all(|(&(x, w), &i)| spans[i][0] == x && spans[i][2] == w);
            if same_as_above {
                for &i in &open {
                    spans[i][3] += 1;
                }
            } else {
                open.clear();
                for (x, w) in row {
                    open.push(spans.len());
                    spans.push([x, y, w, 1]);
                }
            }
        }
        spans
    }

    pub fn flipped_h(&self) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            self.get((self.width - 1 - x) as i32, y as i32)
        })
    }

    pub fn scaled(&self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self::from_fn(self.width * factor, self.height * factor, |x, y| {
            self.get((x / factor) as i32, (y / factor) as i32)
        })
    }
}

/// One opaque horizontal run, possibly repeated over several identical rows:
/// `x, y, width, height` in image pixels.
pub type Span = [u32; 4];

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub color: Color,
    mask: Mask,
    spans: Vec<Span>,
}

impl Image {
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        Self::with_mask(color, Mask::full(width, height))
    }

    pub fn with_mask(color: Color, mask: Mask) -> Self {
        let spans = mask.spans();
        Self {
            width: mask.width(),
            height: mask.height(),
            color,
            mask,
            spans,
        }
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Opaque area as merged rectangles, for renderers that draw flat quads.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }

    /// Flat white image with the same opaque footprint.
    pub fn silhouette(&self) -> Self {
        Self {
            color: Color::WHITE,
            ..self.clone()
        }
    }

    pub fn tinted(&self, color: Color) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }

    pub fn flipped_h(&self) -> Self {
        Self::with_mask(self.color, self.mask.flipped_h())
    }

    pub fn scaled(&self, factor: u32) -> Self {
        Self::with_mask(self.color, self.mask.scaled(factor))
    }

    pub fn into_ref(self) -> ImageRef {
        Arc::new(self)
    }
}
