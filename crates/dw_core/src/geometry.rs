//! Axis-aligned rectangles in screen-style coordinates (x right, y down).
//!
//! Edges are half-open like pixel rows: a rect covers `[left, right)` and
//! `[top, bottom)`. Two rects that merely share an edge do not overlap, which
//! is what lets a body rest exactly on a floor without registering a hit.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(top_left: Vec2, size: Vec2) -> Self {
        Self::new(top_left.x, top_left.y, size.x, size.y)
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::from_pos_size(center - size * 0.5, size)
    }

    pub fn from_midbottom(midbottom: Vec2, size: Vec2) -> Self {
        Self::new(midbottom.x - size.x * 0.5, midbottom.y - size.y, size.x, size.y)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn midbottom(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.bottom())
    }

    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.x, self.bottom())
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    pub fn mid_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y + self.h * 0.5)
    }

    pub fn mid_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.y + self.h * 0.5)
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    pub fn set_top_left(&mut self, top_left: Vec2) {
        self.x = top_left.x;
        self.y = top_left.y;
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.w * 0.5;
        self.y = center.y - self.h * 0.5;
    }

    pub fn set_center_x(&mut self, center_x: f32) {
        self.x = center_x - self.w * 0.5;
    }

    pub fn set_center_y(&mut self, center_y: f32) {
        self.y = center_y - self.h * 0.5;
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }

    /// Grows (or with negative amounts shrinks) the rect around its center.
    pub fn inflated(&self, dw: f32, dh: f32) -> Self {
        Self::new(
            self.x - dw * 0.5,
            self.y - dh * 0.5,
            self.w + dw,
            self.h + dh,
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_is_not_an_overlap() {
        let floor = Rect::new(0.0, 64.0, 64.0, 64.0);
        let body = Rect::new(10.0, 0.0, 20.0, 64.0);
        assert!(!body.overlaps(&floor));
        assert!(body.translated(Vec2::new(0.0, 0.5)).overlaps(&floor));
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(9.99, 9.99)));
        assert!(!rect.contains_point(Vec2::new(10.0, 5.0)));
        assert!(!rect.contains_point(Vec2::new(5.0, 10.0)));
    }

    #[test]
    fn inflate_keeps_center() {
        let rect = Rect::new(100.0, 50.0, 96.0, 64.0);
        let hitbox = rect.inflated(-50.0, 0.0);
        assert_eq!(hitbox.w, 46.0);
        assert_eq!(hitbox.center(), rect.center());
    }

    #[test]
    fn edge_setters_move_without_resizing() {
        let mut rect = Rect::new(0.0, 0.0, 20.0, 30.0);
        rect.set_right(100.0);
        rect.set_bottom(50.0);
        assert_eq!(rect, Rect::new(80.0, 20.0, 20.0, 30.0));
        let anchored = Rect::from_midbottom(Vec2::new(32.0, 64.0), Vec2::new(40.0, 20.0));
        assert_eq!(anchored.midbottom(), Vec2::new(32.0, 64.0));
    }
}
