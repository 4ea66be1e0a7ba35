//! Free-floating editor objects: the player start, the sky handle and palms.
//!
//! An object remembers its top-left as a distance from the canvas origin, so
//! panning moves it with the canvas. While dragged it follows the cursor and
//! the distance is only re-derived on release.

use crate::catalog::TileId;
use crate::settings::ANIMATION_SPEED;
use dw_core::{AnimationState, Rect};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawLayer {
    Background,
    Foreground,
}

#[derive(Debug, Clone)]
pub struct CanvasObject {
    pub id: TileId,
    pub rect: Rect,
    pub distance_to_origin: Vec2,
    pub layer: DrawLayer,
    /// The player start and the sky handle cannot be erased.
    pub removable: bool,
    selected: bool,
    drag_offset: Vec2,
    animation: AnimationState,
}

impl CanvasObject {
    /// Creates an object of `size` centred on `center` (screen space).
    pub fn new(
        id: TileId,
        center: Vec2,
        size: Vec2,
        origin: Vec2,
        layer: DrawLayer,
        removable: bool,
    ) -> Self {
        let rect = Rect::from_center(center, size);
        Self {
            id,
            rect,
            distance_to_origin: rect.top_left() - origin,
            layer,
            removable,
            selected: false,
            drag_offset: Vec2::ZERO,
            animation: AnimationState::looping(ANIMATION_SPEED),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.selected
    }

    pub fn start_drag(&mut self, cursor: Vec2) {
        self.selected = true;
        self.drag_offset = cursor - self.rect.top_left();
    }

    pub fn drag(&mut self, cursor: Vec2) {
        if self.selected {
            self.rect.set_top_left(cursor - self.drag_offset);
        }
    }

    pub fn end_drag(&mut self, origin: Vec2) {
        self.selected = false;
        self.distance_to_origin = self.rect.top_left() - origin;
    }

    /// Re-anchors the screen rect after the origin moved.
    pub fn pan(&mut self, origin: Vec2) {
        self.rect.set_top_left(origin + self.distance_to_origin);
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.rect.contains_point(point)
    }

    pub fn tick(&mut self, dt: f32, frame_count: usize) {
        self.animation.tick(dt, frame_count);
    }

    pub fn frame_index(&self, frame_count: usize) -> usize {
        self.animation.frame_index(frame_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palm(origin: Vec2) -> CanvasObject {
        CanvasObject::new(
            TileId(11),
            Vec2::new(300.0, 200.0),
            Vec2::new(76.0, 128.0),
            origin,
            DrawLayer::Foreground,
            true,
        )
    }

    #[test]
    fn created_centred_on_cursor() {
        let obj = palm(Vec2::new(10.0, 20.0));
        assert_eq!(obj.rect.center(), Vec2::new(300.0, 200.0));
        assert_eq!(obj.distance_to_origin, Vec2::new(252.0, 116.0));
    }

    #[test]
    fn drag_keeps_grab_offset_and_reanchors_on_release() {
        let origin = Vec2::new(0.0, 0.0);
        let mut obj = palm(origin);
        let grab = obj.rect.top_left() + Vec2::new(5.0, 7.0);
        obj.start_drag(grab);
        assert!(obj.is_dragging());
        obj.drag(grab + Vec2::new(100.0, -50.0));
        assert_eq!(obj.rect.top_left(), Vec2::new(362.0, 86.0));
        obj.end_drag(Vec2::new(40.0, 40.0));
        assert!(!obj.is_dragging());
        assert_eq!(obj.distance_to_origin, Vec2::new(322.0, 46.0));
    }

    #[test]
    fn pan_moves_with_origin() {
        let mut obj = palm(Vec2::ZERO);
        let before = obj.rect.top_left();
        obj.pan(Vec2::new(-64.0, 30.0));
        assert_eq!(obj.rect.top_left(), before + Vec2::new(-64.0, 30.0));
    }

    #[test]
    fn drag_without_start_is_ignored() {
        let mut obj = palm(Vec2::ZERO);
        let before = obj.rect;
        obj.drag(Vec2::new(999.0, 999.0));
        assert_eq!(obj.rect, before);
    }
}
