//! Level drawing: sky, clouds, horizon and sea, then the entity layers
//! shifted by the scroll camera.

use super::entity::Layer;
use super::Level;
use crate::settings::{HORIZON_COLOR, HORIZON_TOP_COLOR, SEA_COLOR, SKY_COLOR};
use dw_core::Rect;
use dw_render::RenderTarget;
use glam::Vec2;

pub fn draw(target: &mut impl RenderTarget, level: &Level) {
    target.clear(SKY_COLOR);
    draw_layer(target, level, Layer::Clouds);
    draw_horizon(target, level);
    for layer in [Layer::Background, Layer::Water, Layer::Main] {
        draw_layer(target, level, layer);
    }
}

fn draw_layer(target: &mut impl RenderTarget, level: &Level, layer: Layer) {
    let camera = level.camera();
    for (_, entity) in level.arena().iter().filter(|(_, e)| e.layer == layer) {
        if let Some(image) = entity.sprite.image() {
            target.draw_image(image, camera.to_screen(entity.rect.top_left()));
        }
    }
}

fn draw_horizon(target: &mut impl RenderTarget, level: &Level) {
    let Some(horizon_y) = level.horizon_y() else {
        return;
    };
    let viewport = target.viewport();
    let y = horizon_y - level.camera().offset.y;

    if y < viewport.y {
        target.fill_rect(Rect::new(0.0, y, viewport.x, viewport.y - y), SEA_COLOR);
        for (offset, height) in [(10.0, 10.0), (16.0, 4.0), (20.0, 2.0)] {
            target.fill_rect(
                Rect::new(0.0, y - offset, viewport.x, height),
                HORIZON_TOP_COLOR,
            );
        }
        target.draw_line(Vec2::new(0.0, y), Vec2::new(viewport.x, y), 3.0, HORIZON_COLOR);
    }
    if y < 0.0 {
        target.fill_rect(Rect::from_pos_size(Vec2::ZERO, viewport), SEA_COLOR);
    }
}
