//! Editor drawing, back to front: sky and sea, background objects, grid
//! cells, foreground objects, grid lines, hover preview, menu.

use super::autotile::terrain_key;
use super::canvas_object::{CanvasObject, DrawLayer};
use super::grid::cell_at;
use super::menu::Menu;
use super::Editor;
use crate::assets::AssetLibrary;
use crate::catalog::{Catalog, CatalogError, Placement, Style, TileId};
use crate::settings::{
    BUTTON_BG_COLOR, BUTTON_LINE_COLOR, HORIZON_COLOR, HORIZON_TOP_COLOR, LINE_COLOR, SEA_COLOR,
    SKY_COLOR, TILE,
};
use dw_core::{Color, ImageRef, Rect};
use dw_render::RenderTarget;
use glam::Vec2;

const PREVIEW_ALPHA: f32 = 200.0 / 255.0;
const BRACKET_SIZE: f32 = 15.0;
const BRACKET_WIDTH: f32 = 3.0;
const MENU_HIGHLIGHT_WIDTH: f32 = 5.0;

pub fn draw(
    target: &mut impl RenderTarget,
    editor: &Editor,
    catalog: &Catalog,
    assets: &AssetLibrary,
    cursor: Vec2,
) -> Result<(), CatalogError> {
    draw_sky(target, editor, catalog);
    draw_objects(target, editor.objects(), DrawLayer::Background, assets)?;
    draw_cells(target, editor, catalog, assets)?;
    draw_objects(target, editor.objects(), DrawLayer::Foreground, assets)?;
    draw_grid_lines(target, editor.origin());
    if !editor.menu().contains(cursor) {
        draw_preview(target, editor, catalog, assets, cursor)?;
    }
    draw_menu(target, editor.menu(), editor.selection(), assets);
    Ok(())
}

fn draw_sky(target: &mut impl RenderTarget, editor: &Editor, catalog: &Catalog) {
    let viewport = target.viewport();
    target.clear(SKY_COLOR);
    let Some(y) = editor.horizon_y(catalog) else {
        return;
    };

    if y > 0.0 {
        for (offset, height) in [(10.0, 10.0), (16.0, 4.0), (20.0, 2.0)] {
            target.fill_rect(
                Rect::new(0.0, y - offset, viewport.x, height),
                HORIZON_TOP_COLOR,
            );
        }
        for cloud in editor.clouds() {
            target.draw_image(&cloud.image, Vec2::new(cloud.pos.x, y - cloud.pos.y));
        }
    }

    if y > 0.0 && y < viewport.y {
        target.fill_rect(Rect::new(0.0, y, viewport.x, viewport.y - y), SEA_COLOR);
        target.draw_line(Vec2::new(0.0, y), Vec2::new(viewport.x, y), 3.0, HORIZON_COLOR);
    } else if y <= 0.0 {
        target.fill_rect(Rect::from_pos_size(Vec2::ZERO, viewport), SEA_COLOR);
    }
}

fn draw_objects(
    target: &mut impl RenderTarget,
    objects: &[CanvasObject],
    layer: DrawLayer,
    assets: &AssetLibrary,
) -> Result<(), CatalogError> {
    for object in objects.iter().filter(|o| o.layer == layer) {
        let frames = assets.frames(object.id)?;
        if let Some(frame) = frames.get(object.frame_index(frames.len())) {
            target.draw_image(frame, object.rect.top_left());
        }
    }
    Ok(())
}

fn draw_cells(
    target: &mut impl RenderTarget,
    editor: &Editor,
    catalog: &Catalog,
    assets: &AssetLibrary,
) -> Result<(), CatalogError> {
    let water = catalog.first_with_style(Style::Water);
    let half = Vec2::splat(TILE / 2.0);

    for (cell, tile) in editor.grid().iter() {
        let pos = editor.origin() + cell.as_vec2() * TILE;

        if tile.has_terrain {
            let key = terrain_key(tile.terrain_neighbors, |k| assets.has_land_graphic(k));
            if let Some(image) = assets.land(&key) {
                target.draw_image(image, pos);
            }
        }

        if tile.has_water {
            if tile.water_on_top {
                target.draw_image(assets.water_bottom(), pos);
            } else if let Some(id) = water {
                let frames = assets.water_top();
                if let Some(frame) = frames.get(editor.frame_index(id, frames.len())) {
                    target.draw_image(frame, pos);
                }
            }
        }

        if let Some(coin) = tile.coin {
            if let Some(frame) = current_frame(editor, assets, coin)? {
                let rect = Rect::from_center(pos + half, frame.size());
                target.draw_image(frame, rect.top_left());
            }
        }

        if let Some(enemy) = tile.enemy {
            if let Some(frame) = current_frame(editor, assets, enemy)? {
                let rect = Rect::from_midbottom(pos + Vec2::new(half.x, TILE), frame.size());
                target.draw_image(frame, rect.top_left());
            }
        }
    }
    Ok(())
}

fn current_frame<'a>(
    editor: &Editor,
    assets: &'a AssetLibrary,
    id: TileId,
) -> Result<Option<&'a ImageRef>, CatalogError> {
    let frames = assets.frames(id)?;
    Ok(frames.get(editor.frame_index(id, frames.len())))
}

fn draw_grid_lines(target: &mut impl RenderTarget, origin: Vec2) {
    let viewport = target.viewport();
    let offset = origin - (origin / TILE).trunc() * TILE;
    let cols = (viewport.x / TILE) as i32;
    let rows = (viewport.y / TILE) as i32;

    for col in 0..=cols {
        let x = offset.x + col as f32 * TILE;
        target.draw_line(Vec2::new(x, 0.0), Vec2::new(x, viewport.y), 1.0, LINE_COLOR);
    }
    for row in 0..=rows {
        let y = offset.y + row as f32 * TILE;
        target.draw_line(Vec2::new(0.0, y), Vec2::new(viewport.x, y), 1.0, LINE_COLOR);
    }
}

fn draw_preview(
    target: &mut impl RenderTarget,
    editor: &Editor,
    catalog: &Catalog,
    assets: &AssetLibrary,
    cursor: Vec2,
) -> Result<(), CatalogError> {
    if let Some(object) = editor.hovered_object(cursor) {
        draw_brackets(target, object.rect.inflated(10.0, 10.0), Color::BLACK);
        return Ok(());
    }

    let selection = editor.selection();
    let preview = assets.preview(selection)?;
    let top_left = match catalog.placement(selection)? {
        Placement::Tile => {
            let cell = cell_at(cursor - editor.origin());
            editor.origin() + cell.as_vec2() * TILE
        }
        Placement::Object => cursor - preview.size() / 2.0,
    };
    target.draw_image_faded(preview, top_left, PREVIEW_ALPHA);
    Ok(())
}

fn draw_brackets(target: &mut impl RenderTarget, rect: Rect, color: Color) {
    let (l, t, r, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let s = BRACKET_SIZE;
    let corners = [
        [Vec2::new(l, t + s), Vec2::new(l, t), Vec2::new(l + s, t)],
        [Vec2::new(r - s, t), Vec2::new(r, t), Vec2::new(r, t + s)],
        [Vec2::new(r, b - s), Vec2::new(r, b), Vec2::new(r - s, b)],
        [Vec2::new(l + s, b), Vec2::new(l, b), Vec2::new(l, b - s)],
    ];
    for corner in corners {
        target.draw_polyline(&corner, BRACKET_WIDTH, color);
    }
}

fn draw_menu(target: &mut impl RenderTarget, menu: &Menu, selection: TileId, assets: &AssetLibrary) {
    for button in menu.buttons() {
        target.fill_rect(button.rect, BUTTON_BG_COLOR);
        if let Some(thumb) = assets.thumbnail(button.current_id()) {
            let rect = Rect::from_center(button.rect.center(), thumb.size());
            target.draw_image(thumb, rect.top_left());
        }
    }

    if let Some(active) = menu.button_for(selection) {
        let r = active.rect;
        let outline = [
            r.top_left(),
            Vec2::new(r.right(), r.top()),
            r.bottom_right(),
            r.bottom_left(),
            r.top_left(),
        ];
        target.draw_polyline(&outline, MENU_HIGHLIGHT_WIDTH, BUTTON_LINE_COLOR);
    }
}
