//! Turns the canvas into a level blueprint.
//!
//! Export works on a snapshot of the grid so folding the free objects in
//! never touches the live canvas. Cell coordinates are shifted so the
//! top-left occupied cell lands at pixel (0, 0).

use super::autotile::terrain_key;
use super::canvas_object::CanvasObject;
use super::grid::{cell_at, CanvasGrid};
use crate::catalog::{Catalog, CatalogError, Style, TileId};
use crate::settings::{TILE, TILE_SIZE};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("nothing to export: the canvas is empty")]
    EmptyCanvas,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerName {
    Water,
    BgPalms,
    Terrain,
    Enemies,
    Coins,
    FgObjects,
}

impl LayerName {
    /// Build order; later layers may refer to entities from earlier ones.
    pub const ORDER: [LayerName; 6] = [
        LayerName::Water,
        LayerName::BgPalms,
        LayerName::Terrain,
        LayerName::Enemies,
        LayerName::Coins,
        LayerName::FgObjects,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Land graphic key, e.g. `"CDE"` or the placeholder `"X"`.
    Terrain(String),
    WaterTop,
    WaterBottom,
    Tile(TileId),
}

pub type Position = (i32, i32);

/// Layered level description keyed by pixel position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blueprint {
    layers: [BTreeMap<Position, Payload>; 6],
}

impl Blueprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layer: LayerName, pos: Position, payload: Payload) {
        self.layers[layer.slot()].insert(pos, payload);
    }

    pub fn layer(&self, layer: LayerName) -> &BTreeMap<Position, Payload> {
        &self.layers[layer.slot()]
    }

    /// Layers in build order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerName, &BTreeMap<Position, Payload>)> {
        LayerName::ORDER
            .into_iter()
            .map(move |name| (name, self.layer(name)))
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn export(
    grid: &CanvasGrid,
    objects: &[CanvasObject],
    catalog: &Catalog,
    has_land_graphic: impl Fn(&str) -> bool,
) -> Result<Blueprint, ExportError> {
    let mut snapshot = grid.clone();
    for object in objects {
        let cell = cell_at(object.distance_to_origin);
        let offset = object.distance_to_origin - cell.as_vec2() * TILE;
        snapshot.add_object(cell, object.id, offset, catalog)?;
    }

    let min_col = snapshot.iter().map(|(cell, _)| cell.x).min();
    let min_row = snapshot.iter().map(|(cell, _)| cell.y).min();
    let (Some(min_col), Some(min_row)) = (min_col, min_row) else {
        return Err(ExportError::EmptyCanvas);
    };

    let mut blueprint = Blueprint::new();
    for (cell, tile) in snapshot.iter() {
        let x = (cell.x - min_col) * TILE_SIZE;
        let y = (cell.y - min_row) * TILE_SIZE;

        if tile.has_water {
            let payload = if tile.water_on_top {
                Payload::WaterBottom
            } else {
                Payload::WaterTop
            };
            blueprint.insert(LayerName::Water, (x, y), payload);
        }

        if tile.has_terrain {
            let key = terrain_key(tile.terrain_neighbors, &has_land_graphic);
            blueprint.insert(LayerName::Terrain, (x, y), Payload::Terrain(key));
        }

        if let Some(coin) = tile.coin {
            let half = TILE_SIZE / 2;
            blueprint.insert(LayerName::Coins, (x + half, y + half), Payload::Tile(coin));
        }

        if let Some(enemy) = tile.enemy {
            blueprint.insert(LayerName::Enemies, (x, y), Payload::Tile(enemy));
        }

        for &(id, offset) in &tile.objects {
            let layer = if catalog.style(id)? == Style::PalmBg {
                LayerName::BgPalms
            } else {
                LayerName::FgObjects
            };
            let pos = (x + offset.x as i32, y + offset.y as i32);
            blueprint.insert(layer, pos, Payload::Tile(id));
        }
    }

    log::info!(
        "Exported blueprint: {} entries from {} cells",
        blueprint.len(),
        snapshot.len()
    );
    Ok(blueprint)
}
