//! Sparse canvas grid: one `CanvasTile` per occupied cell, unbounded in
//! every direction.
//!
//! Mutations dispatch on the id's catalog style. A tile that loses its last
//! terrain/water/coin/enemy flag through `remove` leaves the map in the same
//! call, so `cells.len()` is always the number of visibly occupied cells.

use crate::catalog::{Catalog, CatalogError, Style, TileId};
use crate::settings::TILE;
use glam::{IVec2, Vec2};
use std::collections::HashMap;

/// Compass directions in their fixed clockwise enumeration, starting north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Cell offset, y down.
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::N => IVec2::new(0, -1),
            Direction::NE => IVec2::new(1, -1),
            Direction::E => IVec2::new(1, 0),
            Direction::SE => IVec2::new(1, 1),
            Direction::S => IVec2::new(0, 1),
            Direction::SW => IVec2::new(-1, 1),
            Direction::W => IVec2::new(-1, 0),
            Direction::NW => IVec2::new(-1, -1),
        }
    }

    /// Stable letter used in terrain keys: N = 'A' through NW = 'H'.
    pub fn code(self) -> char {
        (b'A' + self.index() as u8) as char
    }

    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NE | Direction::SE | Direction::SW | Direction::NW
        )
    }
}

/// Set of directions holding terrain, stored as one bit per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(u8);

impl Signature {
    pub const EMPTY: Signature = Signature(0);

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    pub fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Letter codes in enumeration order, e.g. `"CDE"` for E, SE, S.
    pub fn code(self) -> String {
        self.directions().map(Direction::code).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasTile {
    pub has_terrain: bool,
    pub terrain_neighbors: Signature,
    pub has_water: bool,
    /// North neighbour also has water; renders the still bottom tile.
    pub water_on_top: bool,
    pub coin: Option<TileId>,
    pub enemy: Option<TileId>,
    /// Free objects with their pixel offset inside the cell.
    pub objects: Vec<(TileId, Vec2)>,
}

impl CanvasTile {
    pub fn is_empty(&self) -> bool {
        !self.has_terrain && !self.has_water && self.coin.is_none() && self.enemy.is_none()
    }

    fn apply(&mut self, id: TileId, style: Style, offset: Vec2) {
        match style {
            Style::Terrain => self.has_terrain = true,
            Style::Water => self.has_water = true,
            Style::Coin => self.coin = Some(id),
            Style::Enemy => self.enemy = Some(id),
            Style::Player | Style::Sky | Style::PalmFg | Style::PalmBg => {
                if !self.objects.contains(&(id, offset)) {
                    self.objects.push((id, offset));
                }
            }
        }
    }

    fn clear(&mut self, style: Style) {
        match style {
            Style::Terrain => self.has_terrain = false,
            Style::Water => self.has_water = false,
            Style::Coin => self.coin = None,
            Style::Enemy => self.enemy = None,
            // Objects are erased by hit-testing in the editor, not per cell.
            Style::Player | Style::Sky | Style::PalmFg | Style::PalmBg => {}
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CanvasGrid {
    cells: HashMap<IVec2, CanvasTile>,
}

impl CanvasGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, cell: IVec2, id: TileId, catalog: &Catalog) -> Result<(), CatalogError> {
        self.add_object(cell, id, Vec2::ZERO, catalog)
    }

    /// Like `add`, with an explicit sub-cell offset for object ids.
    pub fn add_object(
        &mut self,
        cell: IVec2,
        id: TileId,
        offset: Vec2,
        catalog: &Catalog,
    ) -> Result<(), CatalogError> {
        let style = catalog.style(id)?;
        self.cells.entry(cell).or_default().apply(id, style, offset);
        Ok(())
    }

    pub fn remove(
        &mut self,
        cell: IVec2,
        id: TileId,
        catalog: &Catalog,
    ) -> Result<(), CatalogError> {
        let style = catalog.style(id)?;
        if let Some(tile) = self.cells.get_mut(&cell) {
            tile.clear(style);
            if tile.is_empty() {
                self.cells.remove(&cell);
                log::debug!("Cell ({}, {}) emptied", cell.x, cell.y);
            }
        }
        Ok(())
    }

    pub fn neighbors_of(cell: IVec2) -> [IVec2; 8] {
        Direction::ALL.map(|dir| cell + dir.offset())
    }

    pub fn get(&self, cell: IVec2) -> Option<&CanvasTile> {
        self.cells.get(&cell)
    }

    pub(crate) fn get_mut(&mut self, cell: IVec2) -> Option<&mut CanvasTile> {
        self.cells.get_mut(&cell)
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn has_terrain(&self, cell: IVec2) -> bool {
        self.get(cell).is_some_and(|t| t.has_terrain)
    }

    pub fn has_water(&self, cell: IVec2) -> bool {
        self.get(cell).is_some_and(|t| t.has_water)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &CanvasTile)> {
        self.cells.iter().map(|(cell, tile)| (*cell, tile))
    }
}

/// Cell containing a point given as its pixel distance from the canvas
/// origin. Floors toward negative infinity on both axes.
pub fn cell_at(distance_to_origin: Vec2) -> IVec2 {
    (distance_to_origin / TILE).floor().as_ivec2()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().expect("embedded catalog should parse")
    }

    const TERRAIN: TileId = TileId(2);
    const WATER: TileId = TileId(3);
    const GOLD: TileId = TileId(4);
    const SILVER: TileId = TileId(5);
    const TOOTH: TileId = TileId(8);
    const PALM: TileId = TileId(11);

    #[test]
    fn cell_present_iff_any_flag_set() {
        let catalog = catalog();
        let mut grid = CanvasGrid::new();
        let cell = IVec2::new(3, -2);
        let ids = [TERRAIN, WATER, GOLD, TOOTH];

        for id in ids {
            grid.add(cell, id, &catalog).expect("known id");
            assert!(grid.contains(cell));
        }
        // Remove in a different order; the cell must survive until the last.
        for (i, id) in [WATER, TOOTH, TERRAIN, GOLD].into_iter().enumerate() {
            grid.remove(cell, id, &catalog).expect("known id");
            assert_eq!(grid.contains(cell), i < 3, "after removing {id}");
        }
        assert!(grid.is_empty());
    }

    #[test]
    fn removing_coin_keeps_terrain() {
        let catalog = catalog();
        let mut grid = CanvasGrid::new();
        grid.add(IVec2::ZERO, TERRAIN, &catalog).expect("known id");
        grid.add(IVec2::ZERO, GOLD, &catalog).expect("known id");
        grid.remove(IVec2::ZERO, GOLD, &catalog).expect("known id");
        let tile = grid.get(IVec2::ZERO).expect("cell kept");
        assert!(tile.has_terrain);
        assert_eq!(tile.coin, None);
    }

    #[test]
    fn later_coin_overwrites_earlier() {
        let catalog = catalog();
        let mut grid = CanvasGrid::new();
        grid.add(IVec2::ZERO, GOLD, &catalog).expect("known id");
        grid.add(IVec2::ZERO, SILVER, &catalog).expect("known id");
        assert_eq!(grid.get(IVec2::ZERO).and_then(|t| t.coin), Some(SILVER));
    }

    #[test]
    fn repeated_terrain_add_is_idempotent() {
        let catalog = catalog();
        let mut grid = CanvasGrid::new();
        for _ in 0..5 {
            grid.add(IVec2::ZERO, TERRAIN, &catalog).expect("known id");
        }
        assert_eq!(grid.len(), 1);
        grid.remove(IVec2::ZERO, TERRAIN, &catalog).expect("known id");
        assert!(grid.is_empty());
    }

    #[test]
    fn duplicate_objects_are_rejected() {
        let catalog = catalog();
        let mut grid = CanvasGrid::new();
        let offset = Vec2::new(12.0, 40.0);
        grid.add_object(IVec2::ZERO, PALM, offset, &catalog).expect("known id");
        grid.add_object(IVec2::ZERO, PALM, offset, &catalog).expect("known id");
        grid.add_object(IVec2::ZERO, PALM, Vec2::new(13.0, 40.0), &catalog)
            .expect("known id");
        assert_eq!(grid.get(IVec2::ZERO).map(|t| t.objects.len()), Some(2));
    }

    #[test]
    fn removing_from_missing_cell_is_a_no_op() {
        let catalog = catalog();
        let mut grid = CanvasGrid::new();
        grid.remove(IVec2::new(9, 9), TERRAIN, &catalog).expect("known id");
        assert!(grid.is_empty());
    }

    #[test]
    fn unknown_id_is_reported() {
        let catalog = catalog();
        let mut grid = CanvasGrid::new();
        assert_eq!(
            grid.add(IVec2::ZERO, TileId(77), &catalog),
            Err(CatalogError::UnknownId(TileId(77)))
        );
        assert!(grid.is_empty());
    }

    #[test]
    fn neighbors_are_clockwise_from_north() {
        let n = CanvasGrid::neighbors_of(IVec2::new(5, 5));
        assert_eq!(n[0], IVec2::new(5, 4));
        assert_eq!(n[2], IVec2::new(6, 5));
        assert_eq!(n[4], IVec2::new(5, 6));
        assert_eq!(n[6], IVec2::new(4, 5));
        assert_eq!(n[7], IVec2::new(4, 4));
    }

    #[test]
    fn cell_mapping_floors_around_zero() {
        assert_eq!(cell_at(Vec2::new(0.0, 0.0)), IVec2::new(0, 0));
        assert_eq!(cell_at(Vec2::new(-0.5, 63.9)), IVec2::new(-1, 0));
        assert_eq!(cell_at(Vec2::new(64.0, -64.0)), IVec2::new(1, -1));
        assert_eq!(cell_at(Vec2::new(-64.0, -64.5)), IVec2::new(-1, -2));
    }

    #[test]
    fn signature_code_follows_enumeration_order() {
        let mut sig = Signature::EMPTY;
        sig.insert(Direction::W);
        sig.insert(Direction::N);
        sig.insert(Direction::SE);
        assert_eq!(sig.code(), "ADG");
        assert_eq!(Direction::NW.code(), 'H');
    }
}
