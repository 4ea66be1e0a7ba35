//! Neighbour-driven terrain and water tiling.
//!
//! Every edit re-derives the 3x3 block around the edited cell, so the cost
//! per edit is constant regardless of canvas size. Signatures and the water
//! covered flag are recomputed from scratch, never patched incrementally.

use super::grid::{CanvasGrid, Direction, Signature};
use glam::IVec2;

/// Key of the land graphic that fits every neighbour layout.
pub const PLACEHOLDER_KEY: &str = "X";

pub fn refresh_neighborhood(grid: &mut CanvasGrid, cell: IVec2) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            let target = cell + IVec2::new(dx, dy);
            if !grid.contains(target) {
                continue;
            }
            let signature = signature_at(grid, target);
            let covered = grid.has_water(target) && grid.has_water(target + Direction::N.offset());
            if let Some(tile) = grid.get_mut(target) {
                tile.terrain_neighbors = signature;
                tile.water_on_top = covered;
            }
        }
    }
}

pub fn signature_at(grid: &CanvasGrid, cell: IVec2) -> Signature {
    let mut signature = Signature::EMPTY;
    for dir in Direction::ALL {
        if grid.has_terrain(cell + dir.offset()) {
            signature.insert(dir);
        }
    }
    signature
}

/// Land key for a signature: its code when a graphic exists, else the
/// placeholder.
pub fn terrain_key(signature: Signature, has_graphic: impl Fn(&str) -> bool) -> String {
    let code = signature.code();
    if has_graphic(&code) {
        code
    } else {
        PLACEHOLDER_KEY.to_string()
    }
}

/// A diagonal neighbour only changes the tile when both orthogonals beside
/// it are also terrain; layouts that respect this are the drawable ones.
pub fn is_canonical(signature: Signature) -> bool {
    let corners = [
        (Direction::NE, Direction::N, Direction::E),
        (Direction::SE, Direction::S, Direction::E),
        (Direction::SW, Direction::S, Direction::W),
        (Direction::NW, Direction::N, Direction::W),
    ];
    corners.iter().all(|&(diagonal, a, b)| {
        !signature.contains(diagonal) || (signature.contains(a) && signature.contains(b))
    })
}

pub fn canonical_signatures() -> impl Iterator<Item = Signature> {
    (0..=u8::MAX)
        .map(Signature::from_bits)
        .filter(|s| is_canonical(*s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, TileId};

    const TERRAIN: TileId = TileId(2);
    const WATER: TileId = TileId(3);

    fn paint(grid: &mut CanvasGrid, catalog: &Catalog, cell: (i32, i32), id: TileId) {
        let cell = IVec2::new(cell.0, cell.1);
        grid.add(cell, id, catalog).expect("known id");
        refresh_neighborhood(grid, cell);
    }

    fn erase(grid: &mut CanvasGrid, catalog: &Catalog, cell: (i32, i32), id: TileId) {
        let cell = IVec2::new(cell.0, cell.1);
        grid.remove(cell, id, catalog).expect("known id");
        refresh_neighborhood(grid, cell);
    }

    fn code(grid: &CanvasGrid, cell: (i32, i32)) -> String {
        grid.get(IVec2::new(cell.0, cell.1))
            .map(|t| t.terrain_neighbors.code())
            .unwrap_or_default()
    }

    #[test]
    fn paint_order_does_not_change_signatures() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        let cells = [(0, 0), (1, 0), (-1, 0), (0, 1), (1, -1), (-1, 1), (0, -1)];

        let mut forward = CanvasGrid::new();
        for c in cells {
            paint(&mut forward, &catalog, c, TERRAIN);
        }
        let mut backward = CanvasGrid::new();
        for c in cells.iter().rev() {
            paint(&mut backward, &catalog, *c, TERRAIN);
        }

        for c in cells {
            assert_eq!(code(&forward, c), code(&backward, c), "cell {c:?}");
        }
        // Centre sees N, NE, E, S, SW, W.
        assert_eq!(code(&forward, (0, 0)), "ABCEFG");
    }

    #[test]
    fn erasing_updates_neighbours() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        let mut grid = CanvasGrid::new();
        paint(&mut grid, &catalog, (0, 0), TERRAIN);
        paint(&mut grid, &catalog, (1, 0), TERRAIN);
        assert_eq!(code(&grid, (0, 0)), "C");
        erase(&mut grid, &catalog, (1, 0), TERRAIN);
        assert_eq!(code(&grid, (0, 0)), "");
        assert!(!grid.contains(IVec2::new(1, 0)));
    }

    #[test]
    fn water_covered_tracks_north_neighbour() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        let mut grid = CanvasGrid::new();
        paint(&mut grid, &catalog, (0, 1), WATER);
        assert!(!grid.get(IVec2::new(0, 1)).expect("cell").water_on_top);

        paint(&mut grid, &catalog, (0, 0), WATER);
        assert!(grid.get(IVec2::new(0, 1)).expect("cell").water_on_top);
        assert!(!grid.get(IVec2::new(0, 0)).expect("cell").water_on_top);

        erase(&mut grid, &catalog, (0, 0), WATER);
        assert!(!grid.get(IVec2::new(0, 1)).expect("cell").water_on_top);
    }

    #[test]
    fn water_under_terrain_only_is_not_covered() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        let mut grid = CanvasGrid::new();
        paint(&mut grid, &catalog, (0, 0), TERRAIN);
        paint(&mut grid, &catalog, (0, 1), WATER);
        let below = grid.get(IVec2::new(0, 1)).expect("cell");
        assert!(!below.water_on_top);
        assert_eq!(below.terrain_neighbors.code(), "A");
    }

    #[test]
    fn forty_seven_canonical_layouts() {
        assert_eq!(canonical_signatures().count(), 47);
        let mut lone_corner = Signature::EMPTY;
        lone_corner.insert(Direction::NE);
        assert!(!is_canonical(lone_corner));
        lone_corner.insert(Direction::N);
        lone_corner.insert(Direction::E);
        assert!(is_canonical(lone_corner));
    }

    #[test]
    fn missing_graphic_falls_back_to_placeholder() {
        let mut sig = Signature::EMPTY;
        sig.insert(Direction::NE);
        assert_eq!(terrain_key(sig, |_| false), PLACEHOLDER_KEY);
        assert_eq!(terrain_key(sig, |k| k == "B"), "B");
    }
}
