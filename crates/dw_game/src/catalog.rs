//! The tile catalog: every placeable id, what category it belongs to, and
//! which level archetype it turns into.
//!
//! The table is data (`assets/catalog.json`); a copy is compiled in so the
//! game still starts when the file is missing. Everything downstream (grid
//! dispatch, menu, export bucketing, level build) asks the catalog instead of
//! matching on literal ids.

use dw_core::Color;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("../assets/catalog.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u16);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("tile id {0} is not in the catalog")]
    UnknownId(TileId),
    #[error("invalid tile catalog: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Terrain,
    Water,
    Coin,
    Enemy,
    Player,
    Sky,
    PalmFg,
    PalmBg,
}

/// Tiles snap to cells and live in the grid; objects float freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Tile,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuGroup {
    Terrain,
    Coin,
    Enemy,
    Palm,
}

impl MenuGroup {
    pub const ALL: [MenuGroup; 4] = [
        MenuGroup::Terrain,
        MenuGroup::Coin,
        MenuGroup::Enemy,
        MenuGroup::Palm,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinKind {
    Gold,
    Silver,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalmVariant {
    Small,
    Large,
    Left,
    Right,
}

/// What the level builder constructs for an id.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Archetype {
    Terrain,
    Water,
    Coin {
        coin: CoinKind,
    },
    Spikes,
    Tooth,
    Shell {
        facing: Facing,
    },
    Player,
    Sky,
    /// Foreground palm: animated on the main layer plus an invisible block
    /// the player can stand on.
    PalmFg {
        variant: PalmVariant,
        block_offset: [f32; 2],
        block_size: [f32; 2],
    },
    PalmBg {
        variant: PalmVariant,
    },
}

impl Archetype {
    pub fn style(&self) -> Style {
        match self {
            Archetype::Terrain => Style::Terrain,
            Archetype::Water => Style::Water,
            Archetype::Coin { .. } => Style::Coin,
            Archetype::Spikes | Archetype::Tooth | Archetype::Shell { .. } => Style::Enemy,
            Archetype::Player => Style::Player,
            Archetype::Sky => Style::Sky,
            Archetype::PalmFg { .. } => Style::PalmFg,
            Archetype::PalmBg { .. } => Style::PalmBg,
        }
    }
}

/// Placeholder look used by the asset library.
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub color: Color,
    pub width: u32,
    pub height: u32,
    pub frames: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileInfo {
    pub id: TileId,
    pub name: String,
    pub style: Style,
    pub placement: Placement,
    pub menu: Option<MenuGroup>,
    pub archetype: Archetype,
    pub swatch: Swatch,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    tiles: BTreeMap<TileId, TileInfo>,
    first_selectable: TileId,
    last_selectable: TileId,
    player: TileId,
    sky: TileId,
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct CatalogJson {
    version: String,
    selectable: SelectableJson,
    tiles: Vec<TileJson>,
}

#[derive(Debug, Deserialize)]
struct SelectableJson {
    first: TileId,
    last: TileId,
}

#[derive(Debug, Deserialize)]
struct TileJson {
    id: TileId,
    name: String,
    style: Style,
    placement: Placement,
    #[serde(default)]
    menu: Option<MenuGroup>,
    archetype: Archetype,
    swatch: SwatchJson,
}

#[derive(Debug, Deserialize)]
struct SwatchJson {
    color: String,
    size: [u32; 2],
    #[serde(default = "default_frames")]
    frames: usize,
}

const fn default_frames() -> usize {
    1
}

impl Catalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED_CATALOG)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let json: CatalogJson = serde_json::from_str(raw)
            .map_err(|e| CatalogError::Invalid(format!("failed to parse catalog JSON: {e}")))?;
        build_catalog(json).map_err(CatalogError::Invalid)
    }

    /// Reads the catalog file, falling back to the compiled-in copy only when
    /// the file does not exist. A present but malformed file is an error.
    pub fn load_or_embedded(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            log::info!(
                "Catalog '{}' not found, using the embedded catalog",
                path.display()
            );
            return Self::embedded();
        }
        let raw = load_catalog_text(path).map_err(CatalogError::Invalid)?;
        let catalog = Self::from_json_str(&raw)?;
        log::info!(
            "Loaded catalog '{}' ({} tiles)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    pub fn get(&self, id: TileId) -> Result<&TileInfo, CatalogError> {
        self.tiles.get(&id).ok_or(CatalogError::UnknownId(id))
    }

    pub fn style(&self, id: TileId) -> Result<Style, CatalogError> {
        self.get(id).map(|info| info.style)
    }

    pub fn placement(&self, id: TileId) -> Result<Placement, CatalogError> {
        self.get(id).map(|info| info.placement)
    }

    pub fn archetype(&self, id: TileId) -> Result<Archetype, CatalogError> {
        self.get(id).map(|info| info.archetype)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileInfo> {
        self.tiles.values()
    }

    pub fn player(&self) -> TileId {
        self.player
    }

    pub fn sky(&self) -> TileId {
        self.sky
    }

    pub fn first_selectable(&self) -> TileId {
        self.first_selectable
    }

    pub fn last_selectable(&self) -> TileId {
        self.last_selectable
    }

    /// Clamps a candidate selection into the selectable range (no wrap).
    pub fn clamp_selection(&self, candidate: i32) -> TileId {
        let clamped = candidate.clamp(
            i32::from(self.first_selectable.0),
            i32::from(self.last_selectable.0),
        );
        TileId(clamped as u16)
    }

    pub fn first_with_style(&self, style: Style) -> Option<TileId> {
        self.iter().find(|t| t.style == style).map(|t| t.id)
    }

    /// Selectable ids shown under a menu button, in id order.
    pub fn menu_ids(&self, group: MenuGroup) -> Vec<TileId> {
        self.iter()
            .filter(|t| t.menu == Some(group) && self.is_selectable(t.id))
            .map(|t| t.id)
            .collect()
    }

    pub fn is_selectable(&self, id: TileId) -> bool {
        (self.first_selectable..=self.last_selectable).contains(&id)
    }
}

pub fn load_catalog_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|e| format!("Failed to read catalog file {}: {e}", path.display()))
}

fn build_catalog(json: CatalogJson) -> Result<Catalog, String> {
    if json.version.trim().is_empty() {
        return Err("catalog version is empty".to_string());
    }
    if json.selectable.first > json.selectable.last {
        return Err(format!(
            "selectable range is empty ({}..={})",
            json.selectable.first, json.selectable.last
        ));
    }

    let mut tiles = BTreeMap::new();
    let mut names = HashSet::new();
    for tile in json.tiles {
        if tile.archetype.style() != tile.style {
            return Err(format!(
                "tile {} '{}' has style {:?} but archetype {:?}",
                tile.id, tile.name, tile.style, tile.archetype
            ));
        }
        let expected_placement = match tile.style {
            Style::Terrain | Style::Water | Style::Coin | Style::Enemy => Placement::Tile,
            Style::Player | Style::Sky | Style::PalmFg | Style::PalmBg => Placement::Object,
        };
        if tile.placement != expected_placement {
            return Err(format!(
                "tile {} '{}' must use placement {:?}",
                tile.id, tile.name, expected_placement
            ));
        }
        if tile.swatch.size[0] == 0 || tile.swatch.size[1] == 0 || tile.swatch.frames == 0 {
            return Err(format!("tile {} '{}' has an empty swatch", tile.id, tile.name));
        }
        if !names.insert(tile.name.clone()) {
            return Err(format!("duplicate tile name '{}'", tile.name));
        }
        let color = parse_hex_color(&tile.swatch.color)
            .map_err(|e| format!("tile {} '{}': {e}", tile.id, tile.name))?;
        let info = TileInfo {
            id: tile.id,
            name: tile.name,
            style: tile.style,
            placement: tile.placement,
            menu: tile.menu,
            archetype: tile.archetype,
            swatch: Swatch {
                color,
                width: tile.swatch.size[0],
                height: tile.swatch.size[1],
                frames: tile.swatch.frames,
            },
        };
        if let Some(previous) = tiles.insert(info.id, info) {
            return Err(format!("duplicate tile id {}", previous.id));
        }
    }

    for raw in json.selectable.first.0..=json.selectable.last.0 {
        if !tiles.contains_key(&TileId(raw)) {
            return Err(format!("selectable id {} is not defined", TileId(raw)));
        }
    }

    let single = |style: Style| -> Result<TileId, String> {
        let mut ids = tiles.values().filter(|t| t.style == style).map(|t| t.id);
        match (ids.next(), ids.next()) {
            (Some(id), None) => Ok(id),
            (None, _) => Err(format!("catalog has no {style:?} tile")),
            (Some(_), Some(_)) => Err(format!("catalog has more than one {style:?} tile")),
        }
    };
    let player = single(Style::Player)?;
    let sky = single(Style::Sky)?;
    single(Style::Terrain)?;
    single(Style::Water)?;

    Ok(Catalog {
        tiles,
        first_selectable: json.selectable.first,
        last_selectable: json.selectable.last,
        player,
        sky,
    })
}

fn parse_hex_color(raw: &str) -> Result<Color, String> {
    let digits = raw.trim_start_matches('#');
    if digits.len() != 6 {
        return Err(format!("colour '{raw}' must be #rrggbb"));
    }
    u32::from_str_radix(digits, 16)
        .map(Color::hex)
        .map_err(|e| format!("colour '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dw_catalog_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn minimal_json(extra_tiles: &str, first: u16, last: u16) -> String {
        format!(
            r##"{{
              "version": "1.0",
              "selectable": {{ "first": {first}, "last": {last} }},
              "tiles": [
                {{ "id": 0, "name": "player", "style": "player", "placement": "object",
                   "archetype": {{ "kind": "player" }},
                   "swatch": {{ "color": "#e05a47", "size": [48, 64] }} }},
                {{ "id": 1, "name": "sky", "style": "sky", "placement": "object",
                   "archetype": {{ "kind": "sky" }},
                   "swatch": {{ "color": "#ffffff", "size": [64, 64] }} }},
                {{ "id": 2, "name": "terrain", "style": "terrain", "placement": "tile",
                   "menu": "terrain", "archetype": {{ "kind": "terrain" }},
                   "swatch": {{ "color": "#6b8f3a", "size": [64, 64] }} }},
                {{ "id": 3, "name": "water", "style": "water", "placement": "tile",
                   "menu": "terrain", "archetype": {{ "kind": "water" }},
                   "swatch": {{ "color": "#3c7bbd", "size": [64, 64], "frames": 4 }} }}
                {extra_tiles}
              ]
            }}"##
        )
    }

    #[test]
    fn embedded_catalog_is_valid() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        assert_eq!(catalog.player(), TileId(0));
        assert_eq!(catalog.sky(), TileId(1));
        assert_eq!(catalog.first_selectable(), TileId(2));
        assert_eq!(catalog.last_selectable(), TileId(18));
        assert_eq!(catalog.style(TileId(2)), Ok(Style::Terrain));
        assert_eq!(catalog.style(TileId(9)), Ok(Style::Enemy));
        assert_eq!(
            catalog.archetype(TileId(10)),
            Ok(Archetype::Shell {
                facing: Facing::Right
            })
        );
        assert_eq!(catalog.menu_ids(MenuGroup::Coin).len(), 3);
        assert_eq!(catalog.menu_ids(MenuGroup::Palm).len(), 8);
    }

    #[test]
    fn right_foreground_palm_block_is_offset() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        match catalog.archetype(TileId(14)) {
            Ok(Archetype::PalmFg {
                variant,
                block_offset,
                block_size,
            }) => {
                assert_eq!(variant, PalmVariant::Right);
                assert_eq!(block_offset, [50.0, 0.0]);
                assert_eq!(block_size, [76.0, 50.0]);
            }
            other => panic!("unexpected archetype {other:?}"),
        }
    }

    #[test]
    fn unknown_id_is_an_error() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        assert_eq!(
            catalog.style(TileId(99)),
            Err(CatalogError::UnknownId(TileId(99)))
        );
    }

    #[test]
    fn clamp_selection_does_not_wrap() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        assert_eq!(catalog.clamp_selection(1), TileId(2));
        assert_eq!(catalog.clamp_selection(-40), TileId(2));
        assert_eq!(catalog.clamp_selection(19), TileId(18));
        assert_eq!(catalog.clamp_selection(7), TileId(7));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = minimal_json(
            r##", { "id": 3, "name": "water2", "style": "water", "placement": "tile",
                   "archetype": { "kind": "water" },
                   "swatch": { "color": "#3c7bbd", "size": [64, 64] } }"##,
            2,
            3,
        );
        let err = Catalog::from_json_str(&json).expect_err("duplicate id should fail");
        assert!(err.to_string().contains("duplicate tile id"), "{err}");
    }

    #[test]
    fn rejects_empty_selectable_range() {
        let err = Catalog::from_json_str(&minimal_json("", 3, 2)).expect_err("empty range");
        assert!(err.to_string().contains("selectable range is empty"), "{err}");
    }

    #[test]
    fn rejects_range_with_undefined_ids() {
        let err = Catalog::from_json_str(&minimal_json("", 2, 5)).expect_err("gap in range");
        assert!(err.to_string().contains("is not defined"), "{err}");
    }

    #[test]
    fn rejects_missing_player() {
        let json = minimal_json("", 2, 3).replace(r#""style": "player""#, r#""style": "sky""#);
        // The archetype no longer matches, which is reported first.
        assert!(Catalog::from_json_str(&json).is_err());

        let without_player = r##"{
          "version": "1.0",
          "selectable": { "first": 2, "last": 2 },
          "tiles": [
            { "id": 1, "name": "sky", "style": "sky", "placement": "object",
              "archetype": { "kind": "sky" },
              "swatch": { "color": "#ffffff", "size": [64, 64] } },
            { "id": 2, "name": "terrain", "style": "terrain", "placement": "tile",
              "archetype": { "kind": "terrain" },
              "swatch": { "color": "#6b8f3a", "size": [64, 64] } },
            { "id": 3, "name": "water", "style": "water", "placement": "tile",
              "archetype": { "kind": "water" },
              "swatch": { "color": "#3c7bbd", "size": [64, 64] } }
          ]
        }"##;
        let err = Catalog::from_json_str(without_player).expect_err("no player");
        assert!(err.to_string().contains("no Player tile"), "{err}");
    }

    #[test]
    fn rejects_style_placement_mismatch() {
        let json = minimal_json("", 2, 3).replace(
            r#""name": "terrain", "style": "terrain", "placement": "tile""#,
            r#""name": "terrain", "style": "terrain", "placement": "object""#,
        );
        let err = Catalog::from_json_str(&json).expect_err("terrain must be a tile");
        assert!(err.to_string().contains("placement"), "{err}");
    }

    #[test]
    fn load_or_embedded_falls_back_only_when_missing() {
        let missing = temp_file_path("missing");
        let catalog = Catalog::load_or_embedded(&missing).expect("fallback catalog");
        assert_eq!(catalog.len(), 19);

        let broken = temp_file_path("broken");
        fs::write(&broken, "{ not json").expect("failed to write temp catalog file");
        let err = Catalog::load_or_embedded(&broken).expect_err("malformed file is fatal");
        assert!(err.to_string().contains("failed to parse catalog JSON"), "{err}");
        let _ = fs::remove_file(broken);
    }

    #[test]
    fn minimal_catalog_loads_from_disk() {
        let path = temp_file_path("minimal");
        fs::write(&path, minimal_json("", 2, 3)).expect("failed to write temp catalog file");
        let catalog = Catalog::load_or_embedded(&path).expect("minimal catalog should load");
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(TileId(3)).map(|t| t.swatch.frames), Ok(4));
        let _ = fs::remove_file(path);
    }
}
