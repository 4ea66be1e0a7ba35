//! Compile-time constants shared by the editor and the level.

use dw_core::Color;

pub const TILE_SIZE: i32 = 64;
pub const TILE: f32 = TILE_SIZE as f32;

pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 720.0;

pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Frames per second for every looping sprite animation.
pub const ANIMATION_SPEED: f32 = 8.0;

pub const CATALOG_PATH: &str = "assets/catalog.json";

pub const SKY_COLOR: Color = Color::hex(0xddc6a1);
pub const SEA_COLOR: Color = Color::hex(0x92a9ce);
pub const HORIZON_COLOR: Color = Color::hex(0xf5f1de);
pub const HORIZON_TOP_COLOR: Color = Color::hex(0xd1aa9d);
pub const LINE_COLOR: Color = Color::rgba(0, 0, 0, 30);
pub const BUTTON_BG_COLOR: Color = Color::hex(0x33323d);
pub const BUTTON_LINE_COLOR: Color = Color::hex(0xf5f1de);
