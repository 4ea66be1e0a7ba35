//! Placeholder asset library.
//!
//! Nothing is decoded from disk: every image is synthesised from the catalog
//! swatches as a flat colour with an alpha mask. Animations get one image per
//! frame with a slight shade shift so frame changes stay visible. The
//! simulation only ever sees sizes and masks, so these stand in for real art
//! without changing any behaviour.

use crate::catalog::{Catalog, CatalogError, Facing, Style, Swatch, TileId};
use crate::editor::autotile::{canonical_signatures, PLACEHOLDER_KEY};
use crate::level::player::PlayerState;
use dw_core::{Color, Image, ImageRef, Mask};
use std::collections::HashMap;

const FRAME_SHADE_STEP: f32 = 0.04;
const THUMB_MAX: u32 = 64;

pub struct AssetLibrary {
    land: HashMap<String, ImageRef>,
    water_top: Vec<ImageRef>,
    water_bottom: ImageRef,
    frames: HashMap<TileId, Vec<ImageRef>>,
    thumbnails: HashMap<TileId, ImageRef>,
    player: HashMap<(PlayerState, Facing), Vec<ImageRef>>,
    tooth: HashMap<Facing, Vec<ImageRef>>,
    shell_idle: HashMap<Facing, Vec<ImageRef>>,
    shell_attack: HashMap<Facing, Vec<ImageRef>>,
    pearl: ImageRef,
    particle: Vec<ImageRef>,
    clouds: Vec<ImageRef>,
}

impl AssetLibrary {
    pub fn placeholder(catalog: &Catalog) -> Self {
        let mut frames = HashMap::new();
        let mut thumbnails = HashMap::new();
        for info in catalog.iter() {
            let mask = swatch_mask(info.style, &info.swatch);
            frames.insert(info.id, animate(&info.swatch, &mask));
            thumbnails.insert(info.id, thumbnail(info.style, &info.swatch));
        }

        let (terrain_color, water_color) = (
            swatch_color(catalog, Style::Terrain, Color::hex(0x7a9a3c)),
            swatch_color(catalog, Style::Water, Color::hex(0x4f8fc0)),
        );

        let mut land = HashMap::new();
        for signature in canonical_signatures() {
            // Fewer neighbours reads as a lighter, more exposed tile.
            let exposed = 8 - signature.directions().count();
            let color = terrain_color.shade(0.02 * exposed as f32);
            land.insert(signature.code(), Image::solid(64, 64, color).into_ref());
        }
        land.insert(
            PLACEHOLDER_KEY.to_string(),
            Image::solid(64, 64, terrain_color.shade(-0.05)).into_ref(),
        );

        let water_swatch = Swatch {
            color: water_color,
            width: 64,
            height: 64,
            frames: 4,
        };
        let water_top = animate(&water_swatch, &Mask::full(64, 64));
        let water_bottom = Image::solid(64, 64, water_color.shade(-0.08)).into_ref();

        let player_swatch = catalog
            .get(catalog.player())
            .map(|info| info.swatch.clone())
            .unwrap_or(Swatch {
                color: Color::hex(0xe05a47),
                width: 96,
                height: 64,
                frames: 4,
            });
        let player = player_frames(&player_swatch);

        let tooth_right = animate(
            &Swatch {
                color: Color::hex(0xb35c8f),
                width: 56,
                height: 40,
                frames: 6,
            },
            &Mask::ellipse(56, 40, 2),
        );
        let tooth = both_facings(tooth_right);

        // Shell art faces left; right-facing frames are mirrored.
        let shell_color = Color::hex(0xd98e5f);
        let shell_mask = shell_mask(72, 52);
        let shell_idle_left = animate(
            &Swatch {
                color: shell_color,
                width: 72,
                height: 52,
                frames: 1,
            },
            &shell_mask,
        );
        let shell_attack_left = animate(
            &Swatch {
                color: shell_color.shade(0.1),
                width: 72,
                height: 52,
                frames: 6,
            },
            &shell_mask,
        );

        let pearl = Image::with_mask(Color::hex(0xf0eef5), Mask::ellipse(12, 12, 0)).into_ref();
        let particle = (0..4)
            .map(|i| {
                let size = 16 + i * 8;
                Image::with_mask(
                    Color::WHITE.shade(-0.05 * i as f32),
                    Mask::ellipse(size, size, i * 2),
                )
                .into_ref()
            })
            .collect();
        let clouds = [(120, 40), (160, 50), (90, 36)]
            .into_iter()
            .map(|(w, h)| Image::with_mask(Color::WHITE, Mask::ellipse(w, h, 0)).into_ref())
            .collect();

        log::info!(
            "Placeholder assets ready: {} land tiles, {} tile ids",
            land.len(),
            frames.len()
        );

        Self {
            land,
            water_top,
            water_bottom,
            frames,
            thumbnails,
            player,
            tooth,
            shell_idle: mirror_right(shell_idle_left),
            shell_attack: mirror_right(shell_attack_left),
            pearl,
            particle,
            clouds,
        }
    }

    pub fn has_land_graphic(&self, key: &str) -> bool {
        self.land.contains_key(key)
    }

    /// Land tile for a terrain key, or the placeholder when none exists.
    pub fn land(&self, key: &str) -> Option<&ImageRef> {
        self.land.get(key).or_else(|| self.land.get(PLACEHOLDER_KEY))
    }

    pub fn water_top(&self) -> &[ImageRef] {
        &self.water_top
    }

    pub fn water_bottom(&self) -> &ImageRef {
        &self.water_bottom
    }

    /// Editor/level animation frames for a catalog id.
    pub fn frames(&self, id: TileId) -> Result<&[ImageRef], CatalogError> {
        self.frames
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(CatalogError::UnknownId(id))
    }

    pub fn preview(&self, id: TileId) -> Result<&ImageRef, CatalogError> {
        self.frames(id)?
            .first()
            .ok_or(CatalogError::UnknownId(id))
    }

    pub fn thumbnail(&self, id: TileId) -> Option<&ImageRef> {
        self.thumbnails.get(&id)
    }

    pub fn player(&self, state: PlayerState, facing: Facing) -> &[ImageRef] {
        self.player
            .get(&(state, facing))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn tooth(&self, facing: Facing) -> &[ImageRef] {
        self.tooth.get(&facing).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn shell_idle(&self, facing: Facing) -> &[ImageRef] {
        self.shell_idle
            .get(&facing)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn shell_attack(&self, facing: Facing) -> &[ImageRef] {
        self.shell_attack
            .get(&facing)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn pearl(&self) -> &ImageRef {
        &self.pearl
    }

    pub fn particle(&self) -> &[ImageRef] {
        &self.particle
    }

    pub fn clouds(&self) -> &[ImageRef] {
        &self.clouds
    }
}

fn swatch_color(catalog: &Catalog, style: Style, fallback: Color) -> Color {
    catalog
        .first_with_style(style)
        .and_then(|id| catalog.get(id).ok())
        .map(|info| info.swatch.color)
        .unwrap_or(fallback)
}

fn swatch_mask(style: Style, swatch: &Swatch) -> Mask {
    let (w, h) = (swatch.width, swatch.height);
    match style {
        Style::Terrain | Style::Water | Style::Sky => Mask::full(w, h),
        Style::Coin | Style::Player => Mask::ellipse(w, h, 1),
        Style::Enemy if h <= 32 => spikes_mask(w, h),
        Style::Enemy => Mask::ellipse(w, h, 2),
        Style::PalmFg | Style::PalmBg => palm_mask(w, h),
    }
}

fn animate(swatch: &Swatch, mask: &Mask) -> Vec<ImageRef> {
    (0..swatch.frames)
        .map(|i| {
            Image::with_mask(swatch.color.shade(FRAME_SHADE_STEP * i as f32), mask.clone())
                .into_ref()
        })
        .collect()
}

fn thumbnail(style: Style, swatch: &Swatch) -> ImageRef {
    let w = swatch.width.min(THUMB_MAX);
    let h = swatch.height.min(THUMB_MAX);
    let mask = match style {
        Style::Terrain | Style::Water => Mask::full(w, h),
        _ => Mask::ellipse(w, h, 0),
    };
    Image::with_mask(swatch.color, mask).into_ref()
}

/// Row of triangular teeth, each 16 px wide, standing on the bottom edge.
fn spikes_mask(width: u32, height: u32) -> Mask {
    Mask::from_fn(width, height, |x, y| {
        let col = (x % 16) as i32;
        let peak = (col - 8).abs() * height as i32 / 8;
        y as i32 >= peak
    })
}

/// Trunk in the lower half, crown in the upper third.
fn palm_mask(width: u32, height: u32) -> Mask {
    let crown = Mask::ellipse(width, height / 2, 0);
    Mask::from_fn(width, height, |x, y| {
        let trunk = x >= width / 2 - 6 && x < width / 2 + 6 && y >= height / 3;
        trunk || (y < height / 2 && crown.get(x as i32, y as i32))
    })
}

/// Low dome: opaque below a half-ellipse arch.
fn shell_mask(width: u32, height: u32) -> Mask {
    Mask::from_fn(width, height, |x, y| {
        let dx = (x as f32 + 0.5 - width as f32 * 0.5) / (width as f32 * 0.5);
        let dy = (height as f32 - y as f32 - 0.5) / height as f32;
        dx * dx + dy * dy <= 1.0
    })
}

/// Player body: a 46 px wide column centred in the frame, so the sprite has
/// transparent side padding like the real art.
fn player_mask(width: u32, height: u32) -> Mask {
    let body = 46.min(width);
    let left = (width - body) / 2;
    Mask::from_fn(width, height, |x, y| {
        x >= left && x < left + body && y >= 4
    })
}

fn player_frames(swatch: &Swatch) -> HashMap<(PlayerState, Facing), Vec<ImageRef>> {
    let mask = player_mask(swatch.width, swatch.height);
    let mut frames = HashMap::new();
    for (state, shade) in [
        (PlayerState::Idle, 0.0),
        (PlayerState::Run, 0.06),
        (PlayerState::Jump, 0.12),
        (PlayerState::Fall, -0.08),
    ] {
        let right = animate(
            &Swatch {
                color: swatch.color.shade(shade),
                ..swatch.clone()
            },
            &mask,
        );
        let left = right.iter().map(|f| f.flipped_h().into_ref()).collect();
        frames.insert((state, Facing::Right), right);
        frames.insert((state, Facing::Left), left);
    }
    frames
}

fn both_facings(right: Vec<ImageRef>) -> HashMap<Facing, Vec<ImageRef>> {
    let left = right.iter().map(|f| f.flipped_h().into_ref()).collect();
    HashMap::from([(Facing::Right, right), (Facing::Left, left)])
}

fn mirror_right(left: Vec<ImageRef>) -> HashMap<Facing, Vec<ImageRef>> {
    let right = left.iter().map(|f| f.flipped_h().into_ref()).collect();
    HashMap::from([(Facing::Left, left), (Facing::Right, right)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> AssetLibrary {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        AssetLibrary::placeholder(&catalog)
    }

    #[test]
    fn land_covers_canonical_layouts_and_placeholder() {
        let assets = library();
        assert!(assets.has_land_graphic(PLACEHOLDER_KEY));
        assert!(assets.has_land_graphic("CDE"));
        assert!(assets.has_land_graphic(""));
        // NE without N and E is not a drawable layout.
        assert!(!assets.has_land_graphic("B"));
        assert!(assets.land("B").is_some());
    }

    #[test]
    fn every_catalog_id_has_frames() {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        let assets = AssetLibrary::placeholder(&catalog);
        for info in catalog.iter() {
            let frames = assets.frames(info.id).expect("frames for id");
            assert_eq!(frames.len(), info.swatch.frames, "{}", info.name);
            assert!(assets.thumbnail(info.id).is_some());
        }
        assert!(assets.frames(TileId(99)).is_err());
    }

    #[test]
    fn player_frames_have_transparent_padding() {
        let assets = library();
        let frame = &assets.player(PlayerState::Idle, Facing::Right)[0];
        assert!(!frame.mask().get(0, 32));
        assert!(frame.mask().get(48, 32));
        assert_eq!(assets.player(PlayerState::Fall, Facing::Left).len(), 4);
    }

    #[test]
    fn shell_attack_has_a_fire_frame() {
        let assets = library();
        assert!(assets.shell_attack(Facing::Left).len() > 2);
        assert_eq!(
            assets.shell_attack(Facing::Right).len(),
            assets.shell_attack(Facing::Left).len()
        );
    }
}
