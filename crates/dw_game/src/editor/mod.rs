//! The level editor: a pannable, unbounded canvas painted with catalog ids.
//!
//! `Editor::update` runs one fixed step in a fixed order: commit, panning,
//! selection hotkeys, menu clicks, object drag, painting, erasing, then
//! animations and clouds. Drawing lives in `view`.

pub mod autotile;
pub mod canvas_object;
pub mod export;
pub mod grid;
pub mod menu;
pub mod view;

use crate::assets::AssetLibrary;
use crate::catalog::{Catalog, CatalogError, Placement, Style, TileId};
use crate::settings::{ANIMATION_SPEED, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::transition::Transition;
use autotile::refresh_neighborhood;
use canvas_object::{CanvasObject, DrawLayer};
use dw_core::{AnimationState, Cooldown, ImageRef, InputState, Key, MouseBtn};
use export::{export, ExportError};
use glam::{IVec2, Vec2};
use grid::{cell_at, CanvasGrid};
use menu::Menu;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct EditorConfig {
    /// Pixels the origin moves per wheel notch.
    pub wheel_step: f32,
    pub placement_cooldown: f32,
    pub cloud_interval: f32,
    pub startup_clouds: usize,
    /// Clouds drifting past this x are dropped.
    pub cloud_despawn_x: f32,
    pub seed: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            wheel_step: 50.0,
            placement_cooldown: 0.4,
            cloud_interval: 2.0,
            startup_clouds: 20,
            cloud_despawn_x: -400.0,
            seed: 0x0d71_f700,
        }
    }
}

/// Decorative cloud above the horizon. `pos.y` is the height above the
/// horizon line, so clouds follow the sky handle.
#[derive(Debug, Clone)]
pub struct EditorCloud {
    pub image: ImageRef,
    pub pos: Vec2,
    pub speed: f32,
}

pub struct Editor {
    config: EditorConfig,
    grid: CanvasGrid,
    origin: Vec2,
    pan_active: bool,
    pan_offset: Vec2,
    selection: TileId,
    last_painted_cell: Option<IVec2>,
    dragging: Option<usize>,
    placement_cooldown: Cooldown,
    objects: Vec<CanvasObject>,
    menu: Menu,
    animations: HashMap<TileId, AnimationState>,
    clouds: Vec<EditorCloud>,
    cloud_spawn: Cooldown,
    rng: StdRng,
}

impl Editor {
    pub fn new(
        catalog: &Catalog,
        assets: &AssetLibrary,
        config: EditorConfig,
    ) -> Result<Self, CatalogError> {
        let viewport = Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT);
        let origin = Vec2::ZERO;

        let player = catalog.player();
        let sky = catalog.sky();
        let objects = vec![
            CanvasObject::new(
                player,
                Vec2::new(200.0, WINDOW_HEIGHT / 2.0),
                assets.preview(player)?.size(),
                origin,
                DrawLayer::Foreground,
                false,
            ),
            CanvasObject::new(
                sky,
                viewport / 2.0,
                assets.preview(sky)?.size(),
                origin,
                DrawLayer::Foreground,
                false,
            ),
        ];

        let animations = catalog
            .iter()
            .map(|info| (info.id, AnimationState::looping(ANIMATION_SPEED)))
            .collect();

        let mut editor = Self {
            config,
            grid: CanvasGrid::new(),
            origin,
            pan_active: false,
            pan_offset: Vec2::ZERO,
            selection: catalog.first_selectable(),
            last_painted_cell: None,
            dragging: None,
            placement_cooldown: Cooldown::new(config.placement_cooldown),
            objects,
            menu: Menu::new(catalog, viewport),
            animations,
            clouds: Vec::new(),
            cloud_spawn: Cooldown::new(config.cloud_interval),
            rng: StdRng::seed_from_u64(config.seed),
        };
        for _ in 0..config.startup_clouds {
            let pos = Vec2::new(
                editor.rng.gen_range(0.0..WINDOW_WIDTH),
                editor.rng.gen_range(0.0..WINDOW_HEIGHT),
            );
            editor.spawn_cloud(assets, pos);
        }
        editor.cloud_spawn.arm();
        Ok(editor)
    }

    pub fn update(
        &mut self,
        dt: f32,
        input: &InputState,
        catalog: &Catalog,
        assets: &AssetLibrary,
    ) -> Result<Option<Transition>, CatalogError> {
        self.placement_cooldown.tick(dt);
        let cursor = input.mouse_position;
        let over_menu = self.menu.contains(cursor);

        if input.is_just_pressed(Key::Return) {
            match export(&self.grid, &self.objects, catalog, |key| {
                assets.has_land_graphic(key)
            }) {
                Ok(blueprint) => return Ok(Some(Transition::Play(blueprint))),
                Err(ExportError::EmptyCanvas) => {
                    log::warn!("Nothing to play yet, the canvas is empty");
                }
                Err(ExportError::Catalog(err)) => return Err(err),
            }
        }

        self.pan_input(input, cursor, over_menu);
        self.selection_hotkeys(input, catalog);
        self.menu_click(input, cursor, over_menu);
        self.object_drag(input, cursor, over_menu);
        self.canvas_add(input, cursor, over_menu, catalog, assets)?;
        self.canvas_remove(input, cursor, over_menu, catalog)?;
        self.animate(dt, assets)?;
        self.update_clouds(dt, assets);
        Ok(None)
    }

    fn pan_input(&mut self, input: &InputState, cursor: Vec2, over_menu: bool) {
        let before = self.origin;

        if input.is_mouse_just_pressed(MouseBtn::Middle) && !over_menu {
            self.pan_active = true;
            self.pan_offset = cursor - self.origin;
        }
        if !input.is_mouse_held(MouseBtn::Middle) {
            self.pan_active = false;
        }

        let wheel = input.wheel_delta();
        if wheel != 0.0 {
            if input.is_held(Key::Ctrl) {
                self.origin.x -= wheel * self.config.wheel_step;
            } else {
                self.origin.y -= wheel * self.config.wheel_step;
            }
        }

        if self.pan_active {
            self.origin = cursor - self.pan_offset;
        }

        if self.origin != before {
            for object in &mut self.objects {
                object.pan(self.origin);
            }
        }
    }

    fn selection_hotkeys(&mut self, input: &InputState, catalog: &Catalog) {
        let current = i32::from(self.selection.0);
        if input.is_just_pressed(Key::Right) {
            self.select(catalog.clamp_selection(current + 1));
        }
        if input.is_just_pressed(Key::Left) {
            self.select(catalog.clamp_selection(current - 1));
        }
    }

    fn menu_click(&mut self, input: &InputState, cursor: Vec2, over_menu: bool) {
        if !over_menu {
            return;
        }
        for button in [MouseBtn::Left, MouseBtn::Right, MouseBtn::Middle] {
            if input.is_mouse_just_pressed(button) {
                if let Some(id) = self.menu.click(cursor, button) {
                    self.select(id);
                }
            }
        }
    }

    fn object_drag(&mut self, input: &InputState, cursor: Vec2, over_menu: bool) {
        if input.is_mouse_just_pressed(MouseBtn::Left) && !over_menu && self.dragging.is_none() {
            if let Some(index) = self.topmost_object_at(cursor, |_| true) {
                self.objects[index].start_drag(cursor);
                self.dragging = Some(index);
            }
        }

        if let Some(index) = self.dragging {
            let object = &mut self.objects[index];
            object.drag(cursor);
            if !input.is_mouse_held(MouseBtn::Left) {
                object.end_drag(self.origin);
                log::debug!(
                    "Moved {} to ({:.0}, {:.0})",
                    object.id,
                    object.distance_to_origin.x,
                    object.distance_to_origin.y
                );
                self.dragging = None;
            }
        }
    }

    fn canvas_add(
        &mut self,
        input: &InputState,
        cursor: Vec2,
        over_menu: bool,
        catalog: &Catalog,
        assets: &AssetLibrary,
    ) -> Result<(), CatalogError> {
        if input.is_mouse_just_released(MouseBtn::Left) {
            self.last_painted_cell = None;
        }
        if !input.is_mouse_held(MouseBtn::Left) || over_menu || self.dragging.is_some() {
            return Ok(());
        }

        match catalog.placement(self.selection)? {
            Placement::Tile => {
                let cell = cell_at(cursor - self.origin);
                if self.last_painted_cell != Some(cell) {
                    self.grid.add(cell, self.selection, catalog)?;
                    refresh_neighborhood(&mut self.grid, cell);
                    self.last_painted_cell = Some(cell);
                    log::debug!("Painted {} at ({}, {})", self.selection, cell.x, cell.y);
                }
            }
            Placement::Object => {
                if !self.placement_cooldown.is_active() {
                    let layer = if catalog.style(self.selection)? == Style::PalmBg {
                        DrawLayer::Background
                    } else {
                        DrawLayer::Foreground
                    };
                    let size = assets.preview(self.selection)?.size();
                    self.objects.push(CanvasObject::new(
                        self.selection,
                        cursor,
                        size,
                        self.origin,
                        layer,
                        true,
                    ));
                    self.placement_cooldown.arm();
                }
            }
        }
        Ok(())
    }

    fn canvas_remove(
        &mut self,
        input: &InputState,
        cursor: Vec2,
        over_menu: bool,
        catalog: &Catalog,
    ) -> Result<(), CatalogError> {
        if !input.is_mouse_held(MouseBtn::Right) || over_menu || self.dragging.is_some() {
            return Ok(());
        }

        if let Some(index) = self.topmost_object_at(cursor, |object| object.removable) {
            let removed = self.objects.remove(index);
            log::debug!("Erased object {}", removed.id);
        }

        let cell = cell_at(cursor - self.origin);
        if self.grid.contains(cell) {
            self.grid.remove(cell, self.selection, catalog)?;
            refresh_neighborhood(&mut self.grid, cell);
        }
        Ok(())
    }

    fn animate(&mut self, dt: f32, assets: &AssetLibrary) -> Result<(), CatalogError> {
        for (id, animation) in &mut self.animations {
            animation.tick(dt, assets.frames(*id)?.len());
        }
        for object in &mut self.objects {
            object.tick(dt, assets.frames(object.id)?.len());
        }
        Ok(())
    }

    fn update_clouds(&mut self, dt: f32, assets: &AssetLibrary) {
        for cloud in &mut self.clouds {
            cloud.pos.x -= cloud.speed * dt;
        }
        let despawn_x = self.config.cloud_despawn_x;
        self.clouds.retain(|cloud| cloud.pos.x > despawn_x);

        self.cloud_spawn.tick(dt);
        if !self.cloud_spawn.is_active() {
            let pos = Vec2::new(
                WINDOW_WIDTH + self.rng.gen_range(50.0..100.0),
                self.rng.gen_range(0.0..WINDOW_HEIGHT),
            );
            self.spawn_cloud(assets, pos);
            self.cloud_spawn.arm();
        }
    }

    fn spawn_cloud(&mut self, assets: &AssetLibrary, pos: Vec2) {
        let Some(base) = assets.clouds().choose(&mut self.rng) else {
            return;
        };
        let image = if self.rng.gen_range(0..4) < 2 {
            base.scaled(2).into_ref()
        } else {
            base.clone()
        };
        let speed = self.rng.gen_range(20.0..50.0);
        self.clouds.push(EditorCloud { image, pos, speed });
    }

    fn select(&mut self, id: TileId) {
        if id != self.selection {
            self.selection = id;
            self.last_painted_cell = None;
        }
    }

    /// Topmost object under `point` in draw order (foreground above
    /// background, later above earlier).
    fn topmost_object_at(
        &self,
        point: Vec2,
        accept: impl Fn(&CanvasObject) -> bool,
    ) -> Option<usize> {
        [DrawLayer::Foreground, DrawLayer::Background]
            .into_iter()
            .find_map(|layer| {
                self.objects
                    .iter()
                    .enumerate()
                    .rev()
                    .find(|&(_, o)| o.layer == layer && o.contains(point) && accept(o))
                    .map(|(i, _)| i)
            })
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn grid(&self) -> &CanvasGrid {
        &self.grid
    }

    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn selection(&self) -> TileId {
        self.selection
    }

    pub fn clouds(&self) -> &[EditorCloud] {
        &self.clouds
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Screen y of the horizon, taken from the sky handle.
    pub fn horizon_y(&self, catalog: &Catalog) -> Option<f32> {
        let sky = catalog.sky();
        self.objects
            .iter()
            .find(|o| o.id == sky)
            .map(|o| o.rect.center().y)
    }

    pub fn hovered_object(&self, point: Vec2) -> Option<&CanvasObject> {
        self.topmost_object_at(point, |_| true)
            .map(|index| &self.objects[index])
    }

    /// Current editor frame of an id's shared animation.
    pub fn frame_index(&self, id: TileId, frame_count: usize) -> usize {
        self.animations
            .get(&id)
            .map_or(0, |animation| animation.frame_index(frame_count))
    }
}
