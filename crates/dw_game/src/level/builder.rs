//! Turns an exported blueprint into a live level.
//!
//! Building runs in two passes. The first walks the blueprint layers in
//! export order and spawns one entity per payload. The second resolves
//! cross-references that only make sense once everything exists: shells
//! learn the player handle, teeth with no ground under them are dropped, and
//! the cloud band is sized from the terrain extent.

use super::enemies::{stands_on_ground, Shell, Tooth};
use super::entity::{Arena, Behaviour, Entity, Flags, Handle, Layer, Sprite};
use super::player::{PlayerBody, PlayerState};
use super::{Level, LevelConfig, Limits};
use crate::assets::AssetLibrary;
use crate::catalog::{Archetype, Catalog, Facing, TileId};
use crate::editor::export::{Blueprint, Payload, Position};
use crate::settings::{ANIMATION_SPEED, TILE, WINDOW_WIDTH};
use dw_core::{Cooldown, ImageRef, Rect};
use dw_render::ScrollCamera;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("the level has no player")]
    MissingPlayer,
    #[error("the level has more than one player")]
    DuplicatePlayer,
    #[error("tile id {0:?} cannot be built")]
    UnknownId(TileId),
    #[error("no graphic for terrain '{0}'")]
    MissingGraphic(String),
}

struct Builder<'a> {
    catalog: &'a Catalog,
    assets: &'a AssetLibrary,
    config: LevelConfig,
    arena: Arena,
    rng: StdRng,
    player: Option<Handle>,
    horizon_y: Option<f32>,
    terrain_right: Option<f32>,
    shells: Vec<Handle>,
    teeth: Vec<Handle>,
}

pub fn build(
    blueprint: &Blueprint,
    catalog: &Catalog,
    assets: &AssetLibrary,
    config: LevelConfig,
) -> Result<Level, BuildError> {
    let mut builder = Builder {
        catalog,
        assets,
        config,
        arena: Arena::new(),
        rng: StdRng::seed_from_u64(config.seed),
        player: None,
        horizon_y: None,
        terrain_right: None,
        shells: Vec::new(),
        teeth: Vec::new(),
    };

    for (_, cells) in blueprint.iter() {
        for (pos, payload) in cells {
            builder.spawn_payload(*pos, payload)?;
        }
    }

    builder.into_level()
}

fn pos_vec(pos: Position) -> Vec2 {
    Vec2::new(pos.0 as f32, pos.1 as f32)
}

fn first_size(frames: &[ImageRef]) -> Vec2 {
    frames.first().map_or(Vec2::ZERO, |frame| frame.size())
}

impl<'a> Builder<'a> {
    fn spawn_payload(&mut self, pos: Position, payload: &Payload) -> Result<(), BuildError> {
        let at = pos_vec(pos);
        let tile = Vec2::splat(TILE);
        match payload {
            Payload::Terrain(key) => {
                let image = self
                    .assets
                    .land(key)
                    .ok_or_else(|| BuildError::MissingGraphic(key.clone()))?;
                self.arena.spawn(
                    Entity::new(Rect::from_pos_size(at, tile), Layer::Main, Sprite::still(image.clone()))
                        .with_flags(Flags::COLLIDABLE),
                );
                self.terrain_right = Some(self.terrain_right.map_or(at.x, |right| right.max(at.x)));
            }
            Payload::WaterTop => {
                let sprite = Sprite::looping(self.assets.water_top().to_vec(), ANIMATION_SPEED);
                self.arena
                    .spawn(Entity::new(Rect::from_pos_size(at, tile), Layer::Water, sprite));
            }
            Payload::WaterBottom => {
                let sprite = Sprite::still(self.assets.water_bottom().clone());
                self.arena
                    .spawn(Entity::new(Rect::from_pos_size(at, tile), Layer::Water, sprite));
            }
            Payload::Tile(id) => self.spawn_tile(*id, at)?,
        }
        Ok(())
    }

    fn spawn_tile(&mut self, id: TileId, at: Vec2) -> Result<(), BuildError> {
        let archetype = self
            .catalog
            .archetype(id)
            .map_err(|_| BuildError::UnknownId(id))?;
        // Enemies are anchored on the bottom of the cell they were painted in.
        let cell_bottom = at.y + TILE;

        match archetype {
            Archetype::Terrain | Archetype::Water => return Err(BuildError::UnknownId(id)),
            Archetype::Sky => {
                let height = self.frames(id)?.first().map_or(0.0, |frame| frame.size().y);
                self.horizon_y = Some(at.y + height * 0.5);
            }
            Archetype::Player => {
                if self.player.is_some() {
                    return Err(BuildError::DuplicatePlayer);
                }
                let frames = self.assets.player(PlayerState::Idle, Facing::Right);
                let rect = Rect::from_pos_size(at, first_size(frames));
                let entity = Entity::new(
                    rect,
                    Layer::Main,
                    Sprite::looping(frames.to_vec(), ANIMATION_SPEED),
                )
                .with_behaviour(Behaviour::Player(PlayerBody::new(self.config.player)));
                self.player = Some(self.arena.spawn(entity));
            }
            Archetype::Coin { coin } => {
                let frames = self.frames(id)?;
                let rect = Rect::from_center(at, first_size(frames));
                let entity = Entity::new(
                    rect,
                    Layer::Main,
                    Sprite::looping(frames.to_vec(), ANIMATION_SPEED),
                )
                .with_flags(Flags {
                    coin: Some(coin),
                    ..Flags::NONE
                });
                self.arena.spawn(entity);
            }
            Archetype::Spikes => {
                let frames = self.frames(id)?;
                let midbottom = Vec2::new(at.x + TILE * 0.5, cell_bottom);
                let rect = Rect::from_midbottom(midbottom, first_size(frames));
                let entity = Entity::new(
                    rect,
                    Layer::Main,
                    Sprite::looping(frames.to_vec(), ANIMATION_SPEED),
                )
                .with_flags(Flags::DAMAGING);
                self.arena.spawn(entity);
            }
            Archetype::Tooth => {
                let facing = if self.rng.gen_bool(0.5) {
                    Facing::Right
                } else {
                    Facing::Left
                };
                let frames = self.assets.tooth(facing);
                let mut rect = Rect::from_pos_size(at, first_size(frames));
                rect.set_bottom(cell_bottom);
                let entity = Entity::new(
                    rect,
                    Layer::Main,
                    Sprite::looping(frames.to_vec(), ANIMATION_SPEED),
                )
                .with_flags(Flags::DAMAGING)
                .with_behaviour(Behaviour::Tooth(Tooth::new(facing, self.config.enemies.tooth_speed)));
                let handle = self.arena.spawn(entity);
                self.teeth.push(handle);
            }
            Archetype::Shell { facing } => {
                let frames = self.assets.shell_idle(facing);
                let mut rect = Rect::from_pos_size(at, first_size(frames));
                rect.set_bottom(cell_bottom);
                let entity = Entity::new(
                    rect,
                    Layer::Main,
                    Sprite::looping(frames.to_vec(), ANIMATION_SPEED),
                )
                .with_flags(Flags::COLLIDABLE)
                .with_behaviour(Behaviour::Shell(Shell::new(facing, &self.config.enemies)));
                let handle = self.arena.spawn(entity);
                self.shells.push(handle);
            }
            Archetype::PalmFg {
                block_offset,
                block_size,
                ..
            } => {
                let frames = self.frames(id)?;
                let rect = Rect::from_pos_size(at, first_size(frames));
                self.arena.spawn(Entity::new(
                    rect,
                    Layer::Main,
                    Sprite::looping(frames.to_vec(), ANIMATION_SPEED),
                ));
                let block = Rect::from_pos_size(
                    at + Vec2::from(block_offset),
                    Vec2::from(block_size),
                );
                self.arena.spawn(
                    Entity::new(block, Layer::Main, Sprite::hidden()).with_flags(Flags::COLLIDABLE),
                );
            }
            Archetype::PalmBg { .. } => {
                let frames = self.frames(id)?;
                let rect = Rect::from_pos_size(at, first_size(frames));
                self.arena.spawn(Entity::new(
                    rect,
                    Layer::Background,
                    Sprite::looping(frames.to_vec(), ANIMATION_SPEED),
                ));
            }
        }
        Ok(())
    }

    fn frames(&self, id: TileId) -> Result<&'a [ImageRef], BuildError> {
        self.assets.frames(id).map_err(|_| BuildError::UnknownId(id))
    }

    fn into_level(mut self) -> Result<Level, BuildError> {
        let player = self.player.ok_or(BuildError::MissingPlayer)?;

        for handle in &self.shells {
            if let Some(Entity {
                behaviour: Behaviour::Shell(shell),
                ..
            }) = self.arena.get_mut(*handle)
            {
                shell.player = Some(player);
            }
        }

        let colliders = self.arena.collidable_rects();
        for handle in &self.teeth {
            let floating = self
                .arena
                .get(*handle)
                .is_some_and(|tooth| !stands_on_ground(tooth.rect, &colliders));
            if floating {
                log::debug!("Removing a tooth with no ground below it");
                self.arena.despawn(*handle);
            }
        }

        let limits = Limits {
            left: -WINDOW_WIDTH,
            right: self.terrain_right.unwrap_or(0.0) + self.config.cloud_margin,
        };
        let mut cloud_spawn = Cooldown::new(self.config.cloud_interval);
        cloud_spawn.arm();

        let mut level = Level {
            arena: self.arena,
            player,
            horizon_y: self.horizon_y,
            limits,
            camera: ScrollCamera::new(Level::viewport()),
            cloud_spawn,
            rng: self.rng,
            config: self.config,
        };
        for _ in 0..level.config.startup_clouds {
            let x = level.rng.gen_range(limits.left..limits.right);
            level.spawn_cloud(x, self.assets);
        }

        log::info!(
            "Built level: {} entities, clouds between {} and {}",
            level.arena.len(),
            limits.left,
            limits.right
        );
        Ok(level)
    }
}
