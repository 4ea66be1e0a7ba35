//! The playable level: an entity arena stepped once per fixed tick.
//!
//! Tick order: cloud spawning, every entity's own update (player physics,
//! enemy brains, pearls, clouds, particles, plain animation), then coin
//! pickups, then damage. The camera follows the player afterwards.

pub mod builder;
pub mod enemies;
pub mod entity;
pub mod player;
pub mod view;

use crate::assets::AssetLibrary;
use crate::catalog::CoinKind;
use crate::settings::{ANIMATION_SPEED, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::transition::Transition;
use dw_core::{AnimationStep, Cooldown, InputState, Key, Rect};
use dw_render::ScrollCamera;
use enemies::{EnemyConfig, Pearl, PearlShot};
use entity::{Arena, Behaviour, Entity, Flags, Handle, Layer, Sprite};
use glam::Vec2;
use player::{PlayerBody, PlayerConfig, PlayerInput};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub seed: u64,
    pub player: PlayerConfig,
    pub enemies: EnemyConfig,
    pub cloud_interval: f32,
    pub startup_clouds: usize,
    /// Clouds spawn this far beyond the rightmost terrain.
    pub cloud_margin: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            seed: 0x0d71_f700,
            player: PlayerConfig::default(),
            enemies: EnemyConfig::default(),
            cloud_interval: 2.0,
            startup_clouds: 40,
            cloud_margin: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    CoinCollected(CoinKind),
    PlayerDamaged,
    PearlFired,
}

/// Horizontal band clouds live in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub left: f32,
    pub right: f32,
}

pub struct Level {
    arena: Arena,
    player: Handle,
    horizon_y: Option<f32>,
    limits: Limits,
    camera: ScrollCamera,
    cloud_spawn: Cooldown,
    rng: StdRng,
    config: LevelConfig,
}

impl Level {
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputState,
        assets: &AssetLibrary,
    ) -> (Vec<LevelEvent>, Option<Transition>) {
        if input.is_just_pressed(Key::Escape) {
            return (Vec::new(), Some(Transition::Edit));
        }
        let events = self.step(dt, PlayerInput::from_input(input), assets);
        (events, None)
    }

    /// One simulation tick with an explicit player intent.
    pub fn step(
        &mut self,
        dt: f32,
        player_input: PlayerInput,
        assets: &AssetLibrary,
    ) -> Vec<LevelEvent> {
        let mut events = Vec::new();

        self.cloud_spawn.tick(dt);
        if !self.cloud_spawn.is_active() {
            let x = self.limits.right + self.rng.gen_range(100.0..300.0);
            self.spawn_cloud(x, assets);
            self.cloud_spawn.arm();
        }

        self.update_entities(dt, player_input, assets, &mut events);
        self.collect_coins(assets, &mut events);
        self.apply_damage(&mut events);

        if let Some(player) = self.arena.get(self.player) {
            self.camera.follow(player.rect.center());
        }
        events
    }

    fn update_entities(
        &mut self,
        dt: f32,
        player_input: PlayerInput,
        assets: &AssetLibrary,
        events: &mut Vec<LevelEvent>,
    ) {
        let colliders = self.arena.collidable_rects();
        let mut shots: Vec<PearlShot> = Vec::new();
        let mut expired: Vec<Handle> = Vec::new();

        for handle in self.arena.handles() {
            let Some(mut entity) = self.arena.take(handle) else {
                continue;
            };
            let Entity {
                rect,
                sprite,
                behaviour,
                ..
            } = &mut entity;

            match behaviour {
                Behaviour::Static => {
                    sprite.tick(dt);
                }
                Behaviour::Player(body) => {
                    body.step(rect, player_input, dt, &colliders);
                    sprite.set_frames(assets.player(body.state(), body.facing));
                    sprite.tick(dt);
                    sprite.overlay = if body.is_invulnerable() {
                        sprite.frame().map(|frame| frame.silhouette().into_ref())
                    } else {
                        None
                    };
                }
                Behaviour::Tooth(tooth) => {
                    tooth.step(rect, dt, &colliders);
                    sprite.set_frames(assets.tooth(tooth.facing));
                    sprite.tick(dt);
                }
                Behaviour::Shell(shell) => {
                    let target = shell
                        .player
                        .and_then(|player| self.arena.get(player))
                        .map(|player| player.rect.center());
                    let facing = shell.facing;
                    if let Some(shot) = shell.step(
                        sprite,
                        rect.center(),
                        target,
                        dt,
                        assets.shell_idle(facing),
                        assets.shell_attack(facing),
                    ) {
                        shots.push(shot);
                    }
                }
                Behaviour::Pearl(pearl) => {
                    if !pearl.step(rect, dt) {
                        expired.push(handle);
                    }
                    sprite.tick(dt);
                }
                Behaviour::Cloud { speed } => {
                    rect.x -= *speed * dt;
                    if rect.x <= self.limits.left {
                        expired.push(handle);
                    }
                }
                Behaviour::Particle => {
                    if sprite.tick(dt) == AnimationStep::Finished {
                        expired.push(handle);
                    }
                }
            }
            self.arena.put_back(handle, entity);
        }

        for handle in expired {
            self.arena.despawn(handle);
        }
        for shot in shots {
            let pearl = assets.pearl();
            self.arena.spawn(
                Entity::new(
                    Rect::from_center(shot.center, pearl.size()),
                    Layer::Main,
                    Sprite::still(pearl.clone()),
                )
                .with_flags(Flags::DAMAGING)
                .with_behaviour(Behaviour::Pearl(Pearl::new(shot.facing, &self.config.enemies))),
            );
            events.push(LevelEvent::PearlFired);
        }
    }

    fn collect_coins(&mut self, assets: &AssetLibrary, events: &mut Vec<LevelEvent>) {
        let Some(player_rect) = self.arena.get(self.player).map(|p| p.rect) else {
            return;
        };
        let picked: Vec<(Handle, Vec2, CoinKind)> = self
            .arena
            .coins()
            .filter_map(|handle| {
                let coin = self.arena.get(handle)?;
                let kind = coin.flags.coin?;
                coin.rect
                    .overlaps(&player_rect)
                    .then(|| (handle, coin.rect.center(), kind))
            })
            .collect();

        for (handle, center, kind) in picked {
            self.arena.despawn(handle);
            let frames = assets.particle();
            let size = frames.first().map_or(Vec2::ZERO, |f| f.size());
            self.arena.spawn(
                Entity::new(
                    Rect::from_center(center, size),
                    Layer::Main,
                    Sprite::once(frames.to_vec(), ANIMATION_SPEED),
                )
                .with_behaviour(Behaviour::Particle),
            );
            log::debug!("Collected {kind:?} coin");
            events.push(LevelEvent::CoinCollected(kind));
        }
    }

    fn apply_damage(&mut self, events: &mut Vec<LevelEvent>) {
        let Some(player) = self.arena.get(self.player) else {
            return;
        };
        let Some(player_frame) = player.sprite.frame() else {
            return;
        };
        let hit = self.arena.damaging().any(|handle| {
            let Some(other) = self.arena.get(handle) else {
                return false;
            };
            let Some(frame) = other.sprite.frame() else {
                return false;
            };
            if !other.rect.overlaps(&player.rect) {
                return false;
            }
            let offset = (other.rect.top_left() - player.rect.top_left())
                .round()
                .as_ivec2();
            player_frame.mask().overlaps(frame.mask(), offset)
        });
        if !hit {
            return;
        }

        if let Some(Entity {
            behaviour: Behaviour::Player(body),
            ..
        }) = self.arena.get_mut(self.player)
        {
            if body.damage() {
                log::debug!("Player hit");
                events.push(LevelEvent::PlayerDamaged);
            }
        }
    }

    fn spawn_cloud(&mut self, x: f32, assets: &AssetLibrary) {
        let Some(base) = assets.clouds().choose(&mut self.rng) else {
            return;
        };
        let image = if self.rng.gen_range(0..5) > 3 {
            base.scaled(2).into_ref()
        } else {
            base.clone()
        };
        let horizon = self.horizon_y.unwrap_or(0.0);
        let y = horizon - self.rng.gen_range(-50.0..600.0);
        let speed = self.rng.gen_range(20.0..30.0);
        self.arena.spawn(
            Entity::new(
                Rect::from_pos_size(Vec2::new(x, y), image.size()),
                Layer::Clouds,
                Sprite::still(image),
            )
            .with_behaviour(Behaviour::Cloud { speed }),
        );
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn player(&self) -> Handle {
        self.player
    }

    pub fn player_body(&self) -> Option<&PlayerBody> {
        match &self.arena.get(self.player)?.behaviour {
            Behaviour::Player(body) => Some(body),
            _ => None,
        }
    }

    pub fn horizon_y(&self) -> Option<f32> {
        self.horizon_y
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn camera(&self) -> &ScrollCamera {
        &self.camera
    }

    fn viewport() -> Vec2 {
        Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT)
    }
}
