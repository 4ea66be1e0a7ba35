//! Enemy brains: the patrolling tooth, the pearl-spitting shell and its
//! pearls. Each brain works on its entity's rect and sprite and reports what
//! the level has to spawn; none of them reach into the arena themselves.

use super::entity::{Handle, Sprite};
use crate::catalog::Facing;
use dw_core::{AnimationStep, Cooldown, ImageRef, Rect};
use glam::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct EnemyConfig {
    pub tooth_speed: f32,
    /// Player-centre distance that wakes a shell.
    pub shell_range: f32,
    pub shell_cooldown: f32,
    /// Attack frame on which the pearl leaves the shell.
    pub fire_frame: usize,
    pub pearl_speed: f32,
    pub pearl_lifetime: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            tooth_speed: 120.0,
            shell_range: 500.0,
            shell_cooldown: 2.0,
            fire_frame: 2,
            pearl_speed: 150.0,
            pearl_lifetime: 6.0,
        }
    }
}

fn hits(point: Vec2, colliders: &[Rect]) -> bool {
    colliders.iter().any(|c| c.contains_point(point))
}

/// True when something solid sits just below the middle of `rect`.
pub fn stands_on_ground(rect: Rect, colliders: &[Rect]) -> bool {
    hits(rect.midbottom() + Vec2::new(0.0, 10.0), colliders)
}

#[derive(Debug, Clone)]
pub struct Tooth {
    pub facing: Facing,
    speed: f32,
}

impl Tooth {
    pub fn new(facing: Facing, speed: f32) -> Self {
        Self { facing, speed }
    }

    /// Walks, then turns around at ledges and walls. Both sides are checked
    /// every tick, right first.
    pub fn step(&mut self, rect: &mut Rect, dt: f32, colliders: &[Rect]) {
        rect.x += self.facing.sign() * self.speed * dt;

        let floor_right = hits(rect.bottom_right() + Vec2::new(1.0, 1.0), colliders);
        let wall_right = hits(rect.mid_right() + Vec2::new(1.0, 0.0), colliders);
        if self.facing == Facing::Right && (!floor_right || wall_right) {
            self.facing = Facing::Left;
        }

        let floor_left = hits(rect.bottom_left() + Vec2::new(-1.0, 1.0), colliders);
        let wall_left = hits(rect.mid_left() + Vec2::new(-1.0, 0.0), colliders);
        if self.facing == Facing::Left && (!floor_left || wall_left) {
            self.facing = Facing::Right;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellStatus {
    Idle,
    Attack,
}

/// A pearl the level should spawn, centred on `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PearlShot {
    pub center: Vec2,
    pub facing: Facing,
}

#[derive(Debug, Clone)]
pub struct Shell {
    pub facing: Facing,
    /// Resolved after the whole level is built.
    pub player: Option<Handle>,
    status: ShellStatus,
    cooldown: Cooldown,
    has_fired: bool,
    range: f32,
    fire_frame: usize,
}

impl Shell {
    pub fn new(facing: Facing, config: &EnemyConfig) -> Self {
        Self {
            facing,
            player: None,
            status: ShellStatus::Idle,
            cooldown: Cooldown::new(config.shell_cooldown),
            has_fired: false,
            range: config.shell_range,
            fire_frame: config.fire_frame,
        }
    }

    pub fn status(&self) -> ShellStatus {
        self.status
    }

    pub fn step(
        &mut self,
        sprite: &mut Sprite,
        center: Vec2,
        player_center: Option<Vec2>,
        dt: f32,
        idle: &[ImageRef],
        attack: &[ImageRef],
    ) -> Option<PearlShot> {
        self.cooldown.tick(dt);

        let in_range = player_center.is_some_and(|p| p.distance(center) < self.range);
        self.status = if in_range && !self.cooldown.is_active() {
            ShellStatus::Attack
        } else {
            ShellStatus::Idle
        };
        sprite.set_frames(match self.status {
            ShellStatus::Idle => idle,
            ShellStatus::Attack => attack,
        });

        if sprite.tick(dt) == AnimationStep::Wrapped && self.has_fired {
            self.cooldown.arm();
            self.has_fired = false;
        }

        if self.status == ShellStatus::Attack
            && sprite.frame_index() == self.fire_frame
            && !self.has_fired
        {
            self.has_fired = true;
            let offset = match self.facing {
                Facing::Left => Vec2::new(-50.0, -10.0),
                Facing::Right => Vec2::new(20.0, -10.0),
            };
            return Some(PearlShot {
                center: center + offset,
                facing: self.facing,
            });
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct Pearl {
    pub facing: Facing,
    speed: f32,
    lifetime: Cooldown,
}

impl Pearl {
    pub fn new(facing: Facing, config: &EnemyConfig) -> Self {
        let mut lifetime = Cooldown::new(config.pearl_lifetime);
        lifetime.arm();
        Self {
            facing,
            speed: config.pearl_speed,
            lifetime,
        }
    }

    /// Moves the pearl; returns false once its lifetime is over.
    pub fn step(&mut self, rect: &mut Rect, dt: f32) -> bool {
        rect.x += self.facing.sign() * self.speed * dt;
        self.lifetime.tick(dt);
        self.lifetime.is_active()
    }
}
