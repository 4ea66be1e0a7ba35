use crate::catalog::Facing;
use dw_core::{Cooldown, InputState, Key, Rect};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Run,
    Jump,
    Fall,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// -1, 0 or 1.
    pub move_x: f32,
    pub jump: bool,
}

impl PlayerInput {
    pub fn from_input(input: &InputState) -> Self {
        let right = input.is_held(Key::Right) || input.is_held(Key::D);
        let left = input.is_held(Key::Left) || input.is_held(Key::A);
        let move_x = match (left, right) {
            (false, true) => 1.0,
            (true, false) => -1.0,
            _ => 0.0,
        };
        Self {
            move_x,
            jump: input.is_held(Key::Space) || input.is_held(Key::Up) || input.is_held(Key::W),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerConfig {
    pub speed: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    /// Downward speed above which the player counts as falling.
    pub fall_threshold: f32,
    /// Horizontal shrink from the sprite rect to the collision hitbox.
    pub hitbox_shrink: f32,
    pub floor_probe_height: f32,
    pub invulnerability: f32,
    pub knockback: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 300.0,
            gravity: 1200.0,
            jump_velocity: -600.0,
            fall_threshold: 40.0,
            hitbox_shrink: 50.0,
            floor_probe_height: 2.0,
            invulnerability: 0.2,
            knockback: -450.0,
        }
    }
}

/// Platformer body. Positions live in the owning entity's rect; the body
/// keeps velocity, contact and damage state.
#[derive(Debug, Clone)]
pub struct PlayerBody {
    pub velocity: Vec2,
    pub facing: Facing,
    pub on_floor: bool,
    state: PlayerState,
    invulnerable: Cooldown,
    config: PlayerConfig,
}

impl PlayerBody {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            on_floor: false,
            state: PlayerState::Idle,
            invulnerable: Cooldown::new(config.invulnerability),
            config,
        }
    }

    pub fn hitbox(&self, rect: Rect) -> Rect {
        rect.inflated(-self.config.hitbox_shrink, 0.0)
    }

    pub fn step(&mut self, rect: &mut Rect, input: PlayerInput, dt: f32, colliders: &[Rect]) {
        self.velocity.x = input.move_x * self.config.speed;
        if input.move_x > 0.0 {
            self.facing = Facing::Right;
        } else if input.move_x < 0.0 {
            self.facing = Facing::Left;
        }

        // Jumping is only legal from the floor found on the previous tick.
        if input.jump && self.on_floor {
            self.velocity.y = self.config.jump_velocity;
        }
        self.velocity.y += self.config.gravity * dt;

        let mut hitbox = self.hitbox(*rect);
        hitbox.x += self.velocity.x * dt;
        resolve_horizontal(&mut hitbox, self.velocity.x, colliders);
        hitbox.y += self.velocity.y * dt;
        if resolve_vertical(&mut hitbox, self.velocity.y, colliders) {
            self.velocity.y = 0.0;
        }
        rect.set_center(hitbox.center());

        let probe = Rect::from_pos_size(
            hitbox.bottom_left(),
            Vec2::new(hitbox.w, self.config.floor_probe_height),
        );
        self.on_floor = colliders.iter().any(|c| c.overlaps(&probe));

        self.invulnerable.tick(dt);
        self.state = self.derive_state();
    }

    fn derive_state(&self) -> PlayerState {
        if self.velocity.y < 0.0 {
            PlayerState::Jump
        } else if self.velocity.y > self.config.fall_threshold {
            PlayerState::Fall
        } else if self.velocity.x != 0.0 {
            PlayerState::Run
        } else {
            PlayerState::Idle
        }
    }

    /// Applies a hit unless still invulnerable from the previous one.
    /// Returns whether the hit landed.
    pub fn damage(&mut self) -> bool {
        if self.invulnerable.is_active() {
            return false;
        }
        self.velocity.y = self.config.knockback;
        self.invulnerable.arm();
        true
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable.is_active()
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }
}

fn resolve_horizontal(hitbox: &mut Rect, velocity_x: f32, colliders: &[Rect]) {
    for collider in colliders {
        if !collider.overlaps(hitbox) {
            continue;
        }
        if velocity_x > 0.0 {
            hitbox.set_right(collider.left());
        } else if velocity_x < 0.0 {
            hitbox.set_left(collider.right());
        }
    }
}

/// Returns true when any collider was hit.
fn resolve_vertical(hitbox: &mut Rect, velocity_y: f32, colliders: &[Rect]) -> bool {
    let mut hit = false;
    for collider in colliders {
        if !collider.overlaps(hitbox) {
            continue;
        }
        if velocity_y > 0.0 {
            hitbox.set_bottom(collider.top());
        } else if velocity_y < 0.0 {
            hitbox.set_top(collider.bottom());
        }
        hit = true;
    }
    hit
}
