//! Live level entities in a generational arena.
//!
//! A `Handle` stays valid until its entity is despawned; afterwards the slot
//! may be reused under a new generation and the stale handle resolves to
//! nothing. The arena also keeps non-owning handle sets for the collidable,
//! damaging and collectible entities so per-tick queries never scan every
//! slot.

use super::enemies::{Pearl, Shell, Tooth};
use super::player::PlayerBody;
use crate::catalog::CoinKind;
use dw_core::{AnimationState, AnimationStep, ImageRef, Rect};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: u32,
    generation: u32,
}

/// Draw layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Clouds,
    Background,
    Water,
    Main,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Clouds, Layer::Background, Layer::Water, Layer::Main];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Blocks the player (terrain, palm tops, shells).
    pub collidable: bool,
    /// Hurts the player on mask contact.
    pub damaging: bool,
    pub coin: Option<CoinKind>,
}

impl Flags {
    pub const NONE: Flags = Flags {
        collidable: false,
        damaging: false,
        coin: None,
    };

    pub const COLLIDABLE: Flags = Flags {
        collidable: true,
        ..Flags::NONE
    };

    pub const DAMAGING: Flags = Flags {
        damaging: true,
        ..Flags::NONE
    };
}

/// Frames plus playback state. An empty frame list is an invisible sprite
/// (the collision blocks under foreground palms).
#[derive(Debug, Clone)]
pub struct Sprite {
    frames: Vec<ImageRef>,
    pub animation: AnimationState,
    /// Replaces the current frame when set (the invulnerability flash).
    pub overlay: Option<ImageRef>,
}

impl Sprite {
    pub fn hidden() -> Self {
        Self::looping(Vec::new(), 0.0)
    }

    pub fn still(image: ImageRef) -> Self {
        Self::looping(vec![image], 0.0)
    }

    pub fn looping(frames: Vec<ImageRef>, speed: f32) -> Self {
        Self {
            frames,
            animation: AnimationState::looping(speed),
            overlay: None,
        }
    }

    pub fn once(frames: Vec<ImageRef>, speed: f32) -> Self {
        Self {
            frames,
            animation: AnimationState::once(speed),
            overlay: None,
        }
    }

    pub fn tick(&mut self, dt: f32) -> AnimationStep {
        self.animation.tick(dt, self.frames.len())
    }

    pub fn frame_index(&self) -> usize {
        self.animation.frame_index(self.frames.len())
    }

    pub fn frame(&self) -> Option<&ImageRef> {
        self.frames.get(self.frame_index())
    }

    /// What gets drawn this tick.
    pub fn image(&self) -> Option<&ImageRef> {
        self.overlay.as_ref().or_else(|| self.frame())
    }

    /// Swaps the clip, keeping the playback position.
    pub fn set_frames(&mut self, frames: &[ImageRef]) {
        let same = self.frames.len() == frames.len()
            && self
                .frames
                .iter()
                .zip(frames)
                .all(|(a, b)| std::sync::Arc::ptr_eq(a, b));
        if !same {
            self.frames = frames.to_vec();
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Per-kind state; `Static` covers terrain, water, coins, spikes and palms,
/// which only animate.
#[derive(Debug, Clone)]
pub enum Behaviour {
    Static,
    Player(PlayerBody),
    Tooth(Tooth),
    Shell(Shell),
    Pearl(Pearl),
    Cloud { speed: f32 },
    Particle,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub rect: Rect,
    pub layer: Layer,
    pub sprite: Sprite,
    pub flags: Flags,
    pub behaviour: Behaviour,
}

impl Entity {
    pub fn new(rect: Rect, layer: Layer, sprite: Sprite) -> Self {
        Self {
            rect,
            layer,
            sprite,
            flags: Flags::NONE,
            behaviour: Behaviour::Static,
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    /// `None` while free, or while taken out for an update.
    entity: Option<Entity>,
    live: bool,
}

#[derive(Debug, Default)]
pub struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
    collidable: BTreeSet<Handle>,
    damaging: BTreeSet<Handle>,
    coins: BTreeSet<Handle>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: Entity) -> Handle {
        let flags = entity.flags;
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entity = Some(entity);
                slot.live = true;
                Handle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entity: Some(entity),
                    live: true,
                });
                Handle {
                    index,
                    generation: 0,
                }
            }
        };

        if flags.collidable {
            self.collidable.insert(handle);
        }
        if flags.damaging {
            self.damaging.insert(handle);
        }
        if flags.coin.is_some() {
            self.coins.insert(handle);
        }
        self.len += 1;
        handle
    }

    pub fn despawn(&mut self, handle: Handle) -> Option<Entity> {
        let slot = self.live_slot_mut(handle)?;
        let entity = slot.entity.take();
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.collidable.remove(&handle);
        self.damaging.remove(&handle);
        self.coins.remove(&handle);
        self.len -= 1;
        entity
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.live_slot(handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&Entity> {
        self.live_slot(handle)?.entity.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        self.live_slot_mut(handle)?.entity.as_mut()
    }

    /// Moves an entity out of its slot so it can be updated while the rest
    /// of the arena is borrowed. The handle stays reserved until `put_back`.
    pub fn take(&mut self, handle: Handle) -> Option<Entity> {
        self.live_slot_mut(handle)?.entity.take()
    }

    pub fn put_back(&mut self, handle: Handle, entity: Entity) {
        if let Some(slot) = self.live_slot_mut(handle) {
            slot.entity = Some(entity);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let entity = slot.entity.as_ref().filter(|_| slot.live)?;
            let handle = Handle {
                index: index as u32,
                generation: slot.generation,
            };
            Some((handle, entity))
        })
    }

    pub fn collidable(&self) -> impl Iterator<Item = Handle> + '_ {
        self.collidable.iter().copied()
    }

    pub fn damaging(&self) -> impl Iterator<Item = Handle> + '_ {
        self.damaging.iter().copied()
    }

    pub fn coins(&self) -> impl Iterator<Item = Handle> + '_ {
        self.coins.iter().copied()
    }

    /// Rects of every collidable entity currently in its slot.
    pub fn collidable_rects(&self) -> Vec<Rect> {
        self.collidable
            .iter()
            .filter_map(|handle| self.get(*handle))
            .map(|entity| entity.rect)
            .collect()
    }

    fn live_slot(&self, handle: Handle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.live && slot.generation == handle.generation)
    }

    fn live_slot_mut(&mut self, handle: Handle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.live && slot.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dw_core::{Color, Image};

    fn block(x: f32) -> Entity {
        Entity::new(
            Rect::new(x, 0.0, 64.0, 64.0),
            Layer::Main,
            Sprite::still(Image::solid(64, 64, Color::BLACK).into_ref()),
        )
        .with_flags(Flags::COLLIDABLE)
    }

    #[test]
    fn stale_handles_resolve_to_nothing() {
        let mut arena = Arena::new();
        let first = arena.spawn(block(0.0));
        assert!(arena.despawn(first).is_some());
        let second = arena.spawn(block(64.0));
        assert!(!arena.contains(first));
        assert!(arena.get(first).is_none());
        assert!(arena.despawn(first).is_none());
        assert_eq!(arena.get(second).map(|e| e.rect.x), Some(64.0));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn index_sets_follow_spawn_and_despawn() {
        let mut arena = Arena::new();
        let wall = arena.spawn(block(0.0));
        let spikes = arena.spawn(block(64.0).with_flags(Flags::DAMAGING));
        let coin = arena.spawn(block(128.0).with_flags(Flags {
            coin: Some(CoinKind::Gold),
            ..Flags::NONE
        }));

        assert_eq!(arena.collidable().collect::<Vec<_>>(), vec![wall]);
        assert_eq!(arena.damaging().collect::<Vec<_>>(), vec![spikes]);
        assert_eq!(arena.coins().collect::<Vec<_>>(), vec![coin]);

        arena.despawn(coin);
        assert_eq!(arena.coins().count(), 0);
        assert_eq!(arena.collidable_rects(), vec![Rect::new(0.0, 0.0, 64.0, 64.0)]);
    }

    #[test]
    fn taken_entities_are_hidden_until_put_back() {
        let mut arena = Arena::new();
        let wall = arena.spawn(block(0.0));
        let mut taken = arena.take(wall).expect("live entity");
        assert!(arena.collidable_rects().is_empty());
        assert_eq!(arena.iter().count(), 0);

        taken.rect.x = 10.0;
        arena.put_back(wall, taken);
        assert_eq!(arena.get(wall).map(|e| e.rect.x), Some(10.0));
    }

    #[test]
    fn hidden_sprites_draw_nothing() {
        let mut sprite = Sprite::hidden();
        assert!(sprite.image().is_none());
        assert_eq!(sprite.tick(1.0), AnimationStep::Running);
    }

    #[test]
    fn set_frames_keeps_position_for_same_clip() {
        let frames: Vec<ImageRef> = (0..4)
            .map(|_| Image::solid(2, 2, Color::WHITE).into_ref())
            .collect();
        let mut sprite = Sprite::looping(frames.clone(), 8.0);
        sprite.tick(0.25);
        assert_eq!(sprite.frame_index(), 2);
        sprite.set_frames(&frames);
        assert_eq!(sprite.frame_index(), 2);
        sprite.set_frames(&frames[..1]);
        assert_eq!(sprite.frame_index(), 0);
        assert_eq!(sprite.frame_count(), 1);
    }
}
