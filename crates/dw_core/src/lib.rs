pub mod animation;
pub mod color;
pub mod geometry;
pub mod image;
pub mod input;
pub mod time;
pub mod timer;

pub use animation::{AnimationState, AnimationStep, Playback};
pub use color::Color;
pub use geometry::Rect;
pub use image::{Image, ImageRef, Mask};
pub use input::{InputState, Key, MouseBtn};
pub use time::FrameClock;
pub use timer::Cooldown;
