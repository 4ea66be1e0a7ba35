//! Mode switches requested by the editor and the level.

use crate::editor::export::Blueprint;

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Build a level from the exported blueprint and start playing it.
    Play(Blueprint),
    /// Leave the level and return to the (untouched) editor.
    Edit,
}
