use crate::level::player::PlayerInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub move_x: f32,
    #[serde(default)]
    pub jump: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<PlayerInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(PlayerInput {
                    move_x: frame.move_x.clamp(-1.0, 1.0),
                    jump: frame.jump,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetLibrary;
    use crate::catalog::{Catalog, TileId};
    use crate::editor::export::{Blueprint, LayerName, Payload};
    use crate::level::builder::build;
    use crate::level::player::PlayerState;
    use crate::level::{Level, LevelConfig, LevelEvent};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dw_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_replay(name_hint: &str, raw: &str) -> ReplaySequence {
        let path = temp_file_path(name_hint);
        fs::write(&path, raw).expect("write replay file");
        let replay = load_replay_from_path(&path).expect("replay should load");
        let _ = fs::remove_file(path);
        replay
    }

    /// Floor from x = 0 to 1280 at y = 256, a coin row at y = 224 and a
    /// tooth patrolling the far end.
    fn sample_blueprint() -> Blueprint {
        let mut blueprint = Blueprint::new();
        for col in 0..20 {
            blueprint.insert(
                LayerName::Terrain,
                (col * 64, 256),
                Payload::Terrain("X".to_string()),
            );
        }
        for x in [300, 400, 500] {
            blueprint.insert(LayerName::Coins, (x, 224), Payload::Tile(TileId(5)));
        }
        blueprint.insert(LayerName::Enemies, (1088, 192), Payload::Tile(TileId(8)));
        blueprint.insert(LayerName::FgObjects, (100, 192), Payload::Tile(TileId(0)));
        blueprint.insert(LayerName::FgObjects, (0, 0), Payload::Tile(TileId(1)));
        blueprint
    }

    fn run(replay: &ReplaySequence) -> (Level, Vec<LevelEvent>) {
        let catalog = Catalog::embedded().expect("embedded catalog should parse");
        let assets = AssetLibrary::placeholder(&catalog);
        let mut level =
            build(&sample_blueprint(), &catalog, &assets, LevelConfig::default()).expect("builds");
        let mut events = Vec::new();
        for input in replay.expanded_inputs() {
            events.extend(level.step(replay.fixed_dt, input, &assets));
        }
        (level, events)
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let replay = write_replay(
            "parse",
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "move_x": 1.0, "repeat": 3 },
                { "jump": true, "repeat": 1 },
                { "move_x": -4.0 }
              ]
            }"#,
        );
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 5);
        assert!(expanded[3].jump);
        assert_eq!(expanded[4].move_x, -1.0);
    }

    #[test]
    fn invalid_replays_are_rejected() {
        let path = temp_file_path("invalid");
        fs::write(&path, r#"{ "fixed_dt": 0.0, "frames": [{ "repeat": 1 }] }"#)
            .expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("zero dt rejected");
        assert!(err.contains("fixed_dt"));

        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty frames rejected");
        assert!(err.contains("empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn walking_right_collects_the_coin_row() {
        let replay = write_replay(
            "walk",
            r#"{ "frames": [{ "move_x": 1.0, "repeat": 90 }] }"#,
        );
        let (level, events) = run(&replay);

        let coins = events
            .iter()
            .filter(|e| matches!(e, LevelEvent::CoinCollected(_)))
            .count();
        assert_eq!(coins, 3);
        assert!(!events.contains(&LevelEvent::PlayerDamaged));

        let player = level.arena().get(level.player()).expect("player alive");
        assert!((player.rect.x - 550.0).abs() < 0.1);
        assert_eq!(player.rect.bottom(), 256.0);
        assert_eq!(level.player_body().map(|b| b.state()), Some(PlayerState::Run));
    }

    #[test]
    fn jump_leaves_the_floor_and_lands_again() {
        let replay = write_replay(
            "jump",
            r#"{
              "frames": [
                { "repeat": 2 },
                { "jump": true },
                { "repeat": 10 }
              ]
            }"#,
        );
        let (level, _) = run(&replay);
        let player = level.arena().get(level.player()).expect("player alive");
        assert!(player.rect.bottom() < 256.0);
        assert_eq!(level.player_body().map(|b| b.state()), Some(PlayerState::Jump));

        let replay = write_replay(
            "jump_land",
            r#"{
              "frames": [
                { "repeat": 2 },
                { "jump": true },
                { "repeat": 120 }
              ]
            }"#,
        );
        let (level, _) = run(&replay);
        let player = level.arena().get(level.player()).expect("player alive");
        assert_eq!(player.rect.bottom(), 256.0);
        assert_eq!(level.player_body().map(|b| b.on_floor), Some(true));
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = write_replay(
            "deterministic",
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "move_x": 1.0, "repeat": 60 },
                { "move_x": 1.0, "jump": true, "repeat": 1 },
                { "move_x": 1.0, "repeat": 120 },
                { "move_x": -1.0, "repeat": 45 }
              ]
            }"#,
        );
        let (run_a, events_a) = run(&replay);
        let (run_b, events_b) = run(&replay);

        assert_eq!(events_a, events_b);
        assert_eq!(run_a.arena().len(), run_b.arena().len());
        let rect_a = run_a.arena().get(run_a.player()).map(|p| p.rect);
        let rect_b = run_b.arena().get(run_b.player()).map(|p| p.rect);
        assert_eq!(rect_a, rect_b);
        let clouds_a: Vec<_> = run_a.arena().iter().map(|(_, e)| e.rect).collect();
        let clouds_b: Vec<_> = run_b.arena().iter().map(|(_, e)| e.rect).collect();
        assert_eq!(clouds_a, clouds_b);
    }
}
