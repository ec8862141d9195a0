//! Level data: loading, validation and the spawn timeline
//!
//! Levels are JSON files. Geometry is validated when the file is loaded so a
//! run never starts on broken data; everything else has a documented default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::rect::Rect;
use super::state::{Obstacle, ObstacleKind};
use crate::consts::*;

/// Level loading failure
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Malformed(e.to_string())
    }
}

/// Scheduled obstacle creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Run time (seconds) at which the obstacle appears
    pub time: f32,
    #[serde(default, deserialize_with = "de_opt_coord")]
    pub y: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_coord")]
    pub w: Option<i32>,
    #[serde(default, deserialize_with = "de_opt_coord")]
    pub h: Option<i32>,
    #[serde(default, rename = "type")]
    pub kind: ObstacleKind,
}

impl SpawnEntry {
    /// Build the obstacle just past the right edge of the level
    pub fn instantiate(&self, level_width: i32, level_height: i32) -> Obstacle {
        let rect = Rect::new(
            level_width + SPAWN_MARGIN,
            self.y.unwrap_or(level_height - PLAYER_SPAWN_OFFSET),
            self.w.unwrap_or(SPAWN_DEFAULT_W),
            self.h.unwrap_or(SPAWN_DEFAULT_H),
        );
        Obstacle::new(rect, self.kind)
    }
}

/// Background layer descriptor
///
/// Only the presentation layer reads these. Keys the simulation does not know
/// about are kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BgLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_factor: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_factor: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BgLayer {
    /// Fallback fill when a layer has no image
    pub const DEFAULT_COLOR: [u8; 3] = [80, 80, 120];

    /// Parallax factor; deeper layers (higher index) scroll faster by default
    pub fn speed_factor(&self, index: usize) -> f32 {
        self.speed_factor.unwrap_or(0.3 + index as f32 * 0.2)
    }

    /// Vertical placement as a fraction of level height
    pub fn y_factor(&self, index: usize) -> f32 {
        self.y_factor.unwrap_or(0.2 + index as f32 * 0.1)
    }

    pub fn scale(&self, index: usize) -> f32 {
        self.scale.unwrap_or(1.0 + index as f32 * 0.1)
    }

    pub fn color(&self) -> [u8; 3] {
        self.color.unwrap_or(Self::DEFAULT_COLOR)
    }
}

/// On-disk obstacle
#[derive(Deserialize)]
struct ObstacleSpec {
    #[serde(deserialize_with = "de_coord")]
    x: i32,
    #[serde(deserialize_with = "de_coord")]
    y: i32,
    #[serde(deserialize_with = "de_coord")]
    w: i32,
    #[serde(deserialize_with = "de_coord")]
    h: i32,
    #[serde(default, rename = "type")]
    kind: ObstacleKind,
}

/// On-disk level
#[derive(Deserialize)]
struct LevelFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default = "default_width", deserialize_with = "de_coord")]
    width: i32,
    #[serde(default = "default_height", deserialize_with = "de_coord")]
    height: i32,
    #[serde(default = "default_scroll_speed")]
    scroll_speed: f32,
    #[serde(default)]
    obstacles: Vec<ObstacleSpec>,
    #[serde(default)]
    bg_layers: Vec<BgLayer>,
    #[serde(default)]
    duration: Option<f32>,
    #[serde(default)]
    spawn_timeline: Vec<SpawnEntry>,
    #[serde(default)]
    music: Option<String>,
}

fn default_width() -> i32 {
    LEVEL_WIDTH
}

fn default_height() -> i32 {
    LEVEL_HEIGHT
}

fn default_scroll_speed() -> f32 {
    LEVEL_SCROLL_SPEED
}

/// Largest coordinate magnitude a level may use. Edges, landing slack and the
/// spawn column all stay far from `i32` overflow inside this range.
const MAX_COORD: i32 = 1 << 29;

/// Reject a span whose start or end leaves `[-MAX_COORD, MAX_COORD]`
fn check_span(what: &str, start: i32, len: i32) -> Result<(), LevelError> {
    let range = -MAX_COORD..=MAX_COORD;
    match start.checked_add(len) {
        Some(end) if range.contains(&start) && range.contains(&end) => Ok(()),
        _ => Err(LevelError::Malformed(format!(
            "{what} out of range: {start} + {len}"
        ))),
    }
}

/// Any JSON number, truncated onto the pixel grid
fn de_coord<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let v = f64::deserialize(d)?;
    if !v.is_finite() || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return Err(serde::de::Error::custom(format!("coordinate out of range: {v}")));
    }
    Ok(v as i32)
}

fn de_opt_coord<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    #[derive(Deserialize)]
    struct Coord(#[serde(deserialize_with = "de_coord")] i32);

    Ok(Option::<Coord>::deserialize(d)?.map(|Coord(v)| v))
}

/// A side-scrolling level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub title: Option<String>,
    pub width: i32,
    pub height: i32,
    /// Active obstacles in level order
    pub obstacles: Vec<Obstacle>,
    /// Pixels per second
    pub scroll_speed: f32,
    pub bg_layers: Vec<BgLayer>,
    /// Run ends in victory after this long even with obstacles left
    pub duration: Option<f32>,
    /// Pending spawns, ordered by time
    pub spawn_timeline: Vec<SpawnEntry>,
    /// Music path relative to the asset root
    pub music: Option<String>,
}

impl Level {
    /// Parse and validate a level from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let file: LevelFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Read, parse and validate a level file
    pub fn load_from_file(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json_str(&json)?;
        log::info!(
            "Loaded level {:?} from {}: {} obstacles, {} scheduled spawns",
            level.title.as_deref().unwrap_or("untitled"),
            path.display(),
            level.obstacles.len(),
            level.spawn_timeline.len()
        );
        Ok(level)
    }

    fn from_file(file: LevelFile) -> Result<Self, LevelError> {
        if file.width <= 0 || file.height <= 0 {
            return Err(LevelError::Malformed(format!(
                "level size must be positive, got {}x{}",
                file.width, file.height
            )));
        }
        check_span("level width", 0, file.width)?;
        check_span("level height", 0, file.height)?;
        if !file.scroll_speed.is_finite() || file.scroll_speed < 0.0 {
            return Err(LevelError::Malformed(format!(
                "scroll_speed must be a non-negative number, got {}",
                file.scroll_speed
            )));
        }
        if let Some(d) = file.duration.filter(|d| !d.is_finite() || *d <= 0.0) {
            return Err(LevelError::Malformed(format!("duration must be positive, got {d}")));
        }

        let mut obstacles = Vec::with_capacity(file.obstacles.len());
        for (i, o) in file.obstacles.into_iter().enumerate() {
            if o.w <= 0 || o.h <= 0 {
                return Err(LevelError::Malformed(format!(
                    "obstacle {i} has non-positive size {}x{}",
                    o.w, o.h
                )));
            }
            check_span(&format!("obstacle {i} x"), o.x, o.w)?;
            check_span(&format!("obstacle {i} y"), o.y, o.h)?;
            obstacles.push(Obstacle::new(Rect::new(o.x, o.y, o.w, o.h), o.kind));
        }

        let mut spawn_timeline = file.spawn_timeline;
        for (i, s) in spawn_timeline.iter().enumerate() {
            if !s.time.is_finite() {
                return Err(LevelError::Malformed(format!("spawn {i} has invalid time")));
            }
            if s.w.is_some_and(|w| w <= 0) || s.h.is_some_and(|h| h <= 0) {
                return Err(LevelError::Malformed(format!("spawn {i} has non-positive size")));
            }
            let spawned = s.instantiate(file.width, file.height);
            check_span(&format!("spawn {i} x"), spawned.rect.x, spawned.rect.w)?;
            check_span(&format!("spawn {i} y"), spawned.rect.y, spawned.rect.h)?;
        }
        spawn_timeline.sort_by(|a, b| a.time.total_cmp(&b.time));

        Ok(Self {
            title: file.title,
            width: file.width,
            height: file.height,
            obstacles,
            scroll_speed: file.scroll_speed,
            bg_layers: file.bg_layers,
            duration: file.duration,
            spawn_timeline,
            music: file.music,
        })
    }

    /// Y coordinate of the ground plane
    pub fn ground_y(&self) -> i32 {
        self.height - GROUND_MARGIN
    }

    /// Pull every obstacle whose top is above `ceiling` down to it.
    /// Returns how many were moved.
    pub fn clamp_obstacles(&mut self, ceiling: i32) -> usize {
        let mut adjusted = 0;
        for o in &mut self.obstacles {
            if o.rect.y < ceiling {
                o.rect.y = ceiling;
                adjusted += 1;
            }
        }
        adjusted
    }
}

/// A level file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelInfo {
    pub title: String,
    pub path: PathBuf,
}

/// List `*.json` levels in `dir`, sorted by title.
///
/// Files that cannot be read or parsed are still listed under their file name;
/// loading them later reports the real error.
pub fn discover_levels(dir: &Path) -> Result<Vec<LevelInfo>, LevelError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LevelError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut levels = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let title = std::fs::read_to_string(&path)
            .ok()
            .and_then(|json| serde_json::from_str::<serde_json::Value>(&json).ok())
            .and_then(|v| v.get("title").and_then(|t| t.as_str()).map(str::to_owned))
            .unwrap_or(file_name);
        levels.push(LevelInfo { title, path });
    }
    levels.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.path.cmp(&b.path)));
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let level = Level::from_json_str("{}").unwrap();
        assert_eq!(level.width, 800);
        assert_eq!(level.height, 450);
        assert_eq!(level.scroll_speed, 200.0);
        assert!(level.obstacles.is_empty());
        assert!(level.spawn_timeline.is_empty());
        assert_eq!(level.duration, None);
        assert_eq!(level.music, None);
        assert_eq!(level.ground_y(), 410);
    }

    #[test]
    fn test_obstacle_types() {
        let level = Level::from_json_str(
            r#"{"obstacles": [
                {"x": 1, "y": 2, "w": 3, "h": 4},
                {"x": 1, "y": 2, "w": 3, "h": 4, "type": "platform"},
                {"x": 1, "y": 2, "w": 3, "h": 4, "type": "spike"}
            ]}"#,
        )
        .unwrap();
        let kinds: Vec<_> = level.obstacles.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![ObstacleKind::Normal, ObstacleKind::Platform, ObstacleKind::Spike]
        );
        assert_eq!(level.obstacles[0].rect, Rect::new(1, 2, 3, 4));
        assert!(level.obstacles.iter().all(|o| !o.passed));
    }

    #[test]
    fn test_fractional_coordinates_truncate() {
        let level =
            Level::from_json_str(r#"{"obstacles": [{"x": 10.9, "y": 20.2, "w": 30, "h": 40}]}"#)
                .unwrap();
        assert_eq!(level.obstacles[0].rect, Rect::new(10, 20, 30, 40));
    }

    #[test]
    fn test_missing_geometry_is_malformed() {
        let err = Level::from_json_str(r#"{"obstacles": [{"x": 10, "y": 20, "w": 30}]}"#)
            .unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));
    }

    #[test]
    fn test_non_numeric_geometry_is_malformed() {
        let err =
            Level::from_json_str(r#"{"obstacles": [{"x": "ten", "y": 20, "w": 30, "h": 40}]}"#)
                .unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));

        let err = Level::from_json_str(r#"{"width": "wide"}"#).unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));
    }

    #[test]
    fn test_non_positive_size_is_malformed() {
        let err = Level::from_json_str(r#"{"obstacles": [{"x": 1, "y": 1, "w": 0, "h": 40}]}"#)
            .unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));

        let err = Level::from_json_str(r#"{"spawn_timeline": [{"time": 1, "h": -5}]}"#)
            .unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));
    }

    #[test]
    fn test_oversized_geometry_is_malformed() {
        let far_right = r#"{"obstacles": [{"x": 2147483600, "y": 370, "w": 100, "h": 40}]}"#;
        let err = Level::from_json_str(far_right).unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));

        let far_down = r#"{"obstacles": [{"x": 0, "y": 2147483000, "w": 10, "h": 1000}]}"#;
        assert!(matches!(Level::from_json_str(far_down), Err(LevelError::Malformed(_))));

        let huge_width = r#"{"width": 2147483600, "spawn_timeline": [{"time": 1.0}]}"#;
        assert!(matches!(Level::from_json_str(huge_width), Err(LevelError::Malformed(_))));

        let huge_spawn = r#"{"spawn_timeline": [{"time": 1.0, "w": 2147483000}]}"#;
        assert!(matches!(Level::from_json_str(huge_spawn), Err(LevelError::Malformed(_))));

        // Large but in range still loads
        let wide = r#"{"obstacles": [{"x": 500000000, "y": 370, "w": 40, "h": 40}]}"#;
        assert!(Level::from_json_str(wide).is_ok());
    }

    #[test]
    fn test_unknown_obstacle_type_is_malformed() {
        let err = Level::from_json_str(
            r#"{"obstacles": [{"x": 1, "y": 1, "w": 1, "h": 1, "type": "lava"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));
    }

    #[test]
    fn test_negative_scroll_speed_is_malformed() {
        let err = Level::from_json_str(r#"{"scroll_speed": -5}"#).unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = Level::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, LevelError::Malformed(_)));
    }

    #[test]
    fn test_spawn_timeline_sorted_and_defaults() {
        let level = Level::from_json_str(
            r#"{"spawn_timeline": [
                {"time": 3.0, "type": "spike", "h": 30},
                {"time": 1.5, "x": 5000}
            ]}"#,
        )
        .unwrap();
        assert_eq!(level.spawn_timeline[0].time, 1.5);
        assert_eq!(level.spawn_timeline[1].kind, ObstacleKind::Spike);

        let o = level.spawn_timeline[0].instantiate(level.width, level.height);
        assert_eq!(o.rect, Rect::new(900, 370, 40, 80));
        assert_eq!(o.kind, ObstacleKind::Normal);

        let spike = level.spawn_timeline[1].instantiate(level.width, level.height);
        assert_eq!(spike.rect.h, 30);
    }

    #[test]
    fn test_bg_layer_defaults_and_passthrough() {
        let level = Level::from_json_str(
            r#"{"bg_layers": [
                {"color": [10, 20, 30], "speed_factor": 0.5, "tint": "warm"},
                {"image": "hills.png"}
            ]}"#,
        )
        .unwrap();
        let first = &level.bg_layers[0];
        assert_eq!(first.color(), [10, 20, 30]);
        assert_eq!(first.speed_factor(0), 0.5);
        assert_eq!(first.extra.get("tint").and_then(|v| v.as_str()), Some("warm"));

        let second = &level.bg_layers[1];
        assert_eq!(second.image.as_deref(), Some("hills.png"));
        assert_eq!(second.color(), BgLayer::DEFAULT_COLOR);
        assert!((second.speed_factor(1) - 0.5).abs() < 1e-6);
        assert!((second.y_factor(1) - 0.3).abs() < 1e-6);
        assert!((second.scale(1) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_moves_only_high_obstacles() {
        let mut level = Level::from_json_str(
            r#"{"obstacles": [
                {"x": 0, "y": 100, "w": 10, "h": 10},
                {"x": 0, "y": 300, "w": 10, "h": 10}
            ]}"#,
        )
        .unwrap();
        assert_eq!(level.clamp_obstacles(268), 1);
        assert_eq!(level.obstacles[0].rect.y, 268);
        assert_eq!(level.obstacles[1].rect.y, 300);
    }

    #[test]
    fn test_discover_levels() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"title": "Alpha"}"#).unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"title": "Beta"}"#).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let levels = discover_levels(dir.path()).unwrap();
        let titles: Vec<_> = levels.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "broken.json"]);
    }

    #[test]
    fn test_bundled_levels_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/levels");
        let levels = discover_levels(&dir).unwrap();
        assert_eq!(levels.len(), 2);
        for info in &levels {
            let level = Level::load_from_file(&info.path).unwrap();
            assert_eq!(level.title.as_deref(), Some(info.title.as_str()));
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Level::load_from_file(Path::new("/nonexistent/level.json")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }

    proptest! {
        #[test]
        fn prop_clamp_is_exact_and_idempotent(
            ys in proptest::collection::vec(-500i32..500, 0..20),
            ceiling in 0i32..400,
        ) {
            let mut level = Level::from_json_str("{}").unwrap();
            level.obstacles = ys
                .iter()
                .map(|&y| Obstacle::new(Rect::new(0, y, 10, 10), ObstacleKind::Normal))
                .collect();

            level.clamp_obstacles(ceiling);
            for (o, &y) in level.obstacles.iter().zip(&ys) {
                prop_assert_eq!(o.rect.y, y.max(ceiling));
            }

            let once = level.clone();
            prop_assert_eq!(level.clamp_obstacles(ceiling), 0);
            prop_assert_eq!(level, once);
        }
    }
}
