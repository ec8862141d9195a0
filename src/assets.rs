//! Level art lookup
//!
//! Images are loaded through a host-provided [`AssetProvider`]. Every image is
//! optional: a missing or broken file is logged and the renderer falls back to
//! flat colors.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sim::level::Level;

/// Highest index probed for numbered art (`bg1.png` .. `bg9.png`)
const MAX_NUMBERED_ASSETS: u32 = 9;

/// Image loading failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
}

/// Opaque reference to an image owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

/// Host image loader
pub trait AssetProvider {
    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, AssetError>;
}

/// Provider with no images at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAssets;

impl AssetProvider for NullAssets {
    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, AssetError> {
        Err(AssetError::NotFound(path.to_path_buf()))
    }
}

/// Everything a level needs from the asset root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelAssets {
    /// One slot per background layer
    pub layers: Vec<Option<ImageHandle>>,
    /// Skins for normal obstacles (`obstacle1.png`, `obstacle2.png`, ...)
    pub obstacles: Vec<ImageHandle>,
    pub player: Option<ImageHandle>,
    /// Level track resolved against the asset root
    pub music: Option<PathBuf>,
}

impl LevelAssets {
    pub fn resolve(level: &Level, root: &Path, provider: &mut dyn AssetProvider) -> Self {
        let layers = level
            .bg_layers
            .iter()
            .map(|layer| match layer.image.as_deref() {
                Some(name) => load_optional(provider, &root.join(name)),
                None => first_numbered(provider, root, "bg"),
            })
            .collect();

        let obstacles = (1..=MAX_NUMBERED_ASSETS)
            .filter_map(|i| probe(provider, &root.join(format!("obstacle{i}.png"))))
            .collect::<Vec<_>>();

        let player = probe(provider, &root.join("player.png"));
        let music = level.music.as_deref().map(|m| root.join(m));

        log::debug!(
            "Resolved level art: {} layer(s), {} obstacle skin(s), player image: {}",
            level.bg_layers.len(),
            obstacles.len(),
            player.is_some()
        );

        Self {
            layers,
            obstacles,
            player,
            music,
        }
    }

    /// Skin for a normal obstacle, picked by its x position
    pub fn obstacle_image(&self, x: i32) -> Option<ImageHandle> {
        if self.obstacles.is_empty() {
            return None;
        }
        let idx = (x / 100).rem_euclid(self.obstacles.len() as i32) as usize;
        self.obstacles.get(idx).copied()
    }

    pub fn layer_image(&self, index: usize) -> Option<ImageHandle> {
        self.layers.get(index).copied().flatten()
    }
}

/// Load an image the level asked for by name; any failure is worth a warning
fn load_optional(provider: &mut dyn AssetProvider, path: &Path) -> Option<ImageHandle> {
    match provider.load_image(path) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Using fallback color: {e}");
            None
        }
    }
}

/// Load an image we are only guessing exists; absence is expected
fn probe(provider: &mut dyn AssetProvider, path: &Path) -> Option<ImageHandle> {
    match provider.load_image(path) {
        Ok(image) => Some(image),
        Err(AssetError::NotFound(_)) => None,
        Err(e) => {
            log::warn!("Skipping unreadable image: {e}");
            None
        }
    }
}

fn first_numbered(provider: &mut dyn AssetProvider, root: &Path, stem: &str) -> Option<ImageHandle> {
    (1..=MAX_NUMBERED_ASSETS).find_map(|i| probe(provider, &root.join(format!("{stem}{i}.png"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Provider backed by a fixed file table
    #[derive(Default)]
    struct TableAssets {
        files: HashMap<PathBuf, Result<ImageHandle, String>>,
    }

    impl TableAssets {
        fn with(mut self, path: &str, id: u32) -> Self {
            let image = ImageHandle {
                id,
                width: 64,
                height: 64,
            };
            self.files.insert(PathBuf::from(path), Ok(image));
            self
        }

        fn broken(mut self, path: &str) -> Self {
            self.files.insert(PathBuf::from(path), Err("bad header".into()));
            self
        }
    }

    impl AssetProvider for TableAssets {
        fn load_image(&mut self, path: &Path) -> Result<ImageHandle, AssetError> {
            match self.files.get(path) {
                Some(Ok(image)) => Ok(*image),
                Some(Err(reason)) => Err(AssetError::Decode {
                    path: path.to_path_buf(),
                    reason: reason.clone(),
                }),
                None => Err(AssetError::NotFound(path.to_path_buf())),
            }
        }
    }

    fn level() -> Level {
        Level::from_json_str(
            r#"{
                "music": "music/track.ogg",
                "bg_layers": [{"image": "sky.png"}, {"color": [10, 20, 30]}, {"image": "missing.png"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_with_partial_assets() {
        let mut provider = TableAssets::default()
            .with("art/sky.png", 1)
            .with("art/bg2.png", 2)
            .with("art/obstacle1.png", 3)
            .broken("art/obstacle2.png")
            .with("art/obstacle3.png", 4)
            .with("art/player.png", 5);

        let assets = LevelAssets::resolve(&level(), Path::new("art"), &mut provider);
        assert_eq!(assets.layer_image(0).map(|i| i.id), Some(1));
        // No image named: first numbered background found
        assert_eq!(assets.layer_image(1).map(|i| i.id), Some(2));
        assert_eq!(assets.layer_image(2), None);
        assert_eq!(assets.obstacles.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(assets.player.map(|i| i.id), Some(5));
        assert_eq!(assets.music, Some(PathBuf::from("art/music/track.ogg")));
    }

    #[test]
    fn test_resolve_with_nothing() {
        let assets = LevelAssets::resolve(&level(), Path::new("art"), &mut NullAssets);
        assert_eq!(assets.layers, vec![None, None, None]);
        assert!(assets.obstacles.is_empty());
        assert!(assets.player.is_none());
        assert_eq!(assets.obstacle_image(500), None);
    }

    #[test]
    fn test_obstacle_skin_is_stable_per_position() {
        let mut provider = TableAssets::default()
            .with("a/obstacle1.png", 1)
            .with("a/obstacle2.png", 2);
        let assets = LevelAssets::resolve(&level(), Path::new("a"), &mut provider);
        assert_eq!(assets.obstacle_image(0).map(|i| i.id), Some(1));
        assert_eq!(assets.obstacle_image(150).map(|i| i.id), Some(2));
        assert_eq!(assets.obstacle_image(250).map(|i| i.id), Some(1));
        // Off-screen to the left still maps to a skin
        assert!(assets.obstacle_image(-150).is_some());
    }
}
