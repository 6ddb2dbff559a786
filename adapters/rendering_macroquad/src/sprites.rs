use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use macroquad::texture::Texture2D;

use grid_invaders_rendering::SpriteKey;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Cache of textures loaded from the sprite manifest.
///
/// Asset failures are never fatal: entries that cannot be read are logged and
/// skipped, and the renderer falls back to the sprite's placeholder color for
/// any key missing from the atlas.
#[derive(Debug, Default)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads the default sprite manifest, tolerating any missing assets.
    #[must_use]
    pub(crate) fn from_default_manifest() -> Self {
        Self::from_manifest_path(Self::default_manifest_path())
    }

    /// Loads sprites from the manifest located at the provided path.
    ///
    /// An unreadable or malformed manifest yields an empty atlas.
    #[must_use]
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Self {
        let manifest_path = path.as_ref();
        let entries = match read_manifest_entries(manifest_path) {
            Ok(entries) => entries,
            Err(error) => {
                log::warn!(
                    "sprite manifest {} unusable, falling back to placeholders: {error:#}",
                    manifest_path.display()
                );
                return Self::empty();
            }
        };
        Self::from_entries(entries, &mut default_loader)
    }

    /// Returns an atlas with no textures; every draw falls back to placeholders.
    #[must_use]
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub(crate) fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Returns whether the atlas contains the provided key.
    #[must_use]
    pub(crate) fn contains(&self, key: SpriteKey) -> bool {
        self.textures.contains_key(&key)
    }

    /// Returns the number of textures stored in the atlas.
    #[must_use]
    pub(crate) fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Retrieves the texture associated with the provided key.
    #[must_use]
    pub(crate) fn texture(&self, key: SpriteKey) -> Option<Texture2D> {
        self.textures.get(&key).copied()
    }

    fn from_entries(
        entries: Vec<(SpriteKey, PathBuf)>,
        loader: &mut impl FnMut(&Path) -> Result<Texture2D>,
    ) -> Self {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            match loader(&path) {
                Ok(texture) => {
                    let _ = textures.insert(key, texture);
                }
                Err(error) => {
                    log::warn!(
                        "sprite {key:?} failed to load from {}, using placeholder: {error:#}",
                        path.display()
                    );
                }
            }
        }
        Self { textures }
    }
}

fn read_manifest_entries(manifest_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let contents = fs::read_to_string(manifest_path).with_context(|| {
        format!(
            "failed to read sprite manifest at {}",
            manifest_path.display()
        )
    })?;
    let base = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    parse_manifest(&contents, &base)
}

fn default_loader(path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let Some(key) = parse_sprite_key(&name) else {
            log::warn!("ignoring unknown sprite key `{name}` in manifest");
            continue;
        };
        let _ = resolved.insert(key, base_path.join(relative_path));
    }

    // Canonical key order keeps the load sequence deterministic.
    let mut ordered = Vec::with_capacity(SpriteKey::ALL.len());
    for key in SpriteKey::ALL {
        if let Some(path) = resolved.remove(&key) {
            ordered.push((key, path));
        }
    }
    Ok(ordered)
}

fn parse_sprite_key(name: &str) -> Option<SpriteKey> {
    match name {
        "PlayerShip" => Some(SpriteKey::PlayerShip),
        "EnemyAlpha" => Some(SpriteKey::EnemyAlpha),
        "EnemyBeta" => Some(SpriteKey::EnemyBeta),
        "EnemyGamma" => Some(SpriteKey::EnemyGamma),
        "EnemyDelta" => Some(SpriteKey::EnemyDelta),
        _ => None,
    }
}
