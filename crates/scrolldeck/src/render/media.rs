use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui;
use tracing::{debug, warn};

use crate::content::resolve_against;

/// Decoded media textures keyed by the path written in the deck. Failed
/// loads are remembered so each file is only tried once.
pub struct MediaCache {
    base_path: PathBuf,
    textures: RefCell<HashMap<String, Option<egui::TextureHandle>>>,
}

impl MediaCache {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            textures: RefCell::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        resolve_against(&self.base_path, path)
    }

    pub fn get_or_load(&self, ctx: &egui::Context, path: &str) -> Option<egui::TextureHandle> {
        if let Some(entry) = self.textures.borrow().get(path) {
            return entry.clone();
        }
        let resolved = self.resolve(path);
        let loaded = match load_color_image(&resolved) {
            Ok(image) => {
                debug!(path = %resolved.display(), "loaded media");
                Some(ctx.load_texture(path, image, egui::TextureOptions::LINEAR))
            }
            Err(e) => {
                warn!("{e:#}");
                None
            }
        };
        self.textures
            .borrow_mut()
            .insert(path.to_string(), loaded.clone());
        loaded
    }
}

fn load_color_image(path: &Path) -> Result<egui::ColorImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load media {}", path.display()))?
        .into_rgba8();
    let (w, h) = image.dimensions();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        image.as_raw(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let cache = MediaCache::new(PathBuf::from("/decks"));
        assert_eq!(cache.resolve("images/a.png"), PathBuf::from("/decks/images/a.png"));
        assert_eq!(cache.resolve("/abs/b.png"), PathBuf::from("/abs/b.png"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_color_image(Path::new("/nonexistent/image.png")).is_err());
    }
}
