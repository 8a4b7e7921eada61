use crate::domain::model::Card;
use crate::domain::ports::DeckSource;
use crate::utils::error::{DixitError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// 從本機目錄載入牌組圖片
#[derive(Debug, Clone)]
pub struct ImageDirectory {
    base_path: PathBuf,
}

impl ImageDirectory {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                IMAGE_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
            .unwrap_or(false)
    }
}

impl DeckSource for ImageDirectory {
    fn load(&self) -> Result<Vec<Card>> {
        if !self.base_path.is_dir() {
            return Err(DixitError::invalid_config(
                "game.image_directory",
                self.base_path.display(),
                "Not a directory",
            ));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.is_file() && Self::is_image(&path) {
                paths.push(path);
            }
        }

        // read_dir order is platform dependent; sort so a seed replays exactly.
        paths.sort();

        tracing::debug!(
            "Found {} images in {}",
            paths.len(),
            self.base_path.display()
        );
        Ok(paths.into_iter().map(Card::new).collect())
    }
}
