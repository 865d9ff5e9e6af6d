//! Destinations for exported files.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use ml_core::ExportFile;

/// Something that can persist an exported file.
pub trait ArtifactSink {
    /// Saves `file` and returns where it ended up.
    fn save(&self, file: &ExportFile) -> Result<PathBuf>;
}

/// Writes exported files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirectorySink {
    /// Writes atomically by writing to a .tmp file then renaming.
    fn save(&self, file: &ExportFile) -> Result<PathBuf> {
        if !is_plain_file_name(&file.file_name) {
            bail!("refusing to write outside {}: {}", self.dir.display(), file.file_name);
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.dir.join(&file.file_name);
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &file.contents)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;

        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("failed to write {}", path.display()));
        }

        tracing::debug!(path = %path.display(), bytes = file.contents.len(), "saved export");
        Ok(path)
    }
}

/// True when `name` is exactly one normal path component.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
