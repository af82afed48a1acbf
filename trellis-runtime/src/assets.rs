// Asset resolution for SVG sources.
//
// A missing or unreadable asset is never fatal: the input is forwarded as
// literal inline content and a warning is logged.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::{TrellisError, TrellisResult};
use crate::logging::LOG_WARNING;
use crate::tlog;

/// Loads asset bytes by path.
pub trait AssetSource: Send + Sync + 'static {
    fn load(&self, path: &str) -> TrellisResult<Cow<'static, [u8]>>;
}

/// Reads assets from the filesystem, relative to `root`.
#[derive(Clone, Debug)]
pub struct FileAssets {
    root: PathBuf,
}

impl FileAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileAssets { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for FileAssets {
    fn default() -> Self {
        FileAssets::new(".")
    }
}

impl AssetSource for FileAssets {
    fn load(&self, path: &str) -> TrellisResult<Cow<'static, [u8]>> {
        let full = self.root.join(path);
        std::fs::read(&full)
            .map(Cow::Owned)
            .map_err(|e| TrellisError::Asset {
                path: full.display().to_string(),
                message: e.to_string(),
            })
    }
}

/// Treats every path as the content itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineAssets;

impl AssetSource for InlineAssets {
    fn load(&self, path: &str) -> TrellisResult<Cow<'static, [u8]>> {
        Ok(Cow::Owned(path.as_bytes().to_vec()))
    }
}

fn source_slot() -> &'static RwLock<Arc<dyn AssetSource>> {
    static SOURCE: OnceLock<RwLock<Arc<dyn AssetSource>>> = OnceLock::new();
    SOURCE.get_or_init(|| RwLock::new(Arc::new(FileAssets::default())))
}

/// Replace the process-wide asset source (default: [`FileAssets`] rooted at `.`).
pub fn set_asset_source(source: impl AssetSource) {
    let mut slot = source_slot()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = Arc::new(source);
}

fn current_source() -> Arc<dyn AssetSource> {
    source_slot()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Markup is passed through untouched; anything else is looked up.
fn looks_inline(input: &str) -> bool {
    let trimmed = input.trim_start();
    trimmed.starts_with("<svg") || trimmed.starts_with("<?xml")
}

/// Resolve an SVG source to the bytes sent to the native side.
pub(crate) fn resolve(input: &str) -> Vec<u8> {
    if looks_inline(input) {
        return input.as_bytes().to_vec();
    }
    match current_source().load(input) {
        Ok(bytes) => bytes.into_owned(),
        Err(e) => {
            tlog!(LOG_WARNING, "{e}; using the input as inline SVG content");
            input.as_bytes().to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_never_looked_up() {
        assert!(looks_inline("  <svg viewBox=\"0 0 1 1\"/>"));
        assert!(looks_inline("<?xml version=\"1.0\"?><svg/>"));
        assert!(!looks_inline("icons/arrow.svg"));
    }

    #[test]
    fn file_assets_read_relative_to_root() {
        let dir = std::env::temp_dir().join(format!("trellis-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("check.svg"), b"<svg id=\"check\"/>").unwrap();

        let assets = FileAssets::new(&dir);
        assert_eq!(assets.load("check.svg").unwrap().as_ref(), b"<svg id=\"check\"/>");
        assert!(matches!(assets.load("missing.svg"), Err(TrellisError::Asset { .. })));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_asset_falls_back_to_inline_with_warning() {
        crate::testing::install();
        // The default source is FileAssets("."); this path does not exist.
        let bytes = resolve("does/not/exist-7f3a.svg");
        assert_eq!(bytes, b"does/not/exist-7f3a.svg");
        assert!(crate::testing::logs()
            .iter()
            .any(|(level, msg)| *level == LOG_WARNING && msg.contains("exist-7f3a.svg")));
    }

    #[test]
    fn inline_assets_pass_paths_through() {
        assert_eq!(InlineAssets.load("raw").unwrap().as_ref(), b"raw");
    }
}
