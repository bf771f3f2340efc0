//! Pre-build hook module
//!
//! Opportunistic convenience step run before template expansion: copy the
//! most recently modified file matching a glob pattern (typically a browser
//! download) over a fixed destination, only when the match is newer. The
//! hook is best-effort; every failure is logged and swallowed so it can
//! never fail a build.

use crate::config::PrebuildConfig;
use crate::logger;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Run the copy-latest-export step if it is configured.
pub fn copy_latest_export(cfg: &PrebuildConfig, include_base: &Path) {
    if !cfg.enabled || cfg.pattern.is_empty() || cfg.dest.is_empty() {
        return;
    }
    let dest = include_base.join(&cfg.dest);

    let Some((source, source_mtime)) = latest_match(&cfg.pattern) else {
        logger::log_warning(&format!("Prebuild: no file matches '{}'", cfg.pattern));
        return;
    };

    // Only copy when the export is newer than what is already in place.
    if let Some(dest_mtime) = mtime(&dest) {
        if source_mtime <= dest_mtime {
            return;
        }
    }

    match std::fs::copy(&source, &dest) {
        Ok(_) => logger::log_prebuild_copied(&source, &dest),
        Err(e) => logger::log_warning(&format!(
            "Prebuild: failed to copy '{}' to '{}': {e}",
            source.display(),
            dest.display()
        )),
    }
}

/// Most recently modified file matching `pattern`, if any.
fn latest_match(pattern: &str) -> Option<(PathBuf, SystemTime)> {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(e) => {
            logger::log_warning(&format!("Prebuild: bad glob pattern '{pattern}': {e}"));
            return None;
        }
    };
    paths
        .flatten()
        .filter_map(|p| mtime(&p).map(|t| (p, t)))
        .max_by_key(|(_, t)| *t)
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.modified().ok()
}
