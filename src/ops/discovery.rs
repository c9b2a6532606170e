use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LoopResult;

/// Finds the video that belongs to a sidecar file: a regular file in the same
/// directory with the same base name and any other extension. Candidates are
/// checked in name order.
pub fn find_sibling_video(sidecar: &Path) -> LoopResult<Option<PathBuf>> {
    let Some(stem) = sidecar.file_stem() else {
        return Ok(None);
    };
    let own_name = sidecar.file_name();
    let dir = match sidecar.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut candidates: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.file_name() != own_name)
        .filter(|path| path.file_stem() == Some(stem))
        .filter(|path| path.is_file())
        .collect();
    candidates.sort();

    let found = candidates.into_iter().next();
    if let Some(video) = &found {
        tracing::debug!(video = %video.display(), "found sibling video");
    }
    Ok(found)
}
