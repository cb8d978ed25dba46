//! Filesystem helpers for moving rendered files into place.

use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// EXDEV on Linux and macOS.
const CROSS_DEVICE_ERRNO: i32 = 18;

/// Move a file, falling back to copy-and-delete when source and destination
/// live on different filesystems.
///
/// The fallback copies to a sibling temp file first and renames it into place
/// so the destination never holds a half-written file.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(CROSS_DEVICE_ERRNO) => {
            debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Cross-device rename, copying instead"
            );
            copy_across_devices(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

async fn copy_across_devices(src: &Path, dst: &Path) -> MediaResult<()> {
    let staged = dst.with_extension("part");

    fs::copy(src, &staged).await?;

    if let Err(e) = fs::rename(&staged, dst).await {
        let _ = std::fs::remove_file(&staged);
        return Err(MediaError::from(e));
    }

    // Source removal is best effort; the move itself already succeeded
    if let Err(e) = fs::remove_file(src).await {
        warn!(src = %src.display(), "Failed to remove source after move: {}", e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_within_filesystem() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.mp4");
        let dst = dir.path().join("b.mp4");

        fs::write(&src, b"payload").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_move_creates_parent() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.mp4");
        let dst = dir.path().join("nested/deep/b.mp4");

        fs::write(&src, b"payload").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(dst.exists());
    }

    #[tokio::test]
    async fn test_move_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.mp4");
        let dst = dir.path().join("b.mp4");

        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
    }
}
