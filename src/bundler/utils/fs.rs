//! File system utilities for staging the disk image contents.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::io;
use std::path::Path;
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Copies a regular file, creating the destination's parent directories.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Makes a symbolic link at `dst` pointing to `src`.
pub async fn symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::symlink(src, dst).await.fs_context("creating symlink", dst)
}

/// Recursively copies a directory, preserving symlinks.
///
/// Application bundles rely on relative symlinks inside frameworks, so links
/// are recreated rather than followed. Fails if `from` is not a directory.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!("{from:?} is not a directory")));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry.map_err(|e| Error::GenericError(format!("walking {from:?}: {e}")))?;
            let rel_path = entry
                .path()
                .strip_prefix(&from)
                .map_err(|e| Error::GenericError(e.to_string()))?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path()).fs_context("reading symlink", entry.path())?;
                std::os::unix::fs::symlink(&target, &dest_path)
                    .fs_context("creating symlink", &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path).fs_context("copying file", entry.path())?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copy_dir_preserves_symlinks() {
        let scratch = tempfile::tempdir().unwrap();
        let src = scratch.path().join("Lungo.app");
        std::fs::create_dir_all(src.join("Contents/Frameworks/A.framework/Versions/A")).unwrap();
        std::fs::write(src.join("Contents/Info.plist"), b"plist").unwrap();
        std::os::unix::fs::symlink(
            "Versions/A",
            src.join("Contents/Frameworks/A.framework/Current"),
        )
        .unwrap();

        let dst = scratch.path().join("staging/Lungo.app");
        copy_dir(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read(dst.join("Contents/Info.plist")).unwrap(), b"plist");
        let link = dst.join("Contents/Frameworks/A.framework/Current");
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_link(link).unwrap(), Path::new("Versions/A"));
    }

    #[tokio::test]
    async fn copy_dir_rejects_files() {
        let scratch = tempfile::tempdir().unwrap();
        let file = scratch.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(copy_dir(&file, &scratch.path().join("out")).await.is_err());
    }

    #[tokio::test]
    async fn removal_is_idempotent() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().join("gone");
        remove_dir_all(&dir).await.unwrap();
        remove_file(&dir.join("x")).await.unwrap();
        create_dir_all(&dir, true).await.unwrap();
        assert!(dir.is_dir());
    }
}
