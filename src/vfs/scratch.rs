// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{normalize, normalize_file, VirtualFs};
use crate::errors::Result;
use crate::observability::messages::vfs::ScratchCreated;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A host temporary directory, removed on drop.
///
/// WASI modules get this directory preopened as `.`, so a transport key
/// written here is the same relative path the guest opens.
///
/// The guest can create symbolic links inside the preopen. Host-side access
/// never follows one: any link along a key is refused with
/// `PermissionDenied`, except that removal unlinks a final link itself.
#[derive(Debug)]
pub struct ScratchDirFs {
    dir: TempDir,
}

/// Whether the last component of a key may be a symbolic link.
#[derive(Clone, Copy, PartialEq)]
enum FinalLink {
    Refuse,
    Allow,
}

impl ScratchDirFs {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("wasm-bridge-").tempdir()?;
        tracing::debug!("{}", ScratchCreated { root: dir.path() });
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Host path for a normalised key, checked component by component.
    fn host_path(&self, key: &str, final_link: FinalLink) -> io::Result<PathBuf> {
        let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
        let mut path = self.root().to_path_buf();
        let mut missing = false;
        for (i, segment) in segments.iter().enumerate() {
            path.push(segment);
            if missing {
                continue;
            }
            match fs::symlink_metadata(&path) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    let last = i + 1 == segments.len();
                    if !(last && final_link == FinalLink::Allow) {
                        return Err(io::Error::new(
                            io::ErrorKind::PermissionDenied,
                            format!("symbolic link in scratch path '{}'", key),
                        ));
                    }
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => missing = true,
                Err(e) => return Err(e),
            }
        }
        Ok(path)
    }
}

impl VirtualFs for ScratchDirFs {
    fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        let target = self.host_path(&normalize_file(path)?, FinalLink::Refuse)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, contents)?;
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.host_path(&normalize_file(path)?, FinalLink::Refuse)?;
        Ok(fs::read(target)?)
    }

    fn stat(&self, path: &str) -> Result<u64> {
        let target = self.host_path(&normalize_file(path)?, FinalLink::Refuse)?;
        Ok(fs::metadata(target)?.len())
    }

    fn exists(&self, path: &str) -> bool {
        match normalize(path) {
            Ok(key) if key.is_empty() => true,
            Ok(key) => self
                .host_path(&key, FinalLink::Refuse)
                .map(|target| target.exists())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    fn remove_file(&mut self, path: &str) -> Result<()> {
        let target = self.host_path(&normalize_file(path)?, FinalLink::Allow)?;
        fs::remove_file(target)?;
        Ok(())
    }

    fn remove_all(&mut self, path: &str) -> Result<()> {
        let target = self.host_path(&normalize_file(path)?, FinalLink::Allow)?;
        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&target)?,
            Ok(_) => fs::remove_file(&target)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn create_dir_all(&mut self, path: &str) -> Result<()> {
        let key = normalize(path)?;
        if !key.is_empty() {
            fs::create_dir_all(self.host_path(&key, FinalLink::Refuse)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BridgeError;

    #[test]
    fn test_files_land_under_root() {
        let mut fs = ScratchDirFs::new().unwrap();
        fs.write_file("/nested/dir/file.bin", &[1, 2, 3]).unwrap();

        let on_disk = fs.root().join("nested").join("dir").join("file.bin");
        assert_eq!(std::fs::read(on_disk).unwrap(), vec![1, 2, 3]);
        assert_eq!(fs.stat("nested/dir/file.bin").unwrap(), 3);
        assert!(fs.exists("nested/dir"));
    }

    #[test]
    fn test_remove_all_clears_trees_and_tolerates_missing() {
        let mut fs = ScratchDirFs::new().unwrap();
        fs.write_file("surface/index.json", b"{}").unwrap();
        fs.write_file("surface/data/pts.bin", &[0; 12]).unwrap();
        fs.write_file("labels.txt", b"x").unwrap();

        fs.remove_all("surface").unwrap();
        fs.remove_all("labels.txt").unwrap();
        fs.remove_all("never/written").unwrap();

        assert!(!fs.exists("surface"));
        assert!(!fs.exists("labels.txt"));
        assert!(fs.root().exists());
    }

    #[test]
    fn test_directory_is_removed_on_drop() {
        let fs = ScratchDirFs::new().unwrap();
        let root = fs.root().to_path_buf();
        drop(fs);
        assert!(!root.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_links_out_of_the_root_are_not_followed() {
        use std::os::unix::fs::symlink;

        let outside = tempfile::tempdir().unwrap();
        let secret = outside.path().join("secret.txt");
        std::fs::write(&secret, b"HOST SECRET").unwrap();

        let mut fs = ScratchDirFs::new().unwrap();
        symlink(&secret, fs.root().join("out.txt")).unwrap();
        symlink(outside.path(), fs.root().join("shared")).unwrap();

        fn denied<T>(result: Result<T>) -> bool {
            matches!(result, Err(BridgeError::Io(e)) if e.kind() == io::ErrorKind::PermissionDenied)
        }
        assert!(denied(fs.read_file("out.txt")));
        assert!(denied(fs.stat("out.txt")));
        assert!(denied(fs.read_file("shared/secret.txt")));
        assert!(!fs.exists("out.txt"));
        assert!(!fs.exists("shared/secret.txt"));

        assert!(denied(fs.write_file("out.txt", b"overwrite")));
        assert!(denied(fs.write_file("shared/new.txt", b"planted")));
        assert!(denied(fs.create_dir_all("shared/sub")));
        assert!(!outside.path().join("new.txt").exists());

        fs.remove_all("out.txt").unwrap();
        fs.remove_all("shared").unwrap();
        assert_eq!(std::fs::read(&secret).unwrap(), b"HOST SECRET");
        assert!(outside.path().exists());
        assert!(!fs.root().join("out.txt").exists());
    }
}
