// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The filesystem a pipeline module sees.
//!
//! Paths are transport keys, not host paths. A leading `/` or `./` is
//! ignored and `..` components are refused, so every key stays inside the
//! filesystem root.

mod mem;
mod scratch;

pub use mem::MemFs;
pub use scratch::ScratchDirFs;

use crate::errors::Result;
use std::io;

pub trait VirtualFs: Send {
    /// Write `contents` to `path`, creating parent directories.
    fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<()>;

    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Size of the file at `path` in bytes.
    fn stat(&self, path: &str) -> Result<u64>;

    fn exists(&self, path: &str) -> bool;

    fn remove_file(&mut self, path: &str) -> Result<()>;

    /// Remove the file or directory tree at `path`. A missing path is not an error.
    fn remove_all(&mut self, path: &str) -> Result<()>;

    fn create_dir_all(&mut self, path: &str) -> Result<()>;
}

/// Canonical form of a transport key: `/`-separated, no empty or `.` segments.
pub(crate) fn normalize(path: &str) -> io::Result<String> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("path escapes the filesystem root: {}", path),
                ))
            }
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

/// [`normalize`], refusing keys that name the root itself.
pub(crate) fn normalize_file(path: &str) -> io::Result<String> {
    let normalized = normalize(path)?;
    if normalized.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a file path: '{}'", path),
        ));
    }
    Ok(normalized)
}

pub(crate) fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_markers() {
        assert_eq!(normalize("/work/in.json").unwrap(), "work/in.json");
        assert_eq!(normalize("./work//in.json").unwrap(), "work/in.json");
        assert_eq!(normalize("").unwrap(), "");
    }

    #[test]
    fn test_parent_segments_are_refused() {
        let err = normalize("work/../../etc/passwd").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_root_is_not_a_file() {
        let err = normalize_file("/").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
