// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{normalize, normalize_file, not_found, VirtualFs};
use crate::errors::Result;
use std::collections::{BTreeMap, BTreeSet};

/// In-memory filesystem, for modules that run inside the host process.
#[derive(Debug, Default, Clone)]
pub struct MemFs {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized paths of every file, in order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    fn add_parents(&mut self, path: &str) {
        let mut parent = path;
        while let Some((head, _)) = parent.rsplit_once('/') {
            self.dirs.insert(head.to_string());
            parent = head;
        }
    }
}

impl VirtualFs for MemFs {
    fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        let key = normalize_file(path)?;
        self.add_parents(&key);
        self.files.insert(key, contents.to_vec());
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let key = normalize_file(path)?;
        self.files
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(path).into())
    }

    fn stat(&self, path: &str) -> Result<u64> {
        let key = normalize_file(path)?;
        self.files
            .get(&key)
            .map(|contents| contents.len() as u64)
            .ok_or_else(|| not_found(path).into())
    }

    fn exists(&self, path: &str) -> bool {
        match normalize(path) {
            Ok(key) if key.is_empty() => true,
            Ok(key) => self.files.contains_key(&key) || self.dirs.contains(&key),
            Err(_) => false,
        }
    }

    fn remove_file(&mut self, path: &str) -> Result<()> {
        let key = normalize_file(path)?;
        self.files
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| not_found(path).into())
    }

    fn remove_all(&mut self, path: &str) -> Result<()> {
        let key = normalize_file(path)?;
        let prefix = format!("{}/", key);
        self.files.retain(|name, _| *name != key && !name.starts_with(&prefix));
        self.dirs.retain(|name| *name != key && !name.starts_with(&prefix));
        Ok(())
    }

    fn create_dir_all(&mut self, path: &str) -> Result<()> {
        let key = normalize(path)?;
        if !key.is_empty() {
            self.add_parents(&key);
            self.dirs.insert(key);
        }
        Ok(())
    }
}
