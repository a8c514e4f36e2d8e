// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::File;
use std::fs::read_to_string;
use std::fs::rename;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// Somewhere the store can be durably written to.
pub trait Storage {
    /// Durably write the store. When this returns `Ok`, the value has been
    /// persisted.
    fn save(&mut self, value: &Value) -> Fallible<()>;
}

/// Stores the state as a JSON file.
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted value. A missing file reads as `null`.
    pub fn read(&self) -> Fallible<Value> {
        if !self.path.exists() {
            log::debug!("No store at {}.", self.path.display());
            return Ok(Value::Null);
        }
        let content = read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&content).map_err(|e| {
            ErrorReport::new(format!(
                "store file {} is not valid JSON: {e}",
                self.path.display()
            ))
        })
    }
}

impl Storage for JsonFile {
    fn save(&mut self, value: &Value) -> Fallible<()> {
        let content = serde_json::to_string_pretty(value)?;
        // Write to a sibling file and rename it over the old one, so a crash
        // mid-write never leaves a truncated store behind.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let mut file = File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);
        rename(&tmp, &self.path)?;
        log::debug!("Saved store to {}.", self.path.display());
        Ok(())
    }
}

/// Keeps the last saved value in memory. Useful for hosts that persist
/// elsewhere, and for tests.
#[derive(Default)]
pub struct MemoryStorage {
    saved: Option<Value>,
    writes: usize,
    failing: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn saved(&self) -> Option<&Value> {
        self.saved.as_ref()
    }

    /// The number of successful saves.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn save(&mut self, value: &Value) -> Fallible<()> {
        if self.failing {
            return fail("storage is unavailable");
        }
        self.saved = Some(value.clone());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_reads_as_null() -> Fallible<()> {
        let dir = tempdir()?;
        let file = JsonFile::new(dir.path().join("qcards.json"));
        assert_eq!(file.read()?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_save_and_read() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("qcards.json");
        let mut file = JsonFile::new(&path);
        let value = json!({ "cards": {}, "backups": [] });
        file.save(&value)?;
        assert_eq!(file.read()?, value);
        assert!(!dir.path().join("qcards.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_save_replaces_previous_contents() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("qcards.json");
        let mut file = JsonFile::new(&path);
        file.save(&json!({ "cards": { "a": 1, "b": 2 }, "backups": [] }))?;
        let value = json!({ "cards": {}, "backups": [] });
        file.save(&value)?;
        assert_eq!(JsonFile::new(&path).read()?, value);
        assert!(!dir.path().join("qcards.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_invalid_json_is_an_error() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("qcards.json");
        std::fs::write(&path, "{ not json")?;
        let file = JsonFile::new(&path);
        assert!(file.read().is_err());
        Ok(())
    }

    #[test]
    fn test_save_into_missing_directory_fails() -> Fallible<()> {
        let dir = tempdir()?;
        let mut file = JsonFile::new(dir.path().join("nope").join("qcards.json"));
        assert!(file.save(&json!({})).is_err());
        Ok(())
    }

    #[test]
    fn test_memory_storage() -> Fallible<()> {
        let mut storage = MemoryStorage::new();
        storage.save(&json!(1))?;
        storage.set_failing(true);
        assert!(storage.save(&json!(2)).is_err());
        assert_eq!(storage.saved(), Some(&json!(1)));
        assert_eq!(storage.writes(), 1);
        Ok(())
    }
}
