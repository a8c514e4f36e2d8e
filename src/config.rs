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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

/// Looked for in the working directory when no config file is given.
pub const CONFIG_FILE_NAME: &str = "qcards.toml";

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where review state is kept. Relative paths are relative to the config
    /// file.
    pub store: PathBuf,
    /// Whether to take a backup before resetting cards.
    pub backup_before_reset: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: PathBuf::from("qcards.json"),
            backup_before_reset: true,
        }
    }
}

impl Config {
    /// Load the given config file, or `qcards.toml` if it exists, or the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return fail("config file does not exist.");
                }
                Self::from_file(path)
            }
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        Ok(toml::from_str(content)?)
    }

    fn from_file(path: &Path) -> Fallible<Self> {
        log::debug!("Reading config from {}.", path.display());
        let mut config = Self::parse(&read_to_string(path)?)?;
        if config.store.is_relative() {
            if let Some(parent) = path.parent() {
                config.store = parent.join(&config.store);
            }
        }
        Ok(config)
    }
}
