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

pub mod backup;
pub mod check;
pub mod drill;
pub mod reset;
pub mod stats;

use crate::config::Config;
use crate::error::Fallible;
use crate::notice::Notice;
use crate::storage::JsonFile;
use crate::store::Store;
use crate::types::timestamp::Timestamp;

/// What every command that touches review state needs.
pub struct Context {
    pub config: Config,
    pub storage: JsonFile,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let storage = JsonFile::new(config.store.clone());
        Self { config, storage }
    }

    /// Load the store, telling the user about anything that went wrong.
    pub fn open_store(&self, now: Timestamp) -> Fallible<Store> {
        let raw = self.storage.read()?;
        let loaded = Store::load(raw, now);
        report(&loaded.notices);
        if loaded.migrated {
            log::info!(
                "{} will be rewritten in the new format on the next change.",
                self.storage.path().display()
            );
        }
        Ok(loaded.store)
    }
}

pub fn report(notices: &[Notice]) {
    for notice in notices {
        eprintln!("{notice}");
    }
}
