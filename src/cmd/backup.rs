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

use crate::cmd::Context;
use crate::error::Fallible;
use crate::store::MAX_BACKUPS;
use crate::types::timestamp::Timestamp;

pub fn create_backup(ctx: &mut Context) -> Fallible<()> {
    let now = Timestamp::now();
    let mut store = ctx.open_store(now)?;
    store.create_backup(&mut ctx.storage, now)?;
    println!(
        "Backed up {} cards ({} of {MAX_BACKUPS} backups).",
        store.cards().len(),
        store.backups().len()
    );
    Ok(())
}

pub fn list_backups(ctx: &Context) -> Fallible<()> {
    let store = ctx.open_store(Timestamp::now())?;
    if store.backups().is_empty() {
        println!("No backups.");
    }
    for (index, backup) in store.backups().iter().enumerate() {
        println!("{index}: {} ({} cards)", backup.timestamp, backup.cards.len());
    }
    Ok(())
}

pub fn restore_backup(ctx: &mut Context, index: Option<usize>) -> Fallible<()> {
    let mut store = ctx.open_store(Timestamp::now())?;
    store.restore_from_backup(&mut ctx.storage, index)?;
    println!("Restored {} cards.", store.cards().len());
    Ok(())
}
