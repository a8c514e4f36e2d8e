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

use std::path::Path;

use crate::cmd::Context;
use crate::deck::read_deck;
use crate::error::Fallible;
use crate::error::fail;
use crate::storage::Storage;
use crate::store::Store;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

pub enum Target {
    /// Every card in the store.
    All,
    /// Only these cards.
    Cards(Vec<Card>),
}

pub fn reset_cards(ctx: &mut Context, path: Option<&Path>, all: bool, force: bool) -> Fallible<()> {
    let target = match (path, all) {
        (None, true) => Target::All,
        (Some(path), false) => Target::Cards(read_deck(path)?),
        _ => return fail("pass either a path or --all."),
    };
    let now = Timestamp::now();
    let mut store = ctx.open_store(now)?;
    let backup = ctx.config.backup_before_reset;
    let removed = reset_store(&mut store, &mut ctx.storage, target, backup, force, now)?;
    println!("Reset {removed} cards.");
    Ok(())
}

/// Reset cards, taking a backup first if asked to. If the backup fails, the
/// reset only goes ahead when `force` is set. Returns the number of cards
/// reset.
pub fn reset_store(
    store: &mut Store,
    storage: &mut impl Storage,
    target: Target,
    backup: bool,
    force: bool,
    now: Timestamp,
) -> Fallible<usize> {
    if backup {
        if let Err(e) = store.create_backup(storage, now) {
            if !force {
                return fail(format!(
                    "{}. Pass --force to reset without a backup.",
                    e.message()
                ));
            }
            log::warn!("Resetting without a backup: {}", e.message());
        }
    }
    match target {
        Target::All => {
            let count = store.cards().len();
            store.reset_all(storage)?;
            Ok(count)
        }
        Target::Cards(cards) => store.reset_subset(storage, cards.iter().map(Card::question)),
    }
}
