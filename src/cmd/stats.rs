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

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::cmd::Context;
use crate::deck::read_deck;
use crate::error::Fallible;
use crate::select::bucket_by_grade;
use crate::select::due_count;
use crate::select::select_due;
use crate::select::total_tracked_count;
use crate::select::tracked_cards;
use crate::store::Store;
use crate::types::card::Card;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_deck_stats(ctx: &Context, path: &Path, format: StatsFormat) -> Fallible<()> {
    let now = Timestamp::now();
    let deck = read_deck(path)?;
    let store = ctx.open_store(now)?;
    let stats = compute_stats(&deck, &store, now);
    match format {
        StatsFormat::Text => {
            println!("Cards in deck:   {}", stats.cards_in_deck_count);
            println!("Tracked in deck: {}", stats.tracked_in_deck_count);
            println!("Due in deck:     {}", stats.due_in_deck_count);
            for (grade, count) in &stats.grades {
                println!("  {:<5}          {count}", grade.as_str());
            }
            println!("Tracked overall: {}", stats.tracked_count);
            println!("Due overall:     {}", stats.due_count);
            println!("Backups:         {}", stats.backup_count);
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

pub fn compute_stats(deck: &[Card], store: &Store, now: Timestamp) -> Stats {
    let grades = bucket_by_grade(deck, store)
        .into_iter()
        .map(|(grade, cards)| (grade, cards.len()))
        .collect();
    Stats {
        cards_in_deck_count: deck.len(),
        tracked_in_deck_count: tracked_cards(deck, store).len(),
        due_in_deck_count: select_due(deck, store, now).len(),
        grades,
        tracked_count: total_tracked_count(store),
        due_count: due_count(store, now),
        backup_count: store.backups().len(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    cards_in_deck_count: usize,
    tracked_in_deck_count: usize,
    due_in_deck_count: usize,
    /// Tracked cards in the deck, by last grade.
    grades: BTreeMap<Grade, usize>,
    tracked_count: usize,
    due_count: usize,
    backup_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_compute_stats() -> Fallible<()> {
        let now = Timestamp::from_millis(0)?;
        let mut store = Store::default();
        let mut storage = MemoryStorage::new();
        store.grade(&mut storage, "a", Grade::Again, now)?;
        store.grade(&mut storage, "b", Grade::Easy, now)?;
        store.grade(&mut storage, "elsewhere", Grade::Again, now)?;
        store.create_backup(&mut storage, now)?;
        let deck = vec![
            Card::new("a", "1", (1, 1)),
            Card::new("b", "2", (2, 2)),
            Card::new("c", "3", (3, 3)),
        ];
        let stats = compute_stats(&deck, &store, now);
        let json = serde_json::to_value(&stats)?;
        assert_eq!(
            json,
            serde_json::json!({
                "cardsInDeckCount": 3,
                "trackedInDeckCount": 2,
                "dueInDeckCount": 1,
                "grades": { "again": 1, "easy": 1 },
                "trackedCount": 3,
                "dueCount": 2,
                "backupCount": 1
            })
        );
        Ok(())
    }
}
