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

mod load;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

pub use crate::store::load::Loaded;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::scheduler::next_state;
use crate::storage::Storage;
use crate::types::card_state::CardState;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

/// The maximum number of backups kept. Older ones are evicted first.
pub const MAX_BACKUPS: usize = 5;

/// Map of question text to scheduling state.
pub type CardStates = BTreeMap<String, CardState>;

/// Saved card states that could not be read, kept exactly as they were found.
pub type Unreadable = BTreeMap<String, Value>;

/// All persisted state.
///
/// Every mutation builds the complete next store, hands it to a [`Storage`],
/// and only replaces `self` once the write has succeeded. So if a method
/// returns an error, the store is exactly as it was before the call.
///
/// Saved entries that don't parse as card states are not scheduled, but they
/// are written back unchanged until the card is graded or reset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Store {
    cards: CardStates,
    unreadable: Unreadable,
    backups: Vec<Backup>,
}

/// A snapshot of the card states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub timestamp: Timestamp,
    pub cards: CardStates,
}

impl Store {
    /// Build a store from previously persisted data. This never fails: data
    /// that can't be used is dropped, and the returned notices say what was
    /// lost.
    pub fn load(raw: Value, now: Timestamp) -> Loaded {
        load::load(raw, now)
    }

    pub fn get(&self, question: &str) -> Option<&CardState> {
        self.cards.get(question)
    }

    pub fn cards(&self) -> &CardStates {
        &self.cards
    }

    pub fn unreadable(&self) -> &Unreadable {
        &self.unreadable
    }

    /// Backups, oldest first.
    pub fn backups(&self) -> &[Backup] {
        &self.backups
    }

    pub fn to_json(&self) -> Fallible<Value> {
        let mut cards: Map<String, Value> = self
            .unreadable
            .iter()
            .map(|(question, raw)| (question.clone(), raw.clone()))
            .collect();
        for (question, state) in &self.cards {
            cards.insert(question.clone(), serde_json::to_value(state)?);
        }
        let mut root = Map::new();
        root.insert("cards".to_string(), Value::Object(cards));
        root.insert("backups".to_string(), serde_json::to_value(&self.backups)?);
        Ok(Value::Object(root))
    }

    /// Record a card's new state.
    pub fn commit(
        &mut self,
        storage: &mut impl Storage,
        question: &str,
        state: CardState,
    ) -> Fallible<()> {
        if question.is_empty() {
            return fail("cannot store state for an empty question");
        }
        state.check()?;
        let mut next = self.clone();
        next.unreadable.remove(question);
        next.cards.insert(question.to_string(), state);
        self.apply(storage, next)
    }

    /// Grade a card, and record its new state.
    pub fn grade(
        &mut self,
        storage: &mut impl Storage,
        question: &str,
        grade: Grade,
        now: Timestamp,
    ) -> Fallible<CardState> {
        let state = next_state(self.get(question), grade, now);
        log::debug!(
            "{question:?} {grade} interval={}d ease={:.2} reps={} due={}",
            state.interval,
            state.ease_factor,
            state.repetitions,
            state.next_review
        );
        self.commit(storage, question, state.clone())?;
        Ok(state)
    }

    /// Snapshot the current card states. If this fails, no backup was taken
    /// and the store is unchanged.
    pub fn create_backup(&mut self, storage: &mut impl Storage, now: Timestamp) -> Fallible<()> {
        let mut next = self.clone();
        next.backups.push(Backup {
            timestamp: now,
            cards: self.cards.clone(),
        });
        if next.backups.len() > MAX_BACKUPS {
            let excess = next.backups.len() - MAX_BACKUPS;
            next.backups.drain(..excess);
        }
        self.apply(storage, next)
            .map_err(|e| ErrorReport::new(format!("could not create backup: {}", e.message())))?;
        log::info!("Backed up {} card states.", self.cards.len());
        Ok(())
    }

    /// Replace the card states with a backup. `index` counts from the oldest
    /// backup; `None` means the most recent one. Backups are kept. Unreadable
    /// entries are not part of any backup, so they are discarded.
    pub fn restore_from_backup(
        &mut self,
        storage: &mut impl Storage,
        index: Option<usize>,
    ) -> Fallible<()> {
        if self.backups.is_empty() {
            return fail("there are no backups to restore.");
        }
        let index = index.unwrap_or(self.backups.len() - 1);
        let Some(backup) = self.backups.get(index) else {
            return fail(format!(
                "no backup at index {index}: there are {} backups.",
                self.backups.len()
            ));
        };
        let mut next = self.clone();
        next.cards = backup.cards.clone();
        next.unreadable.clear();
        self.apply(storage, next)?;
        log::info!("Restored backup {index} with {} card states.", self.cards.len());
        Ok(())
    }

    /// Forget every card's state.
    pub fn reset_all(&mut self, storage: &mut impl Storage) -> Fallible<()> {
        let mut next = self.clone();
        next.cards.clear();
        next.unreadable.clear();
        self.apply(storage, next)
    }

    /// Forget the state of the given cards. Returns how many were removed.
    pub fn reset_subset<I, Q>(&mut self, storage: &mut impl Storage, questions: I) -> Fallible<usize>
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<str>,
    {
        let mut next = self.clone();
        let mut removed = 0;
        for question in questions {
            let question = question.as_ref();
            let state = next.cards.remove(question);
            let raw = next.unreadable.remove(question);
            if state.is_some() || raw.is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            self.apply(storage, next)?;
        }
        Ok(removed)
    }

    fn apply(&mut self, storage: &mut impl Storage, next: Store) -> Fallible<()> {
        let value = next.to_json()?;
        storage.save(&value)?;
        *self = next;
        Ok(())
    }
}
