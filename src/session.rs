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
use std::collections::VecDeque;

use crate::error::Fallible;
use crate::error::fail;
use crate::select::bucket_by_grade;
use crate::select::select_due;
use crate::select::tracked_cards;
use crate::storage::Storage;
use crate::store::Store;
use crate::types::card::Card;
use crate::types::card_state::CardState;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// No deck loaded.
    Idle,
    /// A deck is loaded, and the user is choosing what to review.
    Selecting,
    /// Going through the queue.
    Reviewing,
    /// The queue is done (or the session was ended early).
    Summarizing,
}

/// Which cards to review.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Choice {
    /// Cards that are due.
    Due,
    /// Every card in the deck.
    All,
    /// Every card that has been graded before.
    Tracked,
    /// Cards whose last grade was the given one.
    Bucket(Grade),
}

/// A review session.
///
/// Gradings are committed to the store one at a time, so ending a session
/// early keeps the gradings made so far.
pub struct Session {
    phase: Phase,
    deck: Vec<Card>,
    queue: VecDeque<Card>,
    revealed: bool,
    reviewed: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            deck: Vec::new(),
            queue: VecDeque::new(),
            revealed: false,
            reviewed: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    /// Load a deck.
    pub fn start(&mut self, deck: Vec<Card>) -> Fallible<()> {
        self.expect(&[Phase::Idle], "start")?;
        if deck.is_empty() {
            return fail("no flashcards found.");
        }
        self.deck = deck;
        self.phase = Phase::Selecting;
        Ok(())
    }

    /// The cards a choice would review, in review order.
    pub fn candidates(&self, choice: Choice, store: &Store, now: Timestamp) -> Vec<Card> {
        match choice {
            Choice::Due => select_due(&self.deck, store, now),
            Choice::All => self.deck.clone(),
            Choice::Tracked => tracked_cards(&self.deck, store),
            Choice::Bucket(grade) => bucket_by_grade(&self.deck, store)
                .remove(&grade)
                .unwrap_or_default(),
        }
    }

    /// Begin reviewing. If there is nothing to review, nothing changes.
    pub fn choose(&mut self, choice: Choice, store: &Store, now: Timestamp) -> Fallible<()> {
        self.expect(&[Phase::Selecting, Phase::Summarizing], "choose cards")?;
        let queue = self.candidates(choice, store, now);
        if queue.is_empty() {
            return fail("no cards to review.");
        }
        log::debug!("Reviewing {} cards ({choice:?}).", queue.len());
        self.queue = queue.into();
        self.revealed = false;
        self.reviewed = 0;
        self.phase = Phase::Reviewing;
        Ok(())
    }

    /// The card being reviewed.
    pub fn current(&self) -> Option<&Card> {
        match self.phase {
            Phase::Reviewing => self.queue.front(),
            _ => None,
        }
    }

    pub fn reveal(&mut self) -> Fallible<()> {
        self.expect(&[Phase::Reviewing], "reveal")?;
        self.revealed = true;
        Ok(())
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Cards left in the queue, including the current one.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Cards graded in this round.
    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    /// Grade the current card. The card only leaves the queue once its new
    /// state has been saved.
    pub fn grade(
        &mut self,
        store: &mut Store,
        storage: &mut impl Storage,
        grade: Grade,
        now: Timestamp,
    ) -> Fallible<CardState> {
        self.expect(&[Phase::Reviewing], "grade")?;
        if !self.revealed {
            return fail("reveal the answer before grading.");
        }
        let Some(card) = self.queue.front() else {
            return fail("no card to grade.");
        };
        let state = store.grade(storage, card.question(), grade, now)?;
        self.queue.pop_front();
        self.revealed = false;
        self.reviewed += 1;
        if self.queue.is_empty() {
            log::debug!("Session completed.");
            self.phase = Phase::Summarizing;
        }
        Ok(state)
    }

    /// Stop reviewing. Gradings made so far are kept.
    pub fn end(&mut self) -> Fallible<()> {
        self.expect(&[Phase::Reviewing], "end")?;
        self.queue.clear();
        self.revealed = false;
        self.phase = Phase::Summarizing;
        Ok(())
    }

    /// The deck's tracked cards grouped by last grade.
    pub fn summary(&self, store: &Store) -> BTreeMap<Grade, Vec<Card>> {
        bucket_by_grade(&self.deck, store)
    }

    /// Close the session.
    pub fn finish(&mut self) {
        *self = Self::new();
    }

    fn expect(&self, allowed: &[Phase], action: &str) -> Fallible<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            fail(format!("cannot {action} while {:?}.", self.phase))
        }
    }
}
