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

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::store::Store;
use crate::types::card::Card;
use crate::types::card_state::CardState;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

/// The cards that are due, most overdue first. Cards that have never been
/// graded are not due.
pub fn select_due(cards: &[Card], store: &Store, now: Timestamp) -> Vec<Card> {
    let mut due: Vec<(&Card, &CardState)> = unique(cards)
        .filter_map(|card| store.get(card.question()).map(|state| (card, state)))
        .filter(|(_, state)| state.next_review <= now)
        .collect();
    // Stable, so ties stay in document order.
    due.sort_by(|(_, a), (_, b)| compare_due(Some(*a), Some(*b)));
    due.into_iter().map(|(card, _)| card.clone()).collect()
}

/// Order two cards for review. Earlier due dates come first, and a card with
/// state comes before one without.
pub fn compare_due(a: Option<&CardState>, b: Option<&CardState>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.next_review.cmp(&b.next_review),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group the tracked cards by their most recent grade.
pub fn bucket_by_grade(cards: &[Card], store: &Store) -> BTreeMap<Grade, Vec<Card>> {
    let mut buckets: BTreeMap<Grade, Vec<Card>> = BTreeMap::new();
    for card in unique(cards) {
        if let Some(state) = store.get(card.question()) {
            buckets.entry(state.grade).or_default().push(card.clone());
        }
    }
    buckets
}

/// The cards that have been graded at least once, in document order.
pub fn tracked_cards(cards: &[Card], store: &Store) -> Vec<Card> {
    unique(cards)
        .filter(|card| store.get(card.question()).is_some())
        .cloned()
        .collect()
}

/// How many tracked cards are due.
pub fn due_count(store: &Store, now: Timestamp) -> usize {
    store
        .cards()
        .values()
        .filter(|state| state.next_review <= now)
        .count()
}

/// How many cards have state.
pub fn total_tracked_count(store: &Store) -> usize {
    store.cards().len()
}

/// Cards with the same question are the same card. Keep the first.
fn unique(cards: &[Card]) -> impl Iterator<Item = &Card> {
    let mut seen: HashSet<&str> = HashSet::new();
    cards.iter().filter(move |card| seen.insert(card.question()))
}
