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

use std::collections::HashMap;
use std::path::Path;

use crate::deck::read_deck;
use crate::error::Fallible;
use crate::types::card::Card;

pub fn check_deck(path: &Path) -> Fallible<()> {
    let deck = read_deck(path)?;
    for (question, lines) in duplicates(&deck) {
        eprintln!("warning: {question:?} appears more than once (lines {lines:?}).");
    }
    println!("ok: {} cards", deck.len());
    Ok(())
}

/// Questions that appear more than once, with the first line of each
/// occurrence. Duplicates share their review state.
fn duplicates(deck: &[Card]) -> Vec<(&str, Vec<usize>)> {
    let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for card in deck {
        let lines = seen.entry(card.question()).or_default();
        if lines.is_empty() {
            order.push(card.question());
        }
        lines.push(card.lines().0);
    }
    order
        .into_iter()
        .filter_map(|question| {
            let lines = seen.remove(question)?;
            (lines.len() > 1).then_some((question, lines))
        })
        .collect()
}
