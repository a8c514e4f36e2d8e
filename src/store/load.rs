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

//! Turning persisted JSON into a [`Store`].
//!
//! Two shapes are understood:
//!
//! - The current one: `{"cards": {question: state}, "backups": [...]}`.
//! - The legacy one, which only recorded the last grade:
//!   `{question: "good", ...}`. Every value is a string.

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::Fallible;
use crate::notice::Notice;
use crate::notice::NoticeKind;
use crate::parser::sanitize;
use crate::store::Backup;
use crate::store::CardStates;
use crate::store::MAX_BACKUPS;
use crate::store::Store;
use crate::store::Unreadable;
use crate::types::card_state::CardState;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

/// The result of loading a store.
pub struct Loaded {
    pub store: Store,
    /// Things the user should know about, e.g. data that couldn't be read.
    pub notices: Vec<Notice>,
    /// Whether the data was in the legacy format. The store is not rewritten
    /// in the new format until its next mutation.
    pub migrated: bool,
}

pub(super) fn load(raw: Value, now: Timestamp) -> Loaded {
    let mut notices = Vec::new();
    let mut migrated = false;
    let store = match raw {
        Value::Null => Store::default(),
        Value::Object(map) => {
            if map.is_empty() {
                Store::default()
            } else if map.values().all(Value::is_string) {
                migrated = true;
                migrate(map, now, &mut notices)
            } else if map.contains_key("cards") {
                load_current(map, &mut notices)
            } else {
                notices.push(Notice::warning(
                    "Saved data has no card states; starting from scratch.",
                ));
                Store::default()
            }
        }
        _ => {
            notices.push(Notice::warning(
                "Saved data is not an object; starting from scratch.",
            ));
            Store::default()
        }
    };
    for notice in notices.iter().filter(|n| n.kind == NoticeKind::Warning) {
        log::warn!("{}", notice.message);
    }
    Loaded {
        store,
        notices,
        migrated,
    }
}

/// Legacy keys are the raw question text, while parsed questions are escaped.
fn migrate(map: Map<String, Value>, now: Timestamp, notices: &mut Vec<Notice>) -> Store {
    let total = map.len();
    let mut cards = CardStates::new();
    let mut dropped = 0;
    for (question, value) in map {
        let Value::String(grade) = value else {
            dropped += 1;
            continue;
        };
        match grade.parse::<Grade>() {
            Ok(grade) => {
                cards
                    .entry(sanitize(question.trim()))
                    .or_insert_with(|| CardState::fresh(grade, now));
            }
            Err(e) => {
                log::debug!("Not migrating {question:?}: {}", e.message());
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        notices.push(Notice::warning(format!(
            "{dropped} of {total} saved grades were not recognized and have been dropped."
        )));
    }
    log::info!("Migrated {} grades from the legacy format.", cards.len());
    notices.push(Notice::info(format!(
        "Upgraded {} saved grades to the new format.",
        cards.len()
    )));
    Store {
        cards,
        ..Store::default()
    }
}

fn load_current(mut map: Map<String, Value>, notices: &mut Vec<Notice>) -> Store {
    let (cards, unreadable) = match map.remove("cards") {
        Some(Value::Object(entries)) => load_cards(entries, notices),
        _ => {
            notices.push(Notice::warning(
                "Saved card states are not an object; starting from scratch.",
            ));
            (CardStates::new(), Unreadable::new())
        }
    };
    let backups = match map.remove("backups") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => load_backups(value, notices),
    };
    Store {
        cards,
        unreadable,
        backups,
    }
}

/// Split entries into valid card states and the ones that can't be read. The
/// latter are kept verbatim so that saving doesn't lose them.
fn load_cards(entries: Map<String, Value>, notices: &mut Vec<Notice>) -> (CardStates, Unreadable) {
    let total = entries.len();
    let mut cards = CardStates::new();
    let mut unreadable = Unreadable::new();
    for (question, value) in entries {
        match parse_state(&value) {
            Ok(state) => {
                cards.insert(question, state);
            }
            Err(e) => {
                log::debug!("Can't read state of {question:?}: {}", e.message());
                unreadable.insert(question, value);
            }
        }
    }
    if !unreadable.is_empty() {
        notices.push(Notice::warning(format!(
            "{} of {total} saved card states are invalid; they are kept but not scheduled.",
            unreadable.len()
        )));
    }
    (cards, unreadable)
}

fn parse_state(value: &Value) -> Fallible<CardState> {
    let state = CardState::deserialize(value)?;
    state.check()?;
    Ok(state)
}

fn load_backups(value: Value, notices: &mut Vec<Notice>) -> Vec<Backup> {
    let backups: Vec<Backup> = match serde_json::from_value(value) {
        Ok(backups) => backups,
        Err(e) => {
            log::debug!("Unreadable backups: {e}");
            notices.push(Notice::warning(
                "Saved backups could not be read and have been dropped.",
            ));
            return Vec::new();
        }
    };
    let total = backups.len();
    let mut backups: Vec<Backup> = backups
        .into_iter()
        .filter(|backup| backup.cards.values().all(|state| state.check().is_ok()))
        .collect();
    if backups.len() < total {
        notices.push(Notice::warning(format!(
            "{} saved backups were invalid and have been dropped.",
            total - backups.len()
        )));
    }
    if backups.len() > MAX_BACKUPS {
        let excess = backups.len() - MAX_BACKUPS;
        backups.drain(..excess);
    }
    backups
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::from_millis(1_700_000_000_000).unwrap()
    }

    fn state_json(grade: &str) -> Value {
        json!({
            "grade": grade,
            "interval": 3,
            "easeFactor": 2.5,
            "repetitions": 2,
            "nextReview": 1_700_000_000_000i64
        })
    }

    fn warnings(loaded: &Loaded) -> usize {
        loaded
            .notices
            .iter()
            .filter(|n| n.kind == NoticeKind::Warning)
            .count()
    }

    #[test]
    fn test_nothing_saved() {
        let loaded = load(Value::Null, now());
        assert_eq!(loaded.store, Store::default());
        assert!(loaded.notices.is_empty());
        assert!(!loaded.migrated);
    }

    #[test]
    fn test_not_an_object() {
        for raw in [json!([1, 2]), json!("cards"), json!(3)] {
            let loaded = load(raw, now());
            assert!(loaded.store.cards().is_empty());
            assert_eq!(warnings(&loaded), 1);
        }
    }

    #[test]
    fn test_current_format() {
        let raw = json!({
            "cards": { "Capital of France": state_json("good") },
            "backups": [
                { "timestamp": 5, "cards": { "Capital of France": state_json("hard") } }
            ]
        });
        let loaded = load(raw, now());
        assert!(loaded.notices.is_empty());
        assert!(!loaded.migrated);
        let state = loaded.store.get("Capital of France").unwrap();
        assert_eq!(state.grade, Grade::Good);
        assert_eq!(state.interval, 3);
        assert_eq!(state.repetitions, 2);
        assert_eq!(loaded.store.backups().len(), 1);
        assert_eq!(loaded.store.backups()[0].cards["Capital of France"].grade, Grade::Hard);
    }

    #[test]
    fn test_round_trip() -> Fallible<()> {
        let raw = json!({
            "cards": { "a": state_json("easy"), "b": state_json("again") },
            "backups": [ { "timestamp": 5, "cards": { "a": state_json("good") } } ]
        });
        let loaded = load(raw.clone(), now());
        assert_eq!(loaded.store.to_json()?, raw);
        Ok(())
    }

    #[test]
    fn test_missing_backups() {
        let loaded = load(json!({ "cards": { "a": state_json("good") } }), now());
        assert!(loaded.notices.is_empty());
        assert!(loaded.store.backups().is_empty());
    }

    #[test]
    fn test_legacy_format() {
        let raw = json!({ "Capital of France": "good", "2+2": "again" });
        let loaded = load(raw, now());
        assert!(loaded.migrated);
        assert_eq!(warnings(&loaded), 0);
        let state = loaded.store.get("Capital of France").unwrap();
        assert_eq!(state.grade, Grade::Good);
        assert_eq!(state.interval, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.next_review, now());
        assert_eq!(loaded.store.get("2+2").unwrap().grade, Grade::Again);
    }

    #[test]
    fn test_legacy_unknown_grades_dropped() {
        let raw = json!({ "a": "good", "b": "forgot", "c": "" });
        let loaded = load(raw, now());
        assert_eq!(loaded.store.cards().len(), 1);
        assert_eq!(warnings(&loaded), 1);
    }

    #[test]
    fn test_legacy_keys_escaped() {
        let raw = json!({ "A & B": "good", "1 < 2": "easy" });
        let loaded = load(raw, now());
        assert_eq!(loaded.store.get("A &amp; B").map(|s| s.grade), Some(Grade::Good));
        assert_eq!(loaded.store.get("1 &lt; 2").map(|s| s.grade), Some(Grade::Easy));
        assert!(loaded.store.get("A & B").is_none());
    }

    #[test]
    fn test_empty_object() {
        let loaded = load(json!({}), now());
        assert!(loaded.store.cards().is_empty());
        assert!(loaded.notices.is_empty());
        assert!(!loaded.migrated);
    }

    #[test]
    fn test_salvage_valid_entries() {
        let raw = json!({
            "cards": {
                "ok": state_json("good"),
                "bad grade": state_json("meh"),
                "missing fields": { "grade": "good" },
                "stringly": {
                    "grade": "good",
                    "interval": "3",
                    "easeFactor": 2.5,
                    "repetitions": 0,
                    "nextReview": 0
                },
                "low ease": {
                    "grade": "hard",
                    "interval": 1,
                    "easeFactor": 0.5,
                    "repetitions": 1,
                    "nextReview": 0
                }
            },
            "backups": []
        });
        let loaded = load(raw.clone(), now());
        assert_eq!(loaded.store.cards().len(), 1);
        assert!(loaded.store.get("ok").is_some());
        assert_eq!(loaded.store.unreadable().len(), 4);
        assert_eq!(loaded.store.unreadable()["low ease"], raw["cards"]["low ease"]);
        assert_eq!(warnings(&loaded), 1);
    }

    #[test]
    fn test_invalid_entries_written_back() -> Fallible<()> {
        let raw = json!({
            "cards": {
                "ok": state_json("good"),
                "fractional": {
                    "grade": "good",
                    "interval": 5.5,
                    "easeFactor": 2.5,
                    "repetitions": 1,
                    "nextReview": 0
                }
            },
            "backups": []
        });
        let loaded = load(raw.clone(), now());
        assert_eq!(loaded.store.to_json()?, raw);
        Ok(())
    }

    #[test]
    fn test_cards_not_an_object() {
        let loaded = load(json!({ "cards": [1, 2, 3], "backups": [] }), now());
        assert!(loaded.store.cards().is_empty());
        assert_eq!(warnings(&loaded), 1);
    }

    #[test]
    fn test_unknown_object() {
        let loaded = load(json!({ "version": 2, "data": {} }), now());
        assert!(loaded.store.cards().is_empty());
        assert_eq!(warnings(&loaded), 1);
    }

    #[test]
    fn test_bad_backups_dropped() {
        let raw = json!({
            "cards": { "a": state_json("good") },
            "backups": "yesterday"
        });
        let loaded = load(raw, now());
        assert_eq!(loaded.store.cards().len(), 1);
        assert!(loaded.store.backups().is_empty());
        assert_eq!(warnings(&loaded), 1);
    }

    #[test]
    fn test_too_many_backups_trimmed() {
        let backups: Vec<Value> = (0..8)
            .map(|i| json!({ "timestamp": i, "cards": {} }))
            .collect();
        let loaded = load(json!({ "cards": {}, "backups": backups }), now());
        assert_eq!(loaded.store.backups().len(), MAX_BACKUPS);
        assert_eq!(loaded.store.backups()[0].timestamp.as_millis(), 3);
    }
}
