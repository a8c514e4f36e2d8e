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

//! qcards: a plain text flashcard scheduler.
//!
//! Cards are written in text files as `#Q question :: answer`. This library
//! provides:
//! - Parsing cards out of text
//! - An SM-2 style scheduler
//! - A JSON-backed store of review state, with backups
//! - Due card selection and a review session state machine

pub mod cli;
pub mod cmd;
pub mod config;
pub mod deck;
pub mod error;
pub mod notice;
pub mod parser;
pub mod scheduler;
pub mod select;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{ErrorReport, Fallible, fail};
pub use notice::{Notice, NoticeKind};
pub use parser::{parse_card_bytes, parse_cards};
pub use scheduler::next_state;
pub use select::{bucket_by_grade, due_count, select_due, total_tracked_count};
pub use session::{Choice, Phase, Session};
pub use storage::{JsonFile, MemoryStorage, Storage};
pub use store::{Backup, Loaded, Store};
pub use types::card::Card;
pub use types::card_state::CardState;
pub use types::grade::Grade;
pub use types::timestamp::Timestamp;
