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

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

/// The ease factor of a card that has never been graded.
pub const DEFAULT_EASE: f64 = 2.5;

/// The ease factor never drops below this.
pub const MIN_EASE: f64 = 1.3;

/// Scheduling information for a card that has been graded at least once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    /// The grade of the most recent review.
    pub grade: Grade,
    /// Days until the card is due, as of the most recent review.
    pub interval: u32,
    /// Multiplier governing interval growth.
    pub ease_factor: f64,
    /// Consecutive reviews since the last `again`.
    pub repetitions: u32,
    /// When the card becomes due.
    pub next_review: Timestamp,
}

impl CardState {
    /// The state of a card with the given grade but no scheduling history.
    /// Used when migrating grade-only data.
    pub fn fresh(grade: Grade, now: Timestamp) -> Self {
        Self {
            grade,
            interval: 0,
            ease_factor: DEFAULT_EASE,
            repetitions: 0,
            next_review: now,
        }
    }

    /// Check the invariants that serde can't express.
    pub fn check(&self) -> Fallible<()> {
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE {
            return fail(format!("ease factor out of range: {}", self.ease_factor));
        }
        Ok(())
    }
}
