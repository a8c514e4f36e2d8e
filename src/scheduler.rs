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

//! An SM-2 variant with four grades.

use crate::types::card_state::CardState;
use crate::types::card_state::DEFAULT_EASE;
use crate::types::card_state::MIN_EASE;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

/// Ease lost on `again`.
const AGAIN_PENALTY: f64 = 0.2;

/// Ease lost on `hard`.
const HARD_PENALTY: f64 = 0.15;

/// Ease gained on `easy`.
const EASY_BONUS: f64 = 0.15;

/// Interval multiplier for `hard`, in place of the ease factor.
const HARD_MULTIPLIER: f64 = 1.2;

/// Extra interval multiplier for `easy`.
const EASY_MULTIPLIER: f64 = 1.3;

/// Compute a card's state after it is graded. A card with no state is
/// treated as new.
pub fn next_state(current: Option<&CardState>, grade: Grade, now: Timestamp) -> CardState {
    let (interval, ease, reps) = match current {
        Some(state) => (state.interval, state.ease_factor, state.repetitions),
        None => (0, DEFAULT_EASE, 0),
    };
    let (interval, ease_factor, repetitions) = match grade {
        Grade::Again => (0, (ease - AGAIN_PENALTY).max(MIN_EASE), 0),
        Grade::Hard => {
            let interval = match reps {
                0 => 1,
                1 => 3,
                _ => scale(interval, HARD_MULTIPLIER).max(1),
            };
            (interval, (ease - HARD_PENALTY).max(MIN_EASE), reps.saturating_add(1))
        }
        Grade::Good => {
            let interval = match reps {
                0 => 1,
                1 => 3,
                _ => scale(interval, ease),
            };
            (interval, ease, reps.saturating_add(1))
        }
        Grade::Easy => {
            let interval = match reps {
                0 => 3,
                1 => 7,
                _ => scale(interval, ease * EASY_MULTIPLIER),
            };
            (interval, ease + EASY_BONUS, reps.saturating_add(1))
        }
    };
    CardState {
        grade,
        interval,
        ease_factor,
        repetitions,
        next_review: now.plus_days(interval),
    }
}

/// Multiply an interval, rounding to the nearest day.
fn scale(interval: u32, factor: f64) -> u32 {
    let days = (f64::from(interval) * factor).round();
    // Saturates rather than wrapping for absurdly long intervals.
    days as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::timestamp::MILLIS_PER_DAY;

    fn state(interval: u32, ease_factor: f64, repetitions: u32) -> CardState {
        CardState {
            grade: Grade::Good,
            interval,
            ease_factor,
            repetitions,
            next_review: Timestamp::now(),
        }
    }

    #[test]
    fn test_new_card() -> Fallible<()> {
        let now = Timestamp::from_millis(1_000_000)?;
        let cases = [
            (Grade::Again, 0, 2.3, 0),
            (Grade::Hard, 1, 2.35, 1),
            (Grade::Good, 1, 2.5, 1),
            (Grade::Easy, 3, 2.65, 1),
        ];
        for (grade, interval, ease, reps) in cases {
            let next = next_state(None, grade, now);
            assert_eq!(next.grade, grade);
            assert_eq!(next.interval, interval);
            assert!((next.ease_factor - ease).abs() < 1e-9, "{grade}");
            assert_eq!(next.repetitions, reps);
            assert_eq!(
                next.next_review.as_millis(),
                now.as_millis() + i64::from(interval) * MILLIS_PER_DAY
            );
        }
        Ok(())
    }

    #[test]
    fn test_repetitions_saturate() {
        let now = Timestamp::now();
        let worn = state(10, 2.5, u32::MAX);
        for grade in [Grade::Hard, Grade::Good, Grade::Easy] {
            let next = next_state(Some(&worn), grade, now);
            assert_eq!(next.repetitions, u32::MAX, "{grade}");
        }
        assert_eq!(next_state(Some(&worn), Grade::Again, now).repetitions, 0);
    }

    #[test]
    fn test_good_sequence() {
        let now = Timestamp::now();
        let first = next_state(None, Grade::Good, now);
        let second = next_state(Some(&first), Grade::Good, now);
        let third = next_state(Some(&second), Grade::Good, now);
        let fourth = next_state(Some(&third), Grade::Good, now);
        assert_eq!(first.interval, 1);
        assert_eq!(second.interval, 3);
        // round(3 * 2.5) = round(7.5)
        assert_eq!(third.interval, 8);
        assert_eq!(fourth.interval, 20);
        assert_eq!(fourth.repetitions, 4);
    }

    #[test]
    fn test_second_review_branches_on_prior_reps() {
        let now = Timestamp::now();
        let one = state(1, 2.5, 1);
        assert_eq!(next_state(Some(&one), Grade::Hard, now).interval, 3);
        assert_eq!(next_state(Some(&one), Grade::Good, now).interval, 3);
        assert_eq!(next_state(Some(&one), Grade::Easy, now).interval, 7);
    }

    #[test]
    fn test_mature_intervals() {
        let now = Timestamp::now();
        let mature = state(10, 2.0, 5);
        let hard = next_state(Some(&mature), Grade::Hard, now);
        assert_eq!(hard.interval, 12);
        assert!((hard.ease_factor - 1.85).abs() < 1e-9);
        let good = next_state(Some(&mature), Grade::Good, now);
        assert_eq!(good.interval, 20);
        assert_eq!(good.ease_factor, 2.0);
        // Uses the ease from before the bonus: round(10 * 2.0 * 1.3).
        let easy = next_state(Some(&mature), Grade::Easy, now);
        assert_eq!(easy.interval, 26);
        assert!((easy.ease_factor - 2.15).abs() < 1e-9);
        assert_eq!(easy.repetitions, 6);
    }

    #[test]
    fn test_hard_interval_at_least_one_day() {
        let now = Timestamp::now();
        let stale = state(0, 2.5, 3);
        assert_eq!(next_state(Some(&stale), Grade::Hard, now).interval, 1);
    }

    #[test]
    fn test_again_resets() {
        let now = Timestamp::now();
        for prior in [state(0, 1.3, 0), state(3, 2.5, 1), state(400, 3.7, 12)] {
            let next = next_state(Some(&prior), Grade::Again, now);
            assert_eq!(next.repetitions, 0);
            assert_eq!(next.interval, 0);
            assert_eq!(next.next_review, now);
            assert_eq!(next.grade, Grade::Again);
        }
    }

    #[test]
    fn test_ease_never_below_minimum() {
        let now = Timestamp::now();
        let mut current: Option<CardState> = None;
        let grades = [Grade::Again, Grade::Hard, Grade::Hard, Grade::Again, Grade::Good];
        for _ in 0..10 {
            for grade in grades {
                let next = next_state(current.as_ref(), grade, now);
                assert!(next.ease_factor >= MIN_EASE);
                current = Some(next);
            }
        }
        let last = current.map(|s| s.ease_factor);
        assert_eq!(last, Some(MIN_EASE));
    }

    #[test]
    fn test_deterministic() {
        let now = Timestamp::now();
        let prior = state(5, 2.2, 3);
        for grade in Grade::ALL {
            assert_eq!(
                next_state(Some(&prior), grade, now),
                next_state(Some(&prior), grade, now)
            );
        }
    }
}
