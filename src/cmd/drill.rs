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

use std::fmt::Display;
use std::fmt::Formatter;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;

use clap::ValueEnum;

use crate::cmd::Context;
use crate::deck::read_deck;
use crate::error::Fallible;
use crate::select::due_count;
use crate::select::tracked_cards;
use crate::session::Choice;
use crate::session::Session;
use crate::storage::Storage;
use crate::store::Store;
use crate::types::card::Card;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone, Copy)]
pub enum Mode {
    /// Cards that are due.
    Due,
    /// Every card.
    All,
    /// Every card graded before.
    Tracked,
    /// Cards last graded `again`.
    Again,
    /// Cards last graded `hard`.
    Hard,
    /// Cards last graded `good`.
    Good,
    /// Cards last graded `easy`.
    Easy,
}

impl Mode {
    fn choice(self) -> Choice {
        match self {
            Mode::Due => Choice::Due,
            Mode::All => Choice::All,
            Mode::Tracked => Choice::Tracked,
            Mode::Again => Choice::Bucket(Grade::Again),
            Mode::Hard => Choice::Bucket(Grade::Hard),
            Mode::Good => Choice::Bucket(Grade::Good),
            Mode::Easy => Choice::Bucket(Grade::Easy),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Due => "due",
            Mode::All => "all",
            Mode::Tracked => "tracked",
            Mode::Again => "again",
            Mode::Hard => "hard",
            Mode::Good => "good",
            Mode::Easy => "easy",
        };
        write!(f, "{name}")
    }
}

pub fn drill(ctx: &mut Context, path: &Path, mode: Mode) -> Fallible<()> {
    let deck = read_deck(path)?;
    let mut store = ctx.open_store(Timestamp::now())?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    run_drill(
        deck,
        &mut store,
        &mut ctx.storage,
        mode,
        Timestamp::now,
        &mut input,
        &mut output,
    )
}

/// Drive a session from line-based input. `clock` is read when the cards are
/// chosen and again for every grade.
pub fn run_drill(
    deck: Vec<Card>,
    store: &mut Store,
    storage: &mut impl Storage,
    mode: Mode,
    clock: impl Fn() -> Timestamp,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    let now = clock();
    let mut session = Session::new();
    session.start(deck)?;
    writeln!(
        output,
        "{} cards, {} graded before, {} due overall.",
        session.deck().len(),
        tracked_cards(session.deck(), store).len(),
        due_count(store, now)
    )?;
    if session.candidates(mode.choice(), store, now).is_empty() {
        writeln!(output, "No {mode} cards to review.")?;
        return Ok(());
    }
    session.choose(mode.choice(), store, now)?;

    while let Some(card) = session.current().cloned() {
        writeln!(output)?;
        writeln!(output, "Q: {}", plain(card.question()))?;
        if let Some(state) = store.get(card.question()) {
            writeln!(output, "Grade: {}", state.grade)?;
        }
        writeln!(output, "[enter to reveal, q to quit]")?;
        match read_line(input)? {
            Some(line) if line != "q" => {}
            _ => {
                session.end()?;
                break;
            }
        }
        session.reveal()?;
        writeln!(output, "A: {}", plain(card.answer()))?;
        let Some(grade) = read_grade(input, output)? else {
            session.end()?;
            break;
        };
        let state = session.grade(store, storage, grade, clock())?;
        writeln!(
            output,
            "Next review in {} days ({} left).",
            state.interval,
            session.remaining()
        )?;
    }

    writeln!(output)?;
    writeln!(output, "Reviewed {} cards.", session.reviewed())?;
    for (grade, cards) in session.summary(store) {
        writeln!(output, "  {grade}: {}", cards.len())?;
    }
    session.finish();
    Ok(())
}

/// Ask for a grade until we get one. `None` means the user quit.
fn read_grade(input: &mut impl BufRead, output: &mut impl Write) -> Fallible<Option<Grade>> {
    loop {
        writeln!(output, "Grade: (1 = Again, 2 = Hard, 3 = Good, 4 = Easy, q = quit)")?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let grade = match line.as_str() {
            "q" => return Ok(None),
            "1" => Grade::Again,
            "2" => Grade::Hard,
            "3" => Grade::Good,
            "4" => Grade::Easy,
            other => match other.parse::<Grade>() {
                Ok(grade) => grade,
                Err(_) => {
                    writeln!(output, "Invalid input. Please enter a number between 1 and 4.")?;
                    continue;
                }
            },
        };
        return Ok(Some(grade));
    }
}

/// Read a trimmed line. `None` at end of input.
fn read_line(input: &mut impl BufRead) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Undo the parser's HTML escaping, for showing text in a terminal.
fn plain(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
