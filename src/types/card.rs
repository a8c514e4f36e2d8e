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

/// A question/answer pair parsed from a document. Cards are identified by
/// their question text: two cards with the same question share their
/// scheduling state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// The sanitized question. Never empty.
    question: String,
    /// The sanitized answer. May be empty.
    answer: String,
    /// The 1-based line range of the card's section in its document.
    lines: (usize, usize),
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, lines: (usize, usize)) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            lines,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn lines(&self) -> (usize, usize) {
        self.lines
    }
}
