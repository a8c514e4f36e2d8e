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

use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;

/// A line starting with this token begins a new card.
const MARKER: &str = "#Q";

/// Separates the question from the answer.
const DELIMITER: &str = "::";

/// The text of a single card, before it is split into question and answer.
struct Section {
    /// Everything after the marker, up to the next marker line.
    text: String,
    /// The line the marker is on.
    start: usize,
    /// The last non-blank line of the section.
    end: usize,
}

/// Parse all cards in a document, in document order. Malformed sections are
/// skipped.
pub fn parse_cards(content: &str) -> Vec<Card> {
    let mut cards = Vec::new();
    for section in split_sections(content) {
        match parse_section(&section) {
            Ok(card) => cards.push(card),
            Err(e) => {
                log::debug!("Skipping card on line {}: {}", section.start, e.message());
            }
        }
    }
    cards
}

/// Like [`parse_cards`], but for input that may not be text at all. Anything
/// that isn't valid UTF-8 has no cards.
pub fn parse_card_bytes(bytes: &[u8]) -> Vec<Card> {
    match std::str::from_utf8(bytes) {
        Ok(content) => parse_cards(content),
        Err(e) => {
            log::warn!("Input is not valid UTF-8: {e}");
            Vec::new()
        }
    }
}

fn split_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;
    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        if let Some(rest) = line.strip_prefix(MARKER) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section {
                text: rest.to_string(),
                start: line_number,
                end: line_number,
            });
        } else if let Some(section) = current.as_mut() {
            section.text.push('\n');
            section.text.push_str(line);
            if !line.trim().is_empty() {
                section.end = line_number;
            }
        }
        // Lines before the first marker aren't part of any card.
    }
    if let Some(section) = current {
        sections.push(section);
    }
    sections
}

fn parse_section(section: &Section) -> Fallible<Card> {
    let Some((question, answer)) = section.text.split_once(DELIMITER) else {
        return fail("missing `::` between question and answer");
    };
    let question = question.trim();
    if question.is_empty() {
        return fail("empty question");
    }
    let answer = answer.trim();
    Ok(Card::new(
        sanitize(question),
        sanitize(answer),
        (section.start, section.end),
    ))
}

/// Escape the characters that are significant in HTML.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
