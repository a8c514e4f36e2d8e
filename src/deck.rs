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

use std::fs::read;
use std::path::Path;
use std::time::Instant;

use walkdir::WalkDir;

use crate::error::Fallible;
use crate::error::fail;
use crate::parser::parse_card_bytes;
use crate::types::card::Card;

/// Read the cards in a file, or in every Markdown file under a directory.
pub fn read_deck(path: &Path) -> Fallible<Vec<Card>> {
    if !path.exists() {
        return fail("path does not exist.");
    }
    log::debug!("Loading deck...");
    let start = Instant::now();
    let mut cards = Vec::new();
    if path.is_file() {
        cards.extend(parse_card_bytes(&read(path)?));
    } else {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                cards.extend(parse_card_bytes(&read(path)?));
            }
        }
    }
    let duration = start.elapsed().as_millis();
    log::debug!("Deck loaded in {duration}ms.");
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_non_existent_path() {
        assert!(read_deck(Path::new("./derpherp")).is_err());
    }

    #[test]
    fn test_single_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        write(&path, "#Q a::1\n#Q b::2")?;
        let cards = read_deck(&path)?;
        assert_eq!(cards.len(), 2);
        Ok(())
    }

    #[test]
    fn test_directory() -> Fallible<()> {
        let dir = tempdir()?;
        create_dir_all(dir.path().join("sub"))?;
        write(dir.path().join("b.md"), "#Q from b::1")?;
        write(dir.path().join("a.md"), "#Q from a::1")?;
        write(dir.path().join("sub").join("c.md"), "#Q from c::1")?;
        write(dir.path().join("ignored.txt"), "#Q ignored::1")?;
        write(dir.path().join("binary.md"), [0xff, 0xfe, 0xfd])?;
        let cards = read_deck(dir.path())?;
        let questions: Vec<&str> = cards.iter().map(Card::question).collect();
        assert_eq!(questions, vec!["from a", "from b", "from c"]);
        Ok(())
    }
}
