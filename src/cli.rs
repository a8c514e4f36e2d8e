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

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::cmd::Context;
use crate::cmd::backup::create_backup;
use crate::cmd::backup::list_backups;
use crate::cmd::backup::restore_backup;
use crate::cmd::check::check_deck;
use crate::cmd::drill::Mode;
use crate::cmd::drill::drill;
use crate::cmd::reset::reset_cards;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_deck_stats;
use crate::config::Config;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the config file. Defaults to `qcards.toml` if it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Path to the review state file. Overrides the config file.
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drill cards.
    Drill {
        /// A file, or a directory of Markdown files.
        path: PathBuf,
        /// Which cards to review.
        #[arg(long, default_value_t = Mode::Due)]
        mode: Mode,
    },
    /// Print deck statistics.
    Stats {
        /// A file, or a directory of Markdown files.
        path: PathBuf,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Check that a deck parses.
    Check {
        /// A file, or a directory of Markdown files.
        path: PathBuf,
    },
    /// Manage backups of the review state.
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
    /// Forget the review history of some or all cards.
    Reset {
        /// Reset the cards in this file or directory.
        path: Option<PathBuf>,
        /// Reset every card.
        #[arg(long)]
        all: bool,
        /// Reset even if a backup can't be taken first.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum BackupAction {
    /// Take a backup.
    Create,
    /// List backups, oldest first.
    List,
    /// Restore a backup.
    Restore {
        /// Which backup to restore, as shown by `list`. Defaults to the latest.
        #[arg(long)]
        index: Option<usize>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store = store;
    }
    let mut ctx = Context::new(config);
    match cli.command {
        Command::Drill { path, mode } => drill(&mut ctx, &path, mode),
        Command::Stats { path, format } => print_deck_stats(&ctx, &path, format),
        Command::Check { path } => check_deck(&path),
        Command::Backup { action } => match action {
            BackupAction::Create => create_backup(&mut ctx),
            BackupAction::List => list_backups(&ctx),
            BackupAction::Restore { index } => restore_backup(&mut ctx, index),
        },
        Command::Reset { path, all, force } => reset_cards(&mut ctx, path.as_deref(), all, force),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_drill() {
        let cli = Cli::try_parse_from(["qcards", "drill", "deck.md", "--mode", "again"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Command::Drill {
                mode: Mode::Again,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_restore() {
        let cli = Cli::try_parse_from(["qcards", "--store", "s.json", "backup", "restore", "--index", "2"]);
        match cli {
            Ok(Cli {
                store,
                command: Command::Backup {
                    action: BackupAction::Restore { index },
                },
                ..
            }) => {
                assert_eq!(store, Some(PathBuf::from("s.json")));
                assert_eq!(index, Some(2));
            }
            _ => panic!("expected backup restore"),
        }
    }
}
