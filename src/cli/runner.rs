use anyhow::Result;

use crate::cli::{Commands, RecordCommands, WatchlistCommands};
use crate::commands::{self as cmd, Command, RecordAction, WatchlistAction};

/// Convert clap `Commands` into the internal `commands::Command`.
/// Returns Err on malformed values (range, shares, positions).
pub fn to_internal_command(c: &Commands) -> Result<Command> {
    match c {
        Commands::Search { code, range } => Ok(Command::Search {
            code: code.trim().to_string(),
            range: cmd::parse_range(range)?,
        }),

        Commands::Info { code } => Ok(Command::Info {
            code: code.trim().to_string(),
        }),

        Commands::Watchlist { action } => {
            let action = match action {
                WatchlistCommands::List => WatchlistAction::List,
                WatchlistCommands::Add { codes, no_verify } => WatchlistAction::Add {
                    codes: codes.clone(),
                    verify: !*no_verify,
                },
                WatchlistCommands::Remove { code } => WatchlistAction::Remove {
                    code: code.trim().to_string(),
                },
                WatchlistCommands::Shares { code, shares } => WatchlistAction::Shares {
                    code: code.trim().to_string(),
                    shares: shares.as_deref().map(cmd::parse_shares).transpose()?,
                },
                WatchlistCommands::Move { from, to } => WatchlistAction::Move {
                    from: cmd::parse_position(*from)?,
                    to: cmd::parse_position(*to)?,
                },
                WatchlistCommands::Refresh => WatchlistAction::Refresh,
            };
            Ok(Command::Watchlist { action })
        }

        Commands::Record { action } => Ok(Command::Record {
            action: match action {
                RecordCommands::Set => RecordAction::Set,
                RecordCommands::Show => RecordAction::Show,
            },
        }),

        Commands::Export { output } => Ok(Command::Export {
            output: output.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundwatch::reports::ChartRange;
    use rust_decimal_macros::dec;

    #[test]
    fn convert_search_with_range() {
        let cmd = Commands::Search {
            code: " 000001 ".to_string(),
            range: "3m".to_string(),
        };
        match to_internal_command(&cmd).expect("conversion failed") {
            Command::Search { code, range } => {
                assert_eq!(code, "000001");
                assert_eq!(range, ChartRange::ThreeMonths);
            }
            other => panic!("unexpected converted result: {:?}", other),
        }
    }

    #[test]
    fn convert_move_is_zero_based() {
        let cmd = Commands::Watchlist {
            action: WatchlistCommands::Move { from: 2, to: 1 },
        };
        assert_eq!(
            to_internal_command(&cmd).unwrap(),
            Command::Watchlist {
                action: WatchlistAction::Move { from: 1, to: 0 }
            }
        );

        let bad = Commands::Watchlist {
            action: WatchlistCommands::Move { from: 0, to: 1 },
        };
        assert!(to_internal_command(&bad).is_err());
    }

    #[test]
    fn convert_shares() {
        let set = Commands::Watchlist {
            action: WatchlistCommands::Shares {
                code: "000001".to_string(),
                shares: Some("1,500.5".to_string()),
            },
        };
        assert_eq!(
            to_internal_command(&set).unwrap(),
            Command::Watchlist {
                action: WatchlistAction::Shares {
                    code: "000001".to_string(),
                    shares: Some(dec!(1500.5)),
                }
            }
        );

        let negative = Commands::Watchlist {
            action: WatchlistCommands::Shares {
                code: "000001".to_string(),
                shares: Some("-1".to_string()),
            },
        };
        assert!(to_internal_command(&negative).is_err());
    }
}
