/// A recognized command-channel instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `!purge <token>` — start a cleanup for the author's account.
    Purge { credential: String },
    /// `!purge` without its token.
    PurgeMissingToken,
    /// `!status` — report how many runs are in flight.
    Status,
    /// Any other `!` command.
    Unknown,
}

/// Parse a command-channel message.
///
/// Returns `None` for ordinary chatter so the daemon can skip it.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let trimmed = text.trim();
    if !trimmed.starts_with('!') {
        return None;
    }
    let mut parts = trimmed.split_whitespace();
    let head = parts.next().unwrap_or("");
    match head {
        "!purge" => Some(match parts.next() {
            Some(token) => BotCommand::Purge {
                credential: token.to_string(),
            },
            None => BotCommand::PurgeMissingToken,
        }),
        "!status" => Some(BotCommand::Status),
        _ => Some(BotCommand::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_chatter_is_not_a_command() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("purge please"), None);
    }

    #[test]
    fn purge_extracts_the_token() {
        assert_eq!(
            parse_command("!purge my-secret-token"),
            Some(BotCommand::Purge {
                credential: "my-secret-token".to_string()
            })
        );
    }

    #[test]
    fn purge_tolerates_surrounding_whitespace() {
        assert_eq!(
            parse_command("  !purge   tok  "),
            Some(BotCommand::Purge {
                credential: "tok".to_string()
            })
        );
    }

    #[test]
    fn purge_without_token_asks_for_usage() {
        assert_eq!(parse_command("!purge"), Some(BotCommand::PurgeMissingToken));
    }

    #[test]
    fn status_and_unknown_commands() {
        assert_eq!(parse_command("!status"), Some(BotCommand::Status));
        assert_eq!(parse_command("!frobnicate"), Some(BotCommand::Unknown));
    }
}
