//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and control the conversation without being sent
//! to the agent.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Show the last N stored messages (default 20).
    History(usize),
    /// Delete every stored message with this agent.
    Reset,
    /// Merge the most recent discoveries into the profile.
    Accept,
    /// Show the current profile facts.
    Profile,
    /// Unknown command or bad argument.
    Unknown(String),
}

const DEFAULT_HISTORY: usize = 20;

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(' ') {
        Some((cmd, arg)) => (cmd.to_lowercase(), Some(arg.trim())),
        None => (trimmed.to_lowercase(), None),
    };

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => match arg.filter(|a| !a.is_empty()) {
            None => Some(ChatCommand::History(DEFAULT_HISTORY)),
            Some(n) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Some(ChatCommand::History(n)),
                _ => Some(ChatCommand::Unknown(
                    "/history takes a positive number".to_string(),
                )),
            },
        },
        "/reset" => Some(ChatCommand::Reset),
        "/accept" => Some(ChatCommand::Accept),
        "/profile" | "/me" => Some(ChatCommand::Profile),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}      {}", style("/help").cyan(), "Show this help message");
    println!("  {}     {}", style("/clear").cyan(), "Clear the screen");
    println!(
        "  {} {}",
        style("/history N").cyan(),
        "Show the last N messages (default 20)"
    );
    println!(
        "  {}     {}",
        style("/reset").cyan(),
        "Forget this conversation"
    );
    println!(
        "  {}    {}",
        style("/accept").cyan(),
        "Add the latest discoveries to your profile"
    );
    println!(
        "  {}   {}",
        style("/profile").cyan(),
        "Show what the companion knows about you"
    );
    println!("  {}      {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!(
        "  {}",
        style("Ctrl+D to exit, Ctrl+C safe (no message loss)").dim()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/H"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("  /q  "), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_history_count() {
        assert_eq!(parse("/history"), Some(ChatCommand::History(20)));
        assert_eq!(parse("/history 5"), Some(ChatCommand::History(5)));
        assert!(matches!(parse("/history zero"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/history 0"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn test_parse_conversation_controls() {
        assert_eq!(parse("/reset"), Some(ChatCommand::Reset));
        assert_eq!(parse("/accept"), Some(ChatCommand::Accept));
        assert_eq!(parse("/me"), Some(ChatCommand::Profile));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("hello world"), None);
        assert_eq!(parse("I feel great :)/"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo bar"), Some(ChatCommand::Unknown("/foo".to_string())));
    }
}
