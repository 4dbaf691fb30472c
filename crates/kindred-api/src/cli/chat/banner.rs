//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(
    name: &str,
    description: &str,
    model: &str,
    user_name: &str,
    past_messages: usize,
) {
    println!();
    println!("  {} {}", style("♥").magenta(), style(name).cyan().bold());
    if !description.is_empty() {
        println!("  {}", style(description).dim());
    }
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    println!("  {}   {}", style("User:").bold(), style(user_name).dim());
    if past_messages > 0 {
        println!(
            "  {}  {} earlier messages (see /history)",
            style("Story:").bold(),
            style(past_messages).dim()
        );
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
