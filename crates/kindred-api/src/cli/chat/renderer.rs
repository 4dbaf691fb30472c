//! Terminal markdown rendering with syntax-highlighted code blocks.
//!
//! `ChatRenderer` combines `termimad` for prose and `syntect` for fenced code
//! blocks. Replies arrive whole, so each one is rendered once.

use crossterm::style::Color;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

use kindred_types::emotion::{Emotion, EmotionReading};

const CODE_THEME: &str = "base16-ocean.dark";

/// Terminal markdown renderer with syntax highlighting.
pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    /// Create a renderer whose headers and bold text use `accent`.
    pub fn new(accent: Color) -> Self {
        let mut skin = MadSkin::default_dark();
        let tc = crossterm_to_termimad(accent);
        skin.bold.set_fg(tc);
        skin.headers[0].set_fg(tc);
        skin.headers[1].set_fg(tc);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a complete markdown reply.
    ///
    /// Code fences with a language tag are highlighted via syntect; everything
    /// else goes through termimad.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            if line.starts_with("```") {
                if in_code_block {
                    in_code_block = false;
                    output.push_str(&self.highlight_code(&code_buf, &code_lang));
                    output.push('\n');
                } else {
                    in_code_block = true;
                    code_lang = line.trim_start_matches('`').trim().to_string();
                    code_buf.clear();
                }
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                output.push_str(&self.skin.term_text(line).to_string());
            }
        }

        // Unclosed fence
        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }

        output
    }

    /// Print the footer after a reply.
    ///
    /// Format: "| sad (high) . 1.2s . gemini-2.5-flash"
    pub fn print_stats_footer(&self, reading: &EmotionReading, response_ms: u64, model: &str) {
        let seconds = response_ms as f64 / 1000.0;
        let dot = console::style("\u{00b7}").dim();
        println!(
            "\n  {} {} {} {} {:.1}s {} {}",
            console::style("|").dim(),
            emotion_style(reading.label),
            console::style(format!("({})", reading.intensity)).dim(),
            dot,
            console::style(seconds).dim(),
            dot,
            console::style(model).dim(),
        );
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let mut output = String::new();
        output.push_str(&format!("  {}\n", console::style(format!("--- {lang} ---")).dim()));

        let Some(theme) = self.theme_set.themes.get(CODE_THEME) else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };
        let mut h = HighlightLines::new(syntax, theme);

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }
}

/// Accent colour for an agent, picked from its gradient classes.
pub fn accent_for(color_classes: &str) -> Color {
    const PALETTE: [(&str, Color); 7] = [
        ("pink", Color::Magenta),
        ("purple", Color::Magenta),
        ("green", Color::Green),
        ("emerald", Color::Green),
        ("amber", Color::Yellow),
        ("orange", Color::Yellow),
        ("red", Color::Red),
    ];
    PALETTE
        .iter()
        .find(|(name, _)| color_classes.contains(name))
        .map(|(_, color)| *color)
        .unwrap_or(Color::Cyan)
}

fn emotion_style(emotion: Emotion) -> console::StyledObject<String> {
    let label = emotion.to_string();
    match emotion {
        Emotion::Happy => console::style(label).green(),
        Emotion::Sad | Emotion::Lonely => console::style(label).blue(),
        Emotion::Angry => console::style(label).red(),
        Emotion::Anxious | Emotion::Confused => console::style(label).yellow(),
        Emotion::Neutral => console::style(label).dim(),
    }
}

fn crossterm_to_termimad(color: Color) -> termimad::crossterm::style::Color {
    match color {
        Color::Cyan => termimad::crossterm::style::Color::Cyan,
        Color::Green => termimad::crossterm::style::Color::Green,
        Color::Yellow => termimad::crossterm::style::Color::Yellow,
        Color::Magenta => termimad::crossterm::style::Color::Magenta,
        Color::Blue => termimad::crossterm::style::Color::Blue,
        Color::Red => termimad::crossterm::style::Color::Red,
        Color::Rgb { r, g, b } => termimad::crossterm::style::Color::Rgb { r, g, b },
        _ => termimad::crossterm::style::Color::Cyan,
    }
}
