//! Output rendering for the chat shell.
//!
//! The shell talks to a [`Renderer`] rather than stdout so that the loop can
//! be driven and observed in tests.  [`TerminalRenderer`] writes styled text
//! to any [`Write`] sink.

use std::io::{self, Stdout, Write};

/// ANSI escape code for bold green text (welcome banner, status lines).
const ANSI_BOLD_GREEN: &str = "\x1b[1;32m";

/// ANSI escape code for bold blue text (assistant label).
const ANSI_BOLD_BLUE: &str = "\x1b[1;34m";

/// ANSI escape code for bold red text (error label).
const ANSI_BOLD_RED: &str = "\x1b[1;31m";

/// ANSI escape code for blue text (panel borders).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for bold text (panel titles).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering shell output.
pub trait Renderer {
    /// Print the banner shown before the first prompt.
    fn print_welcome(&mut self);

    /// Print a short status line, e.g. while touching the clipboard.
    fn print_status(&mut self, status: &str);

    /// Print the list of available commands.
    fn print_commands(&mut self, commands: &[&str]);

    /// Print a response from the chat backend.
    fn print_assistant(&mut self, response: &str);

    /// Print `content` inside a bordered panel.
    fn print_panel(&mut self, title: &str, content: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print the farewell shown when the shell ends.
    fn print_goodbye(&mut self);
}

/// Renderer writing to a terminal or any other byte sink.
pub struct TerminalRenderer<W: Write = Stdout> {
    out: W,
    use_color: bool,
}

impl TerminalRenderer<Stdout> {
    /// Creates a renderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a renderer on stdout with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for TerminalRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalRenderer<W> {
    /// Creates a renderer on `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// The sink this renderer writes to.
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Consumes the renderer, returning its sink.
    pub fn into_writer(self) -> W {
        self.out
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn print_welcome(&mut self) {
        let banner = self.paint(ANSI_BOLD_GREEN, "Welcome to Simplechat!");
        self.line(&banner);
        self.line("Type '/help' for available commands");
        self.line("");
        self.flush();
    }

    fn print_status(&mut self, status: &str) {
        let status = self.paint(ANSI_BOLD_GREEN, status);
        self.line(&status);
        self.flush();
    }

    fn print_commands(&mut self, commands: &[&str]) {
        self.line("");
        self.line("Available commands:");
        for command in commands {
            self.line(&format!("  {command}"));
        }
        self.line("");
        self.flush();
    }

    fn print_assistant(&mut self, response: &str) {
        let label = self.paint(ANSI_BOLD_BLUE, "Assistant:");
        self.line("");
        self.line(&format!("{label} {response}"));
        self.line("");
        self.flush();
    }

    fn print_panel(&mut self, title: &str, content: &str) {
        let lines = panel_lines(title, content);
        self.line("");
        for panel_line in &lines {
            let painted = match panel_line {
                PanelLine::Top { left, title, right } => format!(
                    "{}{}{}",
                    self.paint(ANSI_BLUE, left),
                    self.paint(ANSI_BOLD, title),
                    self.paint(ANSI_BLUE, right)
                ),
                PanelLine::Body(body) => {
                    let border = self.paint(ANSI_BLUE, "│");
                    format!("{border} {body} {border}")
                }
                PanelLine::Bottom(bottom) => self.paint(ANSI_BLUE, bottom),
            };
            self.line(&painted);
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        let label = self.paint(ANSI_BOLD_RED, "Error:");
        self.line(&format!("{label} {error}"));
        self.line("");
        self.flush();
    }

    fn print_goodbye(&mut self) {
        self.line("");
        self.line("Goodbye!");
        self.flush();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PanelLine {
    Top {
        left: String,
        title: String,
        right: String,
    },
    Body(String),
    Bottom(String),
}

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Lays out a panel sized to fit its content, with the title centered in
/// the top border.
fn panel_lines(title: &str, content: &str) -> Vec<PanelLine> {
    let body: Vec<&str> = content.lines().collect();
    let title = format!(" {title} ");
    let content_width = body.iter().map(|l| width(l)).max().unwrap_or(0);
    // Inner width excludes the corner glyphs but includes the padding
    // spaces on each side of the body.
    let inner = (content_width + 2).max(width(&title) + 2);

    let fill = inner - width(&title);
    let left_fill = fill / 2;
    let right_fill = fill - left_fill;
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(PanelLine::Top {
        left: format!("╭{}", "─".repeat(left_fill)),
        title,
        right: format!("{}╮", "─".repeat(right_fill)),
    });
    for line in body {
        let pad = inner - 2 - width(line);
        lines.push(PanelLine::Body(format!("{line}{}", " ".repeat(pad))));
    }
    lines.push(PanelLine::Bottom(format!("╰{}╯", "─".repeat(inner))));
    lines
}
