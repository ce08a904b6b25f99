//! Clipboard access for the shell's `/copy` and `/paste` commands.
//!
//! [`SystemClipboard`] drives the platform's clipboard utilities
//! (`pbcopy`, `wl-copy`, `xclip`, ...) as child processes, trying each
//! candidate in turn until one is installed.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::observability::CLIPBOARD_OPERATIONS;

/// Read and write access to a clipboard.
pub trait Clipboard {
    /// Replaces the clipboard contents with `text`.
    fn copy(&mut self, text: &str) -> Result<()>;

    /// Returns the clipboard contents; empty when the clipboard is empty.
    fn paste(&mut self) -> Result<String>;
}

/// An external clipboard utility and its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tool {
    program: &'static str,
    args: &'static [&'static str],
}

impl Tool {
    const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.program);
        command.args(self.args);
        command
    }
}

#[cfg(target_os = "macos")]
fn copy_tools() -> Vec<Tool> {
    vec![Tool::new("pbcopy", &[])]
}

#[cfg(target_os = "macos")]
fn paste_tools() -> Vec<Tool> {
    vec![Tool::new("pbpaste", &[])]
}

#[cfg(windows)]
fn copy_tools() -> Vec<Tool> {
    vec![Tool::new("clip", &[])]
}

#[cfg(windows)]
fn paste_tools() -> Vec<Tool> {
    vec![Tool::new(
        "powershell",
        &["-NoProfile", "-Command", "Get-Clipboard"],
    )]
}

#[cfg(not(any(target_os = "macos", windows)))]
fn copy_tools() -> Vec<Tool> {
    let mut tools = Vec::new();
    if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        tools.push(Tool::new("wl-copy", &[]));
    }
    tools.push(Tool::new("xclip", &["-selection", "clipboard"]));
    tools.push(Tool::new("xsel", &["--clipboard", "--input"]));
    tools
}

#[cfg(not(any(target_os = "macos", windows)))]
fn paste_tools() -> Vec<Tool> {
    let mut tools = Vec::new();
    if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        tools.push(Tool::new("wl-paste", &["--no-newline"]));
    }
    tools.push(Tool::new("xclip", &["-selection", "clipboard", "-o"]));
    tools.push(Tool::new("xsel", &["--clipboard", "--output"]));
    tools
}

/// What a paste utility produced.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pasted {
    Text(String),
    Empty,
    Failed(String),
}

/// Paste utilities exit non-zero when the selection is empty; they say so
/// on stderr, or say nothing at all.
fn is_empty_selection(stderr: &str) -> bool {
    const EMPTY_MARKERS: &[&str] = &[
        "target STRING not available",
        "Nothing is copied",
        "No selection",
    ];
    stderr.is_empty() || EMPTY_MARKERS.iter().any(|marker| stderr.contains(marker))
}

/// The operating system clipboard.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    copy_tools: Vec<Tool>,
    paste_tools: Vec<Tool>,
}

impl SystemClipboard {
    /// Creates a clipboard using the utilities available on this platform.
    pub fn new() -> Self {
        Self {
            copy_tools: copy_tools(),
            paste_tools: paste_tools(),
        }
    }

    fn not_found(tools: &[Tool]) -> Error {
        let names = tools
            .iter()
            .map(|tool| tool.program)
            .collect::<Vec<_>>()
            .join(", ");
        Error::clipboard(format!("no clipboard utility found (tried {names})"))
    }

    fn copy_with(tool: &Tool, text: &str) -> std::io::Result<bool> {
        let mut child = tool
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        Ok(child.wait()?.success())
    }

    fn paste_with(tool: &Tool) -> std::io::Result<Pasted> {
        let output = tool.command().stdin(Stdio::null()).output()?;
        if output.status.success() {
            let text = String::from_utf8_lossy(&output.stdout).into_owned();
            return Ok(Pasted::Text(text));
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_empty_selection(&stderr) {
            Ok(Pasted::Empty)
        } else {
            Ok(Pasted::Failed(stderr))
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        CLIPBOARD_OPERATIONS.click();
        for tool in &self.copy_tools {
            match Self::copy_with(tool, text) {
                Ok(true) => {
                    tracing::debug!(program = tool.program, "copied to clipboard");
                    return Ok(());
                }
                Ok(false) => {
                    return Err(Error::clipboard(format!("{} failed", tool.program)));
                }
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(Error::io(format!("{}: {err}", tool.program), err)),
            }
        }
        Err(Self::not_found(&self.copy_tools))
    }

    fn paste(&mut self) -> Result<String> {
        CLIPBOARD_OPERATIONS.click();
        for tool in &self.paste_tools {
            match Self::paste_with(tool) {
                Ok(Pasted::Text(text)) => return Ok(text),
                Ok(Pasted::Empty) => return Ok(String::new()),
                Ok(Pasted::Failed(stderr)) => {
                    return Err(Error::clipboard(format!("{}: {stderr}", tool.program)));
                }
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(Error::io(format!("{}: {err}", tool.program), err)),
            }
        }
        Err(Self::not_found(&self.paste_tools))
    }
}

/// An in-process clipboard.
///
/// Useful where no system clipboard exists, and for driving the shell in
/// tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: String,
}

impl MemoryClipboard {
    /// Creates a clipboard holding `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// The current contents.
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        self.contents = text.to_string();
        Ok(())
    }

    fn paste(&mut self) -> Result<String> {
        Ok(self.contents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_round_trip() {
        let mut clipboard = MemoryClipboard::default();
        assert_eq!(clipboard.paste().unwrap(), "");
        clipboard.copy("/copy").unwrap();
        assert_eq!(clipboard.contents(), "/copy");
        assert_eq!(clipboard.paste().unwrap(), "/copy");
    }

    #[test]
    fn missing_utilities_are_a_clipboard_error() {
        let mut clipboard = SystemClipboard {
            copy_tools: vec![Tool::new("simplechat-no-such-copy", &[])],
            paste_tools: vec![Tool::new("simplechat-no-such-paste", &[])],
        };
        let err = clipboard.copy("text").unwrap_err();
        assert!(err.is_clipboard());
        assert!(err.to_string().contains("simplechat-no-such-copy"));
        assert!(clipboard.paste().unwrap_err().is_clipboard());
    }

    #[test]
    fn empty_selection_markers() {
        assert!(is_empty_selection(""));
        assert!(is_empty_selection("Error: target STRING not available"));
        assert!(is_empty_selection("Nothing is copied"));
        assert!(!is_empty_selection("Error: Can't open display: (null)"));
    }

    #[cfg(unix)]
    #[test]
    fn silent_paste_failure_is_an_empty_clipboard() {
        let mut clipboard = SystemClipboard {
            copy_tools: Vec::new(),
            paste_tools: vec![Tool::new("false", &[])],
        };
        assert_eq!(clipboard.paste().unwrap(), "");
    }

    #[cfg(unix)]
    #[test]
    fn unavailable_display_is_a_clipboard_error() {
        let mut clipboard = SystemClipboard {
            copy_tools: Vec::new(),
            paste_tools: vec![Tool::new(
                "sh",
                &["-c", "echo \"Error: Can't open display: (null)\" >&2; exit 1"],
            )],
        };
        let err = clipboard.paste().unwrap_err();
        assert!(err.is_clipboard());
        assert!(err.to_string().contains("Can't open display"));
    }

    #[test]
    fn platform_has_candidates() {
        let clipboard = SystemClipboard::new();
        assert!(!clipboard.copy_tools.is_empty());
        assert!(!clipboard.paste_tools.is_empty());
    }
}
