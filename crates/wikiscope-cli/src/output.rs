//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its result
//! accordingly: indented text for humans, stable JSON for scripts. The
//! mode comes from the global `--json` flag.

use serde::Serialize;
use std::io::{self, Write};

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON, one object or array per command.
    Json,
}

impl OutputMode {
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Render a value: JSON dump in JSON mode, `human` closure otherwise.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human(value, &mut out)?,
    }
    Ok(())
}

/// Render a one-line success message.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "ok": true, "message": message });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "✓ {message}")?;
        }
    }
    Ok(())
}

/// Render an error to stderr. The process exit code is handled by main.
pub fn render_error(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "ok": false, "error": message });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "error: {message}")?;
        }
    }
    Ok(())
}

/// Render a warning line that must not pollute JSON stdout.
pub fn render_note(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    if mode.is_json() {
        return Ok(());
    }
    let stderr = io::stderr();
    let mut out = stderr.lock();
    writeln!(out, "{message}")?;
    Ok(())
}
