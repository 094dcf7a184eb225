use anyhow::Context;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output configuration derived from CLI flags.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output file path. When set, output is saved as JSON.
    pub output: Option<PathBuf>,
    /// Suppress informational messages on stderr.
    pub quiet: bool,
}

impl OutputConfig {
    /// Emit output: if `-o` is set, save as JSON; otherwise print human text.
    pub fn emit_with_default_name(
        &self,
        _default_name: &str,
        human_text: &str,
        json_value: &serde_json::Value,
    ) -> anyhow::Result<()> {
        if let Some(ref path) = self.output {
            let content =
                serde_json::to_string_pretty(json_value).context("Failed to serialize JSON")?;
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !self.quiet {
                eprintln!("Wrote {}", path.display());
            }
        } else {
            println!("{human_text}");
        }
        Ok(())
    }

    /// Print an informational message to stderr unless `--quiet` is set.
    pub fn note(&self, text: &str) {
        if !self.quiet {
            eprintln!("{text}");
        }
    }
}

/// Whether colored output should be used (TTY + not NO_COLOR).
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Format a section header (cyan when color is enabled).
pub fn fmt_section(text: &str) -> String {
    if use_color() {
        format!("{}", text.cyan())
    } else {
        text.to_string()
    }
}

/// Format a success / SAT marker (green when color is enabled).
pub fn fmt_sat(text: &str) -> String {
    if use_color() {
        format!("{}", text.green())
    } else {
        text.to_string()
    }
}

/// Format a failure / UNSAT marker (red when color is enabled).
pub fn fmt_unsat(text: &str) -> String {
    if use_color() {
        format!("{}", text.red())
    } else {
        text.to_string()
    }
}

/// Format dim text (for secondary detail lines).
pub fn fmt_dim(text: &str) -> String {
    if use_color() {
        format!("{}", text.dimmed())
    } else {
        text.to_string()
    }
}
