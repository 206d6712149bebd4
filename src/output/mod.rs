//! Output formatting: severity-tagged message emission with optional decoration.

pub mod styles;

use clap::ValueEnum;
use console::Term;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

/// Message severity threshold selected by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    /// Show everything including command traces.
    #[value(name = "DEBUG")]
    Debug,
    /// Default level.
    #[value(name = "INFO")]
    Info,
    /// Warnings and errors only.
    #[value(name = "WARNING")]
    Warning,
    /// Errors only.
    #[value(name = "ERROR")]
    Error,
}

/// Output context carrying styling, terminal state, and the active log level.
///
/// Cheap to clone; components that emit messages hold their own copy.
#[derive(Clone)]
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Minimum severity that gets printed.
    pub level: LogLevel,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, level: LogLevel) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            level,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && self.level <= LogLevel::Info
    }

    /// Print a debug trace. Only shown at DEBUG level.
    pub fn debug(&self, msg: &str) {
        if self.level <= LogLevel::Debug {
            println!("  {}", msg.style(self.styles.debug));
        }
    }

    /// Print an info message prefixed with `ℹ`. Suppressed above INFO.
    pub fn info(&self, msg: &str) {
        if self.level <= LogLevel::Info {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed above INFO.
    pub fn success(&self, msg: &str) {
        if self.level <= LogLevel::Info {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed above WARNING.
    pub fn warn(&self, msg: &str) {
        if self.level <= LogLevel::Warning {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print a section header. Suppressed above INFO.
    pub fn header(&self, msg: &str) {
        if self.level <= LogLevel::Info {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a demo step banner. Suppressed above INFO.
    pub fn step(&self, msg: &str) {
        if self.level <= LogLevel::Info {
            println!("  {} {}", "▶".style(self.styles.step), msg.style(self.styles.bold));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed above INFO.
    pub fn kv(&self, key: &str, value: &str) {
        if self.level <= LogLevel::Info {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }

    /// Context that prints nothing below ERROR — used by tests.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            styles: Styles::default(),
            is_tty: false,
            level: LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LogLevel, OutputContext};

    #[test]
    fn test_log_levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_silent_context_suppresses_progress() {
        let ctx = OutputContext::silent();
        assert!(!ctx.show_progress());
    }

    #[test]
    fn test_no_color_leaves_styles_plain() {
        let ctx = OutputContext::new(true, LogLevel::Info);
        // A default Style applies no escape codes; formatting a probe string
        // through it must leave the text unchanged.
        use owo_colors::OwoColorize as _;
        let rendered = format!("{}", "probe".style(ctx.styles.success));
        assert_eq!(rendered, "probe");
    }
}
