//! Styled messages on stderr.
//!
//! Results are printed as `label: value` fields and indented list items so a
//! publish summary reads the same for every command.

use std::fmt::Display;

use console::{Style, Term};

/// Writes user-facing messages to stderr.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    warn: Style,
    fail: Style,
    heading: Style,
    label: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
            heading: Style::new().cyan().bold(),
            label: Style::new().dim(),
        }
    }

    /// Plain message.
    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    /// Green message.
    pub(crate) fn success(&self, msg: &str) {
        self.line(&self.ok.apply_to(msg).to_string());
    }

    /// Yellow message.
    pub(crate) fn warning(&self, msg: &str) {
        self.line(&self.warn.apply_to(msg).to_string());
    }

    /// Red message.
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.fail.apply_to(msg).to_string());
    }

    /// Section heading (cyan bold), preceded by a blank line.
    pub(crate) fn heading(&self, msg: &str) {
        self.line("");
        self.line(&self.heading.apply_to(msg).to_string());
    }

    /// `label: value`, with the label dimmed.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        let label = self.label.apply_to(format!("{label}:"));
        self.line(&field_line(&label.to_string(), value));
    }

    /// Indented list item.
    pub(crate) fn item(&self, msg: impl Display) {
        self.line(&item_line(msg));
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }
}

fn field_line(label: &str, value: impl Display) -> String {
    format!("{label} {value}")
}

fn item_line(msg: impl Display) -> String {
    format!("  - {msg}")
}
