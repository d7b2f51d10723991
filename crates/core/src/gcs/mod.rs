//! Operator status text
//!
//! Landing logic reports progress and faults to the ground station as
//! severity-tagged text. Delivery is best effort: a sink may drop
//! messages, and nothing in the landing logic depends on a message
//! having been sent.

use core::fmt::{self, Write};
use heapless::{String, Vec};

/// Message severity, numerically identical to MAV_SEVERITY
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

/// Destination for operator-visible status text
pub trait StatusTextSink {
    fn send_text(&mut self, severity: Severity, args: fmt::Arguments<'_>);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatusText;

impl StatusTextSink for NullStatusText {
    fn send_text(&mut self, _severity: Severity, _args: fmt::Arguments<'_>) {}
}

/// Text length kept per message by [`StatusTextLog`]
pub const LOG_TEXT_LEN: usize = 96;

/// Number of messages kept by [`StatusTextLog`]
pub const LOG_CAPACITY: usize = 32;

/// In-memory sink that records messages, for host tests
#[derive(Debug, Default)]
pub struct StatusTextLog {
    messages: Vec<(Severity, String<LOG_TEXT_LEN>), LOG_CAPACITY>,
}

impl StatusTextLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[(Severity, String<LOG_TEXT_LEN>)] {
        &self.messages
    }

    /// True if any recorded message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|(_, text)| text.contains(needle))
    }

    /// Severity of the first message containing `needle`
    pub fn severity_of(&self, needle: &str) -> Option<Severity> {
        self.messages
            .iter()
            .find(|(_, text)| text.contains(needle))
            .map(|(severity, _)| *severity)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl StatusTextSink for StatusTextLog {
    fn send_text(&mut self, severity: Severity, args: fmt::Arguments<'_>) {
        let mut text = String::new();
        // Overlong text is cut short
        let _ = text.write_fmt(args);
        if self.messages.is_full() {
            self.messages.remove(0);
        }
        let _ = self.messages.push((severity, text));
    }
}
