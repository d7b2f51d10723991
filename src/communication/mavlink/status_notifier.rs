//! MAVLink STATUSTEXT Notification System
//!
//! Landing messages ("Deepstall: breakout, heading 270", "Flare 2m ...")
//! are queued here and drained by the telemetry side as STATUSTEXT
//! messages for the ground station.
//!
//! # Architecture
//!
//! - **Owned queue**: [`StatusNotifier`] is a plain value implementing the
//!   core `StatusTextSink`, so a landing controller can own one directly
//! - **Global instance**: [`GlobalStatusText`] forwards into a static
//!   notifier behind a critical section for firmware builds
//! - **Heapless**: Fixed-capacity queue (16 messages), 200 character text
//! - **MAVLink v2 Chunking**: Text over 50 bytes is split into up to four
//!   chunks sharing a non-zero id
//!
//! Every queued message is mirrored to the log macros.

use core::cell::RefCell;
use core::fmt::{self, Write};

use critical_section::Mutex;
use heapless::{Deque, String, Vec};
use mavlink::common::{MavSeverity, STATUSTEXT_DATA};
use plane_landing_core::gcs::{Severity, StatusTextSink};

/// Maximum message length (200 characters)
pub const MAX_MESSAGE_LEN: usize = 200;

/// Queue capacity (16 messages)
pub const QUEUE_CAPACITY: usize = 16;

/// Chunk size for MAVLink STATUSTEXT messages (50 bytes)
const CHUNK_SIZE: usize = 50;

/// Maximum number of chunks per message (200 / 50 = 4)
const MAX_CHUNKS: usize = 4;

/// STATUSTEXT messages returned per drain
pub const MAX_PENDING_STATUSTEXT: usize = 32;

/// Queued STATUSTEXT message with severity and text
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub severity: MavSeverity,
    pub text: String<MAX_MESSAGE_LEN>,
}

/// Queue of pending STATUSTEXT messages
#[derive(Debug)]
pub struct StatusNotifier {
    queue: Deque<QueuedMessage, QUEUE_CAPACITY>,
    next_chunk_id: u16,
    dropped_count: u32,
}

impl Default for StatusNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusNotifier {
    /// Create an empty notifier (const for static initialization)
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            next_chunk_id: 1, // 0 is reserved for non-chunked
            dropped_count: 0,
        }
    }

    /// Enqueue a message
    ///
    /// If the queue is full, the oldest message is dropped and
    /// `dropped_count` is incremented. Text over 200 characters is
    /// truncated on a character boundary.
    pub fn enqueue(&mut self, severity: Severity, text: &str) {
        let mut writer = TruncatingWriter::default();
        let _ = writer.write_str(text);
        self.push(severity, writer);
    }

    fn push(&mut self, severity: Severity, writer: TruncatingWriter) {
        if writer.truncated {
            crate::log_warn!("STATUSTEXT truncated to {} chars", MAX_MESSAGE_LEN);
        }
        mirror_to_log(severity, writer.text.as_str());

        if self.queue.is_full() {
            self.queue.pop_front();
            self.dropped_count = self.dropped_count.saturating_add(1);
            crate::log_warn!(
                "STATUSTEXT queue full, dropped {} messages",
                self.dropped_count
            );
        }
        // Space was made above
        let _ = self.queue.push_back(QueuedMessage {
            severity: mav_severity(severity),
            text: writer.text,
        });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Messages lost to queue overflow since creation
    pub fn dropped_count(&self) -> u32 {
        self.dropped_count
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.dropped_count = 0;
    }

    /// Drain queued messages in arrival order
    pub fn drain_messages(&mut self) -> impl Iterator<Item = QueuedMessage> + '_ {
        core::iter::from_fn(move || self.queue.pop_front())
    }

    /// Drain the queue and convert it to STATUSTEXT messages
    ///
    /// Messages that do not fit in the returned buffer stay queued for
    /// the next call.
    pub fn take_pending_statustext(&mut self) -> Vec<STATUSTEXT_DATA, MAX_PENDING_STATUSTEXT> {
        let mut result = Vec::new();
        while let Some(msg) = self.queue.front() {
            let needed = chunk_count(msg.text.len());
            if result.len() + needed > result.capacity() {
                crate::log_warn!(
                    "STATUSTEXT result buffer full, {} messages pending",
                    self.queue.len()
                );
                break;
            }
            let Some(msg) = self.queue.pop_front() else {
                break;
            };
            for chunk in self.chunk_message(msg.severity, msg.text.as_str()) {
                let _ = result.push(chunk);
            }
        }
        result
    }

    /// Split a message into STATUSTEXT chunks
    ///
    /// Messages of 50 bytes or less produce a single message with id 0.
    /// Longer ones share a fresh non-zero id with sequential `chunk_seq`.
    pub fn chunk_message(
        &mut self,
        severity: MavSeverity,
        text: &str,
    ) -> Vec<STATUSTEXT_DATA, MAX_CHUNKS> {
        let bytes = text.as_bytes();
        let len = bytes.len().min(MAX_MESSAGE_LEN);
        let id = if len <= CHUNK_SIZE { 0 } else { self.take_chunk_id() };

        let mut chunks = Vec::new();
        for (seq, piece) in bytes[..len].chunks(CHUNK_SIZE).take(MAX_CHUNKS).enumerate() {
            let mut text_bytes = [0u8; CHUNK_SIZE];
            text_bytes[..piece.len()].copy_from_slice(piece);
            let _ = chunks.push(STATUSTEXT_DATA {
                severity,
                text: text_bytes.into(),
                id,
                chunk_seq: seq as u8,
            });
        }
        if chunks.is_empty() {
            let _ = chunks.push(STATUSTEXT_DATA {
                severity,
                text: [0u8; CHUNK_SIZE].into(),
                id: 0,
                chunk_seq: 0,
            });
        }
        chunks
    }

    fn take_chunk_id(&mut self) -> u16 {
        let id = self.next_chunk_id;
        // Skip 0 on wraparound
        self.next_chunk_id = match id.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        id
    }
}

impl StatusTextSink for StatusNotifier {
    fn send_text(&mut self, severity: Severity, args: fmt::Arguments<'_>) {
        let mut writer = TruncatingWriter::default();
        let _ = writer.write_fmt(args);
        self.push(severity, writer);
    }
}

fn chunk_count(len: usize) -> usize {
    len.min(MAX_MESSAGE_LEN).div_ceil(CHUNK_SIZE).max(1)
}

/// Map a core severity onto the MAVLink enum
pub fn mav_severity(severity: Severity) -> MavSeverity {
    match severity {
        Severity::Emergency => MavSeverity::MAV_SEVERITY_EMERGENCY,
        Severity::Alert => MavSeverity::MAV_SEVERITY_ALERT,
        Severity::Critical => MavSeverity::MAV_SEVERITY_CRITICAL,
        Severity::Error => MavSeverity::MAV_SEVERITY_ERROR,
        Severity::Warning => MavSeverity::MAV_SEVERITY_WARNING,
        Severity::Notice => MavSeverity::MAV_SEVERITY_NOTICE,
        Severity::Info => MavSeverity::MAV_SEVERITY_INFO,
        Severity::Debug => MavSeverity::MAV_SEVERITY_DEBUG,
    }
}

fn mirror_to_log(severity: Severity, text: &str) {
    match severity {
        Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
            crate::log_error!("GCS: {}", text)
        }
        Severity::Warning => crate::log_warn!("GCS: {}", text),
        Severity::Notice | Severity::Info => crate::log_info!("GCS: {}", text),
        Severity::Debug => crate::log_debug!("GCS: {}", text),
    }
}

/// Formatter target that keeps whole characters up to the text limit
#[derive(Default)]
struct TruncatingWriter {
    text: String<MAX_MESSAGE_LEN>,
    truncated: bool,
}

impl Write for TruncatingWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        for c in s.chars() {
            if self.text.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

/// Global StatusNotifier instance
static NOTIFIER: Mutex<RefCell<StatusNotifier>> = Mutex::new(RefCell::new(StatusNotifier::new()));

/// Sink that forwards into the global notifier
///
/// Zero-sized, so any number of landing components can hold one.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalStatusText;

impl StatusTextSink for GlobalStatusText {
    fn send_text(&mut self, severity: Severity, args: fmt::Arguments<'_>) {
        critical_section::with(|cs| NOTIFIER.borrow(cs).borrow_mut().send_text(severity, args));
    }
}

/// Queue a message on the global notifier
pub fn send_statustext(severity: Severity, text: &str) {
    critical_section::with(|cs| NOTIFIER.borrow(cs).borrow_mut().enqueue(severity, text));
}

/// Drain the global notifier into STATUSTEXT messages
///
/// Called by the telemetry side to send pending status notifications.
pub fn take_pending_statustext_messages() -> Vec<STATUSTEXT_DATA, MAX_PENDING_STATUSTEXT> {
    critical_section::with(|cs| NOTIFIER.borrow(cs).borrow_mut().take_pending_statustext())
}

/// Messages the global notifier has dropped
pub fn global_dropped_count() -> u32 {
    critical_section::with(|cs| NOTIFIER.borrow(cs).borrow().dropped_count())
}
