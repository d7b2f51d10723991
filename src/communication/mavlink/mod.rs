//! MAVLink protocol support
//!
//! Only the STATUSTEXT path is provided here; message transport is the
//! firmware's concern.

pub mod status_notifier;

pub use status_notifier::{
    send_statustext, take_pending_statustext_messages, GlobalStatusText, StatusNotifier,
};
