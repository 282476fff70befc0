//! Version-specific backend handles.
//!
//! A backend handle owns exactly one live connection to the ledger for one
//! (protocol version, partition) pair. Handles are created once during router
//! initialization and live for the process lifetime; there is no teardown
//! path short of process exit.

mod legacy;
mod modern;

pub(crate) use legacy::LegacyBackend;
pub(crate) use modern::ModernBackend;

use crate::error::{Result, RouterError};

/// Upper bound on a published event's content, enforced before the send is
/// pooled.
pub(crate) const MAX_EVENT_CONTENT_BYTES: usize = 10 * 1024;

pub(crate) fn check_event_content(content: &[u8]) -> Result<()> {
    if content.is_empty() {
        return Err(RouterError::validation("event content", "empty payload"));
    }
    if content.len() > MAX_EVENT_CONTENT_BYTES {
        return Err(RouterError::validation(
            "event content",
            format!(
                "payload of {} bytes exceeds the {} byte limit",
                content.len(),
                MAX_EVENT_CONTENT_BYTES
            ),
        ));
    }
    Ok(())
}
