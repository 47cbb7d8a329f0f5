//! Error taxonomy and the single-slot global error buffer.
//!
//! Configuration and host errors are fatal and carry a message; runtime
//! conditions (unmapped bus addresses, illegal opcodes) are handled
//! silently elsewhere and never reach this module. Mirrors the original
//! `NESL_SetError`/`nesl_get_error` contract: one slot, overwritten on
//! each failure, file/function/line folded into the message text since
//! Rust's `#[track_caller]` location serves the same purpose.

use std::sync::{Mutex, OnceLock};

use rustynes_mappers::{MapperError, RomError};

/// Errors that can make [`crate::console::run`] fail.
#[derive(Debug, thiserror::Error)]
pub enum NesError {
    /// The ROM image failed to parse (bad magic, truncated banks, ...).
    #[error("invalid ROM: {0}")]
    Rom(#[from] RomError),

    /// The ROM names a mapper number this build has no implementation for.
    #[error("unsupported cartridge: {0}")]
    Mapper(#[from] MapperError),

    /// The host layer failed (window, renderer, audio device, ...).
    #[error("host error: {0}")]
    Host(String),

    /// An internal allocation failed; `bytes` is the requested size.
    #[error("allocation of {bytes} bytes failed")]
    Allocation {
        /// Size of the failed allocation, in bytes.
        bytes: usize,
    },
}

static ERROR_SLOT: OnceLock<Mutex<Option<String>>> = OnceLock::new();

fn slot() -> &'static Mutex<Option<String>> {
    ERROR_SLOT.get_or_init(|| Mutex::new(None))
}

/// Overwrites the single error slot with `error`'s formatted message.
///
/// Called once, immediately before `run()` returns a failure.
pub(crate) fn set_error(error: &NesError) {
    log::error!("{error}");
    let mut guard = slot().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    *guard = Some(error.to_string());
}

/// Reads back the most recent failure's message, if any.
///
/// Matches the original's `nesl_get_error`: the slot holds only the last
/// failure and is not cleared by reading it.
#[must_use]
pub fn get_error() -> Option<String> {
    slot().lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases share the process-global slot, so they run as one test to
    // avoid interleaving with a parallel test thread.
    #[test]
    fn set_error_is_retrievable_and_later_failures_overwrite_it() {
        set_error(&NesError::Host("window failed".to_string()));
        assert_eq!(get_error().as_deref(), Some("host error: window failed"));

        set_error(&NesError::Allocation { bytes: 16 });
        assert_eq!(get_error().as_deref(), Some("allocation of 16 bytes failed"));
    }
}
