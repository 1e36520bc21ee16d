//! Decoder error types.
//!
//! Every variant means the byte stream is not valid BLE-MIDI at the current
//! scan position. The decoder makes no attempt to resynchronize after an
//! error: its internal cursors are left where the failure was detected, so
//! the instance must be discarded (or replaced) by the caller.
//!
//! A *partial* event cut off by a chunk boundary is not an error. That is
//! the expected steady state between calls and the decoder simply waits for
//! the remaining bytes.

use thiserror::Error;

/// Malformed-input conditions reported by [`decode`](crate::BleMidiDecoder::decode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A two-byte classification tail mixed a header-like and a data-like
    /// byte, which matches neither wire sub-format.
    #[error("unclassifiable byte pair {first:#04x} {second:#04x} at end of buffer")]
    AmbiguousTail { first: u8, second: u8 },

    /// The byte at an extraction position is not a valid MIDI status byte
    /// (its high nibble is outside `0x8`..=`0xF`).
    #[error("invalid status byte {byte:#04x}")]
    InvalidStatus { byte: u8 },

    /// A running-status data pair arrived before any full-format event had
    /// established a status byte to reuse.
    #[error("running-status data with no prior status byte")]
    MissingRunningStatus,
}
