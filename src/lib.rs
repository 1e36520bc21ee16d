//! # BLE-MIDI to standard MIDI decoder.
//!
//! Bluetooth Low Energy MIDI notifications carry one or more MIDI events
//! behind header/timestamp bytes, may compress repeated status bytes
//! (running status), and may split *any* event — including its header —
//! across notifications, because BLE delivery has no alignment guarantee
//! with MIDI event boundaries.
//!
//! [`BleMidiDecoder`] reassembles standard MIDI messages from that stream:
//! feed it raw payload chunks in arrival order and it returns the messages
//! completed by each chunk, buffering any trailing partial event until the
//! rest arrives.
//!
//! ```
//! use ble_midi_decoder::BleMidiDecoder;
//!
//! let mut decoder = BleMidiDecoder::new();
//! // header + timestamp + note on, split mid-event
//! assert!(decoder.decode(&[0x80, 0x80, 0x90, 0x3C]).unwrap().is_empty());
//! let messages = decoder.decode(&[0x40]).unwrap();
//! assert_eq!(messages, vec![vec![0x90, 0x3C, 0x40]]);
//! ```

pub mod decoder;
pub mod error;
pub mod ffi;
pub mod midi;

pub use decoder::BleMidiDecoder;
pub use error::DecodeError;
