//! # BLE-MIDI stream decoder core.
//!
//! This module implements the stateful translation from BLE-MIDI packet
//! payloads to standard MIDI messages. A BLE-MIDI payload interleaves two
//! wire sub-formats:
//!
//! - **Full format**: header byte, timestamp byte, status byte, data bytes.
//!   The timestamp is occasionally compacted away, leaving a lone header.
//! - **Running status**: bare two-byte data pairs that reuse the status
//!   byte of the most recent full-format channel-voice event.
//!
//! Headers and timestamps carry the high bit set while channel-voice data
//! bytes do not, which is what lets the decoder tell the sub-formats apart
//! without any external framing.
//!
//! Because BLE notifications are not aligned with MIDI event boundaries,
//! any event — header included — can be split across `decode` calls. The
//! decoder therefore keeps every byte it has not folded into a completed
//! message in a pending buffer, and each call walks that buffer with two
//! cursors:
//!
//! - `scanned`: the next byte not yet looked at during this call.
//! - `consumed`: how many leading bytes have been folded into completed
//!   output messages. Always `consumed <= scanned <= buffer.len()`.
//!
//! The walk alternates between classifying (which sub-format starts at the
//! cursor?) and extracting (pull one complete event, or stop and wait for
//! more input). When the cursor reaches the end of the buffer, the
//! consumed prefix is dropped and the completed messages are returned.

use log::{trace, warn};

use crate::error::DecodeError;
use crate::midi::{StatusKind, CHANNEL_VOICE_LENGTH, RUNNING_STATUS_PAIR_LENGTH, SYSEX_END};

/// Classification threshold: bytes with unsigned value above this are
/// treated as header-like, bytes at or below as data-like.
///
/// The source device's adapter compares against `0x79` rather than the
/// `0x7F` that the high-bit rule would suggest, so `0x7A..=0x7F` classify
/// as header-like here. Kept verbatim for wire compatibility.
const HEADER_THRESHOLD: u8 = 0x79;

/// Which stage currently owns the scan cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Deciding which sub-format starts at the cursor.
    Classifying,
    /// Pulling one event out of the buffer.
    Extracting,
}

/// Wire sub-format believed in effect, valid while `Mode::Extracting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    /// Header + timestamp + status + data.
    Full,
    /// Bare data pairs reusing the last cached status byte.
    RunningStatus,
}

/// Stateful BLE-MIDI to standard MIDI decoder.
///
/// One instance per BLE connection. `decode` takes `&mut self`, so the
/// borrow checker enforces the one-call-at-a-time contract; callers that
/// share a decoder across tasks must wrap it in their own mutex.
///
/// All state except the per-call output persists across calls — that is
/// what makes reassembly of events split across notifications possible.
#[derive(Debug)]
pub struct BleMidiDecoder {
    /// Bytes received but not yet folded into completed messages.
    buffer: Vec<u8>,
    /// Scan cursor, reset at the start of every call.
    scanned: usize,
    /// Length of the buffer prefix consumed by completed messages.
    consumed: usize,
    mode: Mode,
    protocol: Protocol,
    /// Status byte of the most recent full-format channel-voice event,
    /// reused by running-status pairs. Survives across calls indefinitely.
    last_status: Option<u8>,
}

impl Default for BleMidiDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BleMidiDecoder {
    /// Returns a decoder with an empty pending buffer and no cached status.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            consumed: 0,
            mode: Mode::Classifying,
            protocol: Protocol::Full,
            last_status: None,
        }
    }

    /// Decodes one chunk of raw BLE-MIDI payload bytes.
    ///
    /// Chunk boundaries carry no meaning: feeding a stream as one call or
    /// as many arbitrarily split calls yields the same message sequence.
    /// Each returned message is either exactly three bytes (channel-voice,
    /// possibly synthesized from a running-status pair) or a SysEx span
    /// ending with `0xF7` inclusive, in reassembly order. A call that ends
    /// mid-event returns only the messages completed so far and keeps the
    /// partial tail buffered for the next call.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] means the stream is not valid BLE-MIDI at the
    /// current position. The decoder's cursors are left where the failure
    /// was detected; discard the instance and start over.
    pub fn decode(&mut self, input: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
        self.buffer.extend_from_slice(input);
        self.scanned = 0;
        self.consumed = 0;

        let mut messages = Vec::new();
        while self.scanned < self.buffer.len() {
            match self.mode {
                Mode::Classifying => self.classify()?,
                Mode::Extracting => self.extract(&mut messages)?,
            }
        }
        self.buffer.drain(..self.consumed);
        self.consumed = 0;
        self.scanned = 0;

        Ok(messages)
    }

    /// Bytes currently buffered while waiting for the rest of an event.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the decoder to its freshly-constructed state, dropping any
    /// buffered partial event and the cached status byte.
    ///
    /// This is the recovery path after a [`DecodeError`]: the discarded
    /// bytes were never observable externally, so nothing is lost that was
    /// ever valid.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
        self.consumed = 0;
        self.mode = Mode::Classifying;
        self.protocol = Protocol::Full;
        self.last_status = None;
    }

    // ------------------------------------------------------------------
    // Protocol classification
    // ------------------------------------------------------------------

    /// Decides which sub-format starts at the cursor from a lookahead of up
    /// to three bytes, or records that more input is needed.
    fn classify(&mut self) -> Result<(), DecodeError> {
        debug_assert_eq!(self.mode, Mode::Classifying);

        let s = self.scanned;
        if s + 2 < self.buffer.len() {
            let lookahead = (
                is_header_like(self.buffer[s]),
                is_header_like(self.buffer[s + 1]),
                is_header_like(self.buffer[s + 2]),
            );
            match lookahead {
                // Header + timestamp in front of a status byte.
                (true, true, true) => {
                    self.protocol = Protocol::Full;
                    self.scanned += 2;
                    self.consumed += 2;
                    self.mode = Mode::Extracting;
                }
                // Compacted form: lone header, no timestamp.
                (true, true, false) => {
                    self.protocol = Protocol::Full;
                    self.scanned += 1;
                    self.consumed += 1;
                    self.mode = Mode::Extracting;
                }
                (false, false, _) => {
                    self.protocol = Protocol::RunningStatus;
                    self.mode = Mode::Extracting;
                }
                _ => {
                    warn!(
                        "skipping unclassifiable byte {:#04x} at offset {}",
                        self.buffer[s], s
                    );
                    self.scanned += 1;
                }
            }
        } else if s + 1 < self.buffer.len() {
            match (is_header_like(self.buffer[s]), is_header_like(self.buffer[s + 1])) {
                (false, false) => {
                    self.protocol = Protocol::RunningStatus;
                    self.mode = Mode::Extracting;
                }
                (true, true) => {
                    // Could be header + timestamp or two of something else;
                    // only a third byte can tell. Leave both unconsumed.
                    trace!("header-like pair at end of buffer, waiting for more input");
                    self.scanned += 2;
                }
                _ => {
                    return Err(DecodeError::AmbiguousTail {
                        first: self.buffer[s],
                        second: self.buffer[s + 1],
                    });
                }
            }
        } else {
            // A single trailing byte classifies as nothing on its own.
            self.scanned += 1;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event extraction
    // ------------------------------------------------------------------

    /// Extracts one event according to the classified sub-format.
    fn extract(&mut self, messages: &mut Vec<Vec<u8>>) -> Result<(), DecodeError> {
        debug_assert_eq!(self.mode, Mode::Extracting);

        match self.protocol {
            Protocol::Full => self.extract_full(messages),
            Protocol::RunningStatus => self.extract_running_status(messages),
        }
    }

    /// Full format: the cursor points at a status byte. Channel-voice
    /// statuses are handled inline; system statuses hand off to the SysEx
    /// extractor.
    fn extract_full(&mut self, messages: &mut Vec<Vec<u8>>) -> Result<(), DecodeError> {
        let status = self.buffer[self.scanned];
        match StatusKind::from_status(status) {
            Some(kind) if kind.is_channel_voice() => {
                self.extract_channel_voice(messages);
                Ok(())
            }
            Some(_) => {
                self.extract_sysex(messages);
                Ok(())
            }
            None => Err(DecodeError::InvalidStatus { byte: status }),
        }
    }

    /// Emits a complete 3-byte channel-voice event, or waits if the buffer
    /// ends before its two data bytes have arrived. Nothing partial is
    /// consumed or emitted; the event is re-extracted once complete.
    fn extract_channel_voice(&mut self, messages: &mut Vec<Vec<u8>>) {
        let s = self.scanned;
        if s + CHANNEL_VOICE_LENGTH <= self.buffer.len() {
            let message = self.buffer[s..s + CHANNEL_VOICE_LENGTH].to_vec();
            self.last_status = Some(message[0]);
            messages.push(message);
            self.scanned += CHANNEL_VOICE_LENGTH;
            self.consumed += CHANNEL_VOICE_LENGTH;
            self.mode = Mode::Classifying;
        } else {
            trace!(
                "channel-voice event cut off after {} byte(s), waiting",
                self.buffer.len() - s
            );
            self.scanned = self.buffer.len();
        }
    }

    /// Emits the SysEx span from the cursor through the `0xF7` terminator
    /// inclusive, or waits if the terminator has not arrived yet. The
    /// partial span stays buffered unconsumed until it completes.
    fn extract_sysex(&mut self, messages: &mut Vec<Vec<u8>>) {
        match self.buffer[self.scanned..].iter().position(|&b| b == SYSEX_END) {
            Some(offset) => {
                let end = self.scanned + offset;
                messages.push(self.buffer[self.scanned..=end].to_vec());
                self.scanned = end + 1;
                self.consumed = end + 1;
                self.mode = Mode::Classifying;
            }
            None => {
                trace!("sysex terminator not yet buffered, waiting");
                self.scanned = self.buffer.len();
            }
        }
    }

    /// Running status: synthesizes a 3-byte event from the cached status
    /// byte and a bare data pair, or waits if only one byte of the pair has
    /// arrived.
    fn extract_running_status(&mut self, messages: &mut Vec<Vec<u8>>) -> Result<(), DecodeError> {
        let s = self.scanned;
        if s + RUNNING_STATUS_PAIR_LENGTH <= self.buffer.len() {
            let status = self.last_status.ok_or(DecodeError::MissingRunningStatus)?;
            messages.push(vec![status, self.buffer[s], self.buffer[s + 1]]);
            self.scanned += RUNNING_STATUS_PAIR_LENGTH;
            self.consumed += RUNNING_STATUS_PAIR_LENGTH;
            self.mode = Mode::Classifying;
        } else {
            self.scanned = self.buffer.len();
        }
        Ok(())
    }
}

/// `true` if the byte classifies as a BLE-MIDI header or timestamp.
fn is_header_like(byte: u8) -> bool {
    byte > HEADER_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_threshold_is_literal() {
        // 0x7A..=0x7F land on the header side of the source device's
        // threshold even though they are data bytes under the high-bit rule.
        assert!(!is_header_like(0x79));
        assert!(is_header_like(0x7A));
        assert!(is_header_like(0x80));
        assert!(!is_header_like(0x00));
    }

    #[test]
    fn fresh_decoder_buffers_lone_byte() {
        let mut decoder = BleMidiDecoder::new();
        assert_eq!(decoder.decode(&[0x80]).unwrap(), Vec::<Vec<u8>>::new());
        assert_eq!(decoder.pending(), 1);
    }

    #[test]
    fn header_pair_waits_for_third_byte() {
        let mut decoder = BleMidiDecoder::new();
        assert!(decoder.decode(&[0x80, 0x80]).unwrap().is_empty());
        assert_eq!(decoder.pending(), 2);
        // The third byte resolves the pair as header + timestamp.
        let messages = decoder.decode(&[0x90, 0x3C, 0x40]).unwrap();
        assert_eq!(messages, vec![vec![0x90, 0x3C, 0x40]]);
        assert_eq!(decoder.pending(), 0);
    }
}
