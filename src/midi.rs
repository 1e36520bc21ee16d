//! MIDI status-byte taxonomy and wire constants.
//!
//! Standard MIDI encodes the message kind in the high nibble of the status
//! byte; the low nibble of a channel-voice status carries the channel
//! number. [`StatusKind`] covers exactly the shapes the decoder accepts —
//! the seven channel-voice kinds plus system messages — and rejects
//! everything else.

// ============================================================================
// MIDI Protocol Constants
// ============================================================================

/// Start of System Exclusive (SysEx) message.
pub const SYSEX_START: u8 = 0xF0;

/// End of System Exclusive (SysEx) message.
pub const SYSEX_END: u8 = 0xF7;

/// Length of a decoded channel-voice message: status plus two data bytes.
///
/// The source device emits two data bytes even for `0xC_`/`0xD_` statuses
/// (which standard MIDI defines as 2-byte messages), so a uniform 3-byte
/// length is used for every channel-voice kind.
pub const CHANNEL_VOICE_LENGTH: usize = 3;

/// Length of a running-status data pair on the wire (the status byte is
/// implied by the previous full-format event).
pub const RUNNING_STATUS_PAIR_LENGTH: usize = 2;

// ============================================================================
// Status Byte Classification
// ============================================================================

/// Message kind encoded in the high nibble of a MIDI status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// `0x8_` — note off.
    NoteOff,
    /// `0x9_` — note on.
    NoteOn,
    /// `0xA_` — polyphonic key pressure.
    PolyPressure,
    /// `0xB_` — control change.
    ControlChange,
    /// `0xC_` — program change.
    ProgramChange,
    /// `0xD_` — channel pressure.
    ChannelPressure,
    /// `0xE_` — pitch bend.
    PitchBend,
    /// `0xF_` — system message (SysEx and system common/realtime).
    System,
}

impl StatusKind {
    /// Classifies a status byte by its high nibble.
    ///
    /// Returns `None` for bytes whose high nibble is below `0x8`, i.e.
    /// bytes that cannot open a MIDI message.
    pub fn from_status(byte: u8) -> Option<StatusKind> {
        match byte & 0xF0 {
            0x80 => Some(StatusKind::NoteOff),
            0x90 => Some(StatusKind::NoteOn),
            0xA0 => Some(StatusKind::PolyPressure),
            0xB0 => Some(StatusKind::ControlChange),
            0xC0 => Some(StatusKind::ProgramChange),
            0xD0 => Some(StatusKind::ChannelPressure),
            0xE0 => Some(StatusKind::PitchBend),
            0xF0 => Some(StatusKind::System),
            _ => None,
        }
    }

    /// `true` for the seven fixed-length channel-voice kinds.
    pub fn is_channel_voice(self) -> bool {
        !matches!(self, StatusKind::System)
    }
}
