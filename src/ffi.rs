//! # FFI Layer for the BLE-MIDI decoder
//!
//! C-compatible interface over [`BleMidiDecoder`] for host applications
//! that own the BLE transport (mobile audio engines, embedded firmwares).
//! All functions use C-provided output buffers; the only allocation is the
//! decoder handle itself.
//!
//! ## Usage pattern
//!
//! 1. Create a handle with `ble_midi_decoder_new()`.
//! 2. For every BLE notification, size an output buffer with
//!    `ble_midi_decoder_max_output_size()` and call
//!    `ble_midi_decoder_decode()`.
//! 3. Walk the output buffer: each decoded message is prefixed by one
//!    length byte.
//! 4. On any non-zero return code, free the handle and create a new one —
//!    the stream is no longer in a decodable state.
//! 5. Free the handle with `ble_midi_decoder_free()` when the connection
//!    closes.

use std::ffi::{c_char, c_int};
use std::slice;

use crate::decoder::BleMidiDecoder;

// ============================================================================
// FFI TYPE DEFINITIONS
// ============================================================================

/// Error codes returned by FFI functions.
///
/// Use `ble_midi_decoder_error_message()` for human-readable descriptions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CErrorCode {
    /// Operation completed successfully
    Success = 0,
    /// The byte stream is not valid BLE-MIDI; discard the handle
    MalformedInput = 1,
    /// Provided output buffer is too small for the decoded messages
    BufferTooSmall = 2,
    /// Null pointer passed where a valid pointer was expected
    NullPointer = 3,
    /// A decoded SysEx message exceeds the 255-byte length prefix
    MessageTooLong = 4,
}

// ============================================================================
// HANDLE LIFECYCLE
// ============================================================================

/// Create a new decoder handle.
///
/// The returned pointer is an opaque heap allocation owned by the caller;
/// release it with `ble_midi_decoder_free()`. Never returns null.
#[no_mangle]
pub extern "C" fn ble_midi_decoder_new() -> *mut BleMidiDecoder {
    Box::into_raw(Box::new(BleMidiDecoder::new()))
}

/// Destroy a decoder handle created by `ble_midi_decoder_new()`.
///
/// # Safety
/// `decoder` must be a pointer returned by `ble_midi_decoder_new()` that
/// has not already been freed, or null (in which case this is a no-op).
#[no_mangle]
pub unsafe extern "C" fn ble_midi_decoder_free(decoder: *mut BleMidiDecoder) {
    if !decoder.is_null() {
        drop(Box::from_raw(decoder));
    }
}

// ============================================================================
// CORE FFI FUNCTIONS
// ============================================================================

/// Decode one chunk of raw BLE-MIDI payload bytes.
///
/// Completed messages are written into `buffer` back-to-back, each
/// preceded by a single length byte. `*actual_size` receives the total
/// number of bytes written and `*message_count` the number of messages.
///
/// A call may legitimately produce zero messages (the chunk ended
/// mid-event); that is still `Success`, with the partial event retained
/// inside the handle for the next call.
///
/// # Safety
/// This function is unsafe because it dereferences raw pointers. Callers
/// must ensure:
/// - `decoder` is a live handle from `ble_midi_decoder_new()`
/// - `input` points to `input_len` readable bytes (null is allowed only
///   when `input_len` is 0)
/// - `buffer` points to a writable buffer of at least `buffer_size` bytes
/// - `actual_size` and `message_count` point to writable `usize` locations
/// - No other call is executing against the same handle
///
/// # Returns
/// * `0` (Success) — chunk decoded; outputs are valid
/// * Non-zero — error code (see [`CErrorCode`]); the handle must be freed
///   and recreated, and the output buffer contents are unspecified
///
/// # Example Usage (C)
/// ```c
/// size_t cap = ble_midi_decoder_max_output_size(decoder, payload_len);
/// uint8_t *out = malloc(cap);
/// size_t written, count;
/// int rc = ble_midi_decoder_decode(decoder, payload, payload_len,
///                                  out, cap, &written, &count);
/// if (rc == 0) {
///     for (size_t off = 0; count > 0; count--) {
///         uint8_t len = out[off];
///         handle_midi(&out[off + 1], len);
///         off += 1 + len;
///     }
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn ble_midi_decoder_decode(
    decoder: *mut BleMidiDecoder,
    input: *const u8,
    input_len: usize,
    buffer: *mut u8,
    buffer_size: usize,
    actual_size: *mut usize,
    message_count: *mut usize,
) -> c_int {
    // Validate all pointers before use
    if decoder.is_null() || buffer.is_null() || actual_size.is_null() || message_count.is_null() {
        return CErrorCode::NullPointer as c_int;
    }
    if input.is_null() && input_len != 0 {
        return CErrorCode::NullPointer as c_int;
    }

    // Initialize output parameters to safe defaults
    *actual_size = 0;
    *message_count = 0;

    let decoder = &mut *decoder;
    let input = if input_len == 0 {
        &[][..]
    } else {
        slice::from_raw_parts(input, input_len)
    };

    let messages = match decoder.decode(input) {
        Ok(messages) => messages,
        Err(_) => return CErrorCode::MalformedInput as c_int,
    };

    // Pack messages into the C-provided buffer with 1-byte length prefixes
    let out = slice::from_raw_parts_mut(buffer, buffer_size);
    let mut offset = 0;
    for message in &messages {
        if message.len() > u8::MAX as usize {
            return CErrorCode::MessageTooLong as c_int;
        }
        if offset + 1 + message.len() > buffer_size {
            return CErrorCode::BufferTooSmall as c_int;
        }
        out[offset] = message.len() as u8;
        out[offset + 1..offset + 1 + message.len()].copy_from_slice(message);
        offset += 1 + message.len();
    }

    *actual_size = offset;
    *message_count = messages.len();

    CErrorCode::Success as c_int
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Upper bound on the output-buffer size needed to decode `input_len` more
/// bytes through `decoder`.
///
/// Running-status pairs expand two wire bytes into a four-byte output
/// record (length prefix plus synthesized status plus the pair), so the
/// bound is twice the decodable byte count: the new input plus whatever
/// partial event the handle is still holding.
///
/// # Safety
/// `decoder` must be a live handle from `ble_midi_decoder_new()`.
#[no_mangle]
pub unsafe extern "C" fn ble_midi_decoder_max_output_size(
    decoder: *const BleMidiDecoder,
    input_len: usize,
) -> usize {
    let pending = if decoder.is_null() {
        0
    } else {
        (*decoder).pending()
    };
    2 * (pending + input_len)
}

/// Get a human-readable message for an error code.
///
/// # Safety
/// The returned pointer is valid for the lifetime of the program and
/// points to a null-terminated C string. Do not free the pointer.
#[no_mangle]
pub extern "C" fn ble_midi_decoder_error_message(error_code: c_int) -> *const c_char {
    let message = match error_code {
        x if x == CErrorCode::Success as c_int => "Success\0",
        x if x == CErrorCode::MalformedInput as c_int => "Malformed BLE-MIDI input\0",
        x if x == CErrorCode::BufferTooSmall as c_int => "Output buffer too small\0",
        x if x == CErrorCode::NullPointer as c_int => "Null pointer passed\0",
        x if x == CErrorCode::MessageTooLong as c_int => "Decoded message too long\0",
        _ => "Unknown error\0",
    };
    message.as_ptr() as *const c_char
}
