//! Deep-sleep retained storage.
//!
//! Implements [`RetainedStore`] on a small blob in RTC slow memory, the
//! one RAM region that survives deep sleep.  A cold boot or reflash zeroes
//! it, which the magic word turns into "nothing retained".
//!
//! Blob layout (little-endian):
//!
//! ```text
//! [0..4)   magic 0x4B4D4143 ("CAMK")
//! [4]      payload length
//! [5..)    postcard-encoded PersistentState
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: static buffer linked into `.rtc.data`.
//! - **all other targets**: the same blob held in an ordinary field.

use log::{info, warn};

use crate::app::ports::RetainedStore;
use crate::cycle::PersistentState;

pub const BLOB_MAGIC: u32 = 0x4B4D_4143;
pub const BLOB_LEN: usize = 32;
const HEADER_LEN: usize = 5;
const MAX_PAYLOAD: usize = BLOB_LEN - HEADER_LEN;

/// Serialise `state` into a fixed-size blob.
pub fn encode_blob(state: &PersistentState) -> [u8; BLOB_LEN] {
    let mut blob = [0u8; BLOB_LEN];
    blob[..4].copy_from_slice(&BLOB_MAGIC.to_le_bytes());
    // Two varint u32s need at most 10 bytes, well under MAX_PAYLOAD.
    match postcard::to_slice(state, &mut blob[HEADER_LEN..]) {
        Ok(used) => blob[4] = used.len() as u8,
        Err(e) => {
            warn!("retained: encode failed ({}), writing empty blob", e);
            return [0u8; BLOB_LEN];
        }
    }
    blob
}

/// Parse a blob; `None` for anything that is not a blob we wrote.
pub fn decode_blob(blob: &[u8]) -> Option<PersistentState> {
    if blob.len() < HEADER_LEN {
        return None;
    }
    let magic = u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]);
    if magic != BLOB_MAGIC {
        return None;
    }
    let len = blob[4] as usize;
    if len == 0 || len > MAX_PAYLOAD || HEADER_LEN + len > blob.len() {
        return None;
    }
    postcard::from_bytes(&blob[HEADER_LEN..HEADER_LEN + len]).ok()
}

// ── ESP-IDF ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
#[unsafe(link_section = ".rtc.data")]
static mut RTC_BLOB: [u8; BLOB_LEN] = [0; BLOB_LEN];

/// Handle to the RTC blob.  Construct at most one per program run.
#[cfg(target_os = "espidf")]
pub struct RtcRetainedStore {
    _private: (),
}

#[cfg(target_os = "espidf")]
impl RtcRetainedStore {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_os = "espidf")]
impl RetainedStore for RtcRetainedStore {
    fn load(&self) -> Option<PersistentState> {
        // SAFETY: the wake runs on one task and this is the only accessor.
        let blob = unsafe { core::ptr::read(&raw const RTC_BLOB) };
        let state = decode_blob(&blob);
        if state.is_none() {
            info!("retained: RTC blob empty or invalid");
        }
        state
    }

    fn store(&mut self, state: &PersistentState) {
        let blob = encode_blob(state);
        // SAFETY: as in load().
        unsafe { core::ptr::write(&raw mut RTC_BLOB, blob) };
    }
}

// ── Simulation ────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct RtcRetainedStore {
    blob: [u8; BLOB_LEN],
}

#[cfg(not(target_os = "espidf"))]
impl RtcRetainedStore {
    /// Fresh after power-on: all zeroes.
    pub fn new_simulated() -> Self {
        Self {
            blob: [0; BLOB_LEN],
        }
    }

    /// Start from an arbitrary blob (e.g. garbage after a brown-out).
    pub fn from_blob(blob: [u8; BLOB_LEN]) -> Self {
        Self { blob }
    }

    pub fn blob(&self) -> &[u8; BLOB_LEN] {
        &self.blob
    }
}

#[cfg(not(target_os = "espidf"))]
impl RetainedStore for RtcRetainedStore {
    fn load(&self) -> Option<PersistentState> {
        let state = decode_blob(&self.blob);
        if state.is_none() {
            info!("retained(sim): blob empty or invalid");
        }
        state
    }

    fn store(&mut self, state: &PersistentState) {
        self.blob = encode_blob(state);
    }
}
