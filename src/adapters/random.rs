//! Entropy for mood rolls.
//!
//! On the ESP32 the hardware RNG (`esp_random`) is used directly; with the
//! radio up it is a true RNG. On the host a xorshift32 generator stands in,
//! seeded from the std hasher's per-process random keys.

use crate::app::ports::RandomPort;

pub struct HwRandom {
    #[cfg(not(target_os = "espidf"))]
    state: u32,
}

impl Default for HwRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl HwRandom {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        use std::hash::{BuildHasher, Hasher};
        let mut h = std::collections::hash_map::RandomState::new().build_hasher();
        h.write_u64(0x5049_5845_4c50_414c);
        Self::seeded(h.finish() as u32)
    }

    /// Deterministic sequence for simulation runs.
    #[cfg(not(target_os = "espidf"))]
    pub fn seeded(seed: u32) -> Self {
        // xorshift has a fixed point at zero
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }
}

impl RandomPort for HwRandom {
    #[cfg(target_os = "espidf")]
    fn next_u32(&mut self) -> u32 {
        unsafe { esp_idf_svc::sys::esp_random() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
