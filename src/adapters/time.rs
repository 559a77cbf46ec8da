//! System clock adapter.
//!
//! - **`target_os = "espidf"`**: monotonic time from `esp_timer_get_time()`,
//!   local hour from `gettimeofday` + `localtime_r` (needs SNTP and `TZ`),
//!   delays through FreeRTOS so other tasks keep running.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `thread::sleep`. The hour can be pinned for simulation.

use crate::app::ports::ClockPort;

/// Anything before 2020-01-01 means SNTP has not synced yet.
#[cfg(target_os = "espidf")]
const EPOCH_2020: i64 = 1_577_836_800;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    #[cfg(not(target_os = "espidf"))]
    fixed_hour: Option<u8>,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            fixed_hour: None,
        }
    }

    /// Pretend the wall clock reads `hour`. Simulation only.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_hour(mut self, hour: Option<u8>) -> Self {
        self.fixed_hour = hour.filter(|h| *h < 24);
        self
    }

    #[cfg(target_os = "espidf")]
    fn local_hour() -> Option<u8> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        if (tv.tv_sec as i64) < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        u8::try_from(tm.tm_hour).ok().filter(|h| *h < 24)
    }
}

impl ClockPort for SystemClock {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_os = "espidf")]
    fn hour_of_day(&self) -> Option<u8> {
        Self::local_hour()
    }

    #[cfg(not(target_os = "espidf"))]
    fn hour_of_day(&self) -> Option<u8> {
        self.fixed_hour
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
