//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the tick loop stalls. The timeout must cover the
//! longest blocking phase the loop can enter (the message announcement and
//! an offline replay); the main loop calls [`Watchdog::feed`] once per tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    timeout_ms: u32,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: plain FFI calls with a valid config; null means "this task".
        let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
        if ret != ESP_OK as esp_err_t {
            warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
        }
        let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
        let subscribed = ret == ESP_OK as esp_err_t;
        if subscribed {
            info!("Watchdog: subscribed ({} ms, panic on trigger)", timeout_ms);
        } else {
            warn!("Watchdog: failed to subscribe ({})", ret);
        }
        Self {
            subscribed,
            timeout_ms,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): no-op ({} ms)", timeout_ms);
        if timeout_ms == 0 {
            warn!("Watchdog(sim): zero timeout would reset on every tick");
        }
        Self { timeout_ms }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: only called from the subscribed task.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
