//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] for the Pixelpal.
//!
//! - Config validation: every field is range-checked before persistence.
//! - Namespaces: `pixelpal` holds the config blob and the persistent store
//!   records, `wifi` holds the station credentials.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//!
//! Off-target the adapter keeps everything in memory.

use heapless::String;
use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::DeviceConfig;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "pixelpal";
const CONFIG_KEY: &str = "config";
const WIFI_NAMESPACE: &str = "wifi";
const WIFI_SSID_KEY: &str = "ssid";
const WIFI_PASS_KEY: &str = "pass";

/// NVS keys and namespaces are limited to 15 bytes plus the terminator.
#[cfg(target_os = "espidf")]
const NVS_NAME_MAX: usize = 15;
const CONFIG_BLOB_MAX: usize = 128;

pub type Ssid = String<32>;
pub type Passphrase = String<64>;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<std::string::String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// On first boot or after a layout change the partition is erased and
    /// re-initialised. Any other failure is returned; the caller runs the
    /// store degraded.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if Self::check(unsafe { nvs_flash_erase() })
                    .and_then(|()| Self::check(unsafe { nvs_flash_init() }))
                    .is_err()
                {
                    return Err(StorageError::Unavailable);
                }
            } else if ret != ESP_OK as esp_err_t {
                warn!("NVS: init failed ({})", ret);
                return Err(StorageError::Unavailable);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: in-memory backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> std::string::String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of an NVS name, or `None` if it is too long.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> Option<[u8; NVS_NAME_MAX + 1]> {
        let bytes = name.as_bytes();
        if bytes.len() > NVS_NAME_MAX || bytes.contains(&0) {
            return None;
        }
        let mut buf = [0u8; NVS_NAME_MAX + 1];
        buf[..bytes.len()].copy_from_slice(bytes);
        Some(buf)
    }

    /// Open `namespace`, run `f` with the handle and the encoded `key`,
    /// then close.
    #[cfg(target_os = "espidf")]
    fn with_handle<F, T>(namespace: &str, key: &str, write: bool, f: F) -> Result<T, esp_err_t>
    where
        F: FnOnce(nvs_handle_t, *const core::ffi::c_char) -> Result<T, esp_err_t>,
    {
        let (Some(ns), Some(k)) = (Self::c_name(namespace), Self::c_name(key)) else {
            return Err(ESP_ERR_NVS_INVALID_NAME as esp_err_t);
        };
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        Self::check(unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) })?;
        let result = f(handle, k.as_ptr().cast());
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn map_err(ret: esp_err_t) -> StorageError {
        if ret == ESP_ERR_NVS_NOT_FOUND as esp_err_t {
            StorageError::NotFound
        } else if ret == ESP_ERR_NVS_NOT_ENOUGH_SPACE as esp_err_t
            || ret == ESP_ERR_NVS_INVALID_LENGTH as esp_err_t
        {
            StorageError::Full
        } else {
            StorageError::IoError
        }
    }

    #[cfg(target_os = "espidf")]
    fn check(ret: esp_err_t) -> Result<(), esp_err_t> {
        if ret == ESP_OK as esp_err_t { Ok(()) } else { Err(ret) }
    }
}

// ── Config ─────────────────────────────────────────────────────────

pub fn validate_config(cfg: &DeviceConfig) -> Result<(), ConfigError> {
    if !(20..=2_000).contains(&cfg.debounce_ms) {
        return Err(ConfigError::ValidationFailed("debounce_ms must be 20–2000"));
    }
    if !(1_000..=3_600_000).contains(&cfg.mood_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "mood_interval_ms must be 1000–3600000",
        ));
    }
    if !(500..=60_000).contains(&cfg.happy_hold_ms) {
        return Err(ConfigError::ValidationFailed("happy_hold_ms must be 500–60000"));
    }
    if cfg.night_start_hour > 23 || cfg.night_end_hour > 23 {
        return Err(ConfigError::ValidationFailed("night hours must be 0–23"));
    }
    if !(100..=10_000).contains(&cfg.stats_refresh_ms) {
        return Err(ConfigError::ValidationFailed(
            "stats_refresh_ms must be 100–10000",
        ));
    }
    if !(20..=1_000).contains(&cfg.announcement_frame_ms) {
        return Err(ConfigError::ValidationFailed(
            "announcement_frame_ms must be 20–1000",
        ));
    }
    if !(1..=100).contains(&cfg.wifi_max_attempts) {
        return Err(ConfigError::ValidationFailed("wifi_max_attempts must be 1–100"));
    }
    if cfg.flush_pacing_ms > 5_000 {
        return Err(ConfigError::ValidationFailed("flush_pacing_ms must be 0–5000"));
    }
    if !(500..=600_000).contains(&cfg.flush_retry_ms) {
        return Err(ConfigError::ValidationFailed("flush_retry_ms must be 500–600000"));
    }
    if !(5..=200).contains(&cfg.tick_interval_ms) {
        return Err(ConfigError::ValidationFailed("tick_interval_ms must be 5–200"));
    }
    if cfg.tick_interval_ms >= cfg.stats_refresh_ms {
        return Err(ConfigError::ValidationFailed(
            "tick_interval_ms must be < stats_refresh_ms",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<DeviceConfig, ConfigError> {
        let mut buf = [0u8; CONFIG_BLOB_MAX];
        let len = match self.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                return Ok(DeviceConfig::default());
            }
            Err(e) => {
                warn!("NvsAdapter: config read failed ({}), using defaults", e);
                return Ok(DeviceConfig::default());
            }
        };
        let cfg: DeviceConfig = postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
        validate_config(&cfg)?;
        info!("NvsAdapter: loaded config ({} bytes)", len);
        Ok(cfg)
    }

    fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.put(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)
            .map_err(|_| ConfigError::IoError)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

// ── Blob storage ───────────────────────────────────────────────────

impl NvsAdapter {
    /// Shared write path; `ConfigPort::save` only has `&self`.
    #[cfg(not(target_os = "espidf"))]
    fn put(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .borrow_mut()
            .insert(Self::composite_key(namespace, key), data.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn put(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        Self::with_handle(namespace, key, true, |handle, k| {
            Self::check(unsafe { nvs_set_blob(handle, k, data.as_ptr().cast(), data.len()) })?;
            Self::check(unsafe { nvs_commit(handle) })
        })
        .map_err(Self::map_err)
    }
}

impl StoragePort for NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let store = self.store.borrow();
        let data = store
            .get(&Self::composite_key(namespace, key))
            .ok_or(StorageError::NotFound)?;
        if data.len() > buf.len() {
            return Err(StorageError::Full);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    #[cfg(target_os = "espidf")]
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        Self::with_handle(namespace, key, false, |handle, k| {
            let mut size = buf.len();
            Self::check(unsafe { nvs_get_blob(handle, k, buf.as_mut_ptr().cast(), &mut size) })?;
            Ok(size)
        })
        .map_err(Self::map_err)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.put(namespace, key, data)
    }

    #[cfg(not(target_os = "espidf"))]
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store
            .borrow_mut()
            .remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        Self::with_handle(namespace, key, true, |handle, k| {
            let ret = unsafe { nvs_erase_key(handle, k) };
            if ret != ESP_ERR_NVS_NOT_FOUND as esp_err_t {
                Self::check(ret)?;
            }
            Self::check(unsafe { nvs_commit(handle) })
        })
        .map_err(Self::map_err)
    }

    #[cfg(not(target_os = "espidf"))]
    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store
            .borrow()
            .contains_key(&Self::composite_key(namespace, key))
    }

    #[cfg(target_os = "espidf")]
    fn exists(&self, namespace: &str, key: &str) -> bool {
        Self::with_handle(namespace, key, false, |handle, k| {
            Ok(unsafe { nvs_find_key(handle, k, core::ptr::null_mut()) } == ESP_OK as esp_err_t)
        })
        .unwrap_or(false)
    }
}

// ── WiFi credentials ───────────────────────────────────────────────
//
// Written by the provisioning flow (or a factory script), read once at
// boot. With CONFIG_NVS_ENCRYPTION the whole partition is AES-XTS
// encrypted; nothing here changes.
impl NvsAdapter {
    pub fn store_wifi_credentials(&mut self, ssid: &str, pass: &str) -> Result<(), StorageError> {
        self.write(WIFI_NAMESPACE, WIFI_SSID_KEY, ssid.as_bytes())?;
        self.write(WIFI_NAMESPACE, WIFI_PASS_KEY, pass.as_bytes())
    }

    /// Stored station credentials, or `None` if unprovisioned.
    pub fn load_wifi_credentials(&self) -> Option<(Ssid, Passphrase)> {
        let mut ssid_buf = [0u8; 32];
        let mut pass_buf = [0u8; 64];
        let ssid_len = self.read(WIFI_NAMESPACE, WIFI_SSID_KEY, &mut ssid_buf).ok()?;
        let pass_len = match self.read(WIFI_NAMESPACE, WIFI_PASS_KEY, &mut pass_buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => 0,
            Err(e) => {
                warn!("NvsAdapter: WiFi passphrase unreadable ({})", e);
                return None;
            }
        };
        let ssid = core::str::from_utf8(&ssid_buf[..ssid_len]).ok()?;
        let pass = core::str::from_utf8(&pass_buf[..pass_len]).ok()?;
        Some((Ssid::try_from(ssid).ok()?, Passphrase::try_from(pass).ok()?))
    }

    pub fn erase_wifi_credentials(&mut self) -> Result<(), StorageError> {
        self.delete(WIFI_NAMESPACE, WIFI_SSID_KEY)?;
        self.delete(WIFI_NAMESPACE, WIFI_PASS_KEY)
    }
}
