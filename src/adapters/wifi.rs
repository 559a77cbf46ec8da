//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`]: the bounded startup association and the
//! cheap per-tick reconnect poll.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc`.
//! - **all other targets**: a simulated network that accepts the
//!   association on a chosen attempt, for host-side tests.
//!
//! ## Reconnection policy
//!
//! After a drop the adapter retries with exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s). Reconnect requests never block the tick.
//!
//! When the startup budget runs out the radio is switched to mixed mode
//! and an open access point named [`SETUP_AP_NAME`] is raised, so the
//! device stays reachable while the station keeps retrying.

use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::app::ports::{ConnectivityError, ConnectivityPort};
pub use crate::render::SETUP_AP_NAME;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
#[cfg(target_os = "espidf")]
const STARTUP_RETRY_DELAY: Duration = Duration::from_millis(500);

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

/// Empty means an open network; WPA2 needs 8–64 bytes.
pub fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Simulated network
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimNetwork {
    /// Association attempt (1-based) that succeeds; `None` never does.
    succeed_on: Option<u32>,
    attempts: u32,
    up: bool,
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff: Duration,
    next_retry: Option<Instant>,
    retry_delay: Duration,
    setup_ap: bool,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimNetwork,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        let wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), None)?, sysloop)?;
        Ok(Self::with_driver(wifi))
    }

    #[cfg(target_os = "espidf")]
    fn with_driver(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff: INITIAL_BACKOFF,
            next_retry: None,
            retry_delay: STARTUP_RETRY_DELAY,
            setup_ap: false,
            wifi,
        }
    }

    /// Simulated station that associates on attempt `succeed_on`.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulated(succeed_on: Option<u32>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff: INITIAL_BACKOFF,
            next_retry: None,
            retry_delay: Duration::ZERO,
            setup_ap: false,
            sim: SimNetwork {
                succeed_on,
                ..Default::default()
            },
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn setup_ap_active(&self) -> bool {
        self.setup_ap
    }

    /// Pause between startup attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Raise the open setup access point alongside the station.
    pub fn start_setup_ap(&mut self) -> Result<(), ConnectivityError> {
        if self.setup_ap {
            return Ok(());
        }
        self.platform_start_ap()?;
        self.setup_ap = true;
        info!("WiFi: setup AP '{}' up", SETUP_AP_NAME);
        Ok(())
    }

    /// Reconnect step with an explicit clock.
    pub fn poll_at(&mut self, now: Instant) {
        match self.state {
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.state = WifiState::Reconnecting { attempt: 0 };
                    self.backoff = INITIAL_BACKOFF;
                    self.next_retry = Some(now + self.backoff);
                }
            }
            WifiState::Reconnecting { attempt } => {
                if self.platform_is_connected() {
                    info!("WiFi: reconnected after {} attempt(s)", attempt);
                    self.state = WifiState::Connected;
                    self.backoff = INITIAL_BACKOFF;
                    self.next_retry = None;
                    return;
                }
                if self.next_retry.is_some_and(|at| now < at) {
                    return;
                }
                info!("WiFi: reconnect attempt {} (backoff {:?})", attempt + 1, self.backoff);
                self.platform_request_connect();
                self.backoff = (self.backoff * 2).min(MAX_BACKOFF);
                self.next_retry = Some(now + self.backoff);
                self.state = WifiState::Reconnecting {
                    attempt: attempt + 1,
                };
            }
            WifiState::Disconnected | WifiState::Connecting => {}
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn client_config(&self) -> Result<ClientConfiguration, ConnectivityError> {
        Ok(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        })
    }

    /// One blocking association attempt.
    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let client = self.client_config()?;
        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi(espidf): {}", e);
            ConnectivityError::ConnectionFailed
        };
        if !self.setup_ap {
            self.wifi
                .set_configuration(&Configuration::Client(client))
                .map_err(fail)?;
        }
        if !self.wifi.is_started().map_err(fail)? {
            self.wifi.start().map_err(fail)?;
        }
        self.wifi.connect().map_err(fail)?;
        self.wifi.wait_netif_up().map_err(fail)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim.attempts += 1;
        if self.sim.succeed_on.is_some_and(|n| self.sim.attempts >= n) {
            self.sim.up = true;
            info!("WiFi(sim): associated with '{}' (attempt {})", self.ssid, self.sim.attempts);
            Ok(())
        } else {
            Err(ConnectivityError::ConnectionFailed)
        }
    }

    /// Fire-and-forget connect request for the reconnect poll.
    #[cfg(target_os = "espidf")]
    fn platform_request_connect(&mut self) {
        if let Err(e) = self.wifi.wifi_mut().connect() {
            warn!("WiFi(espidf): connect request failed: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_request_connect(&mut self) {
        let _ = self.platform_connect();
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim.up
    }

    #[cfg(target_os = "espidf")]
    fn platform_start_ap(&mut self) -> Result<(), ConnectivityError> {
        let client = self.client_config().unwrap_or_default();
        let ap = AccessPointConfiguration {
            ssid: SETUP_AP_NAME
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            auth_method: AuthMethod::None,
            channel: 1,
            ..Default::default()
        };
        let fail = |e: esp_idf_svc::sys::EspError| {
            error!("WiFi(espidf): setup AP failed: {}", e);
            ConnectivityError::ConnectionFailed
        };
        self.wifi
            .set_configuration(&Configuration::Mixed(client, ap))
            .map_err(fail)?;
        if !self.wifi.is_started().map_err(fail)? {
            self.wifi.start().map_err(fail)?;
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start_ap(&mut self) -> Result<(), ConnectivityError> {
        Ok(())
    }

    /// Simulate the access point going away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop(&mut self) {
        self.sim.up = false;
    }

    /// Simulate the access point coming back.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_restore(&mut self) {
        self.sim.succeed_on = Some(0);
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn await_connectivity(&mut self, max_attempts: u8) -> bool {
        if self.ssid.is_empty() {
            warn!("WiFi: {}", ConnectivityError::NoCredentials);
            return false;
        }
        if self.state == WifiState::Connected {
            return true;
        }

        info!("WiFi: associating with '{}' ({} attempts)", self.ssid, max_attempts);
        self.state = WifiState::Connecting;
        for attempt in 1..=max_attempts {
            match self.platform_connect() {
                Ok(()) => {
                    self.state = WifiState::Connected;
                    self.backoff = INITIAL_BACKOFF;
                    info!("WiFi: associated on attempt {}", attempt);
                    return true;
                }
                Err(e) => {
                    warn!("WiFi: attempt {}/{} failed: {}", attempt, max_attempts, e);
                    if attempt < max_attempts && !self.retry_delay.is_zero() {
                        std::thread::sleep(self.retry_delay);
                    }
                }
            }
        }

        error!("WiFi: gave up after {} attempts", max_attempts);
        self.state = WifiState::Reconnecting { attempt: 0 };
        self.next_retry = Some(Instant::now() + self.backoff);
        false
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    fn poll(&mut self) {
        self.poll_at(Instant::now());
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
