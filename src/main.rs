//! Pixelpal firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Board (OLED · eyes · inputs · clock · RNG)   LogEventSink     │
//! │  LinkAdapter<TcpTransport | UartTransport>    NvsAdapter       │
//! │  WifiAdapter (STA + setup AP)                 Watchdog         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Interaction · Mood · Mode · Offline queue             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;

use pixelpal::adapters::board::Board;
use pixelpal::adapters::display::OledDisplay;
use pixelpal::adapters::inputs::PinInputs;
use pixelpal::adapters::log_sink::LogEventSink;
use pixelpal::adapters::nvs::NvsAdapter;
use pixelpal::adapters::random::HwRandom;
use pixelpal::adapters::tcp_link::{TcpTransport, DEFAULT_PORT};
use pixelpal::adapters::time::SystemClock;
use pixelpal::adapters::uart_link::UartTransport;
use pixelpal::adapters::wifi::WifiAdapter;
use pixelpal::app::ports::{
    ClockPort, ConfigPort, ConnectivityPort, DisplayPort, EyesPort, InputPort, LinkPort,
    RandomPort, StoragePort,
};
use pixelpal::app::service::AppService;
use pixelpal::config::DeviceConfig;
use pixelpal::drivers::{hw_init, ssd1306::Ssd1306, watchdog::Watchdog};
use pixelpal::link::LinkAdapter;
use pixelpal::pins;
use pixelpal::store::PersistentStore;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Pixelpal v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let watchdog = Watchdog::default();

    // ── 2. Storage and config ─────────────────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running without persistence", e);
            None
        }
    };
    let config = match nvs.as_ref().map(|n| n.load()) {
        Some(Ok(cfg)) => cfg,
        Some(Err(e)) => {
            warn!("Config load failed ({}), using defaults", e);
            DeviceConfig::default()
        }
        None => DeviceConfig::default(),
    };
    let credentials = nvs.as_ref().and_then(NvsAdapter::load_wifi_credentials);
    let store = nvs.map_or_else(PersistentStore::degraded, PersistentStore::new);

    // ── 3. Display, inputs, board ─────────────────────────────
    let bus = hw_init::display_bus(peripherals.i2c0)?;
    let mut panel = Ssd1306::new(bus, pins::DISPLAY_I2C_ADDR);
    if let Err(e) = panel.init() {
        // Keep running headless; the link and the counters still work.
        error!("OLED init failed: {:?}", e);
    }
    let (mode_pin, miss_you_pin, touch_pin) = hw_init::input_pins()?;
    let mut board = Board::new(
        OledDisplay::new(panel),
        PinInputs::new(mode_pin, miss_you_pin, touch_pin),
        SystemClock::new(),
        HwRandom::new(),
    );

    let mut sink = LogEventSink::new();
    let mut service = AppService::new(config.clone(), store);
    service.show_banner(&mut board);

    // ── 4. Network association ────────────────────────────────
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop)?;
    let has_credentials = match &credentials {
        Some((ssid, pass)) => match wifi.set_credentials(ssid, pass) {
            Ok(()) => true,
            Err(e) => {
                warn!("Stored WiFi credentials rejected: {}", e);
                false
            }
        },
        None => false,
    };
    let associated = wifi.await_connectivity(config.wifi_max_attempts);
    if !associated {
        if let Err(e) = wifi.start_setup_ap() {
            warn!("Setup AP unavailable: {}", e);
        }
    }

    service.start(associated, board.now_ms(), &mut sink);

    // ── 5. Message link + event loop ──────────────────────────
    if has_credentials {
        let transport = TcpTransport::bind(DEFAULT_PORT)?;
        info!("Link: TCP on port {}", DEFAULT_PORT);
        run(&mut service, &mut board, LinkAdapter::new(transport), &mut wifi, &watchdog, &mut sink)
    } else {
        let uart = hw_init::link_uart(peripherals.uart1)?;
        info!("Link: UART1 (no WiFi credentials)");
        run(&mut service, &mut board, LinkAdapter::new(UartTransport::new(uart)), &mut wifi, &watchdog, &mut sink)
    }
}

/// The tick loop. Never returns.
fn run<S, B, L>(
    service: &mut AppService<S>,
    board: &mut B,
    mut link: L,
    wifi: &mut WifiAdapter,
    watchdog: &Watchdog,
    sink: &mut LogEventSink,
) -> !
where
    S: StoragePort,
    B: InputPort + DisplayPort + EyesPort + ClockPort + RandomPort,
    L: LinkPort,
{
    let tick_ms = service.config().tick_interval_ms;
    info!("System ready, ticking every {} ms", tick_ms);

    loop {
        watchdog.feed();

        wifi.poll();
        service.set_wifi_associated(wifi.is_connected());

        service.tick(board, &mut link, sink);

        board.delay_ms(tick_ms);
    }
}
