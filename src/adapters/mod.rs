//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements             | Connects to                    |
//! |--------------|------------------------|--------------------------------|
//! | `board`      | Input/Display/Eyes/    | everything below, as one value |
//! |              | Clock/RandomPort       |                                |
//! | `display`    | DisplayPort            | SSD1306 over I²C               |
//! | `eyes`       | (drawn via `board`)    | embedded-graphics primitives   |
//! | `inputs`     | InputPort              | `embedded-hal` input pins      |
//! | `time`       | ClockPort              | ESP32 system timer / SNTP      |
//! | `random`     | RandomPort             | ESP32 hardware RNG             |
//! | `log_sink`   | EventSink              | Serial log output              |
//! | `nvs`        | ConfigPort, StoragePort| NVS / in-memory store          |
//! | `file_store` | StoragePort            | Host directory (simulation)    |
//! | `wifi`       | ConnectivityPort       | ESP-IDF WiFi STA (+ setup AP)  |
//! | `tcp_link`   | Transport              | Single-peer TCP server         |
//! | `uart_link`  | Transport              | UART1                          |

pub mod board;
pub mod display;
pub mod eyes;
#[cfg(not(target_os = "espidf"))]
pub mod file_store;
pub mod inputs;
pub mod log_sink;
pub mod nvs;
pub mod random;
pub mod tcp_link;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart_link;
pub mod wifi;
