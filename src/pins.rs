//! GPIO / peripheral pin assignments for the Pixelpal board (ESP32-C3 mini).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// User inputs
// ---------------------------------------------------------------------------

/// Mode-advance push button. Active-low, internal pull-up.
pub const MODE_BUTTON_GPIO: i32 = 3;
/// "Miss you" push button. Active-low, internal pull-up.
pub const MISS_YOU_BUTTON_GPIO: i32 = 4;
/// TTP223 capacitive touch pad (head-pat sensor). Active-high, idle low.
pub const TOUCH_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 128×64 OLED)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
pub const I2C_FREQ_KHZ: u32 = 400;
/// 7-bit I²C address of the OLED panel.
pub const DISPLAY_I2C_ADDR: u8 = 0x3C;

// ---------------------------------------------------------------------------
// UART1 (serial message link, used when WiFi is not provisioned)
// ---------------------------------------------------------------------------
//
// The console stays on the USB-Serial-JTAG port.

pub const LINK_UART_TX_GPIO: i32 = 21;
pub const LINK_UART_RX_GPIO: i32 = 20;
pub const LINK_UART_BAUD: u32 = 115_200;
