//! One-shot hardware peripheral initialization.
//!
//! Claims the input GPIOs and the I²C bus named in [`pins`](crate::pins)
//! and configures pulls and bus speed. Called once from `main()` before
//! the tick loop starts.

use core::fmt;

#[cfg(target_os = "espidf")]
use esp_idf_hal::{
    gpio::{AnyIOPin, Input, PinDriver, Pull},
    i2c::{I2cConfig, I2cDriver, I2C0},
    units::FromValueType,
    uart::{config::Config as UartConfig, UartDriver, UART1},
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;
#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    I2cInitFailed(i32),
    UartInitFailed(i32),
}

impl fmt::Display for HwInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::I2cInitFailed(rc) => write!(f, "I2C bus init failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "UART init failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

// ── GPIO inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub type InputPinDriver = PinDriver<'static, AnyIOPin, Input>;

/// Mode button, miss-you button, touch pad.
#[cfg(target_os = "espidf")]
pub fn input_pins() -> Result<(InputPinDriver, InputPinDriver, InputPinDriver), HwInitError> {
    let gpio = |e: EspError| HwInitError::GpioConfigFailed(e.code());
    let claim = |num: i32, pull: Pull| -> Result<InputPinDriver, HwInitError> {
        // SAFETY: every number in `pins` is claimed exactly once, here.
        let mut pin = PinDriver::input(unsafe { AnyIOPin::new(num) }).map_err(gpio)?;
        pin.set_pull(pull).map_err(gpio)?;
        Ok(pin)
    };

    // Buttons idle high on pull-ups; the TTP223 drives its output, the
    // pull-down only holds the line when the module is absent.
    let mode = claim(pins::MODE_BUTTON_GPIO, Pull::Up)?;
    let miss_you = claim(pins::MISS_YOU_BUTTON_GPIO, Pull::Up)?;
    let touch = claim(pins::TOUCH_GPIO, Pull::Down)?;
    info!(
        "hw_init: inputs on GPIO{} / GPIO{} / GPIO{}",
        pins::MODE_BUTTON_GPIO,
        pins::MISS_YOU_BUTTON_GPIO,
        pins::TOUCH_GPIO
    );
    Ok((mode, miss_you, touch))
}

// ── I²C (OLED) ────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn display_bus(i2c: I2C0) -> Result<I2cDriver<'static>, HwInitError> {
    let config = I2cConfig::new().baudrate(pins::I2C_FREQ_KHZ.kHz().into());
    // SAFETY: SDA/SCL are not used by anything else.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let bus = I2cDriver::new(i2c, sda, scl, &config)
        .map_err(|e| HwInitError::I2cInitFailed(e.code()))?;
    info!(
        "hw_init: I2C0 SDA=GPIO{} SCL=GPIO{} @ {} kHz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_FREQ_KHZ
    );
    Ok(bus)
}

// ── UART (serial message link) ────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn link_uart(uart: UART1) -> Result<UartDriver<'static>, HwInitError> {
    let config = UartConfig::new().baudrate(pins::LINK_UART_BAUD.Hz());
    // SAFETY: TX/RX are dedicated to the link.
    let (tx, rx) = unsafe {
        (
            AnyIOPin::new(pins::LINK_UART_TX_GPIO),
            AnyIOPin::new(pins::LINK_UART_RX_GPIO),
        )
    };
    let uart = UartDriver::new(
        uart,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &config,
    )
    .map_err(|e| HwInitError::UartInitFailed(e.code()))?;
    info!("hw_init: link UART @ {} baud", pins::LINK_UART_BAUD);
    Ok(uart)
}
