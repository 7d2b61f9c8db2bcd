#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Async, `no_std` driver for the MOD-1016 lightning sensor breakout, built
//! around the AMS AS3935 franklin lightning sensor ASIC.
//!
//! The AS3935 detects the RF signature of lightning strikes with a tuned
//! 500 kHz antenna and reports an estimated storm-front distance. This crate
//! exposes a strongly typed API on top of the raw register map, with helpers
//! for:
//!
//! - Configuring the analog front-end for indoor or outdoor installations
//! - Reading the latched interrupt reason and the distance estimate
//! - Calibrating the internal RC oscillators against the antenna
//! - Auto-tuning the antenna capacitor bank by sweeping all 16 settings and
//!   counting oscillator pulses on the host IRQ pin
//! - Using `embedded-hal-async` 1.0 traits so the driver works across MCU
//!   families
//!
//! ```no_run
//! use embedded_hal_async::{delay::DelayNs, i2c::{I2c, SevenBitAddress}};
//! use mod1016::{Mod1016, PulseCounter};
//!
//! static PULSES: PulseCounter = PulseCounter::new();
//!
//! async fn example<I2C, D, E>(i2c: I2C, delay: D) -> Result<(), mod1016::Error<E>>
//! where
//!   I2C: I2c<SevenBitAddress, Error = E>,
//!   D: DelayNs,
//! {
//!   let mut sensor = Mod1016::new(i2c, delay);
//!   sensor.init().await?;
//!   sensor.set_indoors().await?;
//!
//!   // Wire the sensor IRQ pin to a rising-edge interrupt whose handler
//!   // calls `PULSES.on_pulse()`, then:
//!   let best = sensor.auto_tune_caps(&PULSES).await?;
//!   let _ = best;
//!   Ok(())
//! }
//! ```

mod config;
mod reg;
mod rw;
mod status;
mod tune;

#[cfg(test)]
extern crate std;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

pub use config::AnalogFrontEnd;
use reg::{mask, Reg, DIRECT_COMMAND};
pub use status::{DivisionRatio, IrqReason, OUT_OF_RANGE_KM};
pub use tune::{best_tune_cap, PulseCounter, MEASUREMENT_WINDOW_MS, TARGET_FREQUENCY_HZ, TUNE_CAP_STEPS};

use tune::OSC_SETTLE_MS;

/// Errors that can occur while interacting with the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
  /// I²C bus transaction failed with the underlying driver error.
  I2c(E),
  /// A tuning-capacitance setting outside the 4-bit range 0..=15.
  InvalidTuneCap(u8),
  /// A noise-floor level outside the 3-bit range 0..=7.
  InvalidNoiseFloor(u8),
}

/// Driver for the MOD-1016 / AS3935 lightning sensor.
///
/// The driver owns the I²C peripheral and a delay provider and offers typed
/// configuration helpers plus the antenna auto-tuning routine. The sensor IRQ
/// pin stays under the caller's control: configure it as an input with a
/// rising-edge interrupt and forward edges to a [`PulseCounter`] when running
/// the tuning routine.
pub struct Mod1016<I, D> {
  i2c: I,
  delay: D,
}

impl<I, E, D> Mod1016<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Create a new driver instance with the provided peripherals.
  ///
  /// No bus traffic happens until the first operation; call
  /// [`Mod1016::init`] before any frequency-dependent operation.
  pub fn new(i2c: I, delay: D) -> Self {
    Self { i2c, delay }
  }

  /// Bring the sensor up for use.
  ///
  /// Runs the RCO calibration the chip requires once after power-on. The
  /// caller is expected to have configured the IRQ line as a digital input
  /// beforehand.
  pub async fn init(&mut self) -> Result<(), Error<E>> {
    self.calibrate_rco().await
  }

  /// Recalibrate the internal RC oscillators against the antenna resonator.
  ///
  /// Issues the vendor calibration command, then pulses the TRCO display bit
  /// so the timer oscillator locks to the freshly calibrated reference. Must
  /// run once at startup and again after changing the tuning capacitance.
  pub async fn calibrate_rco(&mut self) -> Result<(), Error<E>> {
    self.write_direct(Reg::CalibRco, DIRECT_COMMAND).await?;

    self.write_field(Reg::Display, mask::DISP_TRCO, 0x01 << 5).await?;
    self.delay.delay_ms(OSC_SETTLE_MS).await;
    self.write_field(Reg::Display, mask::DISP_TRCO, 0x00 << 5).await
  }

  /// Restore every register to its power-on default.
  ///
  /// Uses the same direct-command idiom as [`Mod1016::calibrate_rco`]; the
  /// chip expects the magic byte 0x96 on register 0x3C.
  pub async fn reset_to_defaults(&mut self) -> Result<(), Error<E>> {
    self.write_direct(Reg::PresetDefault, DIRECT_COMMAND).await
  }

  /// Release the underlying peripherals.
  pub fn release(self) -> (I, D) {
    (self.i2c, self.delay)
  }
}
