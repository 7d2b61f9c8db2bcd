use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::reg::{mask, Reg};
use crate::{Error, Mod1016};

/// Antenna resonance target from the datasheet.
pub const TARGET_FREQUENCY_HZ: i32 = 500_000;

/// Number of selectable tuning-capacitance steps (4-bit field).
pub const TUNE_CAP_STEPS: usize = 16;

/// Pulse-counting window length. Counting for 1/5 s means the count times
/// [`PULSES_TO_HZ`] is the divided-signal frequency in Hz.
pub const MEASUREMENT_WINDOW_MS: u32 = 200;

/// Scales a 200 ms pulse count up to Hz.
const PULSES_TO_HZ: u32 = 5;

/// Oscillator settle time after a tuning-capacitance change (datasheet).
pub(crate) const OSC_SETTLE_MS: u32 = 2;

/// Settle time after an RCO recalibration before the chip is trustworthy.
const RCO_SETTLE_MS: u32 = 1000;

/// Edge counter shared between the caller's IRQ handler and a frequency
/// measurement in progress.
///
/// Create one with static lifetime, wire the sensor IRQ pin to a rising-edge
/// interrupt whose handler calls [`PulseCounter::on_pulse`], and pass a
/// reference to the measurement routines. The armed flag gates counting so
/// edges outside a measurement window (lightning interrupts, disturbers) are
/// ignored. One counter serves one sensor; measurement windows never overlap
/// because the driver is exclusively borrowed for the window's duration.
pub struct PulseCounter {
  armed: AtomicBool,
  pulses: AtomicU32,
}

impl PulseCounter {
  pub const fn new() -> Self {
    Self { armed: AtomicBool::new(false), pulses: AtomicU32::new(0) }
  }

  /// Record one rising edge. Call from the IRQ pin's interrupt handler.
  pub fn on_pulse(&self) {
    if self.armed.load(Ordering::Acquire) {
      self.pulses.fetch_add(1, Ordering::Relaxed);
    }
  }

  /// Zero the count and start accepting edges.
  fn arm(&self) {
    self.pulses.store(0, Ordering::Relaxed);
    self.armed.store(true, Ordering::Release);
  }

  /// Stop accepting edges and read out the window's count.
  fn disarm(&self) -> u32 {
    self.armed.store(false, Ordering::Release);
    self.pulses.load(Ordering::Acquire)
  }
}

impl Default for PulseCounter {
  fn default() -> Self {
    Self::new()
  }
}

/// Pick the tuning step whose measured deviation from the 500 kHz target is
/// smallest. Ties go to the lowest index: the running best is only replaced
/// by a strictly smaller deviation.
pub fn best_tune_cap(deviations: &[i32; TUNE_CAP_STEPS]) -> u8 {
  let mut best = 0;
  for candidate in 1..TUNE_CAP_STEPS {
    if deviations[candidate] < deviations[best] {
      best = candidate;
    }
  }
  best as u8
}

impl<I, E, D> Mod1016<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Measure the divided antenna frequency in Hz.
  ///
  /// Routes the antenna oscillator to the IRQ pin, counts rising edges for
  /// the fixed window, then restores the pin to interrupt duty. A window
  /// with no pulses yields 0. The returned value still carries the
  /// frequency division configured on the chip; multiply by
  /// [`DivisionRatio::factor`](crate::DivisionRatio::factor) to recover the
  /// true antenna frequency.
  pub async fn antenna_frequency(&mut self, counter: &PulseCounter) -> Result<u32, Error<E>> {
    self.write_field(Reg::Display, mask::DISP_LCO, 0x80).await?;
    counter.arm();
    self.delay.delay_ms(MEASUREMENT_WINDOW_MS).await;
    let pulses = counter.disarm();
    self.write_field(Reg::Display, mask::DISP_LCO, 0x00).await?;
    Ok(pulses * PULSES_TO_HZ)
  }

  /// Measure the frequency deviation at every tuning-capacitance step.
  ///
  /// For each of the 16 settings: select it, let the oscillator settle,
  /// measure, scale by the division factor and store the absolute deviation
  /// from the 500 kHz target.
  pub async fn sweep_tune_caps(
    &mut self,
    division_factor: u32,
    counter: &PulseCounter,
  ) -> Result<[i32; TUNE_CAP_STEPS], Error<E>> {
    let mut deviations = [0i32; TUNE_CAP_STEPS];
    for steps in 0..TUNE_CAP_STEPS as u8 {
      // set_tune_caps waits out the oscillator settle time.
      self.set_tune_caps(steps).await?;
      let divided = self.antenna_frequency(counter).await?;
      let frequency = (divided * division_factor) as i32;
      deviations[steps as usize] = (frequency - TARGET_FREQUENCY_HZ).abs();
    }
    Ok(deviations)
  }

  /// Full antenna calibration: sweep all 16 capacitance steps, apply the one
  /// closest to the 500 kHz target, then recalibrate the RCO against the
  /// newly tuned antenna. Returns the chosen step.
  pub async fn auto_tune_caps(&mut self, counter: &PulseCounter) -> Result<u8, Error<E>> {
    let division_factor = self.division_ratio().await?.factor();
    let deviations = self.sweep_tune_caps(division_factor, counter).await?;

    let best = best_tune_cap(&deviations);
    self.set_tune_caps(best).await?;

    self.calibrate_rco().await?;
    self.delay.delay_ms(RCO_SETTLE_MS).await;
    Ok(best)
  }
}

#[cfg(test)]
mod tests {
  use embassy_futures::block_on;
  use embedded_hal_mock::eh1::delay::NoopDelay;
  use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
  use std::vec;
  use std::vec::Vec;

  use super::*;
  use crate::reg::I2C_ADDR;

  fn lco_window(expectations: &mut Vec<I2cTransaction>) {
    expectations.extend([
      I2cTransaction::write_read(I2C_ADDR, vec![0x08], vec![0x00]),
      I2cTransaction::write(I2C_ADDR, vec![0x08, 0x80]),
      I2cTransaction::write_read(I2C_ADDR, vec![0x08], vec![0x80]),
      I2cTransaction::write(I2C_ADDR, vec![0x08, 0x00]),
    ]);
  }

  fn tune_write(expectations: &mut Vec<I2cTransaction>, steps: u8) {
    expectations.extend([
      I2cTransaction::write_read(I2C_ADDR, vec![0x08], vec![0x00]),
      I2cTransaction::write(I2C_ADDR, vec![0x08, steps]),
    ]);
  }

  #[test]
  fn counter_ignores_pulses_while_disarmed() {
    let counter = PulseCounter::new();
    counter.on_pulse();
    counter.arm();
    counter.on_pulse();
    counter.on_pulse();
    assert_eq!(counter.disarm(), 2);
    counter.on_pulse();
    assert_eq!(counter.pulses.load(core::sync::atomic::Ordering::Relaxed), 2);
  }

  #[test]
  fn arming_resets_previous_count() {
    let counter = PulseCounter::new();
    counter.arm();
    counter.on_pulse();
    assert_eq!(counter.disarm(), 1);
    counter.arm();
    assert_eq!(counter.disarm(), 0);
  }

  #[test]
  fn quiet_window_measures_zero() {
    let mut expectations = Vec::new();
    lco_window(&mut expectations);
    let mut i2c = I2cMock::new(&expectations);
    let mut sensor = Mod1016::new(i2c.clone(), NoopDelay);
    let counter = PulseCounter::new();

    assert_eq!(block_on(sensor.antenna_frequency(&counter)).unwrap(), 0);
    i2c.done();
  }

  /// Delay stub that plays the part of the ISR: every elapsed window fires
  /// a fixed number of edges at the counter.
  struct PulsingDelay<'a> {
    counter: &'a PulseCounter,
    edges: u32,
  }

  impl embedded_hal_async::delay::DelayNs for PulsingDelay<'_> {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_ms(&mut self, _ms: u32) {
      for _ in 0..self.edges {
        self.counter.on_pulse();
      }
    }
  }

  #[test]
  fn frequency_scales_pulse_count() {
    let mut expectations = Vec::new();
    lco_window(&mut expectations);
    let mut i2c = I2cMock::new(&expectations);
    let counter = PulseCounter::new();
    // 6250 edges in the 200 ms window is a 31.25 kHz divided signal.
    let mut sensor = Mod1016::new(i2c.clone(), PulsingDelay { counter: &counter, edges: 6250 });

    assert_eq!(block_on(sensor.antenna_frequency(&counter)).unwrap(), 31_250);
    i2c.done();
  }

  #[test]
  fn best_tune_cap_finds_minimum() {
    let mut deviations = [500_000i32; TUNE_CAP_STEPS];
    deviations[0] = 50;
    deviations[1] = 10;
    deviations[2] = 30;
    deviations[3] = 5;
    assert_eq!(best_tune_cap(&deviations), 3);
  }

  #[test]
  fn best_tune_cap_first_index_wins_ties() {
    let mut deviations = [500_000i32; TUNE_CAP_STEPS];
    deviations[4] = 7;
    deviations[9] = 7;
    assert_eq!(best_tune_cap(&deviations), 4);

    let flat = [42i32; TUNE_CAP_STEPS];
    assert_eq!(best_tune_cap(&flat), 0);
  }

  #[test]
  fn sweep_visits_every_step_and_stores_absolute_deviations() {
    let mut expectations = Vec::new();
    for steps in 0..TUNE_CAP_STEPS as u8 {
      tune_write(&mut expectations, steps);
      lco_window(&mut expectations);
    }
    let mut i2c = I2cMock::new(&expectations);
    let mut sensor = Mod1016::new(i2c.clone(), NoopDelay);
    let counter = PulseCounter::new();

    let deviations = block_on(sensor.sweep_tune_caps(16, &counter)).unwrap();
    // No pulses arrive under the mock, so every entry is the full distance
    // to the 500 kHz target. Absolute values, never negative.
    assert_eq!(deviations.len(), TUNE_CAP_STEPS);
    for deviation in deviations {
      assert_eq!(deviation, TARGET_FREQUENCY_HZ);
    }
    i2c.done();
  }

  #[test]
  fn auto_tune_applies_best_and_recalibrates() {
    let mut expectations = Vec::new();
    // Division ratio comes first (fdiv = 16).
    expectations.push(I2cTransaction::write_read(I2C_ADDR, vec![0x03], vec![0x00]));
    for steps in 0..TUNE_CAP_STEPS as u8 {
      tune_write(&mut expectations, steps);
      lco_window(&mut expectations);
    }
    // All deviations tie, so step 0 is applied.
    tune_write(&mut expectations, 0);
    // RCO recalibration: command byte, then a TRCO display pulse.
    expectations.extend([
      I2cTransaction::write(I2C_ADDR, vec![0x3D, 0x96]),
      I2cTransaction::write_read(I2C_ADDR, vec![0x08], vec![0x00]),
      I2cTransaction::write(I2C_ADDR, vec![0x08, 0x20]),
      I2cTransaction::write_read(I2C_ADDR, vec![0x08], vec![0x20]),
      I2cTransaction::write(I2C_ADDR, vec![0x08, 0x00]),
    ]);

    let mut i2c = I2cMock::new(&expectations);
    let mut sensor = Mod1016::new(i2c.clone(), NoopDelay);
    let counter = PulseCounter::new();

    assert_eq!(block_on(sensor.auto_tune_caps(&counter)).unwrap(), 0);
    i2c.done();
  }
}
