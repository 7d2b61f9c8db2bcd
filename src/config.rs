use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::reg::{mask, shift, Reg};
use crate::tune::OSC_SETTLE_MS;
use crate::{Error, Mod1016};

/// Analog front-end gain-boost presets from the datasheet.
///
/// Indoor installations need the higher gain because building structure
/// attenuates the lightning RF signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AnalogFrontEnd {
  Indoors = 0b10010,
  Outdoors = 0b01110,
}

impl AnalogFrontEnd {
  pub(crate) const fn into_bits(self) -> u8 {
    self as _
  }
}

impl<I, E, D> Mod1016<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Select the indoor gain-boost preset.
  pub async fn set_indoors(&mut self) -> Result<(), Error<E>> {
    self.set_analog_front_end(AnalogFrontEnd::Indoors).await
  }

  /// Select the outdoor gain-boost preset.
  pub async fn set_outdoors(&mut self) -> Result<(), Error<E>> {
    self.set_analog_front_end(AnalogFrontEnd::Outdoors).await
  }

  /// Write the AFE gain-boost field.
  pub async fn set_analog_front_end(&mut self, afe: AnalogFrontEnd) -> Result<(), Error<E>> {
    self
      .write_field(Reg::AfeGain, mask::AFE_GB, afe.into_bits() << shift::AFE_GB)
      .await
  }

  /// Current AFE gain-boost field value.
  ///
  /// `0b10010` for the indoor preset, `0b01110` for outdoor; other values
  /// mean the register was programmed directly.
  pub async fn afe_gain(&mut self) -> Result<u8, Error<E>> {
    Ok(self.read_field(Reg::AfeGain, mask::AFE_GB).await? >> shift::AFE_GB)
  }

  /// Set the noise-floor threshold, level 0 (most sensitive) to 7.
  ///
  /// The chip raises a noise-level interrupt whenever ambient RF exceeds the
  /// configured floor.
  pub async fn set_noise_floor(&mut self, level: u8) -> Result<(), Error<E>> {
    if level > 0x07 {
      return Err(Error::InvalidNoiseFloor(level));
    }
    self.write_field(Reg::Thresholds, mask::NF_LEV, level << shift::NF_LEV).await
  }

  /// Current noise-floor level, 0..=7.
  pub async fn noise_floor(&mut self) -> Result<u8, Error<E>> {
    Ok(self.read_field(Reg::Thresholds, mask::NF_LEV).await? >> shift::NF_LEV)
  }

  /// Select one of the 16 antenna tuning-capacitance steps (0..=15).
  ///
  /// Waits out the oscillator settle time before returning so a frequency
  /// measurement can follow immediately.
  pub async fn set_tune_caps(&mut self, steps: u8) -> Result<(), Error<E>> {
    if steps > 0x0F {
      return Err(Error::InvalidTuneCap(steps));
    }
    self.write_field(Reg::Display, mask::TUN_CAP, steps).await?;
    self.delay.delay_ms(OSC_SETTLE_MS).await;
    Ok(())
  }

  /// Currently selected tuning-capacitance step, 0..=15.
  pub async fn tune_caps(&mut self) -> Result<u8, Error<E>> {
    self.read_field(Reg::Display, mask::TUN_CAP).await
  }

  /// Suppress (or re-enable) disturber interrupts.
  ///
  /// Useful during installation and antenna tuning, when man-made RF spikes
  /// would otherwise flood the interrupt line.
  pub async fn set_mask_disturbers(&mut self, masked: bool) -> Result<(), Error<E>> {
    let bit = if masked { mask::MASK_DIST } else { 0x00 };
    self.write_field(Reg::Interrupt, mask::MASK_DIST, bit).await
  }
}

#[cfg(test)]
mod tests {
  use embassy_futures::block_on;
  use embedded_hal_mock::eh1::delay::NoopDelay;
  use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
  use std::vec;

  use super::*;
  use crate::reg::I2C_ADDR;

  #[test]
  fn tune_caps_round_trip() {
    for steps in 0u8..=15 {
      let expectations = [
        I2cTransaction::write_read(I2C_ADDR, vec![0x08], vec![0x00]),
        I2cTransaction::write(I2C_ADDR, vec![0x08, steps]),
        I2cTransaction::write_read(I2C_ADDR, vec![0x08], vec![steps]),
      ];
      let mut i2c = I2cMock::new(&expectations);
      let mut sensor = Mod1016::new(i2c.clone(), NoopDelay);

      block_on(sensor.set_tune_caps(steps)).unwrap();
      assert_eq!(block_on(sensor.tune_caps()).unwrap(), steps);
      i2c.done();
    }
  }

  #[test]
  fn tune_caps_rejects_out_of_range() {
    let mut i2c = I2cMock::new(&[]);
    let mut sensor = Mod1016::new(i2c.clone(), NoopDelay);

    assert_eq!(block_on(sensor.set_tune_caps(16)), Err(Error::InvalidTuneCap(16)));
    i2c.done();
  }

  #[test]
  fn tune_caps_write_keeps_display_bits() {
    // DISP_LCO enabled while retuning must survive the capacitance write.
    let expectations = [
      I2cTransaction::write_read(I2C_ADDR, vec![0x08], vec![0x80]),
      I2cTransaction::write(I2C_ADDR, vec![0x08, 0x87]),
    ];
    let mut i2c = I2cMock::new(&expectations);
    let mut sensor = Mod1016::new(i2c.clone(), NoopDelay);

    block_on(sensor.set_tune_caps(7)).unwrap();
    i2c.done();
  }

  #[test]
  fn noise_floor_rejects_out_of_range() {
    let mut i2c = I2cMock::new(&[]);
    let mut sensor = Mod1016::new(i2c.clone(), NoopDelay);

    assert_eq!(block_on(sensor.set_noise_floor(8)), Err(Error::InvalidNoiseFloor(8)));
    i2c.done();
  }

  #[test]
  fn afe_presets_write_expected_patterns() {
    let expectations = [
      I2cTransaction::write_read(I2C_ADDR, vec![0x00], vec![0x00]),
      I2cTransaction::write(I2C_ADDR, vec![0x00, 0x24]),
      I2cTransaction::write_read(I2C_ADDR, vec![0x00], vec![0x24]),
      I2cTransaction::write(I2C_ADDR, vec![0x00, 0x1C]),
      I2cTransaction::write_read(I2C_ADDR, vec![0x00], vec![0x1C]),
    ];
    let mut i2c = I2cMock::new(&expectations);
    let mut sensor = Mod1016::new(i2c.clone(), NoopDelay);

    block_on(sensor.set_indoors()).unwrap();
    block_on(sensor.set_outdoors()).unwrap();
    assert_eq!(block_on(sensor.afe_gain()).unwrap(), AnalogFrontEnd::Outdoors.into_bits());
    i2c.done();
  }
}
