//! Minimal bring-up: calibrate, configure for indoors, poll the interrupt
//! reason after the IRQ pin fires.
#![allow(unused)]
use embedded_hal_async::{
  delay::DelayNs,
  i2c::{I2c, SevenBitAddress},
};
use mod1016::{IrqReason, Mod1016};

#[allow(dead_code)]
async fn main_async<I2C, D, E>(i2c: I2C, delay: D) -> Result<(), mod1016::Error<E>>
where
  I2C: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  let mut sensor = Mod1016::new(i2c, delay);
  sensor.init().await?;
  sensor.set_indoors().await?;
  sensor.set_noise_floor(3).await?;

  // ... IRQ pin went high ...
  match sensor.interrupt_reason().await? {
    Some(IrqReason::Lightning) => {
      let _km = sensor.distance_km().await?;
    }
    Some(IrqReason::DisturberDetected) => sensor.set_mask_disturbers(true).await?,
    Some(IrqReason::NoiseLevelHigh) | None => {}
  }
  Ok(())
}

fn main() {}
