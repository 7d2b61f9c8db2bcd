//! Antenna auto-tuning. The sensor IRQ pin must be wired to a rising-edge
//! interrupt whose handler calls `PULSES.on_pulse()`.
#![allow(unused)]
use embedded_hal_async::{
  delay::DelayNs,
  i2c::{I2c, SevenBitAddress},
};
use mod1016::{Mod1016, PulseCounter};

static PULSES: PulseCounter = PulseCounter::new();

// e.g. in the EXTI handler for the IRQ pin:
// fn on_irq_rising_edge() { PULSES.on_pulse(); }

#[allow(dead_code)]
async fn main_async<I2C, D, E>(i2c: I2C, delay: D) -> Result<(), mod1016::Error<E>>
where
  I2C: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  let mut sensor = Mod1016::new(i2c, delay);
  sensor.init().await?;

  let best = sensor.auto_tune_caps(&PULSES).await?;
  assert_eq!(sensor.tune_caps().await?, best);
  Ok(())
}

fn main() {}
