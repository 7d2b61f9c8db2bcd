use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::reg::{mask, shift, Reg};
use crate::{Error, Mod1016};

/// Time the chip needs to latch the interrupt-reason code after pulling the
/// IRQ line high (datasheet t_int).
const IRQ_LATCH_MS: u32 = 2;

/// Sentinel returned by [`Mod1016::distance_km`] when the storm front is out
/// of the 40 km estimation range.
pub const OUT_OF_RANGE_KM: i8 = -1;

/// Reason codes latched in the interrupt register after the IRQ pin fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IrqReason {
  /// Ambient RF noise exceeded the configured noise floor.
  NoiseLevelHigh = 0x01,
  /// A non-lightning disturber was rejected.
  DisturberDetected = 0x04,
  /// A lightning strike was detected and the distance estimate updated.
  Lightning = 0x08,
}

impl IrqReason {
  pub(crate) const fn from_bits(bits: u8) -> Option<Self> {
    match bits {
      0x01 => Some(Self::NoiseLevelHigh),
      0x04 => Some(Self::DisturberDetected),
      0x08 => Some(Self::Lightning),
      _ => None,
    }
  }
}

/// Ratio by which the antenna frequency is divided before being routed to
/// the IRQ pin for tuning measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DivisionRatio {
  Div16 = 0b00,
  Div32 = 0b01,
  Div64 = 0b10,
  Div128 = 0b11,
}

impl DivisionRatio {
  pub(crate) const fn from_bits(bits: u8) -> Self {
    match bits & 0b11 {
      0b00 => Self::Div16,
      0b01 => Self::Div32,
      0b10 => Self::Div64,
      _ => Self::Div128,
    }
  }

  /// The multiplier that recovers the true antenna frequency from the
  /// divided signal on the IRQ pin.
  pub const fn factor(self) -> u32 {
    16 << (self as u32)
  }
}

/// Map a raw distance code to a kilometre estimate.
///
/// The code points are chip-specific and reproduced exactly from the
/// datasheet: 0x3F means "out of range" ([`OUT_OF_RANGE_KM`]), 0x01 means the
/// storm is overhead, and undocumented codes collapse to 1 km.
pub(crate) const fn km_for_code(code: u8) -> i8 {
  match code {
    0x3F => OUT_OF_RANGE_KM,
    0x28 => 40,
    0x25 => 37,
    0x22 => 34,
    0x1F => 31,
    0x1B => 27,
    0x18 => 24,
    0x14 => 20,
    0x11 => 17,
    0x0E => 14,
    0x0C => 12,
    0x0A => 10,
    0x08 => 8,
    0x06 => 6,
    0x05 => 5,
    0x01 => 0,
    _ => 1,
  }
}

impl<I, E, D> Mod1016<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Read the latched interrupt reason after the IRQ pin fired.
  ///
  /// Waits out the latch delay first so the reason code is stable, then
  /// returns `None` when the register holds no recognised reason.
  pub async fn interrupt_reason(&mut self) -> Result<Option<IrqReason>, Error<E>> {
    self.delay.delay_ms(IRQ_LATCH_MS).await;
    let bits = self.read_field(Reg::Interrupt, mask::INT).await?;
    Ok(IrqReason::from_bits(bits))
  }

  /// Raw storm-front distance code from the estimation register.
  pub async fn light_distance(&mut self) -> Result<u8, Error<E>> {
    self.read_field(Reg::Distance, mask::DISTANCE).await
  }

  /// Estimated distance to the storm front in kilometres.
  ///
  /// Returns [`OUT_OF_RANGE_KM`] when the front is beyond 40 km and 0 when
  /// the storm is overhead.
  pub async fn distance_km(&mut self) -> Result<i8, Error<E>> {
    Ok(km_for_code(self.light_distance().await?))
  }

  /// Currently configured antenna frequency-division ratio.
  pub async fn division_ratio(&mut self) -> Result<DivisionRatio, Error<E>> {
    let bits = self.read_field(Reg::Interrupt, mask::LCO_FDIV).await? >> shift::LCO_FDIV;
    Ok(DivisionRatio::from_bits(bits))
  }
}
