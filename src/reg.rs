/******************************************************************************
 * Refer to the AMS AS3935 datasheet for more information, available here:    *
 * - https://ams.com/as3935                                                   *
 * ========================================================================== *
 *                       MOD-1016 / AS3935 - Register Map                     *
*******************************************************************************/

pub(crate) const I2C_ADDR: u8 = 0x03;

/// Magic byte accepted by the direct-command registers (0x3C / 0x3D).
pub(crate) const DIRECT_COMMAND: u8 = 0x96;

#[allow(dead_code)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reg {
  /// PWD (bit 0) and AFE gain boost (bits 5:1).
  AfeGain = 0x00,
  /// Noise-floor level (bits 6:4) and watchdog threshold (bits 3:0).
  Thresholds = 0x01,
  /// Minimum lightning count (bits 5:4) and spike rejection (bits 3:0).
  Statistics = 0x02,
  /// LCO frequency division (bits 7:6), disturber mask (bit 5), latched
  /// interrupt reason (bits 3:0).
  Interrupt = 0x03,
  /// Estimated storm-front distance code (bits 5:0).
  Distance = 0x07,
  /// Oscillator-display selectors (bits 7:5) and antenna tuning
  /// capacitance (bits 3:0).
  Display = 0x08,
  /// Direct-command register: 0x96 restores all registers to defaults.
  PresetDefault = 0x3C,
  /// Direct-command register: 0x96 starts RCO calibration against the LCO.
  CalibRco = 0x3D,
}

impl From<Reg> for u8 {
  #[inline]
  fn from(r: Reg) -> Self {
    r as u8
  }
}

/// Bit masks for the packed register fields.
pub(crate) mod mask {
  /// AFE gain boost, register 0x00.
  pub(crate) const AFE_GB: u8 = 0x3E;
  /// Noise-floor level, register 0x01.
  pub(crate) const NF_LEV: u8 = 0x70;
  /// LCO frequency-division ratio, register 0x03.
  pub(crate) const LCO_FDIV: u8 = 0xC0;
  /// Disturber-interrupt mask bit, register 0x03.
  pub(crate) const MASK_DIST: u8 = 0x20;
  /// Latched interrupt reason, register 0x03.
  pub(crate) const INT: u8 = 0x0F;
  /// Distance estimate code, register 0x07.
  pub(crate) const DISTANCE: u8 = 0x3F;
  /// Routes the antenna (LCO) oscillator to the IRQ pin, register 0x08.
  pub(crate) const DISP_LCO: u8 = 0x80;
  /// Routes the timer RCO to the IRQ pin, register 0x08. Pulsed high then
  /// low to trigger recalibration.
  pub(crate) const DISP_TRCO: u8 = 0x20;
  /// Antenna tuning capacitance selector, register 0x08.
  pub(crate) const TUN_CAP: u8 = 0x0F;
}

/// Shift amounts matching the masks above.
pub(crate) mod shift {
  pub(crate) const AFE_GB: u8 = 1;
  pub(crate) const NF_LEV: u8 = 4;
  pub(crate) const LCO_FDIV: u8 = 6;
}
