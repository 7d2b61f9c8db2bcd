use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::reg::{Reg, I2C_ADDR};
use crate::{Error, Mod1016};

/// Fold `data` into `current`, touching only the bits selected by `mask`.
pub(crate) const fn merge(current: u8, mask: u8, data: u8) -> u8 {
  (current & !mask) | (data & mask)
}

impl<I, E, D> Mod1016<I, D>
where
  I: I2c<SevenBitAddress, Error = E>,
  D: DelayNs,
{
  /// Read one register as a single write-read transaction.
  ///
  /// Bus failures (no acknowledge, arbitration loss, short read) surface as
  /// [`Error::I2c`] instead of handing back stale data.
  pub(crate) async fn read_raw(&mut self, reg: Reg) -> Result<u8, Error<E>> {
    let mut buf = [0u8; 1];
    self.i2c.write_read(I2C_ADDR, &[reg.into()], &mut buf).await.map_err(Error::I2c)?;
    Ok(buf[0])
  }

  /// Read one register and keep only the bits selected by `mask`.
  ///
  /// Callers shift the result down themselves to interpret sub-fields.
  pub(crate) async fn read_field(&mut self, reg: Reg, mask: u8) -> Result<u8, Error<E>> {
    Ok(self.read_raw(reg).await? & mask)
  }

  /// Read-modify-write one register field.
  ///
  /// Bits outside `mask` are carried over unchanged, so fields sharing a
  /// register byte never disturb each other.
  pub(crate) async fn write_field(&mut self, reg: Reg, mask: u8, data: u8) -> Result<(), Error<E>> {
    let current = self.read_raw(reg).await?;
    let merged = merge(current, mask, data);
    self.i2c.write(I2C_ADDR, &[reg.into(), merged]).await.map_err(Error::I2c)
  }

  /// Plain two-byte write for the direct-command registers.
  ///
  /// The command registers (0x3C, 0x3D) are not readable, so no
  /// read-modify-write here.
  pub(crate) async fn write_direct(&mut self, reg: Reg, data: u8) -> Result<(), Error<E>> {
    self.i2c.write(I2C_ADDR, &[reg.into(), data]).await.map_err(Error::I2c)
  }
}
