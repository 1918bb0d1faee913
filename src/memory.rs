use crate::error::EmuError;

/// 8 MiB of byte-addressable, zero-initialized RAM.
pub const MEM_BYTES: u32 = 8 * 1024 * 1024;
pub const MEM_WORDS: u32 = MEM_BYTES / 4;

/// The fixed RAM word seeded by the boot loader with the RAM size, read
/// by the guest to discover how much memory it has.
pub const MEM_SIZE_ADDR: u32 = 12;
/// The fixed RAM word seeded by the boot loader with the initial stack
/// pointer, mirrored into `R[14]` at boot.
pub const STACK_ORG_ADDR: u32 = 24;
pub const STACK_ORG: u32 = 0x80000;

/// Flat RAM storage. Word accesses go through explicit little-endian
/// conversions rather than native layout, so the emulator's byte-level
/// guest contract holds on a big-endian host too.
pub struct Ram {
    bytes: Vec<u8>,
}

impl Ram {
    pub fn new() -> Self {
        Ram {
            bytes: vec![0; MEM_BYTES as usize],
        }
    }

    /// Word reads/writes are aligned by truncating the low two bits,
    /// matching the hardware rather than rejecting unaligned access.
    fn aligned(adr: u32) -> u32 {
        adr & !3
    }

    pub fn read_word(&self, adr: u32) -> Result<u32, EmuError> {
        let adr = Self::aligned(adr);
        self.check_range(adr, 4, "Memory.ReadWord")?;
        let bytes: [u8; 4] = self.bytes[adr as usize..adr as usize + 4]
            .try_into()
            .unwrap();
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn write_word(&mut self, adr: u32, val: u32) -> Result<(), EmuError> {
        let adr = Self::aligned(adr);
        self.check_range(adr, 4, "Memory.WriteWord")?;
        self.bytes[adr as usize..adr as usize + 4].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }

    pub fn read_byte(&self, adr: u32) -> Result<u32, EmuError> {
        self.check_range(adr, 1, "Memory.ReadByte")?;
        Ok(self.bytes[adr as usize] as u32)
    }

    pub fn write_byte(&mut self, adr: u32, val: u32) -> Result<(), EmuError> {
        self.check_range(adr, 1, "Memory.WriteByte")?;
        self.bytes[adr as usize] = val as u8;
        Ok(())
    }

    pub fn read_slice(&self, adr: u32, len: u32) -> Result<&[u8], EmuError> {
        self.check_range(adr, len, "Memory.Read")?;
        Ok(&self.bytes[adr as usize..(adr + len) as usize])
    }

    pub fn write_slice(&mut self, adr: u32, data: &[u8]) -> Result<(), EmuError> {
        self.check_range(adr, data.len() as u32, "Memory.Write")?;
        self.bytes[adr as usize..adr as usize + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Widening bounds check: `adr + siz` is computed in 64 bits so a
    /// `siz` of 0 at the very top of RAM, or an `adr` near `u32::MAX`,
    /// can never wrap back into range.
    pub fn check_range(&self, adr: u32, siz: u32, proc: &'static str) -> Result<(), EmuError> {
        let len = self.bytes.len() as u64;
        let adr = adr as u64;
        let siz = siz as u64;
        if adr >= len || len - adr < siz {
            return Err(EmuError::RangeOutOfBounds { proc });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_round_trip() {
        let mut ram = Ram::new();
        ram.write_word(100, 0xDEAD_BEEF).unwrap();
        assert_eq!(ram.read_word(100).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn byte_write_touches_only_addressed_byte() {
        let mut ram = Ram::new();
        ram.write_word(0, 0xFFFF_FFFF).unwrap();
        ram.write_byte(1, 0x00).unwrap();
        assert_eq!(ram.read_word(0).unwrap(), 0xFFFF_00FF);
    }

    #[test]
    fn unaligned_word_access_truncates() {
        let mut ram = Ram::new();
        ram.write_word(8, 0x1234_5678).unwrap();
        assert_eq!(ram.read_word(11).unwrap(), 0x1234_5678);
    }

    #[test]
    fn out_of_range_access_is_fatal() {
        let ram = Ram::new();
        assert!(ram.read_word(MEM_BYTES).is_err());
        assert!(ram.read_word(MEM_BYTES - 4).is_ok());
    }

    #[test]
    fn zero_size_range_at_top_of_ram_does_not_wrap() {
        let ram = Ram::new();
        assert!(ram.check_range(MEM_BYTES, 0, "test").is_err());
        assert!(ram.check_range(u32::MAX, 0, "test").is_err());
    }
}
