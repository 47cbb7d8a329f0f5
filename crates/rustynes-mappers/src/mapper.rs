//! Cartridge mapper dispatch.
//!
//! A [`Mapper`] is a tagged union over the mapper families this crate
//! supports. Every mapper's register set is known statically, so a closed
//! enum dispatches cheaper and more simply than a `dyn` trait object, at the
//! cost of the union knowing all its members up front — an acceptable
//! tradeoff for a fixed hardware target.

use crate::cartridge::Cartridge;
use crate::cnrom::CnromState;
use crate::gxrom::GxromState;
use crate::mmc1::Mmc1State;
use crate::mmc3::Mmc3State;
use crate::nrom::NromState;
use crate::rom::RomError;
use crate::unrom30::Unrom30State;
use crate::uxrom::UxromState;
use crate::Mirroring;

/// Errors constructing a [`Mapper`] from a cartridge image.
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// The ROM header names a mapper number this crate has no variant for.
    #[error("unsupported mapper number: {0}")]
    UnsupportedMapper(u16),

    /// The underlying cartridge image failed to parse.
    #[error(transparent)]
    Rom(#[from] RomError),
}

/// Which memory region a [`Mapper`] access targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankKind {
    /// 8 KiB program-RAM window, CPU $6000-$7FFF.
    ProgramRam,
    /// Program-ROM, CPU $8000-$FFFF.
    ProgramRom,
    /// Character memory, PPU $0000-$1FFF.
    Character,
}

/// A cartridge mapper: owns a [`Cartridge`] plus whatever bank-select
/// registers its hardware family implements.
#[derive(Debug, Clone)]
pub enum Mapper {
    /// Mapper 0 — no banking.
    Nrom(NromState),
    /// Mapper 1 — serial-port bank-select with three banking modes.
    Mmc1(Mmc1State),
    /// Mapper 2 — switchable 16 KiB PRG window, fixed CHR-RAM.
    Uxrom(UxromState),
    /// Mapper 3 — switchable 8 KiB CHR window, fixed PRG.
    Cnrom(CnromState),
    /// Mapper 4 — eight-register fine-grained banking with a scanline IRQ.
    Mmc3(Mmc3State),
    /// Mapper 30 — UNROM-like banking plus a cartridge-selected one-screen
    /// mirroring override.
    Unrom30(Unrom30State),
    /// Mapper 66 — single control byte selecting a 32 KiB PRG window and an
    /// 8 KiB CHR window.
    Gxrom(GxromState),
}

impl Mapper {
    /// Builds the mapper implied by the cartridge's header.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::UnsupportedMapper`] if the header names a
    /// mapper number none of this crate's variants implement.
    pub fn new(cartridge: Cartridge) -> Result<Self, MapperError> {
        match cartridge.mapper_id() {
            0 => Ok(Mapper::Nrom(NromState::new(cartridge))),
            1 => Ok(Mapper::Mmc1(Mmc1State::new(cartridge))),
            2 => Ok(Mapper::Uxrom(UxromState::new(cartridge))),
            3 => Ok(Mapper::Cnrom(CnromState::new(cartridge))),
            4 => Ok(Mapper::Mmc3(Mmc3State::new(cartridge))),
            30 => Ok(Mapper::Unrom30(Unrom30State::new(cartridge))),
            66 => Ok(Mapper::Gxrom(GxromState::new(cartridge))),
            n => {
                log::warn!("unsupported mapper number {n}");
                Err(MapperError::UnsupportedMapper(n))
            }
        }
    }

    /// Reads a byte from the given bank kind at a CPU- or PPU-relative
    /// address (the caller is responsible for having already range-checked
    /// the address against the bus window this kind corresponds to).
    #[must_use]
    pub fn read(&self, kind: BankKind, addr: u16) -> u8 {
        match self {
            Mapper::Nrom(s) => s.read(kind, addr),
            Mapper::Mmc1(s) => s.read(kind, addr),
            Mapper::Uxrom(s) => s.read(kind, addr),
            Mapper::Cnrom(s) => s.read(kind, addr),
            Mapper::Mmc3(s) => s.read(kind, addr),
            Mapper::Unrom30(s) => s.read(kind, addr),
            Mapper::Gxrom(s) => s.read(kind, addr),
        }
    }

    /// Writes a byte, either committing it to RAM or updating bank-select
    /// registers, depending on the mapper family and address.
    pub fn write(&mut self, kind: BankKind, addr: u16, value: u8) {
        match self {
            Mapper::Nrom(s) => s.write(kind, addr, value),
            Mapper::Mmc1(s) => s.write(kind, addr, value),
            Mapper::Uxrom(s) => s.write(kind, addr, value),
            Mapper::Cnrom(s) => s.write(kind, addr, value),
            Mapper::Mmc3(s) => s.write(kind, addr, value),
            Mapper::Unrom30(s) => s.write(kind, addr, value),
            Mapper::Gxrom(s) => s.write(kind, addr, value),
        }
    }

    /// Notifies the mapper of a PPU address-line A12 rising edge. Only MMC3
    /// uses this to clock its scanline IRQ counter; all other mappers no-op.
    pub fn tick_scanline(&mut self) {
        if let Mapper::Mmc3(s) = self {
            s.tick_scanline();
        }
    }

    /// Resets bank-select state to its power-on configuration. The
    /// underlying cartridge's ROM/RAM contents are untouched.
    pub fn reset(&mut self) {
        match self {
            Mapper::Nrom(s) => s.reset(),
            Mapper::Mmc1(s) => s.reset(),
            Mapper::Uxrom(s) => s.reset(),
            Mapper::Cnrom(s) => s.reset(),
            Mapper::Mmc3(s) => s.reset(),
            Mapper::Unrom30(s) => s.reset(),
            Mapper::Gxrom(s) => s.reset(),
        }
    }

    /// Current effective nametable mirroring mode (mappers with a mirroring
    /// control register may override the cartridge header's default).
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        match self {
            Mapper::Nrom(s) => s.mirroring(),
            Mapper::Mmc1(s) => s.mirroring(),
            Mapper::Uxrom(s) => s.mirroring(),
            Mapper::Cnrom(s) => s.mirroring(),
            Mapper::Mmc3(s) => s.mirroring(),
            Mapper::Unrom30(s) => s.mirroring(),
            Mapper::Gxrom(s) => s.mirroring(),
        }
    }

    /// True when a scanline-IRQ mapper has a pending, unacknowledged IRQ.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        match self {
            Mapper::Mmc3(s) => s.irq_pending(),
            _ => false,
        }
    }

    /// The iNES/NES 2.0 mapper number this instance implements.
    #[must_use]
    pub fn mapper_number(&self) -> u16 {
        match self {
            Mapper::Nrom(_) => 0,
            Mapper::Mmc1(_) => 1,
            Mapper::Uxrom(_) => 2,
            Mapper::Cnrom(_) => 3,
            Mapper::Mmc3(_) => 4,
            Mapper::Unrom30(_) => 30,
            Mapper::Gxrom(_) => 66,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_bytes(prg_banks: u8, chr_banks: u8, mapper: u8) -> Vec<u8> {
        let mut data = vec![0x4E, 0x45, 0x53, 0x1A, prg_banks, chr_banks];
        data.push((mapper & 0x0F) << 4);
        data.push(mapper & 0xF0);
        data.extend_from_slice(&[0; 8]);
        data.extend(std::iter::repeat(0xAB).take(prg_banks as usize * 16384));
        data.extend(std::iter::repeat(0xCD).take(chr_banks as usize * 8192));
        data
    }

    #[test]
    fn builds_every_supported_mapper_number() {
        for (mapper_id, prg_banks, chr_banks) in
            [(0, 2, 1), (1, 4, 0), (2, 4, 0), (3, 2, 1), (4, 8, 8), (30, 4, 0), (66, 4, 2)]
        {
            let cart = Cartridge::new(&rom_bytes(prg_banks, chr_banks, mapper_id)).unwrap();
            let mapper = Mapper::new(cart).unwrap();
            assert_eq!(mapper.mapper_number(), u16::from(mapper_id));
        }
    }

    #[test]
    fn rejects_unsupported_mapper_number() {
        let cart = Cartridge::new(&rom_bytes(2, 1, 99)).unwrap();
        let err = Mapper::new(cart).unwrap_err();
        assert!(matches!(err, MapperError::UnsupportedMapper(99)));
    }

    #[test]
    fn nrom_ignores_program_rom_writes() {
        let cart = Cartridge::new(&rom_bytes(2, 1, 0)).unwrap();
        let mut mapper = Mapper::new(cart).unwrap();
        let before = mapper.read(BankKind::ProgramRom, 0x8000);
        mapper.write(BankKind::ProgramRom, 0x8000, !before);
        assert_eq!(mapper.read(BankKind::ProgramRom, 0x8000), before);
    }

    #[test]
    fn tick_scanline_only_affects_mmc3() {
        let cart = Cartridge::new(&rom_bytes(2, 1, 0)).unwrap();
        let mut mapper = Mapper::new(cart).unwrap();
        mapper.tick_scanline(); // no-op, must not panic
        assert!(!mapper.irq_pending());
    }
}
