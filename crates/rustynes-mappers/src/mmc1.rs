//! Mapper 1: MMC1.
//!
//! Configuration is serialized through a 5-bit shift register: the CPU
//! writes one bit per cycle to any address $8000-$FFFF, and the fifth write
//! commits the accumulated value to whichever of the four internal
//! registers the written address selects. A write with bit 7 set resets the
//! shift register and forces PRG mode back to fix-last, independent of how
//! many bits had been shifted in.

use crate::cartridge::Cartridge;
use crate::mapper::BankKind;
use crate::Mirroring;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrgMode {
    Switch32K,
    FixFirst,
    FixLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChrMode {
    Switch8K,
    Switch4K,
}

/// MMC1 mapper state (Mapper 1).
#[derive(Debug, Clone)]
pub struct Mmc1State {
    cartridge: Cartridge,

    shift_reg: u8,
    shift_count: u8,

    mirroring: Mirroring,
    prg_mode: PrgMode,
    chr_mode: ChrMode,

    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,
    prg_ram_enabled: bool,
}

impl Mmc1State {
    #[must_use]
    pub fn new(cartridge: Cartridge) -> Self {
        let mirroring = cartridge.mirror();
        Self {
            cartridge,
            shift_reg: 0,
            shift_count: 0,
            mirroring,
            prg_mode: PrgMode::FixLast,
            chr_mode: ChrMode::Switch8K,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            prg_ram_enabled: true,
        }
    }

    fn prg_banks(&self) -> usize {
        (self.cartridge.program_rom_len() / 16384).max(1)
    }

    fn chr_banks_4k(&self) -> usize {
        (self.cartridge.character_len() / 4096).max(1)
    }

    fn write_shift(&mut self, addr: u16, value: u8) {
        if value & 0x80 != 0 {
            self.shift_reg = 0;
            self.shift_count = 0;
            self.prg_mode = PrgMode::FixLast;
            return;
        }

        self.shift_reg |= (value & 1) << self.shift_count;
        self.shift_count += 1;

        if self.shift_count == 5 {
            match (addr >> 13) & 0x03 {
                0 => self.write_control(self.shift_reg),
                1 => self.chr_bank_0 = self.shift_reg,
                2 => self.chr_bank_1 = self.shift_reg,
                3 => self.write_prg_bank(self.shift_reg),
                _ => unreachable!(),
            }
            self.shift_reg = 0;
            self.shift_count = 0;
        }
    }

    fn write_control(&mut self, value: u8) {
        self.mirroring = match value & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        };
        self.prg_mode = match (value >> 2) & 0x03 {
            0 | 1 => PrgMode::Switch32K,
            2 => PrgMode::FixFirst,
            _ => PrgMode::FixLast,
        };
        self.chr_mode = if value & 0x10 != 0 {
            ChrMode::Switch4K
        } else {
            ChrMode::Switch8K
        };
    }

    fn write_prg_bank(&mut self, value: u8) {
        self.prg_bank = value & 0x0F;
        self.prg_ram_enabled = value & 0x10 == 0;
    }

    fn prg_addr(&self, addr: u16) -> usize {
        let bank = match self.prg_mode {
            PrgMode::Switch32K => {
                let base = (self.prg_bank & 0x0E) as usize;
                if addr < 0xC000 {
                    base
                } else {
                    base + 1
                }
            }
            PrgMode::FixFirst => {
                if addr < 0xC000 {
                    0
                } else {
                    (self.prg_bank & 0x0F) as usize
                }
            }
            PrgMode::FixLast => {
                if addr < 0xC000 {
                    (self.prg_bank & 0x0F) as usize
                } else {
                    self.prg_banks() - 1
                }
            }
        };
        (bank % self.prg_banks()) * 16384 + (addr & 0x3FFF) as usize
    }

    fn chr_addr(&self, addr: u16) -> usize {
        match self.chr_mode {
            ChrMode::Switch8K => {
                let bank = (self.chr_bank_0 & 0x1E) as usize;
                bank * 4096 + (addr & 0x1FFF) as usize
            }
            ChrMode::Switch4K => {
                let (bank, offset) = if addr < 0x1000 {
                    (self.chr_bank_0 as usize, addr & 0x0FFF)
                } else {
                    (self.chr_bank_1 as usize, addr & 0x0FFF)
                };
                (bank % self.chr_banks_4k()) * 4096 + offset as usize
            }
        }
    }

    #[must_use]
    pub fn read(&self, kind: BankKind, addr: u16) -> u8 {
        match kind {
            BankKind::ProgramRam => {
                if self.prg_ram_enabled {
                    self.cartridge.read_program_ram((addr & 0x1FFF) as usize)
                } else {
                    0
                }
            }
            BankKind::ProgramRom => self.cartridge.read_program_rom(self.prg_addr(addr)),
            BankKind::Character => self.cartridge.read_character(self.chr_addr(addr)),
        }
    }

    pub fn write(&mut self, kind: BankKind, addr: u16, value: u8) {
        match kind {
            BankKind::ProgramRam => {
                if self.prg_ram_enabled {
                    self.cartridge
                        .write_program_ram((addr & 0x1FFF) as usize, value);
                }
            }
            BankKind::ProgramRom => self.write_shift(addr, value),
            BankKind::Character => {
                let offset = self.chr_addr(addr);
                self.cartridge.write_character(offset, value);
            }
        }
    }

    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn reset(&mut self) {
        self.shift_reg = 0;
        self.shift_count = 0;
        self.prg_mode = PrgMode::FixLast;
    }
}
