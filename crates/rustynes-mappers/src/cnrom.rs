//! Mapper 3: CNROM.
//!
//! Fixed PRG-ROM (16 KiB mirrored or 32 KiB) with a single switchable 8 KiB
//! CHR bank. Writes anywhere in $8000-$FFFF select the bank; real CNROM
//! boards only decode 2 bits, so this crate masks to 2 bits and then wraps
//! modulo the cartridge's actual CHR bank count.

use crate::cartridge::Cartridge;
use crate::mapper::BankKind;
use crate::Mirroring;

/// CNROM mapper state (Mapper 3).
#[derive(Debug, Clone)]
pub struct CnromState {
    cartridge: Cartridge,
    chr_bank: u8,
}

impl CnromState {
    #[must_use]
    pub fn new(cartridge: Cartridge) -> Self {
        Self {
            cartridge,
            chr_bank: 0,
        }
    }

    fn chr_banks(&self) -> usize {
        (self.cartridge.character_len() / 8192).max(1)
    }

    #[must_use]
    pub fn read(&self, kind: BankKind, addr: u16) -> u8 {
        match kind {
            BankKind::ProgramRom => {
                let offset = (addr - 0x8000) as usize;
                let masked = if self.cartridge.program_rom_len() <= 16384 {
                    offset & 0x3FFF
                } else {
                    offset
                };
                self.cartridge.read_program_rom(masked)
            }
            BankKind::Character => {
                let bank = self.chr_bank as usize % self.chr_banks();
                self.cartridge
                    .read_character(bank * 8192 + (addr & 0x1FFF) as usize)
            }
            BankKind::ProgramRam => 0,
        }
    }

    pub fn write(&mut self, kind: BankKind, _addr: u16, value: u8) {
        if kind == BankKind::ProgramRom {
            self.chr_bank = value & 0x03;
        }
    }

    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.cartridge.mirror()
    }

    pub fn reset(&mut self) {
        self.chr_bank = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cartridge(prg_banks: u8, chr_banks: u8) -> Cartridge {
        let mut data = vec![0x4E, 0x45, 0x53, 0x1A, prg_banks, chr_banks, 0x30, 0];
        data.extend_from_slice(&[0; 8]);
        data.extend(std::iter::repeat(0).take(prg_banks as usize * 16384));
        for bank in 0..chr_banks {
            data.extend(std::iter::repeat(bank).take(8192));
        }
        Cartridge::new(&data).unwrap()
    }

    #[test]
    fn chr_bank_switches_on_any_program_rom_write() {
        let mut state = CnromState::new(cartridge(1, 4));
        assert_eq!(state.read(BankKind::Character, 0x0000), 0);
        state.write(BankKind::ProgramRom, 0x9000, 2);
        assert_eq!(state.read(BankKind::Character, 0x0000), 2);
    }

    #[test]
    fn chr_bank_select_masks_to_two_bits() {
        let mut state = CnromState::new(cartridge(1, 4));
        state.write(BankKind::ProgramRom, 0x8000, 7);
        assert_eq!(state.read(BankKind::Character, 0x0000), 3);
    }

    #[test]
    fn program_rom_mirrors_when_16kib() {
        let state = CnromState::new(cartridge(1, 2));
        assert_eq!(
            state.read(BankKind::ProgramRom, 0x8000),
            state.read(BankKind::ProgramRom, 0xC000)
        );
    }

    #[test]
    fn character_rom_writes_are_ignored() {
        let mut state = CnromState::new(cartridge(1, 2));
        let before = state.read(BankKind::Character, 0x0000);
        state.write(BankKind::Character, 0x0000, !before);
        assert_eq!(state.read(BankKind::Character, 0x0000), before);
    }

    #[test]
    fn reset_returns_chr_bank_to_zero() {
        let mut state = CnromState::new(cartridge(1, 4));
        state.write(BankKind::ProgramRom, 0x8000, 2);
        state.reset();
        assert_eq!(state.read(BankKind::Character, 0x0000), 0);
    }
}
