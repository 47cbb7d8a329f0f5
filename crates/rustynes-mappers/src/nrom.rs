//! Mapper 0: NROM.
//!
//! The simplest NES mapper — no bank switching. PRG-ROM is 16 KiB (mirrored
//! to fill the 32 KiB CPU window) or 32 KiB; CHR is a fixed 8 KiB window of
//! ROM or RAM.

use crate::cartridge::Cartridge;
use crate::mapper::BankKind;
use crate::Mirroring;

/// NROM mapper state (Mapper 0).
#[derive(Debug, Clone)]
pub struct NromState {
    cartridge: Cartridge,
}

impl NromState {
    #[must_use]
    pub fn new(cartridge: Cartridge) -> Self {
        Self { cartridge }
    }

    #[must_use]
    pub fn read(&self, kind: BankKind, addr: u16) -> u8 {
        match kind {
            BankKind::ProgramRom => {
                let offset = (addr - 0x8000) as usize;
                let masked = if self.cartridge.program_rom_len() == 16384 {
                    offset & 0x3FFF
                } else {
                    offset
                };
                self.cartridge.read_program_rom(masked)
            }
            BankKind::Character => self.cartridge.read_character(addr as usize),
            BankKind::ProgramRam => self.cartridge.read_program_ram((addr & 0x1FFF) as usize),
        }
    }

    pub fn write(&mut self, kind: BankKind, addr: u16, value: u8) {
        match kind {
            BankKind::ProgramRom => {}
            BankKind::Character => self.cartridge.write_character(addr as usize, value),
            BankKind::ProgramRam => self
                .cartridge
                .write_program_ram((addr & 0x1FFF) as usize, value),
        }
    }

    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.cartridge.mirror()
    }

    pub fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cartridge(prg_banks: u8, chr_banks: u8) -> Cartridge {
        let mut data = vec![0x4E, 0x45, 0x53, 0x1A, prg_banks, chr_banks, 0, 0];
        data.extend_from_slice(&[0; 8]);
        for i in 0..(prg_banks as usize * 16384) {
            data.push((i & 0xFF) as u8);
        }
        for i in 0..(chr_banks as usize * 8192) {
            data.push(0xA0_u8.wrapping_add(i as u8));
        }
        Cartridge::new(&data).unwrap()
    }

    #[test]
    fn nrom_256_reads_full_32kib_without_mirroring() {
        let state = NromState::new(cartridge(2, 1));
        assert_eq!(state.read(BankKind::ProgramRom, 0x8000), 0x00);
        assert_eq!(state.read(BankKind::ProgramRom, 0xFFFF), 0xFF);
    }

    #[test]
    fn nrom_128_mirrors_16kib_into_32kib_window() {
        let state = NromState::new(cartridge(1, 1));
        assert_eq!(
            state.read(BankKind::ProgramRom, 0x8000),
            state.read(BankKind::ProgramRom, 0xC000)
        );
        assert_eq!(
            state.read(BankKind::ProgramRom, 0xBFFF),
            state.read(BankKind::ProgramRom, 0xFFFF)
        );
    }

    #[test]
    fn program_rom_writes_are_ignored() {
        let mut state = NromState::new(cartridge(2, 1));
        let before = state.read(BankKind::ProgramRom, 0x8000);
        state.write(BankKind::ProgramRom, 0x8000, !before);
        assert_eq!(state.read(BankKind::ProgramRom, 0x8000), before);
    }

    #[test]
    fn chr_ram_cartridge_is_writable() {
        let mut state = NromState::new(cartridge(1, 0));
        state.write(BankKind::Character, 0x0000, 0x42);
        assert_eq!(state.read(BankKind::Character, 0x0000), 0x42);
    }

    #[test]
    fn chr_rom_cartridge_ignores_writes() {
        let mut state = NromState::new(cartridge(1, 1));
        let before = state.read(BankKind::Character, 0x0000);
        state.write(BankKind::Character, 0x0000, !before);
        assert_eq!(state.read(BankKind::Character, 0x0000), before);
    }
}
