//! Mapper 4: MMC3.
//!
//! Eight bank-select registers feed four 1-8 KiB CHR windows (laid out
//! either way round depending on the CHR-inversion bit) and two swappable
//! 8 KiB PRG windows (the other two PRG windows are permanently fixed to
//! the second-to-last and last banks, trading places with the swappable
//! ones when the PRG-mode bit flips). A scanline IRQ counter is clocked by
//! the PPU's A12 address-line rising edges: each edge reloads the counter
//! from its latch when it is at zero, otherwise decrements it, and raises
//! the IRQ when the post-decrement value reaches zero while enabled.

use crate::cartridge::Cartridge;
use crate::mapper::BankKind;
use crate::Mirroring;

/// MMC3 mapper state (Mapper 4).
#[derive(Debug, Clone)]
pub struct Mmc3State {
    cartridge: Cartridge,

    bank_select: u8,
    prg_mode: bool,
    chr_inversion: bool,
    bank_registers: [u8; 8],

    mirroring: Mirroring,

    prg_ram_enabled: bool,
    prg_ram_write_protect: bool,

    irq_latch: u8,
    irq_counter: u8,
    irq_enabled: bool,
    irq_pending: bool,
}

impl Mmc3State {
    #[must_use]
    pub fn new(cartridge: Cartridge) -> Self {
        let mirroring = cartridge.mirror();
        Self {
            cartridge,
            bank_select: 0,
            prg_mode: false,
            chr_inversion: false,
            bank_registers: [0; 8],
            mirroring,
            prg_ram_enabled: true,
            prg_ram_write_protect: false,
            irq_latch: 0,
            irq_counter: 0,
            irq_enabled: false,
            irq_pending: false,
        }
    }

    fn prg_banks_8k(&self) -> usize {
        (self.cartridge.program_rom_len() / 8192).max(1)
    }

    fn chr_banks_1k(&self) -> usize {
        (self.cartridge.character_len() / 1024).max(1)
    }

    fn write_bank_select(&mut self, value: u8) {
        self.bank_select = value & 0x07;
        self.prg_mode = value & 0x40 != 0;
        self.chr_inversion = value & 0x80 != 0;
    }

    fn write_bank_data(&mut self, value: u8) {
        let register = self.bank_select as usize;
        let masked = match register {
            0 | 1 => value & 0xFE,
            6 | 7 => value & 0x3F,
            _ => value,
        };
        self.bank_registers[register] = masked;
    }

    fn write_mirroring(&mut self, value: u8) {
        self.mirroring = if value & 0x01 != 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        };
    }

    fn write_prg_ram_protect(&mut self, value: u8) {
        self.prg_ram_write_protect = value & 0x40 != 0;
        self.prg_ram_enabled = value & 0x80 != 0;
    }

    /// Resolves the four 1 KiB CHR window bases, in cartridge-relative
    /// 1 KiB units, for the current `chr_inversion` setting.
    fn chr_window(&self, index: usize) -> usize {
        let r = &self.bank_registers;
        let banks = self.chr_banks_1k();
        let windows: [u8; 8] = if self.chr_inversion {
            [r[2], r[3], r[4], r[5], r[0], r[0] + 1, r[1], r[1] + 1]
        } else {
            [r[0], r[0] + 1, r[1], r[1] + 1, r[2], r[3], r[4], r[5]]
        };
        windows[index] as usize % banks
    }

    fn chr_addr(&self, addr: u16) -> usize {
        let window = (addr >> 10) as usize & 0x07;
        let offset = (addr & 0x03FF) as usize;
        self.chr_window(window) * 1024 + offset
    }

    /// Resolves the four 8 KiB PRG window bases depending on `prg_mode`.
    fn prg_addr(&self, addr: u16) -> usize {
        let banks = self.prg_banks_8k();
        let r6 = self.bank_registers[6] as usize % banks;
        let r7 = self.bank_registers[7] as usize % banks;
        let second_to_last = banks.saturating_sub(2);
        let last = banks.saturating_sub(1);

        let bank = match (addr >> 13) & 0x03 {
            0 => {
                if self.prg_mode {
                    second_to_last
                } else {
                    r6
                }
            }
            1 => r7,
            2 => {
                if self.prg_mode {
                    r6
                } else {
                    second_to_last
                }
            }
            _ => last,
        };
        bank * 8192 + (addr & 0x1FFF) as usize
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
                if self.prg_ram_enabled && !self.prg_ram_write_protect {
                    self.cartridge
                        .write_program_ram((addr & 0x1FFF) as usize, value);
                }
            }
            BankKind::Character => {
                let offset = self.chr_addr(addr);
                self.cartridge.write_character(offset, value);
            }
            BankKind::ProgramRom => match (addr, addr % 2 == 0) {
                (0x8000..=0x9FFF, true) => self.write_bank_select(value),
                (0x8000..=0x9FFF, false) => self.write_bank_data(value),
                (0xA000..=0xBFFF, true) => self.write_mirroring(value),
                (0xA000..=0xBFFF, false) => self.write_prg_ram_protect(value),
                (0xC000..=0xDFFF, true) => self.irq_latch = value,
                (0xC000..=0xDFFF, false) => self.irq_counter = 0,
                (0xE000..=0xFFFF, true) => {
                    self.irq_enabled = false;
                    self.irq_pending = false;
                }
                (0xE000..=0xFFFF, false) => self.irq_enabled = true,
                _ => {}
            },
        }
    }

    /// Clocks the scanline IRQ counter on a PPU A12 rising edge.
    pub fn tick_scanline(&mut self) {
        if self.irq_counter == 0 {
            self.irq_counter = self.irq_latch;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }

    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn reset(&mut self) {
        self.bank_select = 0;
        self.prg_mode = false;
        self.chr_inversion = false;
        self.bank_registers = [0; 8];
        self.prg_ram_enabled = true;
        self.prg_ram_write_protect = false;
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_enabled = false;
        self.irq_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cartridge(prg_8k_banks: u8, chr_1k_banks: u8) -> Cartridge {
        let mut data = vec![
            0x4E,
            0x45,
            0x53,
            0x1A,
            prg_8k_banks / 2,
            chr_1k_banks / 8,
            0x40,
            0,
        ];
        data.extend_from_slice(&[0; 8]);
        for bank in 0..prg_8k_banks {
            data.extend(std::iter::repeat(bank).take(8192));
        }
        for bank in 0..chr_1k_banks {
            data.extend(std::iter::repeat(0x80 + bank).take(1024));
        }
        Cartridge::new(&data).unwrap()
    }

    #[test]
    fn prg_mode_swaps_which_window_is_fixed() {
        let mut state = Mmc3State::new(cartridge(8, 8));
        state.write(BankKind::ProgramRom, 0x8000, 0x06); // select R6
        state.write(BankKind::ProgramRom, 0x8001, 3);
        assert_eq!(state.read(BankKind::ProgramRom, 0x8000), 3);
        assert_eq!(state.read(BankKind::ProgramRom, 0xC000), 6); // second-to-last of 8 banks

        state.write(BankKind::ProgramRom, 0x8000, 0x46); // prg_mode set, select R6
        state.write(BankKind::ProgramRom, 0x8001, 3);
        assert_eq!(state.read(BankKind::ProgramRom, 0xC000), 3);
        assert_eq!(state.read(BankKind::ProgramRom, 0x8000), 6);
    }

    #[test]
    fn chr_inversion_swaps_2k_and_1k_window_halves() {
        let mut state = Mmc3State::new(cartridge(4, 16));
        state.write(BankKind::ProgramRom, 0x8000, 0x00); // select R0, non-inverted
        state.write(BankKind::ProgramRom, 0x8001, 2);
        assert_eq!(state.read(BankKind::Character, 0x0000), 0x82);

        state.write(BankKind::ProgramRom, 0x8000, 0x80); // inversion bit set, select R0
        state.write(BankKind::ProgramRom, 0x8001, 2);
        assert_eq!(state.read(BankKind::Character, 0x1000), 0x82);
    }

    #[test]
    fn bank_data_masks_even_registers_to_two_kib_alignment() {
        let mut state = Mmc3State::new(cartridge(4, 16));
        state.write(BankKind::ProgramRom, 0x8000, 0x00); // select R0
        state.write(BankKind::ProgramRom, 0x8001, 5); // odd value, masked to 4
        assert_eq!(state.bank_registers[0], 4);
    }

    #[test]
    fn mirroring_bit_selects_horizontal_or_vertical() {
        let mut state = Mmc3State::new(cartridge(4, 8));
        state.write(BankKind::ProgramRom, 0xA000, 1);
        assert_eq!(state.mirroring(), Mirroring::Horizontal);
        state.write(BankKind::ProgramRom, 0xA000, 0);
        assert_eq!(state.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn irq_fires_after_latch_plus_one_edges_from_reload() {
        let mut state = Mmc3State::new(cartridge(4, 8));
        state.write(BankKind::ProgramRom, 0xC000, 4); // latch = 4
        state.write(BankKind::ProgramRom, 0xC001, 0); // force reload on next edge
        state.write(BankKind::ProgramRom, 0xE001, 0); // enable

        state.tick_scanline(); // reload: counter = 4
        assert!(!state.irq_pending());
        for _ in 0..3 {
            state.tick_scanline();
            assert!(!state.irq_pending());
        }
        state.tick_scanline(); // counter reaches 0
        assert!(state.irq_pending());
    }

    #[test]
    fn disabling_irq_acknowledges_pending() {
        let mut state = Mmc3State::new(cartridge(4, 8));
        state.write(BankKind::ProgramRom, 0xC000, 0);
        state.write(BankKind::ProgramRom, 0xE001, 0);
        state.tick_scanline();
        assert!(state.irq_pending());
        state.write(BankKind::ProgramRom, 0xE000, 0);
        assert!(!state.irq_pending());
    }

    #[test]
    fn write_protected_ram_ignores_writes() {
        let mut state = Mmc3State::new(cartridge(4, 8));
        state.write(BankKind::ProgramRam, 0x6000, 0x11);
        state.write(BankKind::ProgramRom, 0xA001, 0xC0); // enabled + write-protected
        state.write(BankKind::ProgramRam, 0x6000, 0x22);
        assert_eq!(state.read(BankKind::ProgramRam, 0x6000), 0x11);
    }
}
