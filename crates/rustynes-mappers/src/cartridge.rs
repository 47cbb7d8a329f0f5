//! Cartridge: owns the ROM image and cartridge RAM, exposed as banked byte
//! access. A [`Cartridge`] never interprets CPU or PPU addresses itself —
//! that translation is the [`crate::mapper::Mapper`]'s job.

use crate::mapper::BankKind;
use crate::mirroring::Mirroring;
use crate::rom::{Rom, RomError};

/// Owns the cartridge's program-ROM, character memory, and program-RAM.
///
/// Character memory is ROM when the header declares a non-zero CHR-ROM size,
/// otherwise it is RAM (writes are only effective in the RAM case).
#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Rom,
    chr_ram: Option<Vec<u8>>,
    prg_ram: Vec<u8>,
}

impl Cartridge {
    /// Parses and loads a cartridge image.
    ///
    /// # Errors
    ///
    /// Returns [`RomError`] when the header magic or declared sizes don't
    /// match the supplied buffer.
    pub fn new(data: &[u8]) -> Result<Self, RomError> {
        let rom = Rom::load(data)?;

        let chr_ram = (rom.header.chr_rom_size == 0).then(|| {
            let size = if rom.header.chr_ram_size > 0 {
                rom.header.chr_ram_size
            } else {
                8192
            };
            vec![0u8; size]
        });

        let prg_ram_size = if rom.header.prg_ram_size > 0 {
            rom.header.prg_ram_size
        } else {
            8192
        };

        Ok(Self {
            rom,
            chr_ram,
            prg_ram: vec![0u8; prg_ram_size],
        })
    }

    /// Reads a byte from program-ROM at a cartridge-relative offset.
    #[must_use]
    pub fn read_program_rom(&self, offset: usize) -> u8 {
        let len = self.rom.prg_rom.len();
        self.rom.prg_rom[offset % len]
    }

    /// Reads a byte from character memory at a cartridge-relative offset.
    #[must_use]
    pub fn read_character(&self, offset: usize) -> u8 {
        match &self.chr_ram {
            Some(ram) => ram[offset % ram.len()],
            None => {
                let len = self.rom.chr_rom.len();
                self.rom.chr_rom[offset % len]
            }
        }
    }

    /// Writes a byte to character memory. Only effective when the cartridge
    /// is character-RAM-backed; CHR-ROM writes are silently dropped.
    pub fn write_character(&mut self, offset: usize, value: u8) {
        if let Some(ram) = &mut self.chr_ram {
            let len = ram.len();
            ram[offset % len] = value;
        }
    }

    /// Reads a byte from program-RAM at a cartridge-relative offset.
    #[must_use]
    pub fn read_program_ram(&self, offset: usize) -> u8 {
        let len = self.prg_ram.len();
        self.prg_ram[offset % len]
    }

    /// Writes a byte to program-RAM at a cartridge-relative offset.
    pub fn write_program_ram(&mut self, offset: usize, value: u8) {
        let len = self.prg_ram.len();
        self.prg_ram[offset % len] = value;
    }

    /// Bank count for the given kind, in that kind's native unit
    /// (16 KiB for program-ROM, 8 KiB for character and program-RAM).
    #[must_use]
    pub fn bank_count(&self, kind: BankKind) -> usize {
        match kind {
            BankKind::ProgramRom => self.rom.prg_rom.len() / 16384,
            BankKind::Character => self.character_len() / 8192,
            BankKind::ProgramRam => self.prg_ram.len() / 8192,
        }
    }

    /// Total size of program-ROM in bytes.
    #[must_use]
    pub fn program_rom_len(&self) -> usize {
        self.rom.prg_rom.len()
    }

    /// Total size of character memory in bytes (ROM or RAM, whichever backs it).
    #[must_use]
    pub fn character_len(&self) -> usize {
        self.chr_ram.as_ref().map_or(self.rom.chr_rom.len(), Vec::len)
    }

    /// True when character memory is RAM rather than ROM.
    #[must_use]
    pub fn is_character_ram(&self) -> bool {
        self.chr_ram.is_some()
    }

    /// The header's base mirroring mode (a mapper may override this).
    #[must_use]
    pub fn mirror(&self) -> Mirroring {
        self.rom.header.mirroring
    }

    /// The iNES/NES 2.0 mapper number.
    #[must_use]
    pub fn mapper_id(&self) -> u16 {
        self.rom.header.mapper_number
    }

    /// True when the header declares battery-backed program-RAM.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        self.rom.header.has_battery
    }
}
