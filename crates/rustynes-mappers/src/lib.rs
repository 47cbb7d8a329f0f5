//! NES/Famicom cartridge and mapper emulation.
//!
//! This crate owns cartridge ROM/RAM storage and the bank-switching hardware
//! ("mappers") cartridges use to address more memory than the CPU/PPU's bare
//! 16-bit address space would otherwise allow. A [`Cartridge`] holds the raw
//! program-ROM, character memory, and program-RAM; a [`Mapper`] wraps a
//! `Cartridge` and translates CPU/PPU addresses into cartridge-relative
//! offsets according to its family's bank-select registers.
//!
//! # Supported mappers
//!
//! | Number | Name | Notes |
//! |--------|------|-------|
//! | 0 | NROM | no banking |
//! | 1 | MMC1 | 5-bit serial bank-select |
//! | 2 | UxROM | switchable 16 KiB PRG window |
//! | 3 | CNROM | switchable 8 KiB CHR window |
//! | 4 | MMC3 | eight-register fine-grained banking, scanline IRQ |
//! | 30 | UNROM-variant | UxROM-like plus one-screen mirroring override |
//! | 66 | GxROM | switchable 32 KiB PRG + 8 KiB CHR windows |
//!
//! # Example
//!
//! ```no_run
//! use rustynes_mappers::{Cartridge, Mapper};
//!
//! let data = std::fs::read("game.nes").expect("failed to read ROM");
//! let cartridge = Cartridge::new(&data).expect("failed to parse cartridge");
//! let mapper = Mapper::new(cartridge).expect("unsupported mapper");
//! println!("mapper {}", mapper.mapper_number());
//! ```

mod cartridge;
mod cnrom;
mod gxrom;
mod mapper;
mod mirroring;
mod mmc1;
mod mmc3;
mod nrom;
mod rom;
mod unrom30;
mod uxrom;

pub use cartridge::Cartridge;
pub use mapper::{BankKind, Mapper, MapperError};
pub use mirroring::Mirroring;
pub use rom::{Rom, RomError, RomHeader};
