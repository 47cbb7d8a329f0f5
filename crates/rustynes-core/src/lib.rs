//! RustyNES Core - NES Emulation Integration Layer.
//!
//! This crate provides the high-level NES emulation API, integrating the CPU,
//! PPU, APU, and mapper components into a complete console emulator.
//!
//! # Architecture
//!
//! The core crate connects all NES components through a central bus:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Console                              │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │                      NesBus                          │   │
//! │  │  ┌─────┐  ┌─────┐  ┌─────┐  ┌────────┐  ┌────────┐ │   │
//! │  │  │ RAM │  │ PPU │  │ APU │  │ Mapper │  │ Input  │ │   │
//! │  │  │ 2KB │  │     │  │     │  │        │  │        │ │   │
//! │  │  └─────┘  └─────┘  └─────┘  └────────┘  └────────┘ │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! │                          ▲                                  │
//! │                          │                                  │
//! │                     ┌────┴────┐                             │
//! │                     │   CPU   │                             │
//! │                     │  6502   │                             │
//! │                     └─────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use rustynes_core::{Console, ControllerState};
//!
//! // Load a ROM file
//! let rom_data = std::fs::read("game.nes").expect("Failed to read ROM");
//! let mut console = Console::new(&rom_data).expect("Failed to create console");
//!
//! // Power on and run
//! console.power_on();
//!
//! loop {
//!     // Set controller input
//!     console.set_controller1(ControllerState::A | ControllerState::START);
//!
//!     // Run one frame
//!     console.step_frame();
//!
//!     // Get framebuffer for display (256x240 RGBA)
//!     let _framebuffer = console.framebuffer();
//!
//!     // Drain queued audio samples
//!     let output = console.audio_output();
//!     let mut samples = [0i16; 256];
//!     let _read = output.read(&mut samples);
//!     # break;
//! }
//! ```
//!
//! For a full frontend, implement [`host::Host`] and drive the emulation
//! through [`console::run`] instead of stepping `Console` by hand.

mod bus;
mod console;
pub mod error;
pub mod host;
mod input;
pub mod palette;

// Re-export main types
pub use bus::NesBus;
pub use console::{Console, RunContext, RunOutcome, run, timing};
pub use error::{NesError, get_error};
pub use host::{Host, HostEvent};
pub use input::{Button, Controller, ControllerState};

// Re-export commonly used types from dependencies
pub use rustynes_apu::Apu;
pub use rustynes_cpu::Cpu;
pub use rustynes_mappers::{Cartridge, Mapper, MapperError, Mirroring, Rom, RomError, RomHeader};
pub use rustynes_ppu::Ppu;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NES screen dimensions.
pub mod screen {
    /// Screen width in pixels.
    pub const WIDTH: u32 = 256;
    /// Screen height in pixels.
    pub const HEIGHT: u32 = 240;
    /// Total pixels per frame.
    pub const PIXELS: u32 = WIDTH * HEIGHT;
    /// Bytes per frame (RGBA).
    pub const FRAMEBUFFER_SIZE: usize = (PIXELS * 4) as usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_rom() -> Vec<u8> {
        let mut data = vec![0x4Eu8, 0x45, 0x53, 0x1A, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut prg = vec![0xEAu8; 32768]; // Fill with NOPs
        // Reset vector at $FFFC points to $8000
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0x80;
        data.extend_from_slice(&prg);
        data.extend(std::iter::repeat(0).take(8192));
        data
    }

    #[test]
    fn test_console_creation() {
        let rom = create_test_rom();
        let console = Console::new(&rom).unwrap();
        assert_eq!(console.mapper_number(), 0);
    }

    #[test]
    fn test_screen_constants() {
        assert_eq!(screen::WIDTH, 256);
        assert_eq!(screen::HEIGHT, 240);
        assert_eq!(screen::PIXELS, 61440);
        assert_eq!(screen::FRAMEBUFFER_SIZE, 245_760);
    }

    #[test]
    fn test_timing_constants() {
        assert_eq!(timing::MASTER_CLOCK_NTSC, 21_477_272);
        assert_eq!(timing::CPU_CLOCK_NTSC, 1_789_772);
        assert_eq!(timing::PPU_CLOCK_NTSC, 5_369_318);
        assert_eq!(timing::CPU_CYCLES_PER_FRAME, 29_780);
    }

    #[test]
    fn test_controller_state_buttons() {
        let mut state = ControllerState::empty();
        assert_eq!(state.bits(), 0);

        state |= ControllerState::A | ControllerState::B;
        assert_eq!(state.bits(), 0x03);

        state |= ControllerState::START;
        assert_eq!(state.bits(), 0x0B);
    }

    #[test]
    fn test_palette_module() {
        // Verify palette is accessible
        assert_eq!(palette::NES_PALETTE.len(), 64);

        // Check some known colors
        let white = palette::palette_to_rgb(0x20);
        assert_eq!(white, (0xFF, 0xFF, 0xFF));

        let black = palette::palette_to_rgb(0x0D);
        assert_eq!(black, (0, 0, 0));
    }

    #[test]
    fn test_console_step() {
        let rom = create_test_rom();
        let mut console = Console::new(&rom).unwrap();

        console.reset();

        // Step a few CPU cycles
        for _ in 0..10 {
            console.step();
        }

        assert!(console.total_cycles() > 0);
    }

    #[test]
    fn test_console_audio_output() {
        let rom = create_test_rom();
        let mut console = Console::new(&rom).unwrap();

        console.reset();

        // Run enough cycles that the APU has pushed at least one sample.
        for _ in 0..1000 {
            console.step();
        }

        let output = console.audio_output();
        assert!(output.readable() > 0);
    }
}
