//! NES 2C02 PPU (Picture Processing Unit) emulation.
//!
//! This crate provides a cycle-accurate implementation of the NES PPU,
//! responsible for all graphics rendering.
//!
//! # Overview
//!
//! The PPU operates at 3x the CPU clock rate and generates a 256x240 pixel
//! image. It consists of several subsystems:
//!
//! - **Registers**: Control, Mask, Status, OAM Address, Scroll, Address, Data
//! - **Background rendering**: Nametables, pattern tables, attribute tables
//! - **Sprite rendering**: OAM, sprite evaluation, sprite 0 hit detection
//! - **Palette**: 32-byte palette RAM with mirroring
//!
//! # Timing
//!
//! NTSC timing (the primary target):
//! - Master clock: 21.477272 MHz
//! - PPU clock: 5.369318 MHz (master / 4)
//! - 341 dots per scanline
//! - 262 scanlines per frame
//!
//! # Usage
//!
//! ```no_run
//! use rustynes_ppu::{Ppu, Mirroring};
//!
//! let mut ppu = Ppu::new(Mirroring::Horizontal);
//! let chr = [0u8; 0x2000];
//!
//! // Step the PPU (call 3 times per CPU cycle for NTSC)
//! let (frame_complete, nmi, a12_edge) = ppu.step_with_chr(|addr| chr[addr as usize]);
//! if nmi {
//!     // Trigger NMI in CPU
//! }
//! if a12_edge {
//!     // mapper.tick_scanline()
//! }
//!
//! // Access registers from CPU
//! ppu.write_register(0x2000, 0x80, |_, _| {}); // Enable NMI
//! let status = ppu.read_register(0x2002, |_| 0);
//! let _ = (frame_complete, status);
//! ```

#![warn(missing_docs)]

mod background;
mod oam;
mod ppu;
mod registers;
mod scroll;
mod sprites;
mod timing;
mod vram;

pub use background::Background;
pub use oam::{Oam, SecondaryOam, Sprite};
pub use ppu::{Ppu, FRAME_HEIGHT, FRAME_SIZE, FRAME_WIDTH};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};
pub use scroll::ScrollRegisters;
pub use sprites::{SpriteEvaluator, SpriteRenderer};
pub use timing::Timing;
pub use vram::{Mirroring, Vram};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppu_register_roundtrip_enables_nmi_and_rendering() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        ppu.write_register(0x2000, 0x80, |_, _| {}); // Enable NMI
        ppu.write_register(0x2001, 0x1E, |_, _| {}); // Enable rendering
        assert_eq!(
            ppu.read_register(0x2002, |_| 0) & 0x80,
            0, // VBlank not yet set
        );
    }

    #[test]
    fn frame_completes_after_one_full_sweep_of_dots() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        let mut completed = false;
        for _ in 0..(341u32 * 262) {
            let (frame_complete, _, _) = ppu.step();
            if frame_complete {
                completed = true;
                break;
            }
        }
        assert!(
            completed,
            "a full scanline/dot sweep should complete a frame"
        );
    }

    #[test]
    fn vblank_nmi_fires_once_enabled() {
        let mut ppu = Ppu::new(Mirroring::Horizontal);
        ppu.write_register(0x2000, 0x80, |_, _| {});
        let mut nmi_triggered = false;
        for _ in 0..100_000 {
            let (_, nmi, _) = ppu.step();
            if nmi {
                nmi_triggered = true;
                break;
            }
        }
        assert!(nmi_triggered, "NMI should have been triggered");
    }
}
