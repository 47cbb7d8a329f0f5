//! NES controller input handling.
//!
//! This module emulates the NES standard controller protocol, which uses a
//! **strobe-based parallel-to-serial shift register** (4021 IC) to read
//! 8 button states sequentially.
//!
//! # Hardware Protocol
//!
//! The NES controller protocol works as follows:
//!
//! 1. **Strobe** ($4016 write, bit 0):
//!    - Write 1: Continuously reload shift register (parallel mode)
//!    - Write 0: Enable serial reads (shift mode)
//!    - Falling edge (1 → 0) latches current button states
//!
//! 2. **Serial Read** ($4016/$4017 read):
//!    - Returns one button bit per read
//!    - Order: A, B, Select, Start, Up, Down, Left, Right
//!    - Reads 9+ always return 1
//!
//! # Registers
//!
//! - **$4016**: Controller 1 data (read) / Strobe (write)
//! - **$4017**: Controller 2 data (read) / APU Frame Counter (write)
//!
//! **Note**: $4016 writes strobe BOTH controllers simultaneously.
//!
//! # Usage Example
//!
//! ```no_run
//! use rustynes_core::{Console, ControllerState};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rom = std::fs::read("game.nes")?;
//! let mut console = Console::from_rom_bytes(&rom)?;
//!
//! // Press A and Start on controller 1.
//! console.set_controller1(ControllerState::A | ControllerState::START);
//!
//! for _ in 0..60 {
//!     console.step_frame();
//! }
//!
//! console.set_controller1(ControllerState::empty());
//! # Ok(())
//! # }
//! ```

mod controller;

pub use controller::{Button, Controller};

bitflags::bitflags! {
    /// Snapshot byte for a controller's eight buttons, in shift-register
    /// order (bit 0 = A ... bit 7 = Right). This is the ergonomic public
    /// type `Console::set_controller1`/`set_controller2` accept; internally
    /// it is handed straight to [`Controller::set_buttons`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControllerState: u8 {
        /// A button.
        const A = 0b0000_0001;
        /// B button.
        const B = 0b0000_0010;
        /// Select button.
        const SELECT = 0b0000_0100;
        /// Start button.
        const START = 0b0000_1000;
        /// D-pad up.
        const UP = 0b0001_0000;
        /// D-pad down.
        const DOWN = 0b0010_0000;
        /// D-pad left.
        const LEFT = 0b0100_0000;
        /// D-pad right.
        const RIGHT = 0b1000_0000;
    }
}
