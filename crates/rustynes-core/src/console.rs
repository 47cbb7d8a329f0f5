//! NES Console Implementation.
//!
//! The Console struct provides the high-level emulation API, managing the
//! CPU, PPU, APU, and mapper integration with proper timing, plus the
//! library's entry point, [`run`].

use std::sync::Arc;

use rustynes_apu::RingBuffer;
use rustynes_cpu::Cpu;
use rustynes_mappers::{Cartridge, Mapper};

use crate::bus::NesBus;
use crate::error::{NesError, set_error};
use crate::host::{Host, HostEvent};
use crate::input::{Button, ControllerState};

/// NES emulation timing constants.
pub mod timing {
    /// Master clock frequency (NTSC).
    pub const MASTER_CLOCK_NTSC: u32 = 21_477_272;
    /// CPU clock frequency (NTSC).
    pub const CPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 12;
    /// PPU clock frequency (NTSC).
    pub const PPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 4;
    /// CPU cycles per frame (NTSC).
    pub const CPU_CYCLES_PER_FRAME: u32 = 29_780;
    /// PPU dots per scanline.
    pub const PPU_DOTS_PER_SCANLINE: u16 = 341;
    /// Total scanlines (including vblank).
    pub const PPU_SCANLINES: u16 = 262;
    /// Target frame rate (NTSC).
    pub const FRAME_RATE_NTSC: f64 = 60.0988;
}

/// NES console emulator: owns the CPU and the bus, and drives them one CPU
/// cycle at a time.
pub struct Console {
    /// 6502 CPU.
    cpu: Cpu,
    /// System bus (PPU, APU, mapper, RAM).
    bus: NesBus,
    /// Frame buffer (256x240 RGBA).
    framebuffer: Vec<u8>,
    /// Total CPU cycles executed.
    total_cycles: u64,
    /// Frame counter.
    frame_count: u64,
    /// Remaining DMC DMA stall cycles (each one skips a `cpu.tick`).
    dmc_stall_cycles: u8,
    /// Is emulation running?
    running: bool,
}

impl Console {
    /// Create a new console with the given ROM bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM cannot be parsed or uses an unsupported
    /// mapper.
    pub fn new(rom_data: &[u8]) -> Result<Self, NesError> {
        let cartridge = Cartridge::new(rom_data)?;
        let mapper = Mapper::new(cartridge)?;
        Ok(Self::with_mapper(mapper))
    }

    /// Create a new console from ROM bytes (alias for [`Console::new`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM cannot be parsed or uses an unsupported
    /// mapper.
    pub fn from_rom_bytes(rom_data: &[u8]) -> Result<Self, NesError> {
        Self::new(rom_data)
    }

    /// Create a console with a pre-built mapper.
    #[must_use]
    pub fn with_mapper(mapper: Mapper) -> Self {
        let bus = NesBus::new(mapper);
        let mut cpu = Cpu::new();
        let mut bus = bus;
        cpu.reset(&mut bus);

        Self {
            cpu,
            bus,
            framebuffer: vec![0; crate::screen::FRAMEBUFFER_SIZE],
            total_cycles: 0,
            frame_count: 0,
            dmc_stall_cycles: 0,
            running: true,
        }
    }

    /// Reset the console to initial state.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.total_cycles = 0;
        self.dmc_stall_cycles = 0;
        self.running = true;
    }

    /// Power on the console (cold boot).
    pub fn power_on(&mut self) {
        self.reset();
    }

    /// Advance the console by exactly one CPU cycle.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }

        if self.dmc_stall_cycles > 0 {
            self.dmc_stall_cycles -= 1;
        } else {
            let parity = self.total_cycles % 2 == 1;
            self.cpu.tick(&mut self.bus, parity);

            if let Some(page) = self.bus.take_oam_dma_request() {
                self.cpu.request_dma(page);
            }
            if self.bus.take_nmi() {
                self.cpu.trigger_nmi();
            }
            self.cpu.set_irq_line(self.bus.irq_pending());
        }

        let frame_complete = self.bus.step_ppu();
        if self.bus.step_apu() {
            self.dmc_stall_cycles = 4;
        }

        self.total_cycles += 1;
        if frame_complete {
            self.update_framebuffer();
            self.frame_count += 1;
        }
    }

    /// Run emulation for one frame (approximately 29,780 CPU cycles).
    ///
    /// Returns the actual number of CPU cycles executed.
    pub fn step_frame(&mut self) -> u64 {
        let start_frame = self.frame_count;
        let start_cycles = self.total_cycles;

        while self.frame_count == start_frame && self.running {
            self.step();
        }

        self.total_cycles - start_cycles
    }

    /// Update the framebuffer from PPU output.
    fn update_framebuffer(&mut self) {
        let ppu_buffer = self.bus.ppu.frame_buffer();

        for (i, &palette_idx) in ppu_buffer.iter().enumerate() {
            let rgb = crate::palette::palette_to_rgb(palette_idx & 0x3F);
            let offset = i * 4;
            self.framebuffer[offset] = rgb.0;
            self.framebuffer[offset + 1] = rgb.1;
            self.framebuffer[offset + 2] = rgb.2;
            self.framebuffer[offset + 3] = 255;
        }
    }

    /// Get the current framebuffer (256x240 RGBA).
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    /// Handle to the ring buffer the APU pushes mixed samples into. Clone
    /// it and hand it to an audio callback; it drains independently of the
    /// emulation thread.
    #[must_use]
    pub fn audio_output(&self) -> Arc<RingBuffer> {
        self.bus.apu.output_buffer()
    }

    /// Set controller 1 state from a button snapshot.
    pub fn set_controller1(&mut self, state: ControllerState) {
        self.bus.controller1.set_buttons(state.bits());
    }

    /// Set controller 2 state from a button snapshot.
    pub fn set_controller2(&mut self, state: ControllerState) {
        self.bus.controller2.set_buttons(state.bits());
    }

    /// Get controller 1 state.
    #[must_use]
    pub fn controller1(&self) -> ControllerState {
        ControllerState::from_bits_truncate(self.bus.controller1.buttons())
    }

    /// Get controller 2 state.
    #[must_use]
    pub fn controller2(&self) -> ControllerState {
        ControllerState::from_bits_truncate(self.bus.controller2.buttons())
    }

    /// Get the total CPU cycles executed.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Get the frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Check if emulation is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pause emulation.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Resume emulation.
    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Get a reference to the CPU for debugging.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Get a reference to the PPU for debugging.
    #[must_use]
    pub fn ppu(&self) -> &rustynes_ppu::Ppu {
        &self.bus.ppu
    }

    /// Get a reference to the APU for debugging.
    #[must_use]
    pub fn apu(&self) -> &rustynes_apu::Apu {
        &self.bus.apu
    }

    /// Peek at memory without side effects.
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Get a reference to the bus for debugging.
    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    /// Get a mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }

    /// Get the mapper number.
    #[must_use]
    pub fn mapper_number(&self) -> u16 {
        self.bus.mapper.mapper_number()
    }
}

/// Presentation hints and ROM source passed to [`run`].
///
/// Mirrors the original engine's context struct: ROM bytes, an optional
/// window title, and presentation hints. There is no configuration file
/// format — CLI argument parsing belongs to the host binary.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    /// Raw iNES/NES 2.0 ROM image bytes.
    pub rom: &'a [u8],
    /// Window title; `None` lets the host pick a default.
    pub title: Option<String>,
    /// Use linear (rather than nearest-neighbor) scaling.
    pub linear: bool,
    /// Integer window scale factor, 1-8.
    pub scale: u8,
}

/// Outcome of [`run`]. On `Failure`, [`crate::error::get_error`] holds the
/// diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The host requested a normal exit.
    Success,
    /// The host's `poll` reported the user quit.
    Quit,
    /// A configuration or host error aborted the run.
    Failure,
}

/// Loads `context.rom`, then drives the console through `host` until the
/// host's `poll` returns [`HostEvent::Quit`] or a host call fails.
///
/// This is the library's sole entry point for a full frontend; it owns the
/// frame loop so a host only has to implement [`Host`].
pub fn run(context: &RunContext<'_>, host: &mut impl Host) -> RunOutcome {
    let mut console = match Console::new(context.rom) {
        Ok(console) => console,
        Err(err) => {
            set_error(&err);
            return RunOutcome::Failure;
        }
    };
    console.power_on();
    host.set_audio_source(console.audio_output());

    loop {
        match host.poll() {
            HostEvent::Quit => return RunOutcome::Quit,
            HostEvent::ResetRequest => console.reset(),
            HostEvent::Continue => {}
        }

        console.set_controller1(host_buttons(host, 0));
        console.set_controller2(host_buttons(host, 1));
        console.step_frame();

        let emphasis = console.ppu().mask_emphasis();
        let frame = console.ppu().frame_buffer();
        for y in 0..rustynes_ppu::FRAME_HEIGHT {
            for x in 0..rustynes_ppu::FRAME_WIDTH {
                let color = frame[y * rustynes_ppu::FRAME_WIDTH + x] & 0x3F;
                #[allow(clippy::cast_possible_truncation)]
                host.present_pixel(color, emphasis.0, emphasis.1, emphasis.2, x as u8, y as u8);
            }
        }

        if let Err(message) = host.present_frame() {
            set_error(&NesError::Host(message));
            return RunOutcome::Failure;
        }
    }
}

fn host_buttons(host: &impl Host, controller: u8) -> ControllerState {
    const BUTTONS: [(Button, ControllerState); 8] = [
        (Button::A, ControllerState::A),
        (Button::B, ControllerState::B),
        (Button::Select, ControllerState::SELECT),
        (Button::Start, ControllerState::START),
        (Button::Up, ControllerState::UP),
        (Button::Down, ControllerState::DOWN),
        (Button::Left, ControllerState::LEFT),
        (Button::Right, ControllerState::RIGHT),
    ];
    let mut state = ControllerState::empty();
    for (button, flag) in BUTTONS {
        if host.button(controller, button) {
            state |= flag;
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustynes_mappers::Cartridge;

    fn rom_bytes(prg_banks: u8, chr_banks: u8, mapper: u8) -> Vec<u8> {
        let mut data = vec![0x4Eu8, 0x45, 0x53, 0x1A, prg_banks, chr_banks];
        data.push((mapper & 0x0F) << 4);
        data.push(mapper & 0xF0);
        data.extend_from_slice(&[0; 8]);
        let mut prg = vec![0xEAu8; prg_banks as usize * 16384]; // NOPs
        // Reset vector points at $8000.
        let vector_offset = prg.len() - 4;
        prg[vector_offset] = 0x00;
        prg[vector_offset + 1] = 0x80;
        data.extend_from_slice(&prg);
        data.extend(std::iter::repeat(0xCDu8).take(chr_banks as usize * 8192));
        data
    }

    fn create_test_console() -> Console {
        let cart = Cartridge::new(&rom_bytes(2, 1, 0)).unwrap();
        Console::with_mapper(Mapper::new(cart).unwrap())
    }

    #[test]
    fn test_console_creation() {
        let console = create_test_console();
        assert_eq!(console.mapper_number(), 0);
    }

    #[test]
    fn test_console_step() {
        let mut console = create_test_console();
        console.reset();

        console.step();
        assert!(console.total_cycles() > 0);
    }

    #[test]
    fn test_console_framebuffer() {
        let console = create_test_console();
        let fb = console.framebuffer();
        assert_eq!(fb.len(), 256 * 240 * 4);
    }

    #[test]
    fn test_console_pause_resume() {
        let mut console = create_test_console();
        assert!(console.is_running());

        console.pause();
        assert!(!console.is_running());

        console.resume();
        assert!(console.is_running());
    }

    #[test]
    fn test_controller_state() {
        let mut console = create_test_console();

        console.set_controller1(ControllerState::A | ControllerState::START);

        assert_eq!(console.controller1().bits(), 0x09);
    }

    #[test]
    fn test_console_reset() {
        let mut console = create_test_console();

        for _ in 0..100 {
            console.step();
        }

        let cycles_before = console.total_cycles();
        assert!(cycles_before > 0);

        console.reset();
        assert_eq!(console.total_cycles(), 0);
    }

    #[test]
    fn test_step_frame_advances_frame_count() {
        let mut console = create_test_console();
        console.reset();

        console.step_frame();
        assert_eq!(console.frame_count(), 1);
    }

    #[test]
    fn test_unsupported_mapper_rejected_by_new() {
        let rom = rom_bytes(2, 1, 99);
        assert!(matches!(Console::new(&rom), Err(NesError::Mapper(_))));
    }
}
