//! NES System Bus Implementation.
//!
//! The bus connects the CPU to all other components:
//! - PPU registers ($2000-$2007, mirrored every 8 bytes to $3FFF)
//! - APU/IO registers ($4000-$4017)
//! - Cartridge space ($4020-$FFFF)
//! - Internal RAM ($0000-$07FF, mirrored to $1FFF)

use rustynes_apu::Apu;
use rustynes_cpu::Bus;
use rustynes_mappers::{BankKind, Mapper};
use rustynes_ppu::Ppu;

use crate::input::Controller;

/// Converts a mapper's reported mirroring mode into the video crate's own
/// `Mirroring` type, which additionally distinguishes four-screen layouts
/// (mappers never report four-screen themselves; that comes from the
/// cartridge header and is folded in by the caller of [`NesBus::new`]).
fn to_ppu_mirroring(mirroring: rustynes_mappers::Mirroring) -> rustynes_ppu::Mirroring {
    match mirroring {
        rustynes_mappers::Mirroring::Horizontal => rustynes_ppu::Mirroring::Horizontal,
        rustynes_mappers::Mirroring::Vertical => rustynes_ppu::Mirroring::Vertical,
        rustynes_mappers::Mirroring::SingleScreenLower => rustynes_ppu::Mirroring::SingleScreenLower,
        rustynes_mappers::Mirroring::SingleScreenUpper => rustynes_ppu::Mirroring::SingleScreenUpper,
    }
}

/// NES system bus connecting all components.
pub struct NesBus {
    /// Internal RAM (2KB, mirrored 4 times).
    pub ram: [u8; 2048],
    /// PPU (Picture Processing Unit).
    pub ppu: Ppu,
    /// APU (Audio Processing Unit).
    pub apu: Apu,
    /// Cartridge mapper.
    pub mapper: Mapper,
    /// Controller 1.
    pub controller1: Controller,
    /// Controller 2.
    pub controller2: Controller,
    /// OAM DMA page requested by a `$4014` write this cycle, drained by
    /// whatever owns both the `Cpu` and this bus.
    oam_dma_request: Option<u8>,
    /// Set on a PPU NMI edge, cleared when [`NesBus::take_nmi`] is called.
    nmi_latched: bool,
    /// Last value on the data bus (for open bus behavior).
    last_bus_value: u8,
}

impl NesBus {
    /// Create a new NES bus with the given mapper.
    pub fn new(mapper: Mapper) -> Self {
        let mirroring = to_ppu_mirroring(mapper.mirroring());
        Self {
            ram: [0; 2048],
            ppu: Ppu::new(mirroring),
            apu: Apu::new(),
            mapper,
            controller1: Controller::new(),
            controller2: Controller::new(),
            oam_dma_request: None,
            nmi_latched: false,
            last_bus_value: 0,
        }
    }

    /// Reset the bus and all components.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.ppu.reset();
        self.ppu.set_mirroring(to_ppu_mirroring(self.mapper.mirroring()));
        self.apu.reset();
        self.mapper.reset();
        self.controller1.reset();
        self.controller2.reset();
        self.oam_dma_request = None;
        self.nmi_latched = false;
        self.last_bus_value = 0;
    }

    /// Takes the pending OAM DMA page request, if `$4014` was written since
    /// the last call.
    pub fn take_oam_dma_request(&mut self) -> Option<u8> {
        self.oam_dma_request.take()
    }

    /// Steps the PPU by three dots (one CPU cycle worth), ticking the
    /// mapper's scanline IRQ counter on CHR address line A12 rising edges.
    ///
    /// Returns `true` if the frame completed this CPU cycle.
    pub fn step_ppu(&mut self) -> bool {
        let mut frame_complete = false;
        for _ in 0..3 {
            let mapper = &self.mapper;
            let (done, nmi, a12_edge) = self.ppu.step_with_chr(|addr| mapper.read(BankKind::Character, addr));
            if nmi {
                // Edge-triggered; the caller latches this into the CPU.
                self.nmi_latched = true;
            }
            if a12_edge {
                self.mapper.tick_scanline();
            }
            frame_complete |= done;
        }
        frame_complete
    }

    /// Steps the APU by one CPU cycle, servicing the DMC sample-fetch
    /// handshake against the mapper's program ROM when needed.
    ///
    /// Returns `true` if this cycle started a 4-cycle DMC DMA stall.
    pub fn step_apu(&mut self) -> bool {
        self.apu.clock();

        if self.apu.dmc_needs_sample() {
            let addr = self.apu.dmc_sample_addr();
            let sample = self.mapper.read(BankKind::ProgramRom, addr);
            self.apu.dmc_fill_sample(sample);
            return true;
        }
        false
    }

    /// `true` once an NMI has been latched by [`NesBus::step_ppu`] and not
    /// yet consumed by [`NesBus::take_nmi`].
    #[must_use]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_latched
    }

    /// Consumes the latched NMI flag.
    pub fn take_nmi(&mut self) -> bool {
        core::mem::replace(&mut self.nmi_latched, false)
    }

    /// Level-triggered IRQ line: asserted while the mapper or APU frame
    /// counter has an unacknowledged interrupt pending.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending() || self.apu.irq_pending()
    }

    /// Peek at memory without side effects.
    ///
    /// This is useful for debugging/display purposes where we don't want
    /// to trigger PPU register side effects or mapper state changes.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            // Internal RAM (mirrored every 2KB)
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],

            // PPU registers - return last bus value to avoid side effects
            0x2000..=0x3FFF => self.last_bus_value,

            // APU and I/O registers
            0x4000..=0x4017 => match addr {
                0x4015 => self.apu.peek_status(),
                _ => self.last_bus_value,
            },

            // APU test mode
            0x4018..=0x401F => self.last_bus_value,

            // Cartridge space
            0x6000..=0x7FFF => self.mapper.read(BankKind::ProgramRam, addr),
            0x8000..=0xFFFF => self.mapper.read(BankKind::ProgramRom, addr),
            _ => self.last_bus_value,
        }
    }
}

/// CPU bus implementation.
impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            // Internal RAM (mirrored every 2KB)
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],

            // PPU registers (mirrored every 8 bytes)
            0x2000..=0x3FFF => {
                let mapper = &self.mapper;
                self.ppu.read_register(addr, |chr_addr| mapper.read(BankKind::Character, chr_addr))
            }

            // APU and I/O registers
            0x4000..=0x4017 => match addr {
                0x4015 => self.apu.read_status(),
                0x4016 => self.controller1.read(),
                0x4017 => self.controller2.read(),
                _ => self.last_bus_value, // Write-only registers
            },

            // APU test mode (normally disabled)
            0x4018..=0x401F => self.last_bus_value,

            // Cartridge space
            0x4020..=0x5FFF => self.last_bus_value,
            0x6000..=0x7FFF => self.mapper.read(BankKind::ProgramRam, addr),
            0x8000..=0xFFFF => self.mapper.read(BankKind::ProgramRom, addr),
        };

        self.last_bus_value = value;
        value
    }

    fn write_oam(&mut self, idx: u8, value: u8) {
        self.ppu.write_oam(idx, value);
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.last_bus_value = val;

        match addr {
            // Internal RAM (mirrored every 2KB)
            0x0000..=0x1FFF => {
                self.ram[(addr & 0x07FF) as usize] = val;
            }

            // PPU registers (mirrored every 8 bytes)
            0x2000..=0x3FFF => {
                let mapper = &mut self.mapper;
                self.ppu.write_register(addr, val, |chr_addr, chr_val| {
                    mapper.write(BankKind::Character, chr_addr, chr_val);
                });
            }

            // APU and I/O registers
            0x4000..=0x4017 => match addr {
                0x4000..=0x4013 | 0x4015 | 0x4017 => {
                    self.apu.write(addr, val);
                }
                0x4014 => {
                    self.oam_dma_request = Some(val);
                }
                0x4016 => {
                    self.controller1.write_strobe(val);
                    self.controller2.write_strobe(val);
                }
                _ => {}
            },

            // APU test mode (normally disabled)
            0x4018..=0x401F => {}

            // Cartridge space
            0x4020..=0x5FFF => {}
            0x6000..=0x7FFF => self.mapper.write(BankKind::ProgramRam, addr, val),
            0x8000..=0xFFFF => {
                self.mapper.write(BankKind::ProgramRom, addr, val);
                self.ppu.set_mirroring(to_ppu_mirroring(self.mapper.mirroring()));
            }
        }
    }
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
        data.extend(std::iter::repeat(0xABu8).take(prg_banks as usize * 16384));
        data.extend(std::iter::repeat(0xCDu8).take(chr_banks as usize * 8192));
        data
    }

    fn create_test_bus() -> NesBus {
        let cart = Cartridge::new(&rom_bytes(2, 1, 0)).unwrap();
        NesBus::new(Mapper::new(cart).unwrap())
    }

    #[test]
    fn test_ram_mirroring() {
        let mut bus = create_test_bus();

        Bus::write(&mut bus, 0x0000, 0x42);
        assert_eq!(Bus::read(&mut bus, 0x0000), 0x42);

        // Should mirror to $0800, $1000, $1800
        assert_eq!(Bus::read(&mut bus, 0x0800), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1000), 0x42);
        assert_eq!(Bus::read(&mut bus, 0x1800), 0x42);

        Bus::write(&mut bus, 0x1234, 0xAB);
        assert_eq!(Bus::read(&mut bus, 0x0234), 0xAB); // $1234 & $07FF = $0234
    }

    #[test]
    fn test_controller_strobe() {
        let mut bus = create_test_bus();

        bus.controller1.set_buttons(0b1010_0101); // A, Select, Up, Right

        Bus::write(&mut bus, 0x4016, 1);
        Bus::write(&mut bus, 0x4016, 0);

        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 1); // A
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 0); // B
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 1); // Select
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 0); // Start
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 0); // Up
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 1); // Down
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 0); // Left
        assert_eq!(Bus::read(&mut bus, 0x4016) & 1, 1); // Right
    }

    #[test]
    fn test_oam_dma_request_latched_on_4014_write() {
        let mut bus = create_test_bus();

        Bus::write(&mut bus, 0x4014, 0x02);
        assert_eq!(bus.take_oam_dma_request(), Some(0x02));
        assert_eq!(bus.take_oam_dma_request(), None);
    }

    #[test]
    fn test_open_bus_behavior() {
        let mut bus = create_test_bus();

        Bus::write(&mut bus, 0x0000, 0xAB);
        let _ = Bus::read(&mut bus, 0x0000);

        assert_eq!(bus.last_bus_value, 0xAB);
    }

    #[test]
    fn test_peek_memory() {
        let mut bus = create_test_bus();

        Bus::write(&mut bus, 0x0100, 0x42);

        assert_eq!(bus.peek(0x0100), 0x42);
        assert_eq!(bus.peek(0x0900), 0x42); // mirrored address
    }

    #[test]
    fn test_reset() {
        let mut bus = create_test_bus();
        Bus::write(&mut bus, 0x0000, 0x42);

        bus.reset();

        assert_eq!(Bus::read(&mut bus, 0x0000), 0);
        assert!(!bus.nmi_pending());
    }

    #[test]
    fn test_write_oam_ignores_oamaddr() {
        let mut bus = create_test_bus();

        // Leave OAMADDR ($2003) pointed away from 0, as a game might between
        // frames; OAM DMA's destination index must not be affected by it.
        Bus::write(&mut bus, 0x2003, 0x10);

        for i in 0..256u16 {
            bus.write_oam(i as u8, i as u8);
        }

        Bus::write(&mut bus, 0x2003, 0x00);
        assert_eq!(Bus::read(&mut bus, 0x2004), 0x00);
        Bus::write(&mut bus, 0x2003, 0x01);
        assert_eq!(Bus::read(&mut bus, 0x2004), 0x01);
    }

    #[test]
    fn test_nmi_latch_roundtrip() {
        let mut bus = create_test_bus();
        assert!(!bus.nmi_pending());
        bus.nmi_latched = true;
        assert!(bus.take_nmi());
        assert!(!bus.nmi_pending());
    }
}
