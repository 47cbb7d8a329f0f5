//! The 6502 core: registers, cycle-debt clocking, interrupts, and OAM DMA.
//!
//! There is no per-sub-cycle pipeline here. Each call to [`Cpu::tick`]
//! represents one CPU cycle; the processor idles in a `cycle_debt` counter
//! between instruction boundaries and only decodes/executes when the debt
//! reaches zero, mirroring the reference interpreter's
//! `nesl_processor_cycle`.

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::opcodes::{Mnemonic, OPCODE_TABLE};
use crate::status::Status;

const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

#[derive(Debug, Default)]
struct Dma {
    active: bool,
    sync_pending: bool,
    write_phase: bool,
    source: u16,
    /// Destination index into OAM, independent of the PPU's own OAMADDR.
    dest: u8,
    latch: u8,
}

/// An instruction's resolved operand: either a bus address, the accumulator,
/// or nothing (implied instructions never touch memory for their operand).
#[derive(Debug, Clone, Copy)]
enum Operand {
    Implied,
    Accumulator,
    Address(u16),
}

/// The NES's MOS 6502 (technically a Ricoh 2A03, minus decimal mode's
/// effect, plus the OAM DMA engine this struct also owns timing for).
#[derive(Debug)]
pub struct Cpu {
    a: u8,
    x: u8,
    y: u8,
    pc: u16,
    sp: u8,
    status: Status,
    cycle_debt: u8,
    cycles: u64,
    nmi_pending: bool,
    irq_line: bool,
    dma: Dma,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Power-on state. Call [`Cpu::reset`] before the first [`Cpu::tick`] to
    /// load the program counter from the reset vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            status: Status::POWER_ON,
            cycle_debt: 0,
            cycles: 0,
            nmi_pending: false,
            irq_line: false,
            dma: Dma::default(),
        }
    }

    /// Runs the reset sequence: the stack pointer is decremented by three
    /// with no writes performed, interrupts are disabled, and the program
    /// counter is loaded from `$FFFC`. Costs 7 cycles.
    pub fn reset(&mut self, bus: &mut impl Bus) {
        self.sp = self.sp.wrapping_sub(3);
        self.status.insert(Status::I);
        self.status.insert(Status::U);
        self.pc = bus.read_u16(RESET_VECTOR);
        self.nmi_pending = false;
        self.irq_line = false;
        self.dma = Dma::default();
        self.cycle_debt = 7;
    }

    /// Latches a non-maskable interrupt. Edge-triggered: stays pending until
    /// serviced regardless of the interrupt-disable flag.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Sets the maskable interrupt line. Level-triggered: fires on every
    /// instruction boundary while asserted and the interrupt-disable flag is
    /// clear.
    pub fn set_irq_line(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    /// Starts an OAM DMA transfer from `page << 8` into PPU OAM, as if
    /// `$4014` had just been written with `page`. Takes precedence over
    /// interrupts and instructions until it drains (513 or 514 cycles,
    /// depending on the alignment half-cycle).
    pub fn request_dma(&mut self, page: u8) {
        self.dma = Dma {
            active: true,
            sync_pending: true,
            write_phase: false,
            source: u16::from(page) << 8,
            dest: 0,
            latch: 0,
        };
    }

    /// True while an OAM DMA transfer is in flight.
    #[must_use]
    pub fn dma_active(&self) -> bool {
        self.dma.active
    }

    /// Advances the processor by exactly one CPU cycle. `cycle_parity` is
    /// the caller's current CPU-cycle parity (even/odd), used only to decide
    /// the DMA alignment half-cycle's length — the processor never reads the
    /// global clock itself, and the DMA engine's own read/write alternation
    /// after sync uses an internal toggle, not this parity.
    pub fn tick(&mut self, bus: &mut impl Bus, cycle_parity: bool) {
        if self.cycle_debt == 0 {
            self.cycle_debt = self.dispatch(bus, cycle_parity);
        }
        self.cycle_debt -= 1;
        self.cycles += 1;
    }

    /// Total CPU cycles elapsed since construction (including reset).
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn a(&self) -> u8 {
        self.a
    }

    #[must_use]
    pub fn x(&self) -> u8 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> u8 {
        self.y
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    #[must_use]
    pub fn sp(&self) -> u8 {
        self.sp
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Outstanding cycles before the next dispatch. Exposed crate-wide only
    /// so test harnesses in other modules can drain it between instructions.
    #[must_use]
    pub(crate) fn cycle_debt(&self) -> u8 {
        self.cycle_debt
    }

    fn dispatch(&mut self, bus: &mut impl Bus, cycle_parity: bool) -> u8 {
        if self.dma.active {
            return self.tick_dma(bus, cycle_parity);
        }
        if self.nmi_pending {
            self.nmi_pending = false;
            return self.service_interrupt(bus, NMI_VECTOR);
        }
        if self.irq_line && !self.status.contains(Status::I) {
            return self.service_interrupt(bus, IRQ_VECTOR);
        }
        self.execute_instruction(bus)
    }

    fn tick_dma(&mut self, bus: &mut impl Bus, cycle_parity: bool) -> u8 {
        if self.dma.sync_pending {
            if cycle_parity {
                self.dma.sync_pending = false;
            }
            return 1;
        }
        if !self.dma.write_phase {
            self.dma.latch = bus.read(self.dma.source);
            self.dma.source = self.dma.source.wrapping_add(1);
        } else {
            bus.write_oam(self.dma.dest, self.dma.latch);
            self.dma.dest = self.dma.dest.wrapping_add(1);
            if self.dma.dest == 0 {
                self.dma.active = false;
            }
        }
        self.dma.write_phase = !self.dma.write_phase;
        1
    }

    fn service_interrupt(&mut self, bus: &mut impl Bus, vector: u16) -> u8 {
        self.push_u16(bus, self.pc);
        let status = self.status.to_stack_byte(false);
        self.push(bus, status);
        self.status.insert(Status::I);
        self.pc = bus.read_u16(vector);
        7
    }

    fn execute_instruction(&mut self, bus: &mut impl Bus) -> u8 {
        let opcode = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        let entry = OPCODE_TABLE[opcode as usize];

        let (operand, page_crossed) = self.resolve_operand(bus, entry.mode);
        let extra = self.execute(bus, entry.mnemonic, operand, page_crossed);

        let mut cycles = entry.cycles;
        if entry.page_cross_extra && page_crossed {
            cycles += 1;
        }
        cycles + extra
    }

    fn resolve_operand(&mut self, bus: &mut impl Bus, mode: AddrMode) -> (Operand, bool) {
        match mode {
            AddrMode::Implied => (Operand::Implied, false),
            AddrMode::Accumulator => (Operand::Accumulator, false),
            AddrMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (Operand::Address(addr), false)
            }
            AddrMode::ZeroPage => {
                let addr = u16::from(self.fetch(bus));
                (Operand::Address(addr), false)
            }
            AddrMode::ZeroPageX => {
                let base = self.fetch(bus);
                (Operand::Address(u16::from(base.wrapping_add(self.x))), false)
            }
            AddrMode::ZeroPageY => {
                let base = self.fetch(bus);
                (Operand::Address(u16::from(base.wrapping_add(self.y))), false)
            }
            AddrMode::Relative => {
                let offset = self.fetch(bus) as i8;
                let target = self.pc.wrapping_add(offset as u16);
                let page_crossed = (self.pc & 0xFF00) != (target & 0xFF00);
                (Operand::Address(target), page_crossed)
            }
            AddrMode::Absolute => {
                let addr = self.fetch_word(bus);
                (Operand::Address(addr), false)
            }
            AddrMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(u16::from(self.x));
                (Operand::Address(addr), (base & 0xFF00) != (addr & 0xFF00))
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(u16::from(self.y));
                (Operand::Address(addr), (base & 0xFF00) != (addr & 0xFF00))
            }
            AddrMode::Indirect => {
                let ptr = self.fetch_word(bus);
                let addr = read_word_with_page_wrap(bus, ptr);
                (Operand::Address(addr), false)
            }
            AddrMode::IndirectX => {
                let base = self.fetch(bus).wrapping_add(self.x);
                let lo = bus.read(u16::from(base));
                let hi = bus.read(u16::from(base.wrapping_add(1)));
                (Operand::Address(u16::from_le_bytes([lo, hi])), false)
            }
            AddrMode::IndirectY => {
                let zp = self.fetch(bus);
                let lo = bus.read(u16::from(zp));
                let hi = bus.read(u16::from(zp.wrapping_add(1)));
                let base = u16::from_le_bytes([lo, hi]);
                let addr = base.wrapping_add(u16::from(self.y));
                (Operand::Address(addr), (base & 0xFF00) != (addr & 0xFF00))
            }
        }
    }

    fn fetch(&mut self, bus: &mut impl Bus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_word(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from_le_bytes([lo, hi])
    }

    #[allow(clippy::too_many_lines)]
    fn execute(
        &mut self,
        bus: &mut impl Bus,
        mnemonic: Mnemonic,
        operand: Operand,
        page_crossed: bool,
    ) -> u8 {
        if let Some(condition) = self.branch_condition(mnemonic) {
            return self.branch(operand, condition, page_crossed);
        }

        match mnemonic {
            Mnemonic::Lda => {
                self.a = self.read_operand(bus, operand);
                self.status.set_zn(self.a);
            }
            Mnemonic::Ldx => {
                self.x = self.read_operand(bus, operand);
                self.status.set_zn(self.x);
            }
            Mnemonic::Ldy => {
                self.y = self.read_operand(bus, operand);
                self.status.set_zn(self.y);
            }
            Mnemonic::Sta => self.write_operand(bus, operand, self.a),
            Mnemonic::Stx => self.write_operand(bus, operand, self.x),
            Mnemonic::Sty => self.write_operand(bus, operand, self.y),
            Mnemonic::Adc => {
                let value = self.read_operand(bus, operand);
                self.adc(value);
            }
            Mnemonic::Sbc => {
                let value = self.read_operand(bus, operand);
                self.adc(!value);
            }
            Mnemonic::And => {
                self.a &= self.read_operand(bus, operand);
                self.status.set_zn(self.a);
            }
            Mnemonic::Ora => {
                self.a |= self.read_operand(bus, operand);
                self.status.set_zn(self.a);
            }
            Mnemonic::Eor => {
                self.a ^= self.read_operand(bus, operand);
                self.status.set_zn(self.a);
            }
            Mnemonic::Cmp => {
                let value = self.read_operand(bus, operand);
                self.compare(self.a, value);
            }
            Mnemonic::Cpx => {
                let value = self.read_operand(bus, operand);
                self.compare(self.x, value);
            }
            Mnemonic::Cpy => {
                let value = self.read_operand(bus, operand);
                self.compare(self.y, value);
            }
            Mnemonic::Bit => {
                let value = self.read_operand(bus, operand);
                self.status.set_flag(Status::Z, self.a & value == 0);
                self.status.set_flag(Status::V, value & 0x40 != 0);
                self.status.set_flag(Status::N, value & 0x80 != 0);
            }
            Mnemonic::Asl => self.rmw(bus, operand, |status, v| {
                let carry = v & 0x80 != 0;
                let result = v << 1;
                status.set_flag(Status::C, carry);
                status.set_zn(result);
                result
            }),
            Mnemonic::Lsr => self.rmw(bus, operand, |status, v| {
                let carry = v & 0x01 != 0;
                let result = v >> 1;
                status.set_flag(Status::C, carry);
                status.set_zn(result);
                result
            }),
            Mnemonic::Rol => self.rmw(bus, operand, |status, v| {
                let carry_in = u8::from(status.contains(Status::C));
                let carry_out = v & 0x80 != 0;
                let result = (v << 1) | carry_in;
                status.set_flag(Status::C, carry_out);
                status.set_zn(result);
                result
            }),
            Mnemonic::Ror => self.rmw(bus, operand, |status, v| {
                let carry_in = u8::from(status.contains(Status::C));
                let carry_out = v & 0x01 != 0;
                let result = (v >> 1) | (carry_in << 7);
                status.set_flag(Status::C, carry_out);
                status.set_zn(result);
                result
            }),
            Mnemonic::Inc => self.rmw(bus, operand, |status, v| {
                let result = v.wrapping_add(1);
                status.set_zn(result);
                result
            }),
            Mnemonic::Dec => self.rmw(bus, operand, |status, v| {
                let result = v.wrapping_sub(1);
                status.set_zn(result);
                result
            }),
            Mnemonic::Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zn(self.x);
            }
            Mnemonic::Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zn(self.y);
            }
            Mnemonic::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zn(self.x);
            }
            Mnemonic::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zn(self.y);
            }
            Mnemonic::Tax => {
                self.x = self.a;
                self.status.set_zn(self.x);
            }
            Mnemonic::Tay => {
                self.y = self.a;
                self.status.set_zn(self.y);
            }
            Mnemonic::Txa => {
                self.a = self.x;
                self.status.set_zn(self.a);
            }
            Mnemonic::Tya => {
                self.a = self.y;
                self.status.set_zn(self.a);
            }
            Mnemonic::Tsx => {
                self.x = self.sp;
                self.status.set_zn(self.x);
            }
            Mnemonic::Txs => self.sp = self.x,
            Mnemonic::Clc => self.status.remove(Status::C),
            Mnemonic::Sec => self.status.insert(Status::C),
            Mnemonic::Cli => self.status.remove(Status::I),
            Mnemonic::Sei => self.status.insert(Status::I),
            Mnemonic::Clv => self.status.remove(Status::V),
            Mnemonic::Cld => self.status.remove(Status::D),
            Mnemonic::Sed => self.status.insert(Status::D),
            Mnemonic::Jmp => {
                if let Operand::Address(target) = operand {
                    self.pc = target;
                }
            }
            Mnemonic::Jsr => {
                let return_addr = self.pc.wrapping_sub(1);
                self.push_u16(bus, return_addr);
                if let Operand::Address(target) = operand {
                    self.pc = target;
                }
            }
            Mnemonic::Rts => {
                let addr = self.pop_u16(bus);
                self.pc = addr.wrapping_add(1);
            }
            Mnemonic::Brk => {
                self.pc = self.pc.wrapping_add(1);
                self.push_u16(bus, self.pc);
                let status = self.status.to_stack_byte(true);
                self.push(bus, status);
                self.status.insert(Status::I);
                self.pc = bus.read_u16(IRQ_VECTOR);
            }
            Mnemonic::Rti => {
                let status = self.pop(bus);
                self.status = Status::from_stack_byte(status);
                self.pc = self.pop_u16(bus);
            }
            Mnemonic::Pha => self.push(bus, self.a),
            Mnemonic::Php => {
                let value = self.status.to_stack_byte(true);
                self.push(bus, value);
            }
            Mnemonic::Pla => {
                self.a = self.pop(bus);
                self.status.set_zn(self.a);
            }
            Mnemonic::Plp => {
                let value = self.pop(bus);
                self.status = Status::from_stack_byte(value);
            }
            Mnemonic::Nop => {
                if matches!(operand, Operand::Address(_)) {
                    let _ = self.read_operand(bus, operand);
                }
            }
            Mnemonic::Bcc
            | Mnemonic::Bcs
            | Mnemonic::Beq
            | Mnemonic::Bmi
            | Mnemonic::Bne
            | Mnemonic::Bpl
            | Mnemonic::Bvc
            | Mnemonic::Bvs => unreachable!("handled by branch_condition above"),
        }
        0
    }

    fn branch_condition(&self, mnemonic: Mnemonic) -> Option<bool> {
        Some(match mnemonic {
            Mnemonic::Bcc => !self.status.contains(Status::C),
            Mnemonic::Bcs => self.status.contains(Status::C),
            Mnemonic::Beq => self.status.contains(Status::Z),
            Mnemonic::Bne => !self.status.contains(Status::Z),
            Mnemonic::Bmi => self.status.contains(Status::N),
            Mnemonic::Bpl => !self.status.contains(Status::N),
            Mnemonic::Bvs => self.status.contains(Status::V),
            Mnemonic::Bvc => !self.status.contains(Status::V),
            _ => return None,
        })
    }

    fn branch(&mut self, operand: Operand, taken: bool, page_crossed: bool) -> u8 {
        if !taken {
            return 0;
        }
        if let Operand::Address(target) = operand {
            self.pc = target;
        }
        if page_crossed {
            2
        } else {
            1
        }
    }

    fn read_operand(&self, bus: &mut impl Bus, operand: Operand) -> u8 {
        match operand {
            Operand::Accumulator => self.a,
            Operand::Address(addr) => bus.read(addr),
            Operand::Implied => 0,
        }
    }

    fn write_operand(&mut self, bus: &mut impl Bus, operand: Operand, value: u8) {
        match operand {
            Operand::Accumulator => self.a = value,
            Operand::Address(addr) => bus.write(addr, value),
            Operand::Implied => {}
        }
    }

    /// Performs a read-modify-write: reads the operand, writes the
    /// unmodified value back (the real 6502 always does this dummy
    /// write-back before the final write), then writes the transformed
    /// result.
    fn rmw(&mut self, bus: &mut impl Bus, operand: Operand, f: impl FnOnce(&mut Status, u8) -> u8) {
        let value = self.read_operand(bus, operand);
        if let Operand::Address(addr) = operand {
            bus.write(addr, value);
        }
        let result = f(&mut self.status, value);
        self.write_operand(bus, operand, result);
    }

    fn adc(&mut self, value: u8) {
        let carry_in = u16::from(self.status.contains(Status::C));
        let sum = u16::from(self.a) + u16::from(value) + carry_in;
        let result = sum as u8;
        self.status.set_flag(Status::C, sum > 0xFF);
        self.status.set_flag(
            Status::V,
            (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0,
        );
        self.a = result;
        self.status.set_zn(self.a);
    }

    fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.status.set_flag(Status::C, register >= value);
        self.status.set_zn(result);
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) {
        bus.write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut impl Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | u16::from(self.sp))
    }

    fn push_u16(&mut self, bus: &mut impl Bus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, (value & 0xFF) as u8);
    }

    fn pop_u16(&mut self, bus: &mut impl Bus) -> u16 {
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        u16::from_le_bytes([lo, hi])
    }
}

/// Reads a little-endian word from `ptr`/`ptr+1`, reproducing the original
/// JMP-indirect page-wrap bug: when `ptr`'s low byte is `$FF`, the high byte
/// is read from the start of the same page rather than the next one.
fn read_word_with_page_wrap(bus: &mut impl Bus, ptr: u16) -> u16 {
    let lo = bus.read(ptr);
    let hi_addr = (ptr & 0xFF00) | u16::from((ptr as u8).wrapping_add(1));
    let hi = bus.read(hi_addr);
    u16::from_le_bytes([lo, hi])
}
