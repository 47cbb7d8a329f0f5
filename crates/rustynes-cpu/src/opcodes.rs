//! The 256-entry opcode table.
//!
//! Every opcode byte is defined. Opcodes with no documented 6502 behavior
//! decode to [`Mnemonic::Nop`] with the addressing mode and cycle cost the
//! real chip spends on them — the processor still performs the mode's reads
//! (and their page-crossing penalty, where the original instruction was
//! read-class) even though no register or flag changes.

use crate::addressing::AddrMode;

/// Instruction mnemonic. Unofficial opcodes that have real effects on real
/// silicon (SLO, RLA, LAX, ...) are folded into [`Mnemonic::Nop`] along with
/// the opcodes that were always no-ops — see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny,
    Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror,
    Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

/// One decoded opcode: its operation, addressing mode, base cycle cost, and
/// whether an indexed read-class access adds a cycle when it crosses a page.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    /// The operation to perform.
    pub mnemonic: Mnemonic,
    /// How the operand address is resolved.
    pub mode: AddrMode,
    /// Base cycle cost, before any page-crossing or branch-taken bonus.
    pub cycles: u8,
    /// True when this is a read-class access on an indexed mode (absolute,X
    /// / absolute,Y / indirect,Y) that costs one extra cycle if the indexed
    /// address crosses a page boundary. False for implied/write/RMW-class
    /// opcodes, whose table cost already reflects the worst case.
    pub page_cross_extra: bool,
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, cycles: u8, page_cross_extra: bool) -> Opcode {
    Opcode { mnemonic, mode, cycles, page_cross_extra }
}

use AddrMode::{
    Absolute as ABS, AbsoluteX as ABX, AbsoluteY as ABY, Accumulator as ACC, Immediate as IMM,
    Implied as IMP, Indirect as IND, IndirectX as IDX, IndirectY as IDY, Relative as REL,
    ZeroPage as ZP0, ZeroPageX as ZPX, ZeroPageY as ZPY,
};
use Mnemonic::{
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc, Cld, Cli, Clv, Cmp, Cpx,
    Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla,
    Plp, Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
};

/// Complete 256-entry opcode lookup table, grounded on the reference
/// interpreter's `INSTRUCTION[]` table.
#[rustfmt::skip]
pub static OPCODE_TABLE: [Opcode; 256] = [
    // 0x00
    op(Brk, IMP, 7, false), op(Ora, IDX, 6, false), op(Nop, IMP, 2, false), op(Nop, IDX, 8, false),
    op(Nop, ZP0, 3, false), op(Ora, ZP0, 3, false), op(Asl, ZP0, 5, false), op(Nop, ZP0, 5, false),
    op(Php, IMP, 3, false), op(Ora, IMM, 2, false), op(Asl, ACC, 2, false), op(Nop, IMM, 2, false),
    op(Nop, ABS, 4, false), op(Ora, ABS, 4, false), op(Asl, ABS, 6, false), op(Nop, ABS, 6, false),
    // 0x10
    op(Bpl, REL, 2, false), op(Ora, IDY, 5, true), op(Nop, IMP, 2, false), op(Nop, IDY, 8, false),
    op(Nop, ZPX, 4, false), op(Ora, ZPX, 4, false), op(Asl, ZPX, 6, false), op(Nop, ZPX, 6, false),
    op(Clc, IMP, 2, false), op(Ora, ABY, 4, true), op(Nop, IMM, 2, false), op(Nop, ABY, 7, false),
    op(Nop, ABX, 4, true), op(Ora, ABX, 4, true), op(Asl, ABX, 7, false), op(Nop, ABX, 7, false),
    // 0x20
    op(Jsr, ABS, 6, false), op(And, IDX, 6, false), op(Nop, IMP, 2, false), op(Nop, IDX, 8, false),
    op(Bit, ZP0, 3, false), op(And, ZP0, 3, false), op(Rol, ZP0, 5, false), op(Nop, ZP0, 5, false),
    op(Plp, IMP, 4, false), op(And, IMM, 2, false), op(Rol, ACC, 2, false), op(Nop, IMM, 2, false),
    op(Bit, ABS, 4, false), op(And, ABS, 4, false), op(Rol, ABS, 6, false), op(Nop, ABS, 6, false),
    // 0x30
    op(Bmi, REL, 2, false), op(And, IDY, 5, true), op(Nop, IMP, 2, false), op(Nop, IDY, 8, false),
    op(Nop, ZPX, 4, false), op(And, ZPX, 4, false), op(Rol, ZPX, 6, false), op(Nop, ZPX, 6, false),
    op(Sec, IMP, 2, false), op(And, ABY, 4, true), op(Nop, IMM, 2, false), op(Nop, ABY, 7, false),
    op(Nop, ABX, 4, true), op(And, ABX, 4, true), op(Rol, ABX, 7, false), op(Nop, ABX, 7, false),
    // 0x40
    op(Rti, IMP, 6, false), op(Eor, IDX, 6, false), op(Nop, IMP, 2, false), op(Nop, IDX, 8, false),
    op(Nop, ZP0, 3, false), op(Eor, ZP0, 3, false), op(Lsr, ZP0, 5, false), op(Nop, ZP0, 5, false),
    op(Pha, IMP, 3, false), op(Eor, IMM, 2, false), op(Lsr, ACC, 2, false), op(Nop, IMM, 2, false),
    op(Jmp, ABS, 3, false), op(Eor, ABS, 4, false), op(Lsr, ABS, 6, false), op(Nop, ABS, 6, false),
    // 0x50
    op(Bvc, REL, 2, false), op(Eor, IDY, 5, true), op(Nop, IMP, 2, false), op(Nop, IDY, 8, false),
    op(Nop, ZPX, 4, false), op(Eor, ZPX, 4, false), op(Lsr, ZPX, 6, false), op(Nop, ZPX, 6, false),
    op(Cli, IMP, 2, false), op(Eor, ABY, 4, true), op(Nop, IMM, 2, false), op(Nop, ABY, 7, false),
    op(Nop, ABX, 4, true), op(Eor, ABX, 4, true), op(Lsr, ABX, 7, false), op(Nop, ABX, 7, false),
    // 0x60
    op(Rts, IMP, 6, false), op(Adc, IDX, 6, false), op(Nop, IMP, 2, false), op(Nop, IDX, 8, false),
    op(Nop, ZP0, 3, false), op(Adc, ZP0, 3, false), op(Ror, ZP0, 5, false), op(Nop, ZP0, 5, false),
    op(Pla, IMP, 4, false), op(Adc, IMM, 2, false), op(Ror, ACC, 2, false), op(Nop, IMM, 2, false),
    op(Jmp, IND, 5, false), op(Adc, ABS, 4, false), op(Ror, ABS, 6, false), op(Nop, ABS, 6, false),
    // 0x70
    op(Bvs, REL, 2, false), op(Adc, IDY, 5, true), op(Nop, IMP, 2, false), op(Nop, IDY, 8, false),
    op(Nop, ZPX, 4, false), op(Adc, ZPX, 4, false), op(Ror, ZPX, 6, false), op(Nop, ZPX, 6, false),
    op(Sei, IMP, 2, false), op(Adc, ABY, 4, true), op(Nop, IMM, 2, false), op(Nop, ABY, 7, false),
    op(Nop, ABX, 4, true), op(Adc, ABX, 4, true), op(Ror, ABX, 7, false), op(Nop, ABX, 7, false),
    // 0x80
    op(Nop, IMM, 2, false), op(Sta, IDX, 6, false), op(Nop, IMM, 2, false), op(Nop, IDX, 6, false),
    op(Sty, ZP0, 3, false), op(Sta, ZP0, 3, false), op(Stx, ZP0, 3, false), op(Nop, ZP0, 3, false),
    op(Dey, IMP, 2, false), op(Nop, IMM, 2, false), op(Txa, IMP, 2, false), op(Nop, IMM, 2, false),
    op(Sty, ABS, 4, false), op(Sta, ABS, 4, false), op(Stx, ABS, 4, false), op(Nop, ABS, 4, false),
    // 0x90
    op(Bcc, REL, 2, false), op(Sta, IDY, 6, false), op(Nop, IMP, 2, false), op(Nop, IDY, 6, false),
    op(Sty, ZPX, 4, false), op(Sta, ZPX, 4, false), op(Stx, ZPY, 4, false), op(Nop, ZPY, 4, false),
    op(Tya, IMP, 2, false), op(Sta, ABY, 5, false), op(Txs, IMP, 2, false), op(Nop, ABY, 5, false),
    op(Nop, ABX, 5, false), op(Sta, ABX, 5, false), op(Nop, ABY, 5, false), op(Nop, ABY, 5, false),
    // 0xA0
    op(Ldy, IMM, 2, false), op(Lda, IDX, 6, false), op(Ldx, IMM, 2, false), op(Nop, IDX, 6, false),
    op(Ldy, ZP0, 3, false), op(Lda, ZP0, 3, false), op(Ldx, ZP0, 3, false), op(Nop, ZP0, 3, false),
    op(Tay, IMP, 2, false), op(Lda, IMM, 2, false), op(Tax, IMP, 2, false), op(Nop, IMM, 2, false),
    op(Ldy, ABS, 4, false), op(Lda, ABS, 4, false), op(Ldx, ABS, 4, false), op(Nop, ABS, 4, false),
    // 0xB0
    op(Bcs, REL, 2, false), op(Lda, IDY, 5, true), op(Nop, IMP, 2, false), op(Nop, IDY, 5, true),
    op(Ldy, ZPX, 4, false), op(Lda, ZPX, 4, false), op(Ldx, ZPY, 4, false), op(Nop, ZPY, 4, false),
    op(Clv, IMP, 2, false), op(Lda, ABY, 4, true), op(Tsx, IMP, 2, false), op(Nop, ABY, 4, true),
    op(Ldy, ABX, 4, true), op(Lda, ABX, 4, true), op(Ldx, ABY, 4, true), op(Nop, ABY, 4, true),
    // 0xC0
    op(Cpy, IMM, 2, false), op(Cmp, IDX, 6, false), op(Nop, IMM, 2, false), op(Nop, IDX, 8, false),
    op(Cpy, ZP0, 3, false), op(Cmp, ZP0, 3, false), op(Dec, ZP0, 5, false), op(Nop, ZP0, 5, false),
    op(Iny, IMP, 2, false), op(Cmp, IMM, 2, false), op(Dex, IMP, 2, false), op(Nop, IMM, 2, false),
    op(Cpy, ABS, 4, false), op(Cmp, ABS, 4, false), op(Dec, ABS, 6, false), op(Nop, ABS, 6, false),
    // 0xD0
    op(Bne, REL, 2, false), op(Cmp, IDY, 5, true), op(Nop, IMP, 2, false), op(Nop, IDY, 8, false),
    op(Nop, ZPX, 4, false), op(Cmp, ZPX, 4, false), op(Dec, ZPX, 6, false), op(Nop, ZPX, 6, false),
    op(Cld, IMP, 2, false), op(Cmp, ABY, 4, true), op(Nop, IMM, 2, false), op(Nop, ABY, 7, false),
    op(Nop, ABX, 4, true), op(Cmp, ABX, 4, true), op(Dec, ABX, 7, false), op(Nop, ABX, 7, false),
    // 0xE0
    op(Cpx, IMM, 2, false), op(Sbc, IDX, 6, false), op(Nop, IMM, 2, false), op(Nop, IDX, 8, false),
    op(Cpx, ZP0, 3, false), op(Sbc, ZP0, 3, false), op(Inc, ZP0, 5, false), op(Nop, ZP0, 5, false),
    op(Inx, IMP, 2, false), op(Sbc, IMM, 2, false), op(Nop, IMP, 2, false), op(Nop, IMM, 2, false),
    op(Cpx, ABS, 4, false), op(Sbc, ABS, 4, false), op(Inc, ABS, 6, false), op(Nop, ABS, 6, false),
    // 0xF0
    op(Beq, REL, 2, false), op(Sbc, IDY, 5, true), op(Nop, IMP, 2, false), op(Nop, IDY, 8, false),
    op(Nop, ZPX, 4, false), op(Sbc, ZPX, 4, false), op(Inc, ZPX, 6, false), op(Nop, ZPX, 6, false),
    op(Sed, IMP, 2, false), op(Sbc, ABY, 4, true), op(Nop, IMM, 2, false), op(Nop, ABY, 7, false),
    op(Nop, ABX, 4, true), op(Sbc, ABX, 4, true), op(Inc, ABX, 7, false), op(Nop, ABX, 7, false),
];
