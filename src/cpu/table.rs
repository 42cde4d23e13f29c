/*!
256-entry opcode descriptor table.

Overview
- One `Descriptor` per official opcode: mnemonic, addressing mode, base
  cycle cost and whether the cost grows by one when an indexed read
  crosses a page boundary. Undocumented opcodes are `None`; the engine
  skips them in one cycle with a warning.
- Instruction length is derived from the mode (`1 + Mode::operand_len`).
- Branch timing (+1 taken, +1 more on page cross) is not encoded here;
  the engine applies it from the branch condition and the resolved
  target.
*/

use crate::cpu::addressing::Mode;

/// Instruction mnemonics of the official 6502 set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

/// Static description of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub op: Op,
    pub mode: Mode,
    /// Base cycle cost before page-cross and branch adjustments.
    pub cycles: u32,
    /// True for indexed reads that pay +1 on a page cross.
    pub page_penalty: bool,
}

impl Descriptor {
    /// Total instruction length in bytes (opcode + operands).
    #[inline]
    pub fn byte_len(&self) -> u16 {
        1 + self.mode.operand_len()
    }
}

const fn d(op: Op, mode: Mode, cycles: u32) -> Option<Descriptor> {
    Some(Descriptor {
        op,
        mode,
        cycles,
        page_penalty: false,
    })
}

/// Indexed read variant: +1 cycle when the index crosses a page.
const fn dp(op: Op, mode: Mode, cycles: u32) -> Option<Descriptor> {
    Some(Descriptor {
        op,
        mode,
        cycles,
        page_penalty: true,
    })
}

/// Descriptor table indexed by opcode byte.
pub static OPCODES: [Option<Descriptor>; 256] = {
    use Mode::*;
    use Op::*;
    let mut t: [Option<Descriptor>; 256] = [None; 256];

    t[0x69] = d(Adc, Immediate, 2);
    t[0x65] = d(Adc, ZeroPage, 3);
    t[0x75] = d(Adc, ZeroPageX, 4);
    t[0x6D] = d(Adc, Absolute, 4);
    t[0x7D] = dp(Adc, AbsoluteX, 4);
    t[0x79] = dp(Adc, AbsoluteY, 4);
    t[0x61] = d(Adc, IndirectX, 6);
    t[0x71] = dp(Adc, IndirectY, 5);

    t[0x29] = d(And, Immediate, 2);
    t[0x25] = d(And, ZeroPage, 3);
    t[0x35] = d(And, ZeroPageX, 4);
    t[0x2D] = d(And, Absolute, 4);
    t[0x3D] = dp(And, AbsoluteX, 4);
    t[0x39] = dp(And, AbsoluteY, 4);
    t[0x21] = d(And, IndirectX, 6);
    t[0x31] = dp(And, IndirectY, 5);

    t[0x0A] = d(Asl, Accumulator, 2);
    t[0x06] = d(Asl, ZeroPage, 5);
    t[0x16] = d(Asl, ZeroPageX, 6);
    t[0x0E] = d(Asl, Absolute, 6);
    t[0x1E] = d(Asl, AbsoluteX, 7);

    t[0x90] = d(Bcc, Relative, 2);
    t[0xB0] = d(Bcs, Relative, 2);
    t[0xF0] = d(Beq, Relative, 2);
    t[0x30] = d(Bmi, Relative, 2);
    t[0xD0] = d(Bne, Relative, 2);
    t[0x10] = d(Bpl, Relative, 2);
    t[0x50] = d(Bvc, Relative, 2);
    t[0x70] = d(Bvs, Relative, 2);

    t[0x24] = d(Bit, ZeroPage, 3);
    t[0x2C] = d(Bit, Absolute, 4);

    t[0x00] = d(Brk, Implied, 7);

    t[0x18] = d(Clc, Implied, 2);
    t[0xD8] = d(Cld, Implied, 2);
    t[0x58] = d(Cli, Implied, 2);
    t[0xB8] = d(Clv, Implied, 2);

    t[0xC9] = d(Cmp, Immediate, 2);
    t[0xC5] = d(Cmp, ZeroPage, 3);
    t[0xD5] = d(Cmp, ZeroPageX, 4);
    t[0xCD] = d(Cmp, Absolute, 4);
    t[0xDD] = dp(Cmp, AbsoluteX, 4);
    t[0xD9] = dp(Cmp, AbsoluteY, 4);
    t[0xC1] = d(Cmp, IndirectX, 6);
    t[0xD1] = dp(Cmp, IndirectY, 5);

    t[0xE0] = d(Cpx, Immediate, 2);
    t[0xE4] = d(Cpx, ZeroPage, 3);
    t[0xEC] = d(Cpx, Absolute, 4);

    t[0xC0] = d(Cpy, Immediate, 2);
    t[0xC4] = d(Cpy, ZeroPage, 3);
    t[0xCC] = d(Cpy, Absolute, 4);

    t[0xC6] = d(Dec, ZeroPage, 5);
    t[0xD6] = d(Dec, ZeroPageX, 6);
    t[0xCE] = d(Dec, Absolute, 6);
    t[0xDE] = d(Dec, AbsoluteX, 7);

    t[0xCA] = d(Dex, Implied, 2);
    t[0x88] = d(Dey, Implied, 2);

    t[0x49] = d(Eor, Immediate, 2);
    t[0x45] = d(Eor, ZeroPage, 3);
    t[0x55] = d(Eor, ZeroPageX, 4);
    t[0x4D] = d(Eor, Absolute, 4);
    t[0x5D] = dp(Eor, AbsoluteX, 4);
    t[0x59] = dp(Eor, AbsoluteY, 4);
    t[0x41] = d(Eor, IndirectX, 6);
    t[0x51] = dp(Eor, IndirectY, 5);

    t[0xE6] = d(Inc, ZeroPage, 5);
    t[0xF6] = d(Inc, ZeroPageX, 6);
    t[0xEE] = d(Inc, Absolute, 6);
    t[0xFE] = d(Inc, AbsoluteX, 7);

    t[0xE8] = d(Inx, Implied, 2);
    t[0xC8] = d(Iny, Implied, 2);

    t[0x4C] = d(Jmp, Absolute, 3);
    t[0x6C] = d(Jmp, Indirect, 5);
    t[0x20] = d(Jsr, Absolute, 6);

    t[0xA9] = d(Lda, Immediate, 2);
    t[0xA5] = d(Lda, ZeroPage, 3);
    t[0xB5] = d(Lda, ZeroPageX, 4);
    t[0xAD] = d(Lda, Absolute, 4);
    t[0xBD] = dp(Lda, AbsoluteX, 4);
    t[0xB9] = dp(Lda, AbsoluteY, 4);
    t[0xA1] = d(Lda, IndirectX, 6);
    t[0xB1] = dp(Lda, IndirectY, 5);

    t[0xA2] = d(Ldx, Immediate, 2);
    t[0xA6] = d(Ldx, ZeroPage, 3);
    t[0xB6] = d(Ldx, ZeroPageY, 4);
    t[0xAE] = d(Ldx, Absolute, 4);
    t[0xBE] = dp(Ldx, AbsoluteY, 4);

    t[0xA0] = d(Ldy, Immediate, 2);
    t[0xA4] = d(Ldy, ZeroPage, 3);
    t[0xB4] = d(Ldy, ZeroPageX, 4);
    t[0xAC] = d(Ldy, Absolute, 4);
    t[0xBC] = dp(Ldy, AbsoluteX, 4);

    t[0x4A] = d(Lsr, Accumulator, 2);
    t[0x46] = d(Lsr, ZeroPage, 5);
    t[0x56] = d(Lsr, ZeroPageX, 6);
    t[0x4E] = d(Lsr, Absolute, 6);
    t[0x5E] = d(Lsr, AbsoluteX, 7);

    t[0xEA] = d(Nop, Implied, 2);

    t[0x09] = d(Ora, Immediate, 2);
    t[0x05] = d(Ora, ZeroPage, 3);
    t[0x15] = d(Ora, ZeroPageX, 4);
    t[0x0D] = d(Ora, Absolute, 4);
    t[0x1D] = dp(Ora, AbsoluteX, 4);
    t[0x19] = dp(Ora, AbsoluteY, 4);
    t[0x01] = d(Ora, IndirectX, 6);
    t[0x11] = dp(Ora, IndirectY, 5);

    t[0x48] = d(Pha, Implied, 3);
    t[0x08] = d(Php, Implied, 3);
    t[0x68] = d(Pla, Implied, 4);
    t[0x28] = d(Plp, Implied, 4);

    t[0x2A] = d(Rol, Accumulator, 2);
    t[0x26] = d(Rol, ZeroPage, 5);
    t[0x36] = d(Rol, ZeroPageX, 6);
    t[0x2E] = d(Rol, Absolute, 6);
    t[0x3E] = d(Rol, AbsoluteX, 7);

    t[0x6A] = d(Ror, Accumulator, 2);
    t[0x66] = d(Ror, ZeroPage, 5);
    t[0x76] = d(Ror, ZeroPageX, 6);
    t[0x6E] = d(Ror, Absolute, 6);
    t[0x7E] = d(Ror, AbsoluteX, 7);

    t[0x40] = d(Rti, Implied, 6);
    t[0x60] = d(Rts, Implied, 6);

    t[0xE9] = d(Sbc, Immediate, 2);
    t[0xE5] = d(Sbc, ZeroPage, 3);
    t[0xF5] = d(Sbc, ZeroPageX, 4);
    t[0xED] = d(Sbc, Absolute, 4);
    t[0xFD] = dp(Sbc, AbsoluteX, 4);
    t[0xF9] = dp(Sbc, AbsoluteY, 4);
    t[0xE1] = d(Sbc, IndirectX, 6);
    t[0xF1] = dp(Sbc, IndirectY, 5);

    t[0x38] = d(Sec, Implied, 2);
    t[0xF8] = d(Sed, Implied, 2);
    t[0x78] = d(Sei, Implied, 2);

    t[0x85] = d(Sta, ZeroPage, 3);
    t[0x95] = d(Sta, ZeroPageX, 4);
    t[0x8D] = d(Sta, Absolute, 4);
    t[0x9D] = d(Sta, AbsoluteX, 5);
    t[0x99] = d(Sta, AbsoluteY, 5);
    t[0x81] = d(Sta, IndirectX, 6);
    t[0x91] = d(Sta, IndirectY, 6);

    t[0x86] = d(Stx, ZeroPage, 3);
    t[0x96] = d(Stx, ZeroPageY, 4);
    t[0x8E] = d(Stx, Absolute, 4);

    t[0x84] = d(Sty, ZeroPage, 3);
    t[0x94] = d(Sty, ZeroPageX, 4);
    t[0x8C] = d(Sty, Absolute, 4);

    t[0xAA] = d(Tax, Implied, 2);
    t[0xA8] = d(Tay, Implied, 2);
    t[0xBA] = d(Tsx, Implied, 2);
    t[0x8A] = d(Txa, Implied, 2);
    t[0x9A] = d(Txs, Implied, 2);
    t[0x98] = d(Tya, Implied, 2);

    t
};

/// True for the eight conditional branch mnemonics.
#[inline]
pub fn is_branch(op: Op) -> bool {
    matches!(
        op,
        Op::Bcc | Op::Bcs | Op::Beq | Op::Bmi | Op::Bne | Op::Bpl | Op::Bvc | Op::Bvs
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::addressing::Mode;

    #[test]
    fn official_opcode_count() {
        let n = OPCODES.iter().filter(|e| e.is_some()).count();
        assert_eq!(n, 151);
    }

    #[test]
    fn spot_check_descriptors() {
        let lda_imm = OPCODES[0xA9].unwrap();
        assert_eq!(lda_imm.op, Op::Lda);
        assert_eq!(lda_imm.mode, Mode::Immediate);
        assert_eq!(lda_imm.cycles, 2);
        assert_eq!(lda_imm.byte_len(), 2);
        assert!(!lda_imm.page_penalty);

        let lda_absx = OPCODES[0xBD].unwrap();
        assert!(lda_absx.page_penalty);
        assert_eq!(lda_absx.byte_len(), 3);

        // stores never pay the indexed-read penalty
        let sta_absx = OPCODES[0x9D].unwrap();
        assert_eq!(sta_absx.cycles, 5);
        assert!(!sta_absx.page_penalty);

        let jmp_ind = OPCODES[0x6C].unwrap();
        assert_eq!(jmp_ind.mode, Mode::Indirect);
        assert_eq!(jmp_ind.cycles, 5);
    }

    #[test]
    fn undocumented_slots_are_empty() {
        assert!(OPCODES[0x02].is_none());
        assert!(OPCODES[0xFF].is_none());
    }
}
