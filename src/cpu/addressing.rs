/*!
Effective-address computation for every 6502 addressing mode.

Overview
- `Mode` names the addressing mode carried by each opcode descriptor.
- `resolve` computes the effective address for the instruction at the
  current PC without touching the target location, so it is safe to run
  both during timing computation and again at commit. Only operand and
  zero-page pointer bytes are read through the bus.
- Page-cross detection feeds the +1 cycle penalty on indexed reads and
  taken branches.

Quirks reproduced here:
- Zero-page indexed addressing wraps within page zero.
- (zp,X) and (zp),Y pointer fetches wrap within page zero.
- JMP (indirect) with a pointer ending in $FF fetches the high byte from
  the start of the same page instead of crossing into the next one.
*/

use crate::bus::Bus;
use crate::cpu::state::CpuState;
use crate::error::CoreError;

/// Addressing modes of the official instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl Mode {
    /// Operand bytes following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            Mode::Implied | Mode::Accumulator => 0,
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::IndirectX
            | Mode::IndirectY
            | Mode::Relative => 1,
            Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY | Mode::Indirect => 2,
        }
    }
}

/// Result of address resolution: the effective address plus whether an
/// index or branch displacement crossed a page boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub addr: u16,
    pub page_crossed: bool,
}

impl Resolved {
    fn fixed(addr: u16) -> Self {
        Resolved {
            addr,
            page_crossed: false,
        }
    }
}

#[inline]
fn same_page(a: u16, b: u16) -> bool {
    a & 0xFF00 == b & 0xFF00
}

/// Read the 16-bit pointer at `ptr` with the page-wrap quirk: the high
/// byte comes from the start of `ptr`'s page when `ptr` ends in $FF.
fn read_word_page_wrapped(bus: &mut Bus, ptr: u16) -> Result<u16, CoreError> {
    let lo = bus.read(ptr)? as u16;
    let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
    let hi = bus.read(hi_addr)? as u16;
    Ok((hi << 8) | lo)
}

/// Compute the effective address for the instruction at `cpu.pc`.
///
/// `Implied` and `Accumulator` have no effective address; callers never
/// resolve them. `Immediate` resolves to the operand byte's own address.
pub fn resolve(cpu: &CpuState, bus: &mut Bus, mode: Mode) -> Result<Resolved, CoreError> {
    let op_addr = cpu.pc.wrapping_add(1);
    match mode {
        Mode::Implied | Mode::Accumulator => Ok(Resolved::fixed(0)),
        Mode::Immediate => Ok(Resolved::fixed(op_addr)),
        Mode::ZeroPage => {
            let zp = bus.read(op_addr)? as u16;
            Ok(Resolved::fixed(zp))
        }
        Mode::ZeroPageX => {
            let zp = bus.read(op_addr)?.wrapping_add(cpu.x) as u16;
            Ok(Resolved::fixed(zp))
        }
        Mode::ZeroPageY => {
            let zp = bus.read(op_addr)?.wrapping_add(cpu.y) as u16;
            Ok(Resolved::fixed(zp))
        }
        Mode::Absolute => Ok(Resolved::fixed(bus.read_word(op_addr)?)),
        Mode::AbsoluteX => {
            let base = bus.read_word(op_addr)?;
            let addr = base.wrapping_add(cpu.x as u16);
            Ok(Resolved {
                addr,
                page_crossed: !same_page(base, addr),
            })
        }
        Mode::AbsoluteY => {
            let base = bus.read_word(op_addr)?;
            let addr = base.wrapping_add(cpu.y as u16);
            Ok(Resolved {
                addr,
                page_crossed: !same_page(base, addr),
            })
        }
        Mode::Indirect => {
            let ptr = bus.read_word(op_addr)?;
            Ok(Resolved::fixed(read_word_page_wrapped(bus, ptr)?))
        }
        Mode::IndirectX => {
            let zp = bus.read(op_addr)?.wrapping_add(cpu.x) as u16;
            Ok(Resolved::fixed(read_word_page_wrapped(bus, zp)?))
        }
        Mode::IndirectY => {
            let zp = bus.read(op_addr)? as u16;
            let base = read_word_page_wrapped(bus, zp)?;
            let addr = base.wrapping_add(cpu.y as u16);
            Ok(Resolved {
                addr,
                page_crossed: !same_page(base, addr),
            })
        }
        Mode::Relative => {
            let offset = bus.read(op_addr)? as i8;
            let next = cpu.pc.wrapping_add(2);
            let target = next.wrapping_add(offset as u16);
            Ok(Resolved {
                addr: target,
                page_crossed: !same_page(next, target),
            })
        }
    }
}
