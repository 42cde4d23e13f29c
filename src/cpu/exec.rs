/*!
Instruction commit: apply one decoded instruction's architectural
effects in a single step.

Overview
- `execute` resolves the effective address (again, from the same operand
  bytes the timing pass used), applies the operation, updates flags per
  instruction class, and advances PC. Control-flow instructions set PC
  themselves; everything else advances by instruction length.
- ADC and SBC share one binary add path; SBC feeds it the one's
  complement of the operand. Overflow is computed from the sign algebra
  of the pre-add accumulator, the operand and the result.
*/

use crate::bus::Bus;
use crate::cpu::addressing::{Mode, Resolved, resolve};
use crate::cpu::state::{CpuState, Status};
use crate::cpu::table::{Descriptor, Op};
use crate::error::CoreError;

/// Reset/NMI/IRQ vector locations.
pub const VECTOR_NMI: u16 = 0xFFFA;
pub const VECTOR_RESET: u16 = 0xFFFC;
pub const VECTOR_IRQ: u16 = 0xFFFE;

/// Binary add with carry; shared by ADC and SBC (operand complemented).
fn add_with_carry(cpu: &mut CpuState, arg: u8) {
    let sum = cpu.a as u16 + arg as u16 + cpu.status.carry as u16;
    let result = sum as u8;
    cpu.status.carry = sum > 0xFF;
    cpu.status.overflow = (cpu.a ^ result) & (arg ^ result) & 0x80 != 0;
    cpu.a = result;
    cpu.status.set_zn(result);
}

fn compare(status: &mut Status, reg: u8, arg: u8) {
    status.carry = reg >= arg;
    status.zero = reg == arg;
    status.negative = reg.wrapping_sub(arg) & 0x80 != 0;
}

/// Whether the branch with mnemonic `op` is taken under `cpu`'s flags.
pub fn branch_taken(cpu: &CpuState, op: Op) -> bool {
    let s = &cpu.status;
    match op {
        Op::Bcc => !s.carry,
        Op::Bcs => s.carry,
        Op::Beq => s.zero,
        Op::Bne => !s.zero,
        Op::Bmi => s.negative,
        Op::Bpl => !s.negative,
        Op::Bvc => !s.overflow,
        Op::Bvs => s.overflow,
        _ => false,
    }
}

/// Read-modify-write helper: applies `f` to the operand in place
/// (memory or accumulator) and returns the result for flag updates.
fn rmw<F>(
    cpu: &mut CpuState,
    bus: &mut Bus,
    mode: Mode,
    r: Resolved,
    f: F,
) -> Result<u8, CoreError>
where
    F: Fn(&mut CpuState, u8) -> u8,
{
    if mode == Mode::Accumulator {
        let a = cpu.a;
        let out = f(cpu, a);
        cpu.a = out;
        Ok(out)
    } else {
        let v = bus.read(r.addr)?;
        let out = f(cpu, v);
        bus.write(r.addr, out)?;
        Ok(out)
    }
}

/// Commit the instruction described by `desc` at `cpu.pc`.
pub fn execute(cpu: &mut CpuState, bus: &mut Bus, desc: Descriptor) -> Result<(), CoreError> {
    let r = resolve(cpu, bus, desc.mode)?;
    let next_pc = cpu.pc.wrapping_add(desc.byte_len());

    match desc.op {
        Op::Lda => {
            cpu.a = bus.read(r.addr)?;
            cpu.status.set_zn(cpu.a);
        }
        Op::Ldx => {
            cpu.x = bus.read(r.addr)?;
            cpu.status.set_zn(cpu.x);
        }
        Op::Ldy => {
            cpu.y = bus.read(r.addr)?;
            cpu.status.set_zn(cpu.y);
        }
        Op::Sta => bus.write(r.addr, cpu.a)?,
        Op::Stx => bus.write(r.addr, cpu.x)?,
        Op::Sty => bus.write(r.addr, cpu.y)?,

        Op::Adc => {
            let v = bus.read(r.addr)?;
            add_with_carry(cpu, v);
        }
        Op::Sbc => {
            let v = bus.read(r.addr)?;
            add_with_carry(cpu, !v);
        }

        Op::And => {
            cpu.a &= bus.read(r.addr)?;
            cpu.status.set_zn(cpu.a);
        }
        Op::Ora => {
            cpu.a |= bus.read(r.addr)?;
            cpu.status.set_zn(cpu.a);
        }
        Op::Eor => {
            cpu.a ^= bus.read(r.addr)?;
            cpu.status.set_zn(cpu.a);
        }

        Op::Bit => {
            let v = bus.read(r.addr)?;
            cpu.status.zero = cpu.a & v == 0;
            cpu.status.overflow = v & 0x40 != 0;
            cpu.status.negative = v & 0x80 != 0;
        }

        Op::Cmp => {
            let v = bus.read(r.addr)?;
            compare(&mut cpu.status, cpu.a, v);
        }
        Op::Cpx => {
            let v = bus.read(r.addr)?;
            compare(&mut cpu.status, cpu.x, v);
        }
        Op::Cpy => {
            let v = bus.read(r.addr)?;
            compare(&mut cpu.status, cpu.y, v);
        }

        Op::Asl => {
            let out = rmw(cpu, bus, desc.mode, r, |c, v| {
                c.status.carry = v & 0x80 != 0;
                v << 1
            })?;
            cpu.status.set_zn(out);
        }
        Op::Lsr => {
            let out = rmw(cpu, bus, desc.mode, r, |c, v| {
                c.status.carry = v & 0x01 != 0;
                v >> 1
            })?;
            cpu.status.set_zn(out);
        }
        Op::Rol => {
            let out = rmw(cpu, bus, desc.mode, r, |c, v| {
                let carry_in = c.status.carry as u8;
                c.status.carry = v & 0x80 != 0;
                (v << 1) | carry_in
            })?;
            cpu.status.set_zn(out);
        }
        Op::Ror => {
            let out = rmw(cpu, bus, desc.mode, r, |c, v| {
                let carry_in = (c.status.carry as u8) << 7;
                c.status.carry = v & 0x01 != 0;
                (v >> 1) | carry_in
            })?;
            cpu.status.set_zn(out);
        }

        Op::Inc => {
            let out = rmw(cpu, bus, desc.mode, r, |_, v| v.wrapping_add(1))?;
            cpu.status.set_zn(out);
        }
        Op::Dec => {
            let out = rmw(cpu, bus, desc.mode, r, |_, v| v.wrapping_sub(1))?;
            cpu.status.set_zn(out);
        }
        Op::Inx => {
            cpu.x = cpu.x.wrapping_add(1);
            cpu.status.set_zn(cpu.x);
        }
        Op::Iny => {
            cpu.y = cpu.y.wrapping_add(1);
            cpu.status.set_zn(cpu.y);
        }
        Op::Dex => {
            cpu.x = cpu.x.wrapping_sub(1);
            cpu.status.set_zn(cpu.x);
        }
        Op::Dey => {
            cpu.y = cpu.y.wrapping_sub(1);
            cpu.status.set_zn(cpu.y);
        }

        Op::Tax => {
            cpu.x = cpu.a;
            cpu.status.set_zn(cpu.x);
        }
        Op::Tay => {
            cpu.y = cpu.a;
            cpu.status.set_zn(cpu.y);
        }
        Op::Txa => {
            cpu.a = cpu.x;
            cpu.status.set_zn(cpu.a);
        }
        Op::Tya => {
            cpu.a = cpu.y;
            cpu.status.set_zn(cpu.a);
        }
        Op::Tsx => {
            cpu.x = (cpu.sp & 0x00FF) as u8;
            cpu.status.set_zn(cpu.x);
        }
        Op::Txs => {
            // no flag updates; SP stays inside the stack page by construction
            cpu.sp = 0x0100 | cpu.x as u16;
        }

        Op::Pha => cpu.push(bus, cpu.a)?,
        Op::Php => {
            let b = cpu.status.to_pushed_byte(true);
            cpu.push(bus, b)?;
        }
        Op::Pla => {
            cpu.a = cpu.pull(bus)?;
            cpu.status.set_zn(cpu.a);
        }
        Op::Plp => {
            let b = cpu.pull(bus)?;
            cpu.status.load_pulled_byte(b);
        }

        Op::Clc => cpu.status.carry = false,
        Op::Sec => cpu.status.carry = true,
        Op::Cli => cpu.status.irq_disable = false,
        Op::Sei => cpu.status.irq_disable = true,
        Op::Cld => cpu.status.decimal = false,
        Op::Sed => cpu.status.decimal = true,
        Op::Clv => cpu.status.overflow = false,

        Op::Nop => {}

        Op::Jmp => {
            cpu.pc = r.addr;
            return Ok(());
        }
        Op::Jsr => {
            // return address pushed as PC+2; RTS adds the final +1
            cpu.push_word(bus, cpu.pc.wrapping_add(2))?;
            cpu.pc = r.addr;
            return Ok(());
        }
        Op::Rts => {
            let ret = cpu.pull_word(bus)?;
            cpu.pc = ret.wrapping_add(1);
            return Ok(());
        }
        Op::Brk => {
            cpu.push_word(bus, cpu.pc.wrapping_add(2))?;
            let b = cpu.status.to_pushed_byte(true);
            cpu.push(bus, b)?;
            cpu.status.irq_disable = true;
            cpu.pc = bus.read_word(VECTOR_IRQ)?;
            return Ok(());
        }
        Op::Rti => {
            let b = cpu.pull(bus)?;
            cpu.status.load_pulled_byte(b);
            cpu.pc = cpu.pull_word(bus)?;
            return Ok(());
        }

        Op::Bcc | Op::Bcs | Op::Beq | Op::Bne | Op::Bmi | Op::Bpl | Op::Bvc | Op::Bvs => {
            cpu.pc = if branch_taken(cpu, desc.op) {
                r.addr
            } else {
                next_pc
            };
            return Ok(());
        }
    }

    cpu.pc = next_pc;
    Ok(())
}
