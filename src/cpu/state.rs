/*!
CPU register file and status flags.

Overview
- `Status` keeps each processor flag as a named boolean and knows how to
  compose/decompose the packed byte layout used by PHP/PLP, BRK/RTI and
  interrupt entry (bit 0 = carry .. bit 7 = negative, bit 5 always set).
- `CpuState` holds A/X/Y, the program counter, the stack pointer as a
  full 16-bit address confined to $0100-$01FF, and `Status`. Stack
  pushes store then decrement; pulls increment then load. Any excursion
  outside the stack page is reported as `CoreError::StackFault` instead
  of wrapping silently.

Power-up values match the hardware-documented state: registers zero,
SP = $01FF, carry/zero/interrupt-disable set, PC loaded from the reset
vector by `Cpu::reset`.
*/

use crate::bus::Bus;
use crate::error::CoreError;

/// Bottom of the stack page.
pub const STACK_BASE: u16 = 0x0100;
/// Top of the stack page (power-up stack pointer).
pub const STACK_TOP: u16 = 0x01FF;

/// Packed status byte bit positions.
const FLAG_CARRY: u8 = 0x01;
const FLAG_ZERO: u8 = 0x02;
const FLAG_IRQ_DISABLE: u8 = 0x04;
const FLAG_DECIMAL: u8 = 0x08;
const FLAG_BREAK: u8 = 0x10;
const FLAG_UNUSED: u8 = 0x20;
const FLAG_OVERFLOW: u8 = 0x40;
const FLAG_NEGATIVE: u8 = 0x80;

/// Processor status flags as independent booleans.
///
/// The decimal flag is tracked but never consulted by the arithmetic
/// path; ADC/SBC are binary-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub carry: bool,
    pub zero: bool,
    pub irq_disable: bool,
    pub decimal: bool,
    pub brk: bool,
    pub overflow: bool,
    pub negative: bool,
}

impl Status {
    /// Power-up status: carry, zero and interrupt-disable set.
    pub fn power_up() -> Self {
        Status {
            carry: true,
            zero: true,
            irq_disable: true,
            ..Status::default()
        }
    }

    /// Compose the packed byte pushed on the stack. `set_break` is true
    /// for PHP/BRK and false for hardware interrupt entry.
    pub fn to_pushed_byte(self, set_break: bool) -> u8 {
        let mut b = FLAG_UNUSED;
        if self.carry {
            b |= FLAG_CARRY;
        }
        if self.zero {
            b |= FLAG_ZERO;
        }
        if self.irq_disable {
            b |= FLAG_IRQ_DISABLE;
        }
        if self.decimal {
            b |= FLAG_DECIMAL;
        }
        if set_break {
            b |= FLAG_BREAK;
        }
        if self.overflow {
            b |= FLAG_OVERFLOW;
        }
        if self.negative {
            b |= FLAG_NEGATIVE;
        }
        b
    }

    /// Decompose a packed byte pulled from the stack (PLP/RTI).
    pub fn load_pulled_byte(&mut self, b: u8) {
        self.carry = b & FLAG_CARRY != 0;
        self.zero = b & FLAG_ZERO != 0;
        self.irq_disable = b & FLAG_IRQ_DISABLE != 0;
        self.decimal = b & FLAG_DECIMAL != 0;
        self.brk = b & FLAG_BREAK != 0;
        self.overflow = b & FLAG_OVERFLOW != 0;
        self.negative = b & FLAG_NEGATIVE != 0;
    }

    /// Standard zero/negative update shared by loads, logic, shifts and
    /// increments. Negative mirrors bit 7 of the result.
    #[inline]
    pub fn set_zn(&mut self, result: u8) {
        self.zero = result == 0;
        self.negative = result & 0x80 != 0;
    }
}

/// 6502 register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    /// Full stack address; valid range $0100-$01FF.
    pub sp: u16,
    pub pc: u16,
    pub status: Status,
}

impl CpuState {
    pub fn power_up() -> Self {
        CpuState {
            a: 0,
            x: 0,
            y: 0,
            sp: STACK_TOP,
            pc: 0,
            status: Status::power_up(),
        }
    }

    /// Push one byte: store at SP, then decrement.
    pub fn push(&mut self, bus: &mut Bus, value: u8) -> Result<(), CoreError> {
        bus.write(self.sp, value)?;
        self.sp = self.sp.wrapping_sub(1);
        if self.sp < STACK_BASE {
            return Err(CoreError::StackFault { sp: self.sp });
        }
        Ok(())
    }

    /// Pull one byte: increment SP, then load.
    pub fn pull(&mut self, bus: &mut Bus) -> Result<u8, CoreError> {
        self.sp = self.sp.wrapping_add(1);
        if self.sp > STACK_TOP {
            return Err(CoreError::StackFault { sp: self.sp });
        }
        bus.read(self.sp)
    }

    /// Push a 16-bit value high byte first, so it pulls back low-first.
    pub fn push_word(&mut self, bus: &mut Bus, value: u16) -> Result<(), CoreError> {
        self.push(bus, (value >> 8) as u8)?;
        self.push(bus, (value & 0x00FF) as u8)
    }

    /// Pull a 16-bit value pushed by `push_word`.
    pub fn pull_word(&mut self, bus: &mut Bus) -> Result<u16, CoreError> {
        let lo = self.pull(bus)? as u16;
        let hi = self.pull(bus)? as u16;
        Ok((hi << 8) | lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;

    #[test]
    fn power_up_state_matches_hardware() {
        let s = CpuState::power_up();
        assert_eq!(s.a, 0);
        assert_eq!(s.x, 0);
        assert_eq!(s.y, 0);
        assert_eq!(s.sp, 0x01FF);
        assert!(s.status.carry);
        assert!(s.status.zero);
        assert!(s.status.irq_disable);
        assert!(!s.status.decimal);
        assert!(!s.status.overflow);
        assert!(!s.status.negative);
    }

    #[test]
    fn packed_byte_layout() {
        let mut st = Status::default();
        st.carry = true;
        st.negative = true;
        // bit 5 always reads back set
        assert_eq!(st.to_pushed_byte(false), 0x01 | 0x20 | 0x80);
        assert_eq!(st.to_pushed_byte(true), 0x01 | 0x10 | 0x20 | 0x80);

        let mut st2 = Status::default();
        st2.load_pulled_byte(0b1100_1011);
        assert!(st2.carry);
        assert!(st2.zero);
        assert!(!st2.irq_disable);
        assert!(st2.decimal);
        assert!(!st2.brk);
        assert!(st2.overflow);
        assert!(st2.negative);
    }

    #[test]
    fn stack_push_pull_round_trip() {
        let mut bus = Bus::new();
        let mut s = CpuState::power_up();
        s.push(&mut bus, 0xAB).unwrap();
        s.push_word(&mut bus, 0x1234).unwrap();
        assert_eq!(s.sp, 0x01FC);
        assert_eq!(s.pull_word(&mut bus).unwrap(), 0x1234);
        assert_eq!(s.pull(&mut bus).unwrap(), 0xAB);
        assert_eq!(s.sp, 0x01FF);
    }

    #[test]
    fn pull_past_top_is_a_stack_fault() {
        let mut bus = Bus::new();
        let mut s = CpuState::power_up();
        assert_eq!(
            s.pull(&mut bus),
            Err(CoreError::StackFault { sp: 0x0200 })
        );
    }

    #[test]
    fn push_past_bottom_is_a_stack_fault() {
        let mut bus = Bus::new();
        let mut s = CpuState::power_up();
        s.sp = STACK_BASE;
        assert_eq!(
            s.push(&mut bus, 0x00),
            Err(CoreError::StackFault { sp: 0x00FF })
        );
    }
}
