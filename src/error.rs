/*!
Typed fatal errors surfaced by the emulation core.

Overview
- `CoreError` covers the two invariant violations the core refuses to
  paper over: a stack pointer leaving the $0100-$01FF window, and a PPU
  memory access outside the 14-bit physical space. Both indicate a bug
  in the emulated program (or the emulator) and abort the run loop with
  state intact for inspection.
*/

use std::fmt;

/// Fatal emulation error. The run loop stops; no partial recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// The stack pointer left the $0100-$01FF page.
    StackFault { sp: u16 },
    /// A PPU memory access targeted an address at or above $4000.
    PpuAddressOutOfRange { addr: u16 },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::StackFault { sp } => {
                write!(f, "stack pointer left the stack page: {sp:#06X}")
            }
            CoreError::PpuAddressOutOfRange { addr } => {
                write!(f, "PPU address out of range: {addr:#06X}")
            }
        }
    }
}

impl std::error::Error for CoreError {}
