/*!
famicore - cycle-granular NES CPU + PPU emulation core.

Overview
- `cpu`: 6502 execution engine stepped one cycle at a time.
- `ppu`: scanline/dot picture pipeline with loopy scroll registers.
- `bus`: 64KB CPU address decoder owning RAM, PPU, controller, cartridge.
- `cartridge`: iNES (v1) loader (NROM).
- `controller`: strobe latch + button shift register.
- `nes`: owning orchestrator stepping PPU and CPU at the 3:1 dot ratio.
*/

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod nes;
pub mod ppu;

#[cfg(test)]
pub(crate) mod test_utils;

pub use bus::Bus;
pub use cartridge::{Cartridge, CartridgeError, Mirroring};
pub use controller::{Button, Controller};
pub use cpu::Cpu;
pub use error::CoreError;
pub use nes::Nes;
pub use ppu::Ppu;
