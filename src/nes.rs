/*!
Owning orchestrator: one `Nes` holds the CPU and the bus (which owns
everything else) and steps them at the fixed ratio of three PPU dots
per CPU cycle.
*/

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::error::CoreError;

pub struct Nes {
    cpu: Cpu,
    bus: Bus,
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    pub fn new() -> Self {
        Nes {
            cpu: Cpu::new(),
            bus: Bus::new(),
        }
    }

    /// Install a cartridge and reset the CPU through its vector.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) -> Result<(), CoreError> {
        self.bus.attach_cartridge(cartridge);
        self.cpu.reset(&mut self.bus)
    }

    /// Advance one CPU cycle (three PPU dots, then the CPU).
    pub fn step(&mut self) -> Result<(), CoreError> {
        self.bus.ppu.tick();
        self.bus.ppu.tick();
        self.bus.ppu.tick();
        self.cpu.step_cycle(&mut self.bus)
    }

    /// Run until the next vblank transition completes a frame.
    pub fn run_frame(&mut self) -> Result<(), CoreError> {
        loop {
            self.step()?;
            if self.bus.ppu.take_frame_complete() {
                return Ok(());
            }
        }
    }

    /// Replace the live controller state, one bit per `Button`.
    pub fn set_buttons(&mut self, mask: u8) {
        self.bus.controller.set_buttons(mask);
    }

    /// RGBA frame buffer, 256x240x4 bytes.
    #[inline]
    pub fn frame(&self) -> &[u8] {
        self.bus.ppu.frame()
    }

    #[inline]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    #[inline]
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}
