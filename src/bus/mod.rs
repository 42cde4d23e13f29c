/*!
CPU address decoder.

Map
- $0000-$1FFF: 2KB internal RAM, mirrored every $0800.
- $2000-$3FFF: PPU registers, mirrored every 8 bytes.
- $4014: OAM DMA trigger (write latches a request; the CPU engine
  applies the stall and asks the bus to perform the copy).
- $4016: controller 1 strobe/data port.
- $4000-$401F otherwise: unimplemented I/O, reads as 0.
- $8000-$FFFF: cartridge PRG ROM (16KB images mirrored).

The bus owns every addressable component; the CPU and the orchestrator
reach them only through it.
*/

use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::error::CoreError;
use crate::ppu::Ppu;

const RAM_SIZE: usize = 0x0800;

pub struct Bus {
    ram: [u8; RAM_SIZE],
    pub ppu: Ppu,
    pub controller: Controller,
    cartridge: Option<Cartridge>,
    dma_request: Option<u8>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Bus {
            ram: [0; RAM_SIZE],
            ppu: Ppu::new(),
            controller: Controller::new(),
            cartridge: None,
            dma_request: None,
        }
    }

    /// Install a cartridge: CHR goes to the PPU pattern tables and the
    /// nametable mirroring mode is taken from the header.
    pub fn attach_cartridge(&mut self, cartridge: Cartridge) {
        self.ppu.load_pattern(cartridge.chr_rom());
        self.ppu.mirroring = cartridge.mirroring();
        self.cartridge = Some(cartridge);
    }

    pub fn read(&mut self, addr: u16) -> Result<u8, CoreError> {
        match addr {
            0x0000..=0x1FFF => Ok(self.ram[(addr & 0x07FF) as usize]),
            0x2000..=0x3FFF => self.ppu.read_reg(addr),
            0x4016 => Ok(self.controller.read()),
            0x4000..=0x401F => Ok(0),
            0x4020..=0x7FFF => Ok(0),
            0x8000..=0xFFFF => Ok(self
                .cartridge
                .as_ref()
                .map(|c| c.prg_read(addr))
                .unwrap_or(0xFF)),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), CoreError> {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => self.ppu.write_reg(addr, value)?,
            0x4014 => self.dma_request = Some(value),
            0x4016 => self.controller.write_strobe(value),
            0x4000..=0x401F => {}
            0x4020..=0xFFFF => {
                log::trace!("ignored write to {addr:#06X}");
            }
        }
        Ok(())
    }

    /// Little-endian 16-bit read.
    pub fn read_word(&mut self, addr: u16) -> Result<u16, CoreError> {
        let lo = self.read(addr)? as u16;
        let hi = self.read(addr.wrapping_add(1))? as u16;
        Ok((hi << 8) | lo)
    }

    /// A $4014 write since the last call, if any.
    pub(crate) fn take_dma_request(&mut self) -> Option<u8> {
        self.dma_request.take()
    }

    /// Copy 256 bytes from `page << 8` into sprite memory.
    pub(crate) fn run_oam_dma(&mut self, page: u8) -> Result<(), CoreError> {
        let base = (page as u16) << 8;
        for i in 0..256u16 {
            let v = self.read(base + i)?;
            self.ppu.oam[i as usize] = v;
        }
        Ok(())
    }

    /// Sample and consume the PPU's NMI line. The interrupt source is
    /// cleared so a single vblank delivers a single NMI.
    pub(crate) fn poll_nmi(&mut self) -> bool {
        if self.ppu.nmi_line {
            self.ppu.nmi_line = false;
            self.ppu.nmi_occurred = false;
            return true;
        }
        false
    }
}
