/*!
CPU-visible PPU registers ($2000-$2007, mirrored through $3FFF).

Semantics
- $2000 PPUCTRL: nametable/increment/pattern selects, bit 7 gates NMI.
- $2001 PPUMASK: layer enables and left-column masks.
- $2002 PPUSTATUS: read clears the vblank flag and the shared
  scroll/address write toggle.
- $2003/$2004 OAMADDR/OAMDATA.
- $2005 PPUSCROLL and $2006 PPUADDR share the two-write toggle; both
  stage into `t`, the $2006 low write publishes `t` into `v`.
- $2007 PPUDATA: buffered reads (one access behind) except for palette
  space, which reads through immediately; each access moves `v` by the
  configured increment, or by a full Y-advance while rendering.
*/

use super::{CTRL_INCREMENT_32, CTRL_NMI_ENABLE, MASK_BG, MASK_SPRITES, Ppu, STATUS_VBLANK};
use crate::error::CoreError;

impl Ppu {
    /// CPU read of $2000-$3FFF.
    pub fn read_reg(&mut self, addr: u16) -> Result<u8, CoreError> {
        match 0x2000 + (addr & 0x7) {
            0x2002 => {
                let value = self.status;
                self.status &= !STATUS_VBLANK;
                self.nmi_occurred = false;
                self.write_toggle = false;
                Ok(value)
            }
            0x2004 => Ok(self.oam[self.oam_addr as usize]),
            0x2007 => self.read_data(),
            _ => Ok(0),
        }
    }

    /// CPU write of $2000-$3FFF.
    pub fn write_reg(&mut self, addr: u16, value: u8) -> Result<(), CoreError> {
        match 0x2000 + (addr & 0x7) {
            0x2000 => {
                self.ctrl = value;
                self.nmi_output = value & CTRL_NMI_ENABLE != 0;
            }
            0x2001 => self.mask = value,
            0x2003 => self.oam_addr = value,
            0x2004 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            0x2005 => self.write_scroll(value),
            0x2006 => self.write_addr(value),
            0x2007 => self.write_data(value)?,
            _ => {}
        }
        Ok(())
    }

    /// $2005: first write stages coarse/fine X, second stages Y bits.
    fn write_scroll(&mut self, value: u8) {
        if !self.write_toggle {
            self.t = (self.t & !0x001F) | ((value >> 3) as u16 & 0x1F);
            self.fine_x = value & 0x7;
        } else {
            self.t = (self.t & !0x73E0)
                | (((value & 0x7) as u16) << 12)
                | (((value >> 3) as u16 & 0x1F) << 5);
        }
        self.write_toggle = !self.write_toggle;
    }

    /// $2006: high byte first; the low write publishes `t` into `v`.
    fn write_addr(&mut self, value: u8) {
        if !self.write_toggle {
            self.t = (self.t & 0x00FF) | ((value as u16) << 8);
            self.t &= 0x7FFF;
        } else {
            self.t = (self.t & 0x7F00) | value as u16;
            self.v = self.t;
        }
        self.write_toggle = !self.write_toggle;
    }

    /// $2007 read: buffered except for palette space.
    fn read_data(&mut self) -> Result<u8, CoreError> {
        let addr = self.v;
        let value = self.read_vram(addr)?;
        let out = if addr > 0x3EFF {
            self.read_buffer = value;
            value
        } else {
            let buffered = self.read_buffer;
            self.read_buffer = value;
            buffered
        };
        self.increment_addr();
        Ok(out)
    }

    fn write_data(&mut self, value: u8) -> Result<(), CoreError> {
        self.write_vram(self.v, value)?;
        self.increment_addr();
        Ok(())
    }

    /// Data-port address step: +1 or +32 normally; while both layers
    /// are enabled in the rendering scanline range it performs the
    /// scroll Y-advance instead.
    fn increment_addr(&mut self) {
        let rendering = self.mask & MASK_BG != 0 && self.mask & MASK_SPRITES != 0;
        if rendering && (-1..=239).contains(&self.scanline) {
            self.increment_y();
        } else {
            let step = if self.ctrl & CTRL_INCREMENT_32 != 0 {
                32
            } else {
                1
            };
            self.v = self.v.wrapping_add(step) & 0x7FFF;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::STATUS_SPRITE0;

    #[test]
    fn addr_writes_publish_on_the_second_write() {
        let mut ppu = Ppu::new();
        ppu.write_reg(0x2006, 0x21).unwrap();
        assert_eq!(ppu.v, 0); // staged only
        ppu.write_reg(0x2006, 0x08).unwrap();
        assert_eq!(ppu.v, 0x2108);
    }

    #[test]
    fn two_zero_addr_writes_leave_v_zero() {
        let mut ppu = Ppu::new();
        ppu.v = 0x1234;
        ppu.t = 0x1234;
        ppu.write_reg(0x2006, 0x00).unwrap();
        ppu.write_reg(0x2006, 0x00).unwrap();
        assert_eq!(ppu.v, 0);
    }

    #[test]
    fn status_read_clears_vblank_and_toggle_but_not_v() {
        let mut ppu = Ppu::new();
        ppu.status = STATUS_VBLANK | STATUS_SPRITE0;
        ppu.nmi_occurred = true;
        ppu.v = 0x2400;
        ppu.write_reg(0x2006, 0x3F).unwrap(); // toggle now set
        let s = ppu.read_reg(0x2002).unwrap();
        assert_eq!(s & STATUS_VBLANK, STATUS_VBLANK);
        assert_eq!(ppu.status & STATUS_VBLANK, 0);
        assert_eq!(ppu.status & STATUS_SPRITE0, STATUS_SPRITE0);
        assert!(!ppu.nmi_occurred);
        assert!(!ppu.write_toggle);
        assert_eq!(ppu.v, 0x2400);
    }

    #[test]
    fn scroll_writes_stage_x_then_y() {
        let mut ppu = Ppu::new();
        ppu.write_reg(0x2005, 0b0111_1101).unwrap(); // X = 125
        assert_eq!(ppu.t & 0x1F, 15);
        assert_eq!(ppu.fine_x, 5);
        ppu.write_reg(0x2005, 0b0101_1110).unwrap(); // Y = 94
        assert_eq!((ppu.t >> 5) & 0x1F, 11);
        assert_eq!((ppu.t >> 12) & 0x7, 6);
    }

    #[test]
    fn data_reads_are_buffered_one_behind() {
        let mut ppu = Ppu::new();
        ppu.write_vram(0x2000, 0x11).unwrap();
        ppu.write_vram(0x2001, 0x22).unwrap();
        ppu.write_reg(0x2006, 0x20).unwrap();
        ppu.write_reg(0x2006, 0x00).unwrap();
        assert_eq!(ppu.read_reg(0x2007).unwrap(), 0x00); // stale buffer
        assert_eq!(ppu.read_reg(0x2007).unwrap(), 0x11);
        assert_eq!(ppu.read_reg(0x2007).unwrap(), 0x22);
    }

    #[test]
    fn palette_reads_bypass_the_buffer() {
        let mut ppu = Ppu::new();
        ppu.write_vram(0x3F01, 0x19).unwrap();
        ppu.write_reg(0x2006, 0x3F).unwrap();
        ppu.write_reg(0x2006, 0x01).unwrap();
        assert_eq!(ppu.read_reg(0x2007).unwrap(), 0x19);
    }

    #[test]
    fn data_port_increments_by_1_or_32() {
        let mut ppu = Ppu::new();
        ppu.write_reg(0x2006, 0x20).unwrap();
        ppu.write_reg(0x2006, 0x00).unwrap();
        ppu.read_reg(0x2007).unwrap();
        assert_eq!(ppu.v, 0x2001);
        ppu.write_reg(0x2000, CTRL_INCREMENT_32).unwrap();
        ppu.read_reg(0x2007).unwrap();
        assert_eq!(ppu.v, 0x2021);
    }

    #[test]
    fn data_port_read_past_the_physical_space_is_fatal() {
        let mut ppu = Ppu::new();
        ppu.v = 0x4000;
        assert!(ppu.read_reg(0x2007).is_err());
    }

    #[test]
    fn oam_data_autoincrements_on_write() {
        let mut ppu = Ppu::new();
        ppu.write_reg(0x2003, 0x10).unwrap();
        ppu.write_reg(0x2004, 0xAA).unwrap();
        ppu.write_reg(0x2004, 0xBB).unwrap();
        assert_eq!(ppu.oam[0x10], 0xAA);
        assert_eq!(ppu.oam[0x11], 0xBB);
        ppu.write_reg(0x2003, 0x11).unwrap();
        assert_eq!(ppu.read_reg(0x2004).unwrap(), 0xBB);
    }

    #[test]
    fn register_window_mirrors_every_eight_bytes() {
        let mut ppu = Ppu::new();
        ppu.status = STATUS_VBLANK;
        let s = ppu.read_reg(0x3FFA).unwrap(); // aliases $2002
        assert_eq!(s & STATUS_VBLANK, STATUS_VBLANK);
    }
}
