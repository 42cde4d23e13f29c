/*!
PPU physical address space.

Layout
- $0000-$1FFF: two 4KB pattern tables (CHR).
- $2000-$2FFF: nametable RAM through the cartridge's mirroring mode.
- $3000-$3EFF: unmapped here; reads return 0.
- $3F00-$3FFF: 32-byte palette RAM, repeating every 32 bytes, with
  $3F10/$3F14/$3F18/$3F1C aliased onto their background counterparts.

Anything at or above $4000 is outside the 14-bit physical space and is
reported as `CoreError::PpuAddressOutOfRange`; the core never masks the
address silently.
*/

use super::Ppu;
use crate::cartridge::Mirroring;
use crate::error::CoreError;

impl Ppu {
    /// Map a $2000-$2FFF address onto the 4KB nametable array.
    pub(crate) fn nametable_index(&self, addr: u16) -> usize {
        let mirrored = match self.mirroring {
            Mirroring::Horizontal => addr & !0x0400,
            Mirroring::Vertical => addr & !0x0800,
        };
        ((mirrored - 0x2000) & 0x0FFF) as usize
    }

    /// Map a $3F00-$3FFF address onto palette RAM, applying the sprite
    /// background-colour aliases.
    fn palette_index(addr: u16) -> usize {
        let i = ((addr - 0x3F00) % 32) as usize;
        match i {
            0x10 | 0x14 | 0x18 | 0x1C => i - 0x10,
            _ => i,
        }
    }

    pub(crate) fn read_vram(&self, addr: u16) -> Result<u8, CoreError> {
        match addr {
            0x0000..=0x0FFF => Ok(self.pattern[0][addr as usize]),
            0x1000..=0x1FFF => Ok(self.pattern[1][(addr - 0x1000) as usize]),
            0x2000..=0x2FFF => Ok(self.nametables[self.nametable_index(addr)]),
            0x3000..=0x3EFF => Ok(0),
            0x3F00..=0x3FFF => Ok(self.palette_ram[Self::palette_index(addr)]),
            _ => Err(CoreError::PpuAddressOutOfRange { addr }),
        }
    }

    pub(crate) fn write_vram(&mut self, addr: u16, value: u8) -> Result<(), CoreError> {
        match addr {
            0x0000..=0x0FFF => self.pattern[0][addr as usize] = value,
            0x1000..=0x1FFF => self.pattern[1][(addr - 0x1000) as usize] = value,
            0x2000..=0x2FFF => {
                let i = self.nametable_index(addr);
                self.nametables[i] = value;
            }
            0x3000..=0x3EFF => {}
            0x3F00..=0x3FFF => self.palette_ram[Self::palette_index(addr)] = value,
            _ => return Err(CoreError::PpuAddressOutOfRange { addr }),
        }
        Ok(())
    }

    /// Install CHR data into the pattern tables (cartridge load).
    pub(crate) fn load_pattern(&mut self, chr: &[u8]) {
        for (i, b) in chr.iter().take(0x2000).enumerate() {
            self.pattern[i / 0x1000][i % 0x1000] = *b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_mirroring_aliases_across_0x400() {
        let mut ppu = Ppu::new();
        ppu.mirroring = Mirroring::Horizontal;
        ppu.write_vram(0x2000, 0xAB).unwrap();
        assert_eq!(ppu.read_vram(0x2400).unwrap(), 0xAB);
        ppu.write_vram(0x2800, 0xCD).unwrap();
        assert_eq!(ppu.read_vram(0x2C00).unwrap(), 0xCD);
        assert_ne!(ppu.read_vram(0x2800).unwrap(), 0xAB);
    }

    #[test]
    fn vertical_mirroring_aliases_across_0x800() {
        let mut ppu = Ppu::new();
        ppu.mirroring = Mirroring::Vertical;
        ppu.write_vram(0x2000, 0xAB).unwrap();
        assert_eq!(ppu.read_vram(0x2800).unwrap(), 0xAB);
        assert_ne!(ppu.read_vram(0x2400).unwrap(), 0xAB);
    }

    #[test]
    fn palette_mirror_entries_alias_background() {
        let mut ppu = Ppu::new();
        ppu.write_vram(0x3F10, 0x2A).unwrap();
        assert_eq!(ppu.read_vram(0x3F00).unwrap(), 0x2A);
        ppu.write_vram(0x3F04, 0x11).unwrap();
        assert_eq!(ppu.read_vram(0x3F24).unwrap(), 0x11); // 32-byte repeat
    }

    #[test]
    fn out_of_range_access_is_fatal() {
        let mut ppu = Ppu::new();
        assert_eq!(
            ppu.read_vram(0x4000),
            Err(CoreError::PpuAddressOutOfRange { addr: 0x4000 })
        );
        assert!(ppu.write_vram(0x5000, 0).is_err());
    }

    #[test]
    fn load_pattern_splits_chr_across_tables() {
        let mut ppu = Ppu::new();
        let mut chr = vec![0u8; 0x2000];
        chr[0x0000] = 1;
        chr[0x1000] = 2;
        ppu.load_pattern(&chr);
        assert_eq!(ppu.pattern[0][0], 1);
        assert_eq!(ppu.pattern[1][0], 2);
    }
}
