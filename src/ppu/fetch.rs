/*!
Background tile prefetch and loopy scroll arithmetic.

Overview
- `fetch_tile` prepares one tile (pattern bitplanes + attribute bits)
  from the current VRAM address `v` and pushes it on the prefetch
  queue; the pipeline consumes it roughly 16 dots later.
- The scroll counters live packed inside `v`/`t`:
  coarse X = bits 0-4, coarse Y = bits 5-9, nametable select = bits
  10-11, fine Y = bits 12-14. Coarse X wraps 31 -> 0 flipping the
  horizontal nametable bit; Y advances through fine Y then coarse Y,
  wrapping 29 -> 0 with a vertical nametable flip (row 31 wraps
  without the flip, the attribute-area quirk).
*/

use super::{CTRL_BG_TABLE, Ppu};

/// One prefetched background tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileFetch {
    /// Two-bit palette selector from the attribute table.
    pub attr: u8,
    /// Low bitplane for the tile row.
    pub low: u8,
    /// High bitplane for the tile row.
    pub high: u8,
}

impl Ppu {
    /// Fetch the tile addressed by `v` and queue it.
    pub(crate) fn fetch_tile(&mut self) {
        let table = usize::from(self.ctrl & CTRL_BG_TABLE != 0);
        let v = self.v;
        let coarse_x = (v & 0x1F) as u32;
        let scrolled_y = (((v >> 5) & 0x1F) * 8 + ((v >> 12) & 0x7)) as u32;

        let tile = self.nametables[self.nametable_index(0x2000 | (v & 0x0FFF))] as usize;
        let fine_row = (scrolled_y % 8) as usize;
        let low = self.pattern[table][(tile << 4) + fine_row];
        let high = self.pattern[table][(tile << 4) + fine_row + 8];

        let attr_addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
        let attr_byte = self.nametables[self.nametable_index(attr_addr)];
        let shift = match ((coarse_x / 2) % 2, (scrolled_y / 16) % 2) {
            (0, 0) => 0,
            (1, 0) => 2,
            (0, 1) => 4,
            _ => 6,
        };
        let attr = (attr_byte >> shift) & 0x3;

        self.fetch_queue.push_back(TileFetch { attr, low, high });
    }

    /// Advance coarse X one tile, flipping the horizontal nametable at
    /// column 31.
    pub(crate) fn increment_coarse_x(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Advance one line: fine Y, then coarse Y with the 29/31 wrap
    /// rules.
    pub(crate) fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
        } else {
            self.v &= !0x7000;
            let mut y = (self.v & 0x03E0) >> 5;
            if y == 29 {
                y = 0;
                self.v ^= 0x0800;
            } else if y == 31 {
                // attribute area: wrap without the nametable flip
                y = 0;
            } else {
                y += 1;
            }
            self.v = (self.v & !0x03E0) | (y << 5);
        }
    }

    /// At dot 257: restore the horizontal bits of `v` from `t`.
    pub(crate) fn copy_horizontal_bits(&mut self) {
        self.v = (self.v & !0x041F) | (self.t & 0x041F);
    }

    /// During pre-render dots 280-304: restore the vertical bits.
    pub(crate) fn copy_vertical_bits(&mut self) {
        self.v = (self.v & !0x7BE0) | (self.t & 0x7BE0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_x_wrap_flips_horizontal_nametable() {
        let mut ppu = Ppu::new();
        ppu.v = 30;
        ppu.increment_coarse_x();
        assert_eq!(ppu.v, 31);
        ppu.increment_coarse_x();
        assert_eq!(ppu.v & 0x001F, 0);
        assert_eq!(ppu.v & 0x0400, 0x0400);
        ppu.increment_coarse_x();
        assert_eq!(ppu.v, 0x0401);
    }

    #[test]
    fn y_advance_walks_fine_y_then_coarse_y() {
        let mut ppu = Ppu::new();
        for _ in 0..7 {
            ppu.increment_y();
        }
        assert_eq!(ppu.v, 0x7000);
        ppu.increment_y();
        assert_eq!(ppu.v, 0x0020); // fine Y wrapped, coarse Y = 1
    }

    #[test]
    fn coarse_y_29_wraps_with_vertical_flip_31_without() {
        let mut ppu = Ppu::new();
        ppu.v = 0x7000 | (29 << 5);
        ppu.increment_y();
        assert_eq!(ppu.v & 0x03E0, 0);
        assert_eq!(ppu.v & 0x0800, 0x0800);

        let mut ppu = Ppu::new();
        ppu.v = 0x7000 | (31 << 5);
        ppu.increment_y();
        assert_eq!(ppu.v & 0x03E0, 0);
        assert_eq!(ppu.v & 0x0800, 0);
    }

    #[test]
    fn horizontal_copy_preserves_vertical_bits() {
        let mut ppu = Ppu::new();
        ppu.v = 0x7BE0;
        ppu.t = 0x041F;
        ppu.copy_horizontal_bits();
        assert_eq!(ppu.v, 0x7FFF);
        ppu.v = 0x041F;
        ppu.t = 0x7BE0;
        ppu.copy_vertical_bits();
        assert_eq!(ppu.v, 0x7FFF);
    }

    #[test]
    fn fetch_reads_tile_attr_and_bitplanes() {
        let mut ppu = Ppu::new();
        // tile 2 at nametable entry 0, row 0
        ppu.nametables[0] = 2;
        ppu.pattern[0][2 << 4] = 0xAA;
        ppu.pattern[0][(2 << 4) + 8] = 0x55;
        // attribute byte covering the top-left quadrant
        ppu.nametables[0x03C0] = 0b0000_0011;
        ppu.fetch_tile();
        let t = ppu.fetch_queue.pop_front().unwrap();
        assert_eq!(t.low, 0xAA);
        assert_eq!(t.high, 0x55);
        assert_eq!(t.attr, 3);
    }
}
