/*!
Sprite evaluation.

Runs once per visible scanline at dot 260 and builds the line buffers
consumed while drawing the following scanline: a palette index per
pixel (0 = transparent) and the sprite-zero coverage map used by the
hit test. All 64 OAM entries are walked; later entries overwrite
earlier ones. 8x8 sprites only.
*/

use super::{CTRL_SPRITE_TABLE, Ppu};

impl Ppu {
    /// Evaluate OAM against the next scanline.
    pub(crate) fn evaluate_sprites(&mut self) {
        self.sprite_line = [0; 256];
        self.sprite_zero_line = [false; 256];

        let table = usize::from(self.ctrl & CTRL_SPRITE_TABLE != 0);
        let next = self.scanline + 1;

        for i in 0..64 {
            let y = self.oam[i * 4] as i16;
            let tile = self.oam[i * 4 + 1] as usize;
            let attr = self.oam[i * 4 + 2];
            let x = self.oam[i * 4 + 3] as usize;
            if next <= y || next > y + 8 {
                continue;
            }

            let row = (self.scanline - y) as usize;
            let low = self.pattern[table][(tile << 4) + row];
            let high = self.pattern[table][(tile << 4) + row + 8];
            let palette_sel = (attr & 0x3) + 4;
            let hflip = attr & 0x40 != 0;

            for k in 0..8 {
                let px = x + k;
                if px >= 256 {
                    break;
                }
                let bit = if hflip { k } else { 7 - k };
                let lo = (low >> bit) & 1;
                let hi = (high >> bit) & 1;
                let pix = (hi << 1) | lo;
                if pix != 0 {
                    self.sprite_line[px] = palette_sel * 4 + pix;
                    if i == 0 {
                        self.sprite_zero_line[px] = true;
                    }
                } else {
                    self.sprite_line[px] = 0;
                }
            }
        }
    }
}
