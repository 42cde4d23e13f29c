/*!
Picture pipeline.

Overview
- `Ppu::tick` advances exactly one dot. A frame is 262 scanlines of 341
  dots; scanline -1 is the pre-render line (339 dots on odd frames),
  0-239 are visible, 241 dot 1 is the vblank set-point.
- Background tiles are prefetched into a queue roughly 16 dots ahead of
  the dot that consumes them; scroll state lives in the 15-bit `v`/`t`
  registers plus `fine_x` and the shared write toggle.
- Sprites are evaluated once per visible scanline at dot 260 against the
  following scanline. Sprite-zero hits latch into the status register,
  with a one-dot delay for hits found at dots 0-1.
- The NMI line is the AND of the vblank flag and the control-register
  enable bit, sampled by the CPU at instruction boundaries.

Submodules
- `registers`: CPU-visible $2000-$2007 semantics.
- `fetch`: tile prefetch and loopy scroll arithmetic.
- `sprites`: per-scanline OAM evaluation.
- `memory`: pattern/nametable/palette physical space.
- `palette`: the 64-colour master palette.
*/

pub mod fetch;
pub mod memory;
pub mod palette;
pub mod registers;
pub mod sprites;

use std::collections::VecDeque;

use crate::cartridge::Mirroring;
use fetch::TileFetch;
use palette::SYSTEM_PALETTE;

pub const FRAME_WIDTH: usize = 256;
pub const FRAME_HEIGHT: usize = 240;

/// PPUCTRL bits.
pub(crate) const CTRL_INCREMENT_32: u8 = 0x04;
pub(crate) const CTRL_SPRITE_TABLE: u8 = 0x08;
pub(crate) const CTRL_BG_TABLE: u8 = 0x10;
pub(crate) const CTRL_NMI_ENABLE: u8 = 0x80;

/// PPUMASK bits.
pub(crate) const MASK_BG_LEFT: u8 = 0x02;
pub(crate) const MASK_SPRITE_LEFT: u8 = 0x04;
pub(crate) const MASK_BG: u8 = 0x08;
pub(crate) const MASK_SPRITES: u8 = 0x10;

/// PPUSTATUS bits.
pub(crate) const STATUS_OVERFLOW: u8 = 0x20;
pub(crate) const STATUS_SPRITE0: u8 = 0x40;
pub(crate) const STATUS_VBLANK: u8 = 0x80;

/// Dot-stepped picture processor.
pub struct Ppu {
    // CPU-visible registers
    pub(crate) ctrl: u8,
    pub(crate) mask: u8,
    pub(crate) status: u8,
    pub(crate) oam_addr: u8,
    pub(crate) read_buffer: u8,

    // loopy scroll state
    pub(crate) v: u16,
    pub(crate) t: u16,
    pub(crate) fine_x: u8,
    pub(crate) write_toggle: bool,

    // pipeline position
    pub(crate) scanline: i16,
    pub(crate) dot: u16,
    pub(crate) odd_frame: bool,
    pub(crate) frame_count: u64,
    frame_complete: bool,

    // interrupt signaling
    pub(crate) nmi_occurred: bool,
    pub(crate) nmi_output: bool,
    pub(crate) nmi_line: bool,

    // background pipeline
    pub(crate) fetch_queue: VecDeque<TileFetch>,
    pub(crate) current_tile: TileFetch,
    pub(crate) bg_opaque: [bool; FRAME_WIDTH],

    // sprite line buffers (built at dot 260 for the next scanline)
    pub(crate) sprite_line: [u8; FRAME_WIDTH],
    pub(crate) sprite_zero_line: [bool; FRAME_WIDTH],
    pub(crate) sprite_zero_pending: bool,

    // physical memory
    pub(crate) pattern: [[u8; 0x1000]; 2],
    pub(crate) nametables: [u8; 0x1000],
    pub(crate) palette_ram: [u8; 32],
    pub(crate) oam: [u8; 256],
    pub(crate) mirroring: Mirroring,

    // RGBA output, 256x240
    frame: Vec<u8>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Ppu {
            ctrl: 0,
            mask: 0,
            status: 0,
            oam_addr: 0,
            read_buffer: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            write_toggle: false,
            scanline: -1,
            dot: 0,
            odd_frame: false,
            frame_count: 0,
            frame_complete: false,
            nmi_occurred: false,
            nmi_output: false,
            nmi_line: false,
            fetch_queue: VecDeque::new(),
            current_tile: TileFetch::default(),
            bg_opaque: [false; FRAME_WIDTH],
            sprite_line: [0; FRAME_WIDTH],
            sprite_zero_line: [false; FRAME_WIDTH],
            sprite_zero_pending: false,
            pattern: [[0; 0x1000]; 2],
            nametables: [0; 0x1000],
            palette_ram: [0; 32],
            oam: [0; 256],
            mirroring: Mirroring::Horizontal,
            frame: vec![0; FRAME_WIDTH * FRAME_HEIGHT * 4],
        }
    }

    #[inline]
    pub fn scanline(&self) -> i16 {
        self.scanline
    }
    #[inline]
    pub fn dot(&self) -> u16 {
        self.dot
    }
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
    /// RGBA frame buffer, 256x240x4 bytes.
    #[inline]
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// True once per frame, at the vblank transition. Consuming read.
    pub fn take_frame_complete(&mut self) -> bool {
        let f = self.frame_complete;
        self.frame_complete = false;
        f
    }

    #[inline]
    pub(crate) fn rendering_enabled(&self) -> bool {
        self.mask & (MASK_BG | MASK_SPRITES) != 0
    }

    /// Advance one dot.
    pub fn tick(&mut self) {
        let rendering = self.rendering_enabled();

        // stale prefetch state is dropped before the next line's fetches
        if self.dot == 300 {
            self.fetch_queue.clear();
        }
        if self.dot == 257 && rendering && self.scanline < 240 {
            self.copy_horizontal_bits();
        }
        if self.coarse_x_increment_dot() && rendering && self.scanline < 240 {
            self.increment_coarse_x();
        }
        if self.dot == 256 && rendering && (0..240).contains(&self.scanline) {
            self.increment_y();
        }

        match self.scanline {
            -1 => {
                if self.dot == 1 {
                    self.status &= !(STATUS_VBLANK | STATUS_SPRITE0 | STATUS_OVERFLOW);
                    self.nmi_occurred = false;
                } else if (280..=304).contains(&self.dot)
                    && self.mask & MASK_BG != 0
                    && self.mask & MASK_SPRITES != 0
                {
                    self.copy_vertical_bits();
                }
                if self.dot == 321 || self.dot == 329 {
                    self.fetch_tile();
                }
            }
            0..=239 => self.visible_dot(),
            241 => {
                if self.dot == 1 {
                    self.nmi_occurred = true;
                    self.status |= STATUS_VBLANK;
                    self.frame_complete = true;
                }
            }
            _ => {}
        }

        self.dot += 1;
        let last_dot = if self.scanline == -1 && self.odd_frame {
            339
        } else {
            340
        };
        if self.dot > last_dot {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline == 261 {
                self.scanline = -1;
                self.odd_frame = !self.odd_frame;
                self.frame_count += 1;
            }
        }

        if self.nmi_occurred && self.nmi_output {
            self.nmi_line = true;
        }
    }

    /// Dots at which the horizontal scroll counter advances one tile.
    fn coarse_x_increment_dot(&self) -> bool {
        let d = self.dot as i32;
        let fx = self.fine_x as i32;
        ((d - fx).rem_euclid(8) == 0 && d >= 8 && d - fx < 256) || d == 328 || d == 336
    }

    fn visible_dot(&mut self) {
        let d = self.dot as i32;
        let fx = self.fine_x as i32;

        if ((d - fx - 1).rem_euclid(8) == 0 && d - fx <= 249 && d > 0) || d == 321 || d == 329 {
            self.fetch_tile();
        }
        if ((d + fx).rem_euclid(8) == 0 && d + fx < 256) || d == 0 {
            match self.fetch_queue.pop_front() {
                Some(tile) => self.current_tile = tile,
                None => log::warn!(
                    "tile prefetch queue empty at scanline {} dot {}",
                    self.scanline,
                    self.dot
                ),
            }
        }
        if self.dot == 260 {
            self.evaluate_sprites();
        }
        if self.dot == 2 && self.sprite_zero_pending {
            self.status |= STATUS_SPRITE0;
            self.sprite_zero_pending = false;
        }
        if self.dot < 256 {
            self.draw_dot();
        }
    }

    /// Composite one pixel: background layer, then sprite layer, then
    /// the sprite-zero hit test.
    fn draw_dot(&mut self) {
        let x = self.dot as usize;
        let y = self.scanline as usize;

        if self.mask & MASK_BG != 0 {
            let i = (self.dot as i32 + self.fine_x as i32).rem_euclid(8) as u8;
            let lo = (self.current_tile.low >> (7 - i)) & 1;
            let hi = (self.current_tile.high >> (7 - i)) & 1;
            let pix = (hi << 1) | lo;
            let color = if pix != 0 {
                self.bg_opaque[x] = true;
                self.palette_ram[(self.current_tile.attr * 4 + pix) as usize]
            } else {
                self.bg_opaque[x] = false;
                self.palette_ram[0]
            };
            self.put_pixel(x, y, color);
        }

        if self.mask & MASK_SPRITES != 0 && self.sprite_line[x] != 0 {
            let color = self.palette_ram[self.sprite_line[x] as usize];
            self.put_pixel(x, y, color);
        }

        // sprite-zero hit: both layers on, background opaque, not yet
        // latched this frame, never at dot 255
        if self.mask & MASK_BG != 0
            && self.mask & MASK_SPRITES != 0
            && self.status & STATUS_SPRITE0 == 0
            && self.bg_opaque[x]
            && self.dot != 255
        {
            let left_masked =
                self.mask & MASK_SPRITE_LEFT == 0 || self.mask & MASK_BG_LEFT == 0;
            if left_masked && self.dot <= 7 {
                return;
            }
            if self.sprite_zero_line[x] {
                if self.dot < 2 {
                    self.sprite_zero_pending = true;
                } else {
                    self.status |= STATUS_SPRITE0;
                }
            }
        }
    }

    fn put_pixel(&mut self, x: usize, y: usize, color: u8) {
        let (r, g, b) = SYSTEM_PALETTE[(color & 0x3F) as usize];
        let base = (y * FRAME_WIDTH + x) * 4;
        self.frame[base] = r;
        self.frame[base + 1] = g;
        self.frame[base + 2] = b;
        self.frame[base + 3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_to(ppu: &mut Ppu, scanline: i16, dot: u16) {
        while !(ppu.scanline == scanline && ppu.dot == dot) {
            ppu.tick();
        }
    }

    /// Tile 1 (solid pixel value 1) at nametable columns 0 and 4, tile 0
    /// (transparent) everywhere else; column 4 uses palette 1.
    fn striped_background() -> Ppu {
        let mut ppu = Ppu::new();
        for row in 0..8 {
            ppu.pattern[0][(1 << 4) + row] = 0xFF;
        }
        ppu.nametables[0] = 1;
        ppu.nametables[4] = 1;
        ppu.nametables[0x3C1] = 0b01;
        ppu.palette_ram[0] = 0x0F; // backdrop: black
        ppu.palette_ram[1] = 0x01; // palette 0, pixel 1: blue
        ppu.palette_ram[5] = 0x16; // palette 1, pixel 1: orange
        ppu.mask = MASK_BG | MASK_BG_LEFT;
        ppu
    }

    fn pixel(ppu: &Ppu, x: usize, y: usize) -> (u8, u8, u8) {
        let base = (y * FRAME_WIDTH + x) * 4;
        let f = ppu.frame();
        (f[base], f[base + 1], f[base + 2])
    }

    #[test]
    fn vblank_sets_at_241_1_and_clears_on_prerender() {
        let mut ppu = Ppu::new();
        tick_to(&mut ppu, 241, 1);
        assert_eq!(ppu.status & STATUS_VBLANK, 0);
        ppu.tick();
        assert_eq!(ppu.status & STATUS_VBLANK, STATUS_VBLANK);
        assert!(ppu.nmi_occurred);
        assert!(ppu.take_frame_complete());
        assert!(!ppu.take_frame_complete());

        tick_to(&mut ppu, -1, 1);
        ppu.tick();
        assert_eq!(ppu.status & STATUS_VBLANK, 0);
        assert!(!ppu.nmi_occurred);
    }

    #[test]
    fn nmi_line_requires_enable_bit() {
        let mut ppu = Ppu::new();
        tick_to(&mut ppu, 241, 2);
        assert!(!ppu.nmi_line);

        let mut ppu = Ppu::new();
        ppu.write_reg(0x2000, CTRL_NMI_ENABLE).unwrap();
        tick_to(&mut ppu, 241, 2);
        assert!(ppu.nmi_line);
    }

    #[test]
    fn enabling_nmi_mid_vblank_raises_the_line() {
        let mut ppu = Ppu::new();
        tick_to(&mut ppu, 242, 0);
        assert!(!ppu.nmi_line);
        ppu.write_reg(0x2000, CTRL_NMI_ENABLE).unwrap();
        ppu.tick();
        assert!(ppu.nmi_line);
    }

    #[test]
    fn odd_frames_drop_one_prerender_dot() {
        let mut ppu = Ppu::new();
        // frame 0: even, full length
        let mut n = 0u32;
        while ppu.frame_count == 0 {
            ppu.tick();
            n += 1;
        }
        assert_eq!(n, 262 * 341);
        // frame 1: pre-render line is one dot short
        let mut n = 0u32;
        while ppu.frame_count == 1 {
            ppu.tick();
            n += 1;
        }
        assert_eq!(n, 262 * 341 - 1);
    }

    #[test]
    fn background_tiles_land_at_their_nametable_columns() {
        let mut ppu = striped_background();
        for _ in 0..(262 * 341) {
            ppu.tick();
        }
        let blue = SYSTEM_PALETTE[0x01];
        let orange = SYSTEM_PALETTE[0x16];
        let black = SYSTEM_PALETTE[0x0F];
        // column 0 spans x 0-7, column 1 is empty, column 4 starts at 32
        assert_eq!(pixel(&ppu, 0, 0), blue);
        assert_eq!(pixel(&ppu, 7, 0), blue);
        assert_eq!(pixel(&ppu, 8, 0), black);
        assert_eq!(pixel(&ppu, 32, 0), orange);
        assert_eq!(pixel(&ppu, 40, 0), black);
        // nametable row 1 (all tile 0) starts at scanline 8
        assert_eq!(pixel(&ppu, 0, 7), blue);
        assert_eq!(pixel(&ppu, 0, 8), black);
    }

    #[test]
    fn fine_x_scroll_shifts_the_tile_seams() {
        let mut ppu = striped_background();
        ppu.write_reg(0x2005, 0x03).unwrap();
        ppu.write_reg(0x2005, 0x00).unwrap();
        for _ in 0..(262 * 341) {
            ppu.tick();
        }
        let blue = SYSTEM_PALETTE[0x01];
        let orange = SYSTEM_PALETTE[0x16];
        let black = SYSTEM_PALETTE[0x0F];
        // fine X = 3: column 0 covers x 0-4, column 1 starts at x 5
        assert_eq!(pixel(&ppu, 0, 0), blue);
        assert_eq!(pixel(&ppu, 4, 0), blue);
        assert_eq!(pixel(&ppu, 5, 0), black);
        assert_eq!(pixel(&ppu, 12, 0), black);
        // column 4 moves left with the rest of the row: x 29-36
        assert_eq!(pixel(&ppu, 28, 0), black);
        assert_eq!(pixel(&ppu, 29, 0), orange);
    }

    #[test]
    fn sprite_zero_never_hits_with_rendering_disabled() {
        let mut ppu = Ppu::new();
        // opaque tile 0 everywhere for both layers
        for row in 0..8 {
            ppu.pattern[0][row] = 0xFF;
        }
        ppu.oam[0] = 10; // y
        ppu.oam[1] = 0; // tile
        ppu.oam[2] = 0; // attributes
        ppu.oam[3] = 40; // x
        ppu.mask = 0;
        for _ in 0..(262 * 341 * 2) {
            ppu.tick();
        }
        assert_eq!(ppu.status & STATUS_SPRITE0, 0);
    }

    #[test]
    fn sprite_zero_hits_when_layers_overlap() {
        let mut ppu = Ppu::new();
        for row in 0..8 {
            ppu.pattern[0][row] = 0xFF;
        }
        ppu.oam[0] = 10;
        ppu.oam[1] = 0;
        ppu.oam[2] = 0;
        ppu.oam[3] = 40;
        ppu.mask = MASK_BG | MASK_SPRITES | MASK_BG_LEFT | MASK_SPRITE_LEFT;
        for _ in 0..(262 * 341) {
            ppu.tick();
        }
        assert_ne!(ppu.status & STATUS_SPRITE0, 0);
    }
}
