//! Shared builders for minimal iNES (v1) images used across the test
//! suite (NROM only).
//!
//! Header fields used:
//! - bytes 0..4: b"NES\x1A"
//! - byte 4/5: PRG size in 16KiB units / CHR size in 8KiB units
//! - byte 6/7: flags (mirroring, trainer, mapper nibbles)
//!
//! For a single 16KiB PRG bank the CPU vectors land at PRG offsets
//! 0x3FFA..=0x3FFF.

#![allow(dead_code)]

/// Build an iNES image with pattern-filled payloads (PRG 0xAA, CHR
/// 0xCC).
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes =
        Vec::with_capacity(16 + trainer.map_or(0, |_| 512) + prg_16k * 16384 + chr_8k * 8192);
    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);
    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.extend(std::iter::repeat(0xAA).take(prg_16k * 16384));
    bytes.extend(std::iter::repeat(0xCC).take(chr_8k * 8192));
    bytes
}

/// Build an NROM image with `prg` placed at $8000 and vectors set.
/// `vectors` is (reset, nmi, irq), all defaulting to $8000.
pub fn build_nrom_with_prg(
    prg: &[u8],
    chr_8k: usize,
    prg_ram_8k: u8,
    vectors: Option<(u16, u16, u16)>,
) -> Vec<u8> {
    assert!(prg.len() <= 16384, "program must fit one 16KiB PRG bank");
    let mut rom = build_ines(1, chr_8k, 0, 0, prg_ram_8k, None);
    let prg_start = 16;
    rom[prg_start..prg_start + prg.len()].copy_from_slice(prg);
    // quiet fill so stray execution skips in one-cycle steps
    rom[prg_start + prg.len()..prg_start + 16384].fill(0x02);

    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(&mut rom[prg_start..prg_start + 16384], reset, nmi, irq);
    rom
}

/// Write the NMI/RESET/IRQ vectors into a 16KiB or 32KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        16384 => 0x3FFA,
        32768 => 0x7FFA,
        other => panic!("unsupported PRG length {other}"),
    };
    write_le_u16(prg, base, nmi);
    write_le_u16(prg, base + 2, reset);
    write_le_u16(prg, base + 4, irq);
}

#[inline]
fn write_le_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset] = (value & 0x00FF) as u8;
    buf[offset + 1] = (value >> 8) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_image() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom.len(), 16 + 2 * 16384 + 8192);
    }

    #[test]
    fn vectors_land_at_bank_end() {
        let mut prg = vec![0u8; 16384];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(prg[0x3FFA], 0x56);
        assert_eq!(prg[0x3FFB], 0x84);
        assert_eq!(prg[0x3FFC], 0x23);
        assert_eq!(prg[0x3FFD], 0x81);
        assert_eq!(prg[0x3FFE], 0xBC);
        assert_eq!(prg[0x3FFF], 0x8A);
    }
}
