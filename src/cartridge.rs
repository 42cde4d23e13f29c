/*!
iNES (v1) cartridge loader.

Parses the 16-byte header, skips an optional 512-byte trainer and takes
the PRG and CHR payloads. Only mapper 0 (NROM) is supported; anything
else is a typed load error, never a silent fallback.
*/

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

const HEADER_LEN: usize = 16;
const PRG_UNIT: usize = 16 * 1024;
const CHR_UNIT: usize = 8 * 1024;
const TRAINER_LEN: usize = 512;

/// Nametable arrangement from header flags 6 bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

/// Errors from parsing an iNES image.
#[derive(Debug)]
pub enum CartridgeError {
    Io(io::Error),
    /// Missing or wrong "NES\x1A" magic, or truncated header.
    BadHeader,
    /// Image shorter than the sizes its header promises.
    Truncated { expected: usize, actual: usize },
    /// Mapper other than NROM.
    UnsupportedMapper(u8),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::Io(e) => write!(f, "i/o error: {e}"),
            CartridgeError::BadHeader => write!(f, "not an iNES image"),
            CartridgeError::Truncated { expected, actual } => {
                write!(f, "truncated image: expected {expected} bytes, got {actual}")
            }
            CartridgeError::UnsupportedMapper(m) => {
                write!(f, "unsupported mapper {m} (NROM only)")
            }
        }
    }
}

impl std::error::Error for CartridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CartridgeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CartridgeError {
    fn from(e: io::Error) -> Self {
        CartridgeError::Io(e)
    }
}

/// Parsed NROM cartridge.
pub struct Cartridge {
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
    mirroring: Mirroring,
}

impl Cartridge {
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let bytes = fs::read(path)?;
        Self::from_ines_bytes(&bytes)
    }

    pub fn from_ines_bytes(bytes: &[u8]) -> Result<Self, CartridgeError> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != b"NES\x1A" {
            return Err(CartridgeError::BadHeader);
        }
        let prg_units = bytes[4] as usize;
        let chr_units = bytes[5] as usize;
        let flags6 = bytes[6];
        let flags7 = bytes[7];

        let mapper = (flags7 & 0xF0) | (flags6 >> 4);
        if mapper != 0 {
            return Err(CartridgeError::UnsupportedMapper(mapper));
        }

        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mut offset = HEADER_LEN;
        if flags6 & 0x04 != 0 {
            offset += TRAINER_LEN;
        }

        let prg_len = prg_units * PRG_UNIT;
        let chr_len = chr_units * CHR_UNIT;
        let expected = offset + prg_len + chr_len;
        if bytes.len() < expected {
            return Err(CartridgeError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let prg_rom = bytes[offset..offset + prg_len].to_vec();
        let chr_rom = bytes[offset + prg_len..offset + prg_len + chr_len].to_vec();
        log::debug!(
            "cartridge: prg {}K, chr {}K, {:?} mirroring",
            prg_len / 1024,
            chr_len / 1024,
            mirroring
        );

        Ok(Cartridge {
            prg_rom,
            chr_rom,
            mirroring,
        })
    }

    #[inline]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    #[inline]
    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    #[inline]
    pub fn chr_rom(&self) -> &[u8] {
        &self.chr_rom
    }

    /// CPU read in $8000-$FFFF; 16KB images are mirrored into both
    /// halves.
    pub fn prg_read(&self, addr: u16) -> u8 {
        if self.prg_rom.is_empty() {
            return 0xFF;
        }
        let offset = (addr as usize - 0x8000) % self.prg_rom.len();
        self.prg_rom[offset]
    }
}
