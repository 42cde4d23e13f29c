/*!
Runner binary.

Headless by default: runs a fixed number of frames and prints the final
CPU state. With the `display` feature a minifb window presents each
completed frame and samples the keyboard into the controller
(Z/X = A/B, Right Shift = Select, Enter = Start, arrows = D-pad). The
`screenshot` feature writes the final frame as a PNG.

Without a ROM argument a tiny built-in image runs: it sets a backdrop
colour through the data port, enables the background layer and spins.
*/

use std::path::PathBuf;

use clap::Parser;
use famicore::{Cartridge, Nes};

#[derive(Parser, Debug)]
#[command(name = "famicore", about = "Cycle-granular NES CPU/PPU core runner")]
struct Args {
    /// Path to an iNES (v1) ROM; runs a built-in demo image when omitted
    #[arg(short, long)]
    rom: Option<PathBuf>,

    /// Frames to run in headless mode
    #[arg(short, long, default_value_t = 60)]
    frames: u64,

    /// Window scale factor (1-4)
    #[cfg(feature = "display")]
    #[arg(short, long, default_value_t = 2)]
    scale: usize,

    /// Write the final frame to this PNG path
    #[cfg(feature = "screenshot")]
    #[arg(long)]
    screenshot: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let cartridge = match &args.rom {
        Some(path) => Cartridge::from_ines_file(path)?,
        None => Cartridge::from_ines_bytes(&demo_image())?,
    };
    let mut nes = Nes::new();
    nes.insert_cartridge(cartridge)?;

    #[cfg(feature = "display")]
    run_window(&mut nes, args.scale)?;

    #[cfg(not(feature = "display"))]
    {
        for _ in 0..args.frames {
            nes.run_frame()?;
        }
        let cpu = nes.cpu();
        println!(
            "ran {} frames: pc={:#06X} a={:#04X} x={:#04X} y={:#04X} sp={:#06X}",
            args.frames,
            cpu.pc(),
            cpu.a(),
            cpu.x(),
            cpu.y(),
            cpu.sp()
        );
    }

    #[cfg(feature = "screenshot")]
    if let Some(path) = &args.screenshot {
        image::save_buffer(
            path,
            nes.frame(),
            famicore::ppu::FRAME_WIDTH as u32,
            famicore::ppu::FRAME_HEIGHT as u32,
            image::ExtendedColorType::Rgba8,
        )?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

#[cfg(feature = "display")]
fn run_window(nes: &mut Nes, scale: usize) -> Result<(), Box<dyn std::error::Error>> {
    use famicore::Button;
    use famicore::ppu::{FRAME_HEIGHT, FRAME_WIDTH};
    use minifb::{Key, Window, WindowOptions};

    let scale = scale.clamp(1, 4);
    let mut window = Window::new(
        "famicore",
        FRAME_WIDTH * scale,
        FRAME_HEIGHT * scale,
        WindowOptions::default(),
    )?;
    window.set_target_fps(60);

    let keymap: [(Key, Button); 8] = [
        (Key::Z, Button::A),
        (Key::X, Button::B),
        (Key::RightShift, Button::Select),
        (Key::Enter, Button::Start),
        (Key::Up, Button::Up),
        (Key::Down, Button::Down),
        (Key::Left, Button::Left),
        (Key::Right, Button::Right),
    ];

    let mut pixels = vec![0u32; FRAME_WIDTH * FRAME_HEIGHT];
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let mut mask = 0u8;
        for (key, button) in keymap {
            if window.is_key_down(key) {
                mask |= 1 << (button as u8);
            }
        }
        nes.set_buttons(mask);
        nes.run_frame()?;

        let frame = nes.frame();
        for (i, px) in pixels.iter_mut().enumerate() {
            let r = frame[i * 4] as u32;
            let g = frame[i * 4 + 1] as u32;
            let b = frame[i * 4 + 2] as u32;
            *px = (r << 16) | (g << 8) | b;
        }
        window.update_with_buffer(&pixels, FRAME_WIDTH, FRAME_HEIGHT)?;
    }
    Ok(())
}

/// Minimal NROM image: set the backdrop colour, enable the background
/// layer, spin forever.
fn demo_image() -> Vec<u8> {
    let program: [u8; 23] = [
        0xA9, 0x3F, 0x8D, 0x06, 0x20, // LDA #$3F; STA $2006
        0xA9, 0x00, 0x8D, 0x06, 0x20, // LDA #$00; STA $2006
        0xA9, 0x21, 0x8D, 0x07, 0x20, // LDA #$21; STA $2007
        0xA9, 0x0A, 0x8D, 0x01, 0x20, // LDA #$0A; STA $2001
        0x4C, 0x14, 0x80, // JMP $8014
    ];
    let mut rom = vec![0u8; 16 + 16 * 1024];
    rom[0..4].copy_from_slice(b"NES\x1A");
    rom[4] = 1; // one 16KiB PRG bank, no CHR
    rom[16..16 + program.len()].copy_from_slice(&program);
    for (offset, vector) in [(0x3FFA, 0x8000u16), (0x3FFC, 0x8000), (0x3FFE, 0x8000)] {
        rom[16 + offset] = (vector & 0x00FF) as u8;
        rom[16 + offset + 1] = (vector >> 8) as u8;
    }
    rom
}
