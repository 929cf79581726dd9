//! Headless capture: PNG screenshots of the framebuffer.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::Tk2000;

/// Save the current framebuffer as a PNG file.
///
/// The framebuffer is 0x00RRGGBB (`u32` array); this converts to RGBA
/// bytes for the PNG encoder.
pub fn save_screenshot(machine: &Tk2000, path: &Path) -> Result<(), Box<dyn Error>> {
    let width = machine.framebuffer_width();
    let height = machine.framebuffer_height();
    let fb = machine.framebuffer();

    let file = fs::File::create(path)?;
    let w = BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for &pixel in fb {
        rgba.push(((pixel >> 16) & 0xFF) as u8);
        rgba.push(((pixel >> 8) & 0xFF) as u8);
        rgba.push((pixel & 0xFF) as u8);
        rgba.push(0xFF);
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}
