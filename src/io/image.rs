use log::info;
use std::path::Path;

/// Saves a 0xAARRGGBB framebuffer (the same layout the window uses) as a
/// PNG file.
pub fn save_argb_buffer<P: AsRef<Path>>(
    buffer: &[u32],
    width: usize,
    height: usize,
    path: P,
) -> Result<(), String> {
    let path = path.as_ref();
    if buffer.len() != width * height {
        return Err(format!(
            "buffer size {} does not match {width}x{height}",
            buffer.len()
        ));
    }

    let mut pixels = Vec::with_capacity(width * height * 4);
    for &argb in buffer {
        pixels.push((argb >> 16) as u8);
        pixels.push((argb >> 8) as u8);
        pixels.push(argb as u8);
        pixels.push((argb >> 24) as u8);
    }

    let img = image::RgbaImage::from_raw(width as u32, height as u32, pixels)
        .ok_or_else(|| "failed to build image from buffer".to_string())?;
    img.save(path)
        .map_err(|e| format!("failed to save {path:?}: {e}"))?;
    info!("wrote {path:?} ({width}x{height})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_mismatch_is_rejected() {
        let buffer = vec![0u32; 7];
        assert!(save_argb_buffer(&buffer, 4, 4, "unused.png").is_err());
    }

    #[test]
    fn round_trips_through_a_temp_file() {
        let path = std::env::temp_dir().join("pbr_viewer_io_test.png");
        let buffer = vec![0xFF112233u32; 4];
        save_argb_buffer(&buffer, 2, 2, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        let px = loaded.get_pixel(0, 0);
        assert_eq!(px.0, [0x11, 0x22, 0x33, 0xFF]);
        std::fs::remove_file(&path).ok();
    }
}
