//! Image decoding for the optional spacecraft icon.

use std::path::Path;

pub fn load_icon(path: &Path) -> Result<egui::ColorImage, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    decode_icon(&bytes)
}

pub fn decode_icon(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    use std::io::Cursor;
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| format!("Failed to guess format: {}", e))?;
    let img = reader
        .decode()
        .map_err(|e| format!("Failed to decode image: {}", e))?
        .to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_png_round_trip() {
        let mut png = Vec::new();
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_icon(&png).unwrap();
        assert_eq!(decoded.size, [3, 2]);
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(decode_icon(b"definitely not an image").is_err());
    }
}
