use crate::error::{DtmError, Result};

/// Encodes an 8-bit RGBA buffer as PNG.
pub fn encode_png(rgba: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let expected = width * height * 4;
    if rgba.len() != expected {
        return Err(DtmError::ShapeMismatch {
            expected,
            actual: rgba.len(),
        });
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width as u32, height as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba)?;
        writer.finish()?;
    }

    Ok(out)
}

/// Places two `width x height` RGBA panels next to each other, separated by
/// `gap` transparent columns.
pub fn side_by_side(left: &[u8], right: &[u8], width: usize, height: usize, gap: usize) -> Vec<u8> {
    let panel_row = width * 4;
    let out_row = (2 * width + gap) * 4;
    let mut out = vec![0u8; out_row * height];

    for row in 0..height {
        let src = row * panel_row..(row + 1) * panel_row;
        let dst = row * out_row;
        out[dst..dst + panel_row].copy_from_slice(&left[src.clone()]);
        let right_start = dst + (width + gap) * 4;
        out[right_start..right_start + panel_row].copy_from_slice(&right[src]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_png_header() {
        let rgba = vec![255u8; 3 * 2 * 4];
        let bytes = encode_png(&rgba, 3, 2).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoder = png::Decoder::new(Cursor::new(bytes));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.color_type, png::ColorType::Rgba);
    }

    #[test]
    fn test_encode_png_rejects_wrong_length() {
        let result = encode_png(&[0u8; 10], 2, 2);
        assert!(matches!(
            result,
            Err(DtmError::ShapeMismatch {
                expected: 16,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_side_by_side_layout() {
        let left = vec![1u8; 2 * 2 * 4];
        let right = vec![2u8; 2 * 2 * 4];
        let out = side_by_side(&left, &right, 2, 2, 1);

        // 5 pixels per row
        assert_eq!(out.len(), 5 * 2 * 4);
        let row1 = &out[20..40];
        assert!(row1[..8].iter().all(|&v| v == 1));
        assert!(row1[8..12].iter().all(|&v| v == 0));
        assert!(row1[12..].iter().all(|&v| v == 2));
    }
}
