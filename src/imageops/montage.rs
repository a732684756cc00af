use image::{DynamicImage, Rgb, RgbImage};

use super::padding::place_in_cell;
use crate::errors::{CoffeeLeafError, Result};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Lay images out on a grid of square `cell`-sized tiles, one grid row per
/// input row. Each image is shrunk to fit its tile and centered.
pub fn build_montage(rows: &[Vec<DynamicImage>], cell: u32) -> Result<RgbImage> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let width = canvas_side(columns, cell)?;
    let height = canvas_side(rows.len(), cell)?;
    let mut canvas = RgbImage::from_pixel(width.max(1), height.max(1), BACKGROUND);

    for (row, images) in rows.iter().enumerate() {
        for (column, image) in images.iter().enumerate() {
            let thumbnail = if image.width() > cell || image.height() > cell {
                image.thumbnail(cell, cell).into_rgb8()
            } else {
                image.to_rgb8()
            };
            place_in_cell(
                &mut canvas,
                &thumbnail,
                column as u32 * cell,
                row as u32 * cell,
                (cell, cell),
            );
        }
    }

    Ok(canvas)
}

fn canvas_side(tiles: usize, cell: u32) -> Result<u32> {
    u32::try_from(tiles)
        .ok()
        .and_then(|tiles| tiles.checked_mul(cell))
        .ok_or_else(|| {
            CoffeeLeafError::validation(
                "tile",
                format!("{tiles} tiles of {cell} pixels do not fit in an image"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_montage_layout() -> Result<()> {
        let rows = vec![
            vec![solid(300, 300, [255, 0, 0]), solid(300, 150, [0, 255, 0])],
            vec![solid(20, 20, [0, 0, 255])],
        ];
        let montage = build_montage(&rows, 150)?;

        assert_eq!(montage.dimensions(), (300, 300));
        assert_eq!(*montage.get_pixel(75, 75), Rgb([255, 0, 0]));
        // a wide image is letterboxed inside its tile
        assert_eq!(*montage.get_pixel(225, 75), Rgb([0, 255, 0]));
        assert_eq!(*montage.get_pixel(225, 5), BACKGROUND);
        // small images are not enlarged
        assert_eq!(*montage.get_pixel(75, 225), Rgb([0, 0, 255]));
        assert_eq!(*montage.get_pixel(5, 155), BACKGROUND);
        assert_eq!(*montage.get_pixel(225, 225), BACKGROUND);
        Ok(())
    }

    #[test]
    fn test_empty_montage() -> Result<()> {
        assert_eq!(build_montage(&[], 150)?.dimensions(), (1, 1));
        Ok(())
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let rows = vec![vec![solid(1, 1, [0, 0, 0]); 3]];
        let err = build_montage(&rows, u32::MAX / 2);
        assert!(matches!(err, Err(CoffeeLeafError::Validation { .. })));
    }
}
