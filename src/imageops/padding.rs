use image::{imageops, GenericImage, GenericImageView};

/// Offset that centers a `width`x`height` image inside a
/// `pad_width`x`pad_height` cell, or `None` when it does not fit.
pub fn center_offset(
    width: u32,
    height: u32,
    pad_width: u32,
    pad_height: u32,
) -> Option<(i64, i64)> {
    if width > pad_width || height > pad_height {
        return None;
    }

    let x = (pad_width - width) / 2;
    let y = (pad_height - height) / 2;
    Some((i64::from(x), i64::from(y)))
}

/// Overlay `image` into the cell of `canvas` whose top-left corner is
/// `(cell_x, cell_y)`, centered. Returns `false` when the image does not fit
/// the cell.
pub fn place_in_cell<C, I>(
    canvas: &mut C,
    image: &I,
    cell_x: u32,
    cell_y: u32,
    cell_size: (u32, u32),
) -> bool
where
    C: GenericImage,
    I: GenericImageView<Pixel = C::Pixel>,
{
    let (width, height) = image.dimensions();
    match center_offset(width, height, cell_size.0, cell_size.1) {
        Some((x, y)) => {
            imageops::overlay(canvas, image, i64::from(cell_x) + x, i64::from(cell_y) + y);
            true
        }
        None => false,
    }
}
