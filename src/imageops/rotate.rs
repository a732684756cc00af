use image::DynamicImage;

/// Clockwise rotations that keep every pixel inside the output bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTurn {
    R0,
    R90,
    R180,
    R270,
}

impl QuarterTurn {
    pub const ALL: [QuarterTurn; 4] = [Self::R0, Self::R90, Self::R180, Self::R270];

    pub const fn degrees(self) -> u32 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }

    pub const fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Self::R0),
            90 => Some(Self::R90),
            180 => Some(Self::R180),
            270 => Some(Self::R270),
            _ => None,
        }
    }
}

/// Rotate clockwise, growing the canvas so nothing is cropped. For quarter
/// turns this swaps width and height at 90 and 270 degrees.
pub fn rotate_bound(image: &DynamicImage, turn: QuarterTurn) -> DynamicImage {
    match turn {
        QuarterTurn::R0 => image.clone(),
        QuarterTurn::R90 => image.rotate90(),
        QuarterTurn::R180 => image.rotate180(),
        QuarterTurn::R270 => image.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn marked_image() -> DynamicImage {
        // 3x2 with a red top-left pixel
        let mut image = RgbImage::from_pixel(3, 2, Rgb([0, 0, 0]));
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        DynamicImage::ImageRgb8(image)
    }

    #[test]
    fn test_degrees_round_trip() {
        for turn in QuarterTurn::ALL {
            assert_eq!(QuarterTurn::from_degrees(turn.degrees()), Some(turn));
        }
        assert_eq!(QuarterTurn::from_degrees(450), Some(QuarterTurn::R90));
        assert_eq!(QuarterTurn::from_degrees(45), None);
    }

    #[test]
    fn test_rotate_bound_dimensions() {
        let image = marked_image();
        assert_eq!(rotate_bound(&image, QuarterTurn::R0).dimensions(), (3, 2));
        assert_eq!(rotate_bound(&image, QuarterTurn::R90).dimensions(), (2, 3));
        assert_eq!(rotate_bound(&image, QuarterTurn::R180).dimensions(), (3, 2));
        assert_eq!(rotate_bound(&image, QuarterTurn::R270).dimensions(), (2, 3));
    }

    #[test]
    fn test_rotation_is_clockwise() {
        let image = marked_image();
        let red = image::Rgba([255, 0, 0, 255]);

        // top-left moves to top-right after a clockwise quarter turn
        assert_eq!(rotate_bound(&image, QuarterTurn::R90).get_pixel(1, 0), red);
        assert_eq!(rotate_bound(&image, QuarterTurn::R180).get_pixel(2, 1), red);
        assert_eq!(rotate_bound(&image, QuarterTurn::R270).get_pixel(0, 2), red);
    }
}
