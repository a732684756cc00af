pub mod montage;
pub mod padding;
pub mod rotate;

pub use montage::build_montage;
pub use rotate::{rotate_bound, QuarterTurn};
