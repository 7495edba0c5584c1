mod luhn;
mod points;

pub mod helpers;
pub mod op;

pub use luhn::is_luhn_valid;
pub use points::{Points, PointsConversionError};
