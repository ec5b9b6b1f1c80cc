#![deny(clippy::all)]

mod color;
pub mod telemetry;

pub use color::Colors;
pub use color::init as color_init;
