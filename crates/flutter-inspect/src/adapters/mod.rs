pub mod format;
pub mod presenter;
