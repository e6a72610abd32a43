pub mod basic;
pub mod light;
pub mod overlay;
