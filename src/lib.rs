pub mod constants;
mod declination;
pub mod env_state;
pub mod geodesy;
pub mod geometry;
pub mod gradient;
pub mod karst;
pub mod karst_errors;
pub mod model;
pub mod persistence;
pub mod reconstruction;
pub mod segments;
pub mod traversal;
