//! Tourism categories. Every operation except the open filter endpoint is admin only.

pub mod dtos;
pub mod models;
pub mod resources;

pub use resources::TourismTypeResource;
