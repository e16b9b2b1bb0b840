pub mod auth;
pub mod catalog;
pub mod regions;
pub mod tourism_types;
pub mod tourist_spots;
