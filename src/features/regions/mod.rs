//! Administrative regions: provinces and the cities inside them.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Policy |
//! |--------|----------|--------|
//! | GET | `/api/provinces`, `/api/cities` | admin or editor |
//! | POST | `/api/provinces`, `/api/cities` | admin or editor to enter, then admin only |
//! | GET/PUT/DELETE | `/api/provinces/{id}`, `/api/cities/{id}` | admin or editor |
//! | GET | `/provinces/filter`, `/cities/filter` | open |
//!
//! Deleting a province deletes its cities.

pub mod dtos;
pub mod models;
pub mod resources;

pub use resources::{CityResource, ProvinceResource};
