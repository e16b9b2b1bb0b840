//! Tourist spot listings.
//!
//! Every write stamps the audit columns from the authenticated caller:
//! `created_by`/`created_on` once at creation, `updated_by` on update, and
//! `last_modified` on both. Client-supplied values for these columns are ignored.

pub mod dtos;
pub mod models;
pub mod resources;

pub use resources::TouristSpotResource;
