//! Generic, authorization-aware CRUD and filtering shared by every catalog resource.
//!
//! A resource type implements [`resource::Resource`] to describe its columns, policy
//! binding and allow-listed filter/ordering fields. [`services::ResourceService`] and the
//! handlers in [`handlers`] are instantiated once per resource.

pub mod handlers;
pub mod query;
pub mod resource;
pub mod routes;
pub mod services;

use crate::core::store::Relation;
use crate::features::regions::{CityResource, ProvinceResource};
use crate::features::tourism_types::TourismTypeResource;
use crate::features::tourist_spots::TouristSpotResource;
use resource::Resource;

pub use services::ResourceService;

/// Every foreign key declared by the catalog, used by stores that enforce
/// delete behaviour themselves.
pub fn relations() -> Vec<Relation> {
    let mut relations = ProvinceResource::relations();
    relations.extend(CityResource::relations());
    relations.extend(TourismTypeResource::relations());
    relations.extend(TouristSpotResource::relations());
    relations
}
