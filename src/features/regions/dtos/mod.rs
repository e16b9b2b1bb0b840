mod region_dto;

pub use region_dto::{CityInputDto, ProvinceInputDto};
