mod tourist_spot_dto;

pub use tourist_spot_dto::TouristSpotInputDto;
