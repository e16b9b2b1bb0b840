mod tourism_type_dto;

pub use tourism_type_dto::TourismTypeInputDto;
