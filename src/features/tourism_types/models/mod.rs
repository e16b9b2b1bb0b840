mod tourism_type;

pub use tourism_type::TourismType;
