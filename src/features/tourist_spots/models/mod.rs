mod tourist_spot;

pub use tourist_spot::{SpotStatus, TouristSpot};
