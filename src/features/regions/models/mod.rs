mod city;
mod province;

pub use city::City;
pub use province::Province;
