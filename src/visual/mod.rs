pub mod city;

pub use city::CityView;
