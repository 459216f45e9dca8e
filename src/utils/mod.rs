pub mod currency;
pub mod ids;
pub mod token;
