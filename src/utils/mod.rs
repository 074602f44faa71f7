pub mod datastruct;
pub mod precision;
