pub mod core;
pub mod parsers;
pub mod profiles;
