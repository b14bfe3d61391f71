pub mod hierarchy;
pub mod line_ingester;
pub mod stats_file;
pub mod value;
