pub mod batch;
pub mod config;
pub mod fuzzy;
pub mod output;
pub mod similarity;
pub mod stderr_buffer;
