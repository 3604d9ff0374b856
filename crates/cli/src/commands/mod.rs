pub mod config;
pub mod doctor;
pub mod mappings;
pub mod serve;
