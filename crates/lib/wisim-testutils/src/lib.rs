pub mod agent;
pub mod bucket;
