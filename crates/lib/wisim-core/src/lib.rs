#![forbid(unsafe_code)]

pub use hashbrown;

pub mod agent;
pub mod bucket;
pub mod scheduler;
