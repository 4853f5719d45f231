#![forbid(unsafe_code)]

pub mod logger;
pub mod measurement;
pub mod writer;
