#![forbid(unsafe_code)]

pub mod control;
pub mod dist;
pub mod flow;
pub mod mobility;
pub mod propagation;
