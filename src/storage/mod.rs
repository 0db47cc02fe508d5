//! Delivery of resolved tracks: download to disk, then tag

pub mod error;
pub mod fs;
pub mod operations;
pub mod tags;
