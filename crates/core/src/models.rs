pub mod booking;
pub mod config;
pub mod interval;
pub mod slot;
