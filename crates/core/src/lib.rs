#![forbid(unsafe_code)]

pub mod catalog;
pub mod cycle;
pub mod error;
pub mod feedback;
pub mod model;
pub mod stats;
pub mod time;

pub use error::Error;
pub use time::Clock;
