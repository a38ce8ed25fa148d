pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod ports;
pub mod publish;
pub mod sink;

pub use error::{Result, ScraperError};
pub use normalize::{normalize, SpaceRecord};
