pub mod handler;
pub mod listener;
pub mod manager;
pub mod error;

pub type Result<T> = std::result::Result<T, Error>;

use error::Error;
pub use manager::GatewayManager;
