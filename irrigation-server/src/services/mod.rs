mod persistence_service;
mod relay;
mod transport;

pub use persistence_service::*;
pub use relay::*;
pub use transport::*;
