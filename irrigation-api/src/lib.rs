pub mod codec;
pub mod message;
pub mod models;

pub use codec::{CodecError, decode, encode};
pub use message::{ClientMessage, ServerMessage};
pub use models::*;
