mod control;
mod device;
mod limit;
mod sensor;

pub use control::*;
pub use device::*;
pub use limit::*;
pub use sensor::*;

pub type Id = i64;
