mod control;
mod registry;
mod service;

pub use control::{ControlState, validate_limits};
pub use registry::DeviceRegistry;
pub use service::{Connection, RelayHandle, RelayService, RelaySnapshot};
