pub mod device;
pub mod error;
pub mod tune;

pub use device::{MsrDevice, SysMsr};
pub use error::{Result, ZentuneError};
pub use tune::{apply, list, plan, PstateRequest, PstateUpdate};
