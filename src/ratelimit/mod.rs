pub mod classify;
pub mod coordinator;

pub use classify::{classify, CooldownConfig, ErrorClass};
pub use coordinator::{CooldownCoordinator, CooldownTick};
