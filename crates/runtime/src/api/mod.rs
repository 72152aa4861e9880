//! Public API surface of the runtime.
mod errors;
mod handle;
mod types;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
pub use types::{BattleSnapshot, PlayerCommand};
