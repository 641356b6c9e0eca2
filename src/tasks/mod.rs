//! Background Tasks Module
//!
//! Contains background tasks owned by cache instances.
//!
//! # Tasks
//! - Expiry sweep: removes expired cache entries at the configured interval

mod sweep;

pub(crate) use sweep::spawn_sweep_task;
