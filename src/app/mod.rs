//! Application core: wake orchestration with no direct I/O.
//!
//! The sleep scheduler ([`service::WakeService`]) and everything it drives
//! talk to hardware only through the **port traits** in [`ports`], so a
//! full wake can run on the host against mock adapters.

pub mod events;
pub mod ports;
pub mod service;
