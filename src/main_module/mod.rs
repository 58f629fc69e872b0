//! Process wiring: router assembly, health check, logging and shutdown

mod health;
mod logging;
mod server;
mod shutdown;

pub use health::*;
pub use logging::*;
pub use server::*;
pub use shutdown::*;
