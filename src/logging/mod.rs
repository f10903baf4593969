//! Rotating file logger engine
//!
//! Header formatting, rotation decisions and the file session are kept apart
//! from the synchronized writer that sequences them.

mod clock;
mod header;
mod registry;
pub mod rotation;
mod session;
mod sink;
mod writer;

pub use clock::{Clock, SystemClock};
pub use header::{format_header, CallSite};
pub use rotation::Rotation;
pub use writer::{Logger, Stats};
