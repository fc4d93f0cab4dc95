//! In-memory stores shared by every connection handler. Each store owns one
//! map behind one lock, so same-key operations (ensure, append, join/leave,
//! report) are atomic; nothing here is ambient global state.

mod bus;
mod log;
mod presence;
mod registry;

pub use bus::{Envelope, RoomBus};
pub use log::MessageLog;
pub use presence::PresenceTracker;
pub use registry::{RoomNotFound, RoomRegistry};
