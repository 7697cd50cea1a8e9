//! Classification session: status machine, pure session state and the async
//! controller that drives it.

mod controller;
mod state;
mod status;

pub use controller::SessionController;
pub use state::{ClassificationSession, PendingCall, Ticket};
pub use status::SessionStatus;
