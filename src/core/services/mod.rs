pub mod capabilities;
pub mod notify;
pub mod results;
pub mod session;

pub use capabilities::Viewer;
pub use session::{PollSession, Replica, VoteState};
