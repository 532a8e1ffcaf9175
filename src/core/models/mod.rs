pub mod message;
pub mod option;
pub mod poll;
pub mod space;
pub mod vote;

pub use message::{MessageType, OutgoingMessage};
pub use option::PollOption;
pub use poll::{Poll, PollSettings, PollStatus, PollType, ShowResults};
pub use space::{Space, SpaceRole};
pub use vote::{VoteRecord, VoterProfile};
