//! Poll engine for the Huddle collaboration client: domain models, the
//! permission capability set, result computation, and an optimistic
//! voting state machine over a pluggable collaboration-service client.

pub mod client;
pub mod core;
pub mod error;

pub use crate::client::{ClientConfig, HttpCollaborationApi};
pub use crate::core::models::{
    MessageType, OutgoingMessage, Poll, PollOption, PollSettings, PollStatus, PollType, ShowResults, Space, SpaceRole,
    VoteRecord, VoterProfile,
};
pub use crate::core::ports::{CollaborationApi, DeleteOutcome, DeletedBy};
pub use crate::core::services::{PollSession, Viewer, VoteState};
pub use crate::error::{Error, ValidationErrors};
