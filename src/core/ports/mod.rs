pub mod api;

pub use api::{CollaborationApi, DeleteOutcome, DeletedBy};
