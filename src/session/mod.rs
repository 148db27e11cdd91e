//! Session-scoped state: account, mirrored usage, cached results, history and paging.
//!
//! A [`Session`] is owned by whichever front end drives it (the interactive UI or a
//! one-shot command) and is passed the [`crate::api::LeadApi`] to talk to for each call.

pub mod pager;
pub mod state;

pub use pager::Pager;
pub use state::{
    EMPTY_FIELDS_MESSAGE, HISTORY_LIMIT, NO_LEADS_MESSAGE, SearchOutcome, SearchPhase,
    SearchSummary, Session, StatusRefresh,
};
