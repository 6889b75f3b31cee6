//! Use cases of the Genie chat application.
//!
//! Every browser session owns a [`ClientState`] held in the [`ClientStore`].
//! A chat turn flows through the [`ChatPipeline`] stages (submit, fetch,
//! render), which hand off to each other with [`ChatEvent`]s.

pub mod chat_pipeline;
pub mod client;
pub mod insight_service;
pub mod space_service;

pub use chat_pipeline::{ChatEvent, ChatPipeline};
pub use client::{ClientHandle, ClientState, ClientStore};
pub use insight_service::{InsightOutcome, InsightService, NO_INSIGHT_DATA_TEXT};
pub use space_service::SpaceService;
