//! Space (agent) domain module.
//!
//! - `model`: A Genie space as listed by the workspace (`Space`) and the
//!   welcome banner derived from it (`WelcomeBanner`)
//! - `selection`: The selection lifecycle (`SelectionState`)

mod model;
mod selection;

pub use model::{DEFAULT_WELCOME_DESCRIPTION, DEFAULT_WELCOME_TITLE, Space, WelcomeBanner};
pub use selection::{NO_SPACES_SENTINEL, SelectionError, SelectionPhase, SelectionState};
