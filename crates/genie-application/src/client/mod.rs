mod state;
mod store;

pub use state::ClientState;
pub use store::{ClientHandle, ClientStore, DEFAULT_IDLE_TIMEOUT};
