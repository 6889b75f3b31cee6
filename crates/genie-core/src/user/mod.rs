//! User domain module.
//!
//! The chat service sits behind an authenticating proxy that forwards the
//! signed-in user's identity and access token as request headers.
//!
//! - `model`: Forwarded identity (`ForwardedUser`) and display-name parsing

mod model;

pub use model::{
    FORWARDED_TOKEN_HEADER, FORWARDED_USERNAME_HEADER, ForwardedUser, display_name_from_username,
};
