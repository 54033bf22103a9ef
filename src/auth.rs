//! Application/user credentials, signature-circuit selection, and token state.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::{secret::*, state::*};
