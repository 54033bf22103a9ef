//! Token secrets and the mutable authorization state populated by grants.

pub mod secret;
pub mod state;
