//! Relay: routes extract/derive messages from the channel to the target
//! tab, the interpretation client and the store.

pub mod messages;
pub mod relay;

pub use messages::{Message, Reply};
pub use relay::Relay;
