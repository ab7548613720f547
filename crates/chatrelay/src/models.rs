//! These models represent the objects passed through the relay
//!
//! There are a few related formats we need to interact with:
//! - the inbound conversation request, sent from the chat interface
//! - openai-style chat messages, sent from the relay to the completion servers
//! - instruction presets, read from configuration
//!
//! All three use the same `{role, content}` shape, so a single `Message` type
//! serves them; roles we do not know are carried through untouched.
pub mod message;
pub mod role;
