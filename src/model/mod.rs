//! Core data model types: parsed messages, their MIME part tree, and sender addresses.

pub mod address;
pub mod message;
