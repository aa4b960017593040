//! `woof`: render a batch of email messages into one HTML digest.
//!
//! Each message becomes an entry with its sender, date, and the text of
//! its main body part. Entries are concatenated in input order and the
//! digest file is replaced atomically.

pub mod config;
pub mod digest;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
