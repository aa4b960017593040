//! Digest entry rendering: part selection, charset normalization, and text output.

pub mod charset;
pub mod message;
pub mod select;
pub mod text;
