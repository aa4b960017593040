//! Email parsing: header decoding, transfer encodings, and MIME structure.

pub mod header;
pub mod mime;
pub mod transfer;
