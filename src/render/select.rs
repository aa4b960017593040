//! Part selection: which leaf of a MIME tree is shown in the digest.
//!
//! - `multipart/alternative`: one preferred child (see [`preferred_alternative`]).
//! - any other multipart: the first child. Later children are attachments
//!   or inline resources and are never excerpted.
//! - embedded message: its root part.
//! - leaf: itself.

use crate::model::message::{Leaf, Part};

/// Walk `part` down to the leaf that represents its readable content.
///
/// Returns `None` when the walk reaches an empty multipart.
pub fn select_leaf(part: &Part) -> Option<&Leaf> {
    let mut part = part;
    loop {
        part = match part {
            Part::Leaf(leaf) => return Some(leaf),
            Part::Message(inner) => &inner.root,
            Part::Multipart(mp) if mp.subtype == "alternative" => {
                preferred_alternative(&mp.children)?
            }
            Part::Multipart(mp) => mp.children.first()?,
        };
    }
}

/// Choose among the children of a `multipart/alternative`.
///
/// Priority: the first container child (multipart or embedded message),
/// then the first `text/html` leaf, then the first `text/plain` leaf,
/// then the last child. `None` only when there are no children.
pub fn preferred_alternative(children: &[Part]) -> Option<&Part> {
    children
        .iter()
        .find(|child| child.is_container())
        .or_else(|| children.iter().find(|child| is_leaf_of_type(child, "text/html")))
        .or_else(|| children.iter().find(|child| is_leaf_of_type(child, "text/plain")))
        .or_else(|| children.last())
}

fn is_leaf_of_type(part: &Part, media_type: &str) -> bool {
    matches!(part, Part::Leaf(leaf) if leaf.media_type == media_type)
}
