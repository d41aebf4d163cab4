//! Immutable line records and the rewindable cursor the parser walks.

pub mod line;
pub mod stream;

pub use line::{Line, Paragraph, indent_of};
pub use stream::{LineStream, Position};
