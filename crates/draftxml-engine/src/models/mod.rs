pub mod document;
pub mod reference;

pub use document::*;
pub use reference::*;
