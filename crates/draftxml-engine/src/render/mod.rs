//! Output serializers for a parsed [`Document`](crate::models::Document).

pub mod xml;

pub use xml::{OUTPUT_SCHEMA, RenderOptions, is_attribute, render_xml};
