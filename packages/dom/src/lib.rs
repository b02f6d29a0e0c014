//! # Shade DOM
//!
//! Arena-backed host document used by the element runtime.
//!
//! The model covers a document, elements with ordered
//! attributes, text, document fragments and shadow roots. Nodes are
//! addressed by [`NodeId`] and every structural mutation goes through
//! [`Document`], so a runtime layered on top can observe connection and
//! slot-assignment changes around each call.

pub mod dataset;
pub mod document;
pub mod error;
pub mod serializer;

#[cfg(test)]
mod tests_slots;

pub use dataset::{data_attribute_name, dataset_key};
pub use document::{Attribute, Document, NodeId, NodeKind, ShadowRootMode};
pub use error::{DomError, DomResult};
pub use serializer::to_html;
