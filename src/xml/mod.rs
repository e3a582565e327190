pub mod document;
pub mod errors;
pub mod locator;
pub(crate) mod query;
pub mod store;

pub use document::{escape_text, unescape, Attribute, Element, ManifestDocument, POM_NAMESPACE};
pub use errors::XmlError;
pub use locator::{find, read, FieldPath, TextHandle};
pub use store::DocumentStore;
