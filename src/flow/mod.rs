mod document;
mod step;
mod store;
mod summary;

pub use document::{AddressRecord, EditError, GraphDocument, Link, Node, NodeType, Resource};
pub use step::{flow_order, step_marker};
pub use store::{DocumentStore, JsonFileStore, StoreError};
pub use summary::{SummaryTable, description_headline};
