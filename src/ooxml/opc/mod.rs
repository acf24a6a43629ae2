//! Open Packaging Conventions (OPC) support.
//!
//! The post-processor needs only a thin slice of OPC: mapping part names to
//! their relationship parts ([`PackURI`]) and reading and extending a part's
//! relationship table ([`RelationshipTable`]). Physical zip handling lives
//! in [`crate::package`].
pub mod constants;
pub mod packuri;
pub mod rel;

// Re-export commonly used types
pub use packuri::PackURI;
pub use rel::{Relationship, RelationshipTable};
