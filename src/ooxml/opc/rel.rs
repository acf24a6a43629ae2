//! Relationship-related objects for OPC packages.
//!
//! This module provides typed access to a part's relationship table (a
//! `.rels` part). The table is kept as its parsed XML tree so that entries
//! this crate does not touch are written back verbatim; only cloned entries
//! are ever inserted.
use crate::common::xml::{XmlDocument, XmlElement};
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::packuri::PackURI;
use std::collections::HashSet;

/// A single relationship from a source part to a target.
///
/// Represents a connection between parts in an OPC package, identified by an rId
/// (relationship ID). Can be either internal (pointing to another part) or external
/// (pointing to an external URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part URI or external URL
    target_ref: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    /// Read a relationship from a `<Relationship>` element.
    fn from_element(element: &XmlElement) -> Option<Self> {
        Some(Self {
            r_id: element.attribute("Id")?.to_string(),
            reltype: element.attribute("Type").unwrap_or_default().to_string(),
            target_ref: element.attribute("Target")?.to_string(),
            is_external: element.attribute("TargetMode") == Some(target_mode::EXTERNAL),
        })
    }

    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference.
    ///
    /// For internal relationships, this is a part reference relative to the
    /// source part's directory. For external relationships, an absolute URL.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the member name of the target part for internal relationships.
    ///
    /// Returns `None` for external relationships or unresolvable references.
    pub fn target_member(&self, base_uri: &str) -> Option<String> {
        if self.is_external {
            return None;
        }
        PackURI::from_rel_ref(base_uri, &self.target_ref)
            .ok()
            .map(|uri| uri.membername().to_string())
    }
}

/// The relationship table of one source part.
///
/// Wraps the parsed `.rels` document. Lookups go through the `<Relationship>`
/// children of the root; insertions clone an existing element so any extra
/// attributes survive.
#[derive(Debug, Clone)]
pub struct RelationshipTable {
    /// Member name of the `.rels` part, for error messages
    part_name: String,

    /// Parsed `.rels` document
    doc: XmlDocument,

    /// Whether an entry was inserted since parsing
    modified: bool,
}

impl RelationshipTable {
    /// Parse a relationship table from its XML text.
    pub fn parse(part_name: &str, xml: &str) -> Result<Self> {
        let doc = XmlDocument::parse(part_name, xml)?;
        if doc.root().local_name() != "Relationships" {
            return Err(Error::parse(
                part_name,
                format!("expected <Relationships> root, found <{}>", doc.root().name()),
            ));
        }
        Ok(Self {
            part_name: part_name.to_string(),
            doc,
            modified: false,
        })
    }

    /// Member name of the `.rels` part this table was read from.
    #[inline]
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.doc
            .root()
            .child_elements()
            .filter(|e| e.local_name() == "Relationship")
    }

    /// Get a relationship by its ID.
    pub fn get(&self, r_id: &str) -> Option<Relationship> {
        self.elements()
            .find(|e| e.attribute("Id") == Some(r_id))
            .and_then(Relationship::from_element)
    }

    /// Get a relationship by its ID, failing with [`Error::RelationNotFound`].
    pub fn require(&self, r_id: &str, source_part: &str) -> Result<Relationship> {
        self.get(r_id).ok_or_else(|| Error::RelationNotFound {
            part: source_part.to_string(),
            id: r_id.to_string(),
        })
    }

    /// Get an iterator over all well-formed relationships, in document order.
    pub fn iter(&self) -> impl Iterator<Item = Relationship> + '_ {
        self.elements().filter_map(Relationship::from_element)
    }

    /// Whether an entry with this ID exists.
    pub fn contains_id(&self, r_id: &str) -> bool {
        self.elements().any(|e| e.attribute("Id") == Some(r_id))
    }

    /// Whether an entry already points at this target reference.
    pub fn contains_target(&self, target_ref: &str) -> bool {
        self.elements().any(|e| e.attribute("Target") == Some(target_ref))
    }

    /// Get the number of relationships in the table.
    pub fn len(&self) -> usize {
        self.elements().count()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// IDs that occur more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for id in self.elements().filter_map(|e| e.attribute("Id")) {
            if !seen.insert(id) && !duplicates.iter().any(|d: &String| d == id) {
                duplicates.push(id.to_string());
            }
        }
        duplicates
    }

    /// Clone the entry `r_id` under a new ID and target, appending it.
    ///
    /// The new ID and target must not exist yet; violating either fails with
    /// [`Error::InvalidFormat`] and leaves the table unchanged.
    pub fn duplicate(
        &mut self,
        r_id: &str,
        new_r_id: &str,
        new_target: &str,
    ) -> Result<Relationship> {
        if self.contains_id(new_r_id) {
            return Err(Error::InvalidFormat(format!(
                "Relationship id '{}' already exists in {}",
                new_r_id, self.part_name
            )));
        }
        if self.contains_target(new_target) {
            return Err(Error::InvalidFormat(format!(
                "Relationship target '{}' already exists in {}",
                new_target, self.part_name
            )));
        }

        let mut clone = self
            .elements()
            .find(|e| e.attribute("Id") == Some(r_id))
            .cloned()
            .ok_or_else(|| Error::RelationNotFound {
                part: self.part_name.clone(),
                id: r_id.to_string(),
            })?;
        clone.set_attribute("Id", new_r_id);
        clone.set_attribute("Target", new_target);

        let relationship = Relationship::from_element(&clone).ok_or_else(|| {
            Error::InvalidFormat(format!("Relationship '{}' is missing attributes", r_id))
        })?;
        self.doc.root_mut().push_element(clone);
        self.modified = true;
        Ok(relationship)
    }

    /// Whether entries were inserted since the table was parsed.
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Serialize the table back to XML.
    pub fn to_xml(&self) -> String {
        self.doc.to_xml()
    }
}
