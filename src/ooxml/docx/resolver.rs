//! Relation graph resolution for dynamic pictures.
//!
//! A picture reaches its bytes through two hops: the blip's `r:embed` id is
//! looked up in the owning part's relationship table, and the relationship
//! target names a media part. This module performs the lookup without
//! touching anything ([`lookup_media`]) and then either repoints the
//! existing media ([`repoint_media`]) or clones the whole chain under a
//! fresh id ([`duplicate_media`]).
//!
//! Reuse of an id is tracked by [`SubstitutionState`], which the caller
//! creates per part and threads through every drawing of that part.

use crate::common::{Error, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::RelationshipTable;
use crate::package::{Package, Part};
use std::collections::HashMap;

/// Name of the relationship part belonging to `owner`.
///
/// `word/document.xml` maps to `word/_rels/document.xml.rels`, and
/// `word/footer2.xml` to `word/_rels/footer2.xml.rels`.
pub fn rels_part_name(owner: &str) -> String {
    PackURI::from_member(owner)
        .rels_uri()
        .membername()
        .to_string()
}

/// Per-part record of how often each relationship id has been used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionState {
    occurrences: HashMap<String, u32>,
}

impl SubstitutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `r_id` has been used so far (0 if never).
    pub fn occurrences(&self, r_id: &str) -> u32 {
        self.occurrences.get(r_id).copied().unwrap_or(0)
    }

    /// The occurrence number the next use of `r_id` would get.
    pub fn next_occurrence(&self, r_id: &str) -> u32 {
        self.occurrences(r_id) + 1
    }

    /// Record a use of `r_id` with the given occurrence number.
    pub fn record(&mut self, r_id: &str, occurrence: u32) {
        self.occurrences.insert(r_id.to_string(), occurrence);
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// A relationship and the media part it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Relationship id referenced by the blip
    pub r_id: String,
    /// Target reference as written in the relationship table
    pub target_ref: String,
    /// Member name of the media part
    pub media_part: String,
}

/// Resolve `r_id` to its media part without modifying anything.
///
/// # Errors
/// * [`Error::RelationNotFound`] if the table is absent or has no such id
/// * [`Error::MediaNotFound`] if the target is external or names no part
pub fn lookup_media(
    package: &Package,
    rels: Option<&RelationshipTable>,
    owner: &str,
    r_id: &str,
) -> Result<ResolvedMedia> {
    let relationship = rels
        .ok_or_else(|| Error::RelationNotFound {
            part: owner.to_string(),
            id: r_id.to_string(),
        })?
        .require(r_id, owner)?;

    let base_uri = PackURI::from_member(owner);
    let media_part = relationship
        .target_member(base_uri.base_uri())
        .filter(|member| package.contains_part(member))
        .ok_or_else(|| Error::MediaNotFound {
            part: owner.to_string(),
            target: relationship.target_ref().to_string(),
        })?;

    Ok(ResolvedMedia {
        r_id: relationship.r_id().to_string(),
        target_ref: relationship.target_ref().to_string(),
        media_part,
    })
}

/// First use of an id: overwrite the existing media part's data.
pub fn repoint_media(package: &mut Package, media: &ResolvedMedia, data: &[u8]) -> Result<()> {
    package.require_part_mut(&media.media_part)?.set_data(data);
    Ok(())
}

/// A freshly allocated copy of a relationship and its media part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    /// New relationship id, `<id>_<n>`
    pub r_id: String,
    /// Member name of the new media part
    pub media_part: String,
    /// Occurrence number that was finally used
    pub occurrence: u32,
}

/// The id, target and media part name for occurrence `n` of `media`.
fn candidate(media: &ResolvedMedia, n: u32) -> (String, String, String) {
    let suffix = format!("_{}", n);
    (
        format!("{}{}", media.r_id, suffix),
        PackURI::suffixed_ref(&media.target_ref, &suffix),
        PackURI::suffixed_ref(&media.media_part, &suffix),
    )
}

/// Reuse of an id: clone the relationship and media under occurrence `n`.
///
/// If the id, target or part name for `n` is already taken, `n` is advanced
/// until all three are free, so relationship ids stay unique.
pub fn duplicate_media(
    package: &mut Package,
    rels: &mut RelationshipTable,
    media: &ResolvedMedia,
    occurrence: u32,
    data: &[u8],
) -> Result<Duplicate> {
    let mut n = occurrence.max(2);
    let (r_id, target_ref, media_part) = loop {
        let (r_id, target_ref, media_part) = candidate(media, n);
        if !rels.contains_id(&r_id)
            && !rels.contains_target(&target_ref)
            && !package.contains_part(&media_part)
        {
            break (r_id, target_ref, media_part);
        }
        log::debug!("'{}' is taken in {}, trying occurrence {}", r_id, rels.part_name(), n + 1);
        n += 1;
    };

    rels.duplicate(&media.r_id, &r_id, &target_ref)?;
    package.push_part(Part::new(media_part.clone(), data))?;

    Ok(Duplicate {
        r_id,
        media_part,
        occurrence: n,
    })
}
