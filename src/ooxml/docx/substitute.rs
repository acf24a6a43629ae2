//! Dynamic image substitution.
//!
//! [`substitute`] handles one drawing: it resolves the picture's
//! relationship and media part, computes the contained box when requested,
//! and then either repoints the media (first use of the relationship id in
//! the part) or clones relationship and media under a fresh id (every
//! later use). All lookups happen before the first edit, so a drawing that
//! fails leaves the package and the tree as they were.
//!
//! The payload text is then replaced by the relationship id in the part's
//! serialized XML. That is a plain text pass, separate from the tree edits:
//! drawings record a [`PayloadScrub`] and the part driver calls
//! [`scrub_payloads`] once, after serialization.

use super::drawing::{Drawing, PictureProps};
use super::resolver::{self, SubstitutionState};
use crate::common::xml::serialized_spellings;
use crate::common::{Error, Result};
use crate::config::ProcessOptions;
use crate::images::{DimensionProber, resize};
use crate::ooxml::opc::rel::RelationshipTable;
use crate::package::Package;
use aho_corasick::{AhoCorasick, MatchKind};
use memchr::memmem;
use smallvec::SmallVec;

/// What happened to one drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionOutcome {
    /// Not a dynamic placeholder, or already detached
    Skipped,
    /// First use of the id: the existing media now holds the payload
    Repointed { r_id: String, media_part: String },
    /// Later use: a new relationship and media part were created
    Duplicated { r_id: String, media_part: String },
}

impl SubstitutionOutcome {
    /// The relationship id the drawing ends up referencing, if substituted.
    pub fn r_id(&self) -> Option<&str> {
        match self {
            SubstitutionOutcome::Skipped => None,
            SubstitutionOutcome::Repointed { r_id, .. }
            | SubstitutionOutcome::Duplicated { r_id, .. } => Some(r_id),
        }
    }
}

/// A deferred replacement of payload text by a relationship id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadScrub {
    pub payload: String,
    pub r_id: String,
}

/// Everything a drawing of one part needs besides the drawing itself.
pub struct SubstitutionContext<'a> {
    package: &'a mut Package,
    rels: Option<&'a mut RelationshipTable>,
    owner: &'a str,
    options: &'a ProcessOptions,
    prober: &'a dyn DimensionProber,
    scrubs: Vec<PayloadScrub>,
}

impl<'a> SubstitutionContext<'a> {
    /// Create a context for the part `owner`.
    ///
    /// `rels` is the part's relationship table, if it has one.
    pub fn new(
        package: &'a mut Package,
        rels: Option<&'a mut RelationshipTable>,
        owner: &'a str,
        options: &'a ProcessOptions,
        prober: &'a dyn DimensionProber,
    ) -> Self {
        Self {
            package,
            rels,
            owner,
            options,
            prober,
            scrubs: Vec::new(),
        }
    }

    /// Consume the context, returning the recorded scrubs.
    pub fn into_scrubs(self) -> Vec<PayloadScrub> {
        self.scrubs
    }

    /// Media data for a picture: the payload, with the QR marker if flagged.
    fn media_data(&self, props: &PictureProps) -> String {
        if props.qr_section {
            format!("{}{}", self.options.qr_prefix, props.descr)
        } else {
            props.descr.clone()
        }
    }

    fn malformed(&self, reason: &str) -> Error {
        Error::MalformedDrawing {
            part: self.owner.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Substitute one drawing, updating `state` for the next one.
///
/// Drawings must be fed in document order: the suffix a reused id receives
/// depends on how many earlier drawings of the same part used it.
///
/// # Errors
/// * [`Error::MalformedDrawing`] if the picture has no blip, or is contained
///   and declares no extent
/// * [`Error::RelationNotFound`] / [`Error::MediaNotFound`] from resolution
pub fn substitute(
    ctx: &mut SubstitutionContext<'_>,
    drawing: &mut Drawing<'_>,
    state: &mut SubstitutionState,
) -> Result<SubstitutionOutcome> {
    if drawing.is_detached() {
        return Ok(SubstitutionOutcome::Skipped);
    }
    let Some(props) = drawing.props().filter(PictureProps::is_dynamic) else {
        return Ok(SubstitutionOutcome::Skipped);
    };

    let r_id = drawing
        .blip_id()
        .ok_or_else(|| ctx.malformed("dynamic picture has no blip"))?
        .to_string();
    let media = resolver::lookup_media(ctx.package, ctx.rels.as_deref(), ctx.owner, &r_id)?;

    let extent = if props.contained {
        let bounds = drawing
            .bounding_box()
            .ok_or_else(|| ctx.malformed("contained picture declares no extent"))?;
        Some(resize(bounds, &props.descr, ctx.prober))
    } else {
        None
    };

    let data = ctx.media_data(&props);
    let occurrence = state.next_occurrence(&r_id);
    let outcome = if occurrence == 1 {
        resolver::repoint_media(ctx.package, &media, data.as_bytes())?;
        state.record(&r_id, occurrence);
        SubstitutionOutcome::Repointed {
            r_id,
            media_part: media.media_part.clone(),
        }
    } else {
        // Lookup succeeded, so the table is present.
        let rels = ctx
            .rels
            .as_deref_mut()
            .ok_or_else(|| Error::RelationNotFound {
                part: ctx.owner.to_string(),
                id: r_id.clone(),
            })?;
        let copy =
            resolver::duplicate_media(ctx.package, rels, &media, occurrence, data.as_bytes())?;
        state.record(&r_id, copy.occurrence);
        drawing.set_blip_id(&copy.r_id);
        SubstitutionOutcome::Duplicated {
            r_id: copy.r_id,
            media_part: copy.media_part,
        }
    };

    if let Some(extent) = extent {
        drawing.set_extent(extent);
    }

    if let Some(new_id) = outcome.r_id() {
        log::debug!("{}: substituted '{}' as {}", ctx.owner, props.descr, new_id);
        ctx.scrubs.push(PayloadScrub {
            payload: props.descr,
            r_id: new_id.to_string(),
        });
    }
    Ok(outcome)
}

/// Replace payload text with relationship ids in serialized XML.
///
/// Scrubs are applied in order. Each payload is matched in every spelling
/// it can have in XML (escaped for attributes, escaped for text, raw),
/// longest first.
pub fn scrub_payloads(xml: &str, scrubs: &[PayloadScrub]) -> String {
    let mut output = xml.to_string();
    for scrub in scrubs {
        let present: SmallVec<[String; 3]> = serialized_spellings(&scrub.payload)
            .into_iter()
            .filter(|spelling| memmem::find(output.as_bytes(), spelling.as_bytes()).is_some())
            .collect();
        if present.is_empty() {
            continue;
        }
        let matcher = match AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(present.iter())
        {
            Ok(matcher) => matcher,
            Err(e) => {
                log::warn!("Cannot scrub payload '{}': {}", scrub.payload, e);
                continue;
            },
        };
        let replacements = vec![scrub.r_id.as_str(); present.len()];
        output = matcher.replace_all(&output, &replacements);
    }
    output
}
