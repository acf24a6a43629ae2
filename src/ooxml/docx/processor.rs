//! Per-part pipeline for WordprocessingML packages.
//!
//! [`process_part`] runs the whole rewrite for one document, header or
//! footer part:
//!
//! 1. parse the part (and its relationship table, if any) once,
//! 2. detach unreplaced placeholders,
//! 3. substitute dynamic drawings in document order with a fresh
//!    [`SubstitutionState`],
//! 4. serialize the tree, then scrub payload text,
//! 5. write the part back, and the relationship table if it grew.
//!
//! Failures of single drawings are collected in the [`PartReport`] and do
//! not stop the part. A part that cannot be parsed is returned as an error
//! and left untouched.

use super::cleaner::clean_tree;
use super::drawing::Drawing;
use super::resolver::{SubstitutionState, rels_part_name};
use super::substitute::{SubstitutionContext, SubstitutionOutcome, scrub_payloads, substitute};
use crate::common::xml::XmlElement;
use crate::common::Result;
use crate::config::ProcessOptions;
use crate::images::DimensionProber;
use crate::ooxml::opc::constants::drawing::DRAWING;
use crate::ooxml::opc::rel::RelationshipTable;
use crate::package::Package;
use crate::postprocess::PartReport;

/// Parse the relationship table of `owner`, if the package has one.
fn load_rels(package: &Package, owner: &str) -> Result<Option<RelationshipTable>> {
    let rels_name = rels_part_name(owner);
    package
        .part(&rels_name)
        .map(|part| RelationshipTable::parse(&rels_name, part.text()?))
        .transpose()
}

/// Run the clean and substitute pipeline over one part.
///
/// # Errors
/// * [`Error::PartNotFound`](crate::common::Error::PartNotFound) if `part_name` is not in the
///   package
/// * [`Error::ParseFailure`](crate::common::Error::ParseFailure) if the part or its relationship
///   table is not well-formed; nothing is modified in that case
pub fn process_part(
    package: &mut Package,
    part_name: &str,
    options: &ProcessOptions,
    prober: &dyn DimensionProber,
) -> Result<PartReport> {
    let mut doc = package.require_part(part_name)?.parse_xml()?;
    let mut rels = load_rels(package, part_name)?;
    let mut report = PartReport::new(part_name);

    report.cleaned = clean_tree(doc.root_mut());

    let mut state = SubstitutionState::new();
    let mut ctx = SubstitutionContext::new(package, rels.as_mut(), part_name, options, prober);
    doc.root_mut().visit_mut(DRAWING, &mut |element: &mut XmlElement| {
        let mut drawing = Drawing::new(element);
        match substitute(&mut ctx, &mut drawing, &mut state) {
            Ok(SubstitutionOutcome::Skipped) => {},
            Ok(SubstitutionOutcome::Repointed { media_part, .. }) => {
                report.substituted += 1;
                report.repointed.push(media_part);
            },
            Ok(SubstitutionOutcome::Duplicated { .. }) => report.duplicated += 1,
            Err(e) => {
                log::warn!("{}: drawing left as is: {}", part_name, e);
                report.failures.push(e);
            },
        }
    });
    let scrubs = ctx.into_scrubs();

    if !report.is_modified() {
        return Ok(report);
    }

    let mut xml = doc.to_xml();
    if options.scrub_payload_text {
        xml = scrub_payloads(&xml, &scrubs);
    }
    package.require_part_mut(part_name)?.set_data(xml);

    if let Some(rels) = rels.filter(RelationshipTable::is_modified) {
        let rels_xml = rels.to_xml();
        package.require_part_mut(rels.part_name())?.set_data(rels_xml);
    }

    log::debug!(
        "{}: cleaned {}, substituted {}, duplicated {}",
        part_name,
        report.cleaned,
        report.substituted,
        report.duplicated
    );
    Ok(report)
}
