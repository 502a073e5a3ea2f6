//! Bundle label and readme
//!
//! `bundle_<mission>_spice_v<NNN>.xml` sits at the archive root and names
//! every collection of the release. A collection whose inventory was written
//! in this run is `Primary` at its new version; any other collection that was
//! published before is `Secondary` at its latest published version. The
//! label also describes `readme.txt`, written once with the first release.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::lid::{self, Lidvid};
use crate::catalog::{CollectionName, ProductCatalog};
use crate::common::fs as cfs;
use crate::common::pattern::static_regex;
use crate::context::RunContext;
use crate::coverage::Interval;
use crate::error::Result;
use crate::template::{self, TemplateValues};

/// Archive-relative path of the bundle readme
pub const README_FILE: &str = "readme.txt";

static LIDVID_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"<lidvid_reference>\s*([^<\s]+)\s*</lidvid_reference>"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Primary,
    Secondary,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Secondary => "Secondary",
        }
    }
}

/// One `Bundle_Member_Entry`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    pub collection: CollectionName,
    pub lidvid: Lidvid,
    pub status: MemberStatus,
}

impl MemberEntry {
    fn reference_type(&self) -> &'static str {
        match self.collection {
            CollectionName::SpiceKernels => "bundle_has_spice_kernel_collection",
            CollectionName::Document => "bundle_has_document_collection",
            CollectionName::Miscellaneous => "bundle_has_member_collection",
        }
    }

    fn render(&self) -> String {
        format!(
            "  <Bundle_Member_Entry>\n    \
             <lidvid_reference>{}</lidvid_reference>\n    \
             <member_status>{}</member_status>\n    \
             <reference_type>{}</reference_type>\n  \
             </Bundle_Member_Entry>",
            self.lidvid,
            self.status.as_str(),
            self.reference_type()
        )
    }
}

/// File name of the bundle label of `release`
pub fn file_name(acronym: &str, release: u32) -> String {
    format!("bundle_{}_spice_v{:03}.xml", acronym, release)
}

/// Collection entries in bundle order
pub fn member_entries(catalog: &ProductCatalog) -> Vec<MemberEntry> {
    let bundle_lid = catalog.bundle_lid();
    CollectionName::ALL
        .into_iter()
        .filter_map(|name| {
            let collection_lid = lid::collection_lid(bundle_lid, name);
            let (vid, status) = match catalog.collection(name).inventory() {
                Some(inventory) => (inventory.lidvid.vid, MemberStatus::Primary),
                None => (
                    catalog.published_version(&lid::inventory_lid(bundle_lid, name))?,
                    MemberStatus::Secondary,
                ),
            };
            Some(MemberEntry {
                collection: name,
                lidvid: Lidvid::new(collection_lid, vid),
                status,
            })
        })
        .collect()
}

/// Render and stage the bundle label, returning its archive-relative path
pub fn write(ctx: &RunContext, catalog: &ProductCatalog, interval: &Interval) -> Result<String> {
    let name = file_name(ctx.acronym(), ctx.release.new_release);
    let entries = member_entries(catalog);

    let mut members = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            members.push('\n');
        }
        members.push_str(&entry.render());
        tracing::info!(
            "     {} collection: {} ({})",
            entry.collection,
            entry.lidvid,
            entry.status.as_str()
        );
    }

    let release_date = ctx.config.release_date();
    let mut values = super::common_values(ctx);
    values.insert("BUNDLE_LID", catalog.bundle_lid().to_string());
    values.insert("BUNDLE_VID", format!("{}.0", ctx.release.new_release));
    values.insert("PUBLICATION_YEAR", release_date.format("%Y").to_string());
    values.insert("RELEASE_DATE", release_date.format("%Y-%m-%d").to_string());
    values.insert("RELEASE", ctx.release.label());
    values.insert("START_TIME", interval.start_label());
    values.insert("STOP_TIME", interval.stop_label());
    values.insert("README_FILE", README_FILE.to_string());
    values.insert("BUNDLE_MEMBER_ENTRIES", members);

    super::stage(
        ctx,
        &name,
        (
            template::BUNDLE_LABEL_TEMPLATE_NAME,
            template::BUNDLE_LABEL_TEMPLATE,
        ),
        &values,
    )?;
    tracing::info!("-- Generated {}", name);
    Ok(name)
}

/// Stage `readme.txt` unless the archive already has one
pub fn write_readme(ctx: &RunContext) -> Result<Option<&'static str>> {
    if ctx.layout.archived(README_FILE).is_file() {
        tracing::debug!("{} already archived", README_FILE);
        return Ok(None);
    }

    let title = format!("{} SPICE Kernel Archive", ctx.config.mission.name);
    let mut values = TemplateValues::new();
    values.insert("SPICE_NAME", ctx.config.mission.name.clone());
    values.insert("AUTHOR", ctx.config.author().to_string());
    values.insert("UNDERLINE", "=".repeat(title.chars().count()));

    let template_text = template::load_or_default(
        ctx.layout.templates_dir(),
        template::README_TEMPLATE_NAME,
        template::README_TEMPLATE,
    )?;
    let text = template::with_line_endings(
        &template::render(&template_text, &values),
        ctx.config.eol.as_str(),
    );
    cfs::write_text(&ctx.layout.staged(README_FILE), &text)?;
    tracing::info!("-- Generated {}", README_FILE);
    Ok(Some(README_FILE))
}

/// Collection LIDVIDs referenced by a bundle label
pub fn lidvid_references(text: &str) -> Vec<Lidvid> {
    let mut references = Vec::new();
    for captures in LIDVID_REFERENCE.captures_iter(text) {
        match Lidvid::parse(&captures[1]) {
            Some(lidvid) => references.push(lidvid),
            None => tracing::warn!("     Malformed LIDVID reference {}.", &captures[1]),
        }
    }
    references
}
