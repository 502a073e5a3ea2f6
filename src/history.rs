//! Bundle history and checksum backfill
//!
//! Every published release is reconstructed from its bundle label and the
//! inventories it references. Archives produced before checksum tables
//! existed have no `miscellaneous/checksum` directory; for those a checksum
//! table with its miscellaneous inventory is generated per release, oldest
//! first. After a complete run the history is checked against the archive.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::lid::{self, Lidvid};
use crate::catalog::{CollectionName, Product, ProductCatalog};
use crate::checksum::{ChecksumRegistrar, ChecksumTable, md5_file};
use crate::common::fs::{self as cfs, files_under};
use crate::common::pattern::static_regex;
use crate::config::Layout;
use crate::context::RunContext;
use crate::error::{Result, catalog as catalog_err};
use crate::file_list::FileList;
use crate::inventory::{self, PriorInventory};
use crate::label::{self, README_FILE};

static BUNDLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"^bundle_(.+)_spice_v(\d+)\.xml$"));

/// Archive files making up one published release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFiles {
    pub release: u32,
    /// Archive-relative paths, sorted
    pub files: Vec<String>,
    /// Referenced inventories missing from the archive
    pub missing: Vec<String>,
}

/// Published releases of the archive, oldest first
#[derive(Debug, Clone, Default)]
pub struct BundleHistory {
    releases: Vec<ReleaseFiles>,
}

impl BundleHistory {
    /// Reconstruct every release from the bundle labels in the archive root
    pub fn scan(layout: &Layout, bundle_lid: &str) -> Result<Self> {
        let root = layout.archive_root();
        let all_files = files_under(&root);

        let index: HashMap<Lidvid, String> = all_files
            .iter()
            .filter_map(|relative| {
                lid::identify(bundle_lid, relative).map(|(_, lidvid)| (lidvid, relative.clone()))
            })
            .collect();

        let mut labels: Vec<(u32, String)> = all_files
            .iter()
            .filter_map(|relative| {
                let captures = BUNDLE_LABEL.captures(relative)?;
                let acronym_matches = &captures[1] == layout.acronym();
                let release = captures[2].parse::<u32>().ok()?;
                acronym_matches.then(|| (release, relative.clone()))
            })
            .collect();
        labels.sort();

        let mut releases: Vec<ReleaseFiles> = Vec::with_capacity(labels.len());
        for (release, label_name) in labels {
            let (mut files, missing) = release_files(layout, bundle_lid, &label_name, &index)?;
            if releases.is_empty() && layout.archived(README_FILE).is_file() {
                files.insert(README_FILE.to_string());
            }
            tracing::info!(
                "     Release {:03} has {} files in the archive.",
                release,
                files.len()
            );
            releases.push(ReleaseFiles {
                release,
                files: files.into_iter().collect(),
                missing,
            });
        }
        Ok(Self { releases })
    }

    pub fn releases(&self) -> &[ReleaseFiles] {
        &self.releases
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Files of the release of one bundle label, with its missing inventories
///
/// Inventories and products are listed with their labels when archived.
fn release_files(
    layout: &Layout,
    bundle_lid: &str,
    label_name: &str,
    index: &HashMap<Lidvid, String>,
) -> Result<(BTreeSet<String>, Vec<String>)> {
    let mut files = BTreeSet::new();
    let mut missing = Vec::new();
    files.insert(label_name.to_string());
    let mut insert = |files: &mut BTreeSet<String>, relative: String| {
        let product_label = lid::label_path(&relative);
        if layout.archived(&product_label).is_file() {
            files.insert(product_label);
        }
        files.insert(relative);
    };

    let label_text = cfs::read_text(&layout.archived(label_name))?;
    for reference in label::lidvid_references(&label_text) {
        let Some(collection) = reference
            .lid
            .strip_prefix(bundle_lid)
            .and_then(|rest| rest.strip_prefix(':'))
            .and_then(CollectionName::from_dir)
        else {
            tracing::warn!("     {} is not a collection of this bundle.", reference);
            continue;
        };

        let inventory = lid::inventory_path(collection, reference.vid);
        let inventory_file = layout.archived(&inventory);
        if !inventory_file.is_file() {
            tracing::warn!("     Inventory {} of {} not found.", inventory, label_name);
            missing.push(inventory);
            continue;
        }
        let text = cfs::read_text(&inventory_file)?;
        insert(&mut files, inventory);

        for line in text.lines() {
            let Some((_, entry)) = line.trim().split_once(',') else {
                continue;
            };
            match Lidvid::parse(entry).and_then(|lidvid| index.get(&lidvid)) {
                Some(path) => insert(&mut files, path.clone()),
                None => tracing::warn!("     Product {} not found in the archive.", entry),
            }
        }
    }
    Ok((files, missing))
}

/// Check the archive against the history of its bundle labels
///
/// Every inventory a bundle label references must be archived, and the
/// latest checksum table must list every file of every release but itself
/// and its label.
pub fn validate(layout: &Layout, bundle_lid: &str) -> Result<()> {
    tracing::info!("-- Validating the bundle history.");
    let history = BundleHistory::scan(layout, bundle_lid)?;
    let Some(latest) = history.releases().last() else {
        tracing::warn!("     No bundle label found in the archive.");
        return Ok(());
    };

    if let Some(release) = history.releases().iter().find(|r| !r.missing.is_empty()) {
        return Err(catalog_err::history_mismatch(
            release.release,
            format!("{} not in the archive", release.missing.join(", ")),
        ));
    }

    let Some((version, table)) = ChecksumTable::published(layout)? else {
        return Err(catalog_err::history_mismatch(
            latest.release,
            "no checksum table in the archive",
        ));
    };
    let table_path = lid::checksum_path(version);
    let table_label = lid::label_path(&table_path);
    for release in history.releases() {
        if let Some(unlisted) = release
            .files
            .iter()
            .find(|f| **f != table_path && **f != table_label && !table.contains(f))
        {
            return Err(catalog_err::history_mismatch(
                release.release,
                format!("{} is not listed in {}", unlisted, table_path),
            ));
        }
    }
    tracing::info!(
        "     {} releases consistent with {}.",
        history.releases().len(),
        table_path
    );
    Ok(())
}

/// Prior miscellaneous state left by a backfill
#[derive(Debug, Clone, Default)]
pub struct Backfill {
    pub inventory: Option<PriorInventory>,
    pub table: Option<(u32, ChecksumTable)>,
}

/// True when the archive has releases but no checksum tables
pub fn needs_backfill(ctx: &RunContext) -> bool {
    ctx.release.is_increment && !ctx.layout.archived("miscellaneous/checksum").is_dir()
}

/// Generate the checksum table and miscellaneous inventory of every
/// published release
///
/// The tables are chained: each one carries the rows and the file of the
/// previous one. The miscellaneous inventories continue from the latest
/// published one. The generated checksum products are registered as carried
/// over.
pub fn backfill(
    ctx: &RunContext,
    catalog: &mut ProductCatalog,
    file_list: &mut FileList,
) -> Result<Backfill> {
    tracing::info!("-- Generating checksum files for previous releases.");
    let bundle_lid = catalog.bundle_lid().to_string();
    let history = BundleHistory::scan(&ctx.layout, &bundle_lid)?;
    if history.is_empty() {
        tracing::warn!("     No bundle label found in the archive.");
    }

    let mut result = Backfill {
        inventory: PriorInventory::published(&ctx.layout, CollectionName::Miscellaneous)?,
        table: None,
    };
    let first_version = result.inventory.as_ref().map_or(1, |prior| prior.version + 1);
    let mut table = ChecksumTable::default();
    let mut previous_release = None;
    for (i, release) in history.releases().iter().enumerate() {
        let mut registrar =
            ChecksumRegistrar::new(&bundle_lid, release.release, table, ctx.config.eol);
        if let Some(previous) = previous_release {
            registrar.carry_table(&ctx.layout, previous)?;
        }
        for relative in &release.files {
            registrar.register(relative.as_str(), md5_file(&ctx.layout.archived(relative))?);
        }
        registrar.emit(&ctx.layout.staging)?;
        let checksum = registrar.product().clone();
        file_list.record(&checksum.path);

        let version = first_version.saturating_add(u32::try_from(i).unwrap_or(u32::MAX));
        let inventory_product =
            Product::inventory(&bundle_lid, CollectionName::Miscellaneous, version);
        let text = inventory::build(
            result.inventory.as_ref().map(|p| p.text.as_str()),
            &[&checksum],
        );
        cfs::write_text(&ctx.layout.staged(&inventory_product.path), &text)?;
        file_list.record(&inventory_product.path);
        tracing::info!("     Generated {}", inventory_product.path);

        catalog.register(checksum.carried_over())?;
        previous_release = Some(release.release);
        table = registrar.table().clone();
        result.inventory = Some(PriorInventory { version, text });
        result.table = Some((release.release, table.clone()));
    }
    Ok(result)
}
