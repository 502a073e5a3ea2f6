//! Miscellaneous collection and bundle label
//!
//! The checksum table must cover the final miscellaneous inventory, which in
//! turn lists the table. The inventory and its label are therefore written
//! twice: once so the bundle label can reference the collection, and again
//! once the table is registered. Their table rows are then refreshed. The
//! table label is written last; the next table lists it.

use crate::catalog::CollectionName;
use crate::checksum::{ChecksumRegistrar, ChecksumTable, md5_file};
use crate::coverage::Interval;
use crate::error::Result;
use crate::history;
use crate::inventory::{self, PriorInventory};
use crate::label::bundle;
use crate::label::product::ProductLabel;

use super::ReleaseOperation;

pub(super) fn write(op: &mut ReleaseOperation<'_>, interval: &Interval) -> Result<()> {
    let ctx = op.ctx;
    let collection = CollectionName::Miscellaneous;

    let (prior_inventory, prior_table) = if history::needs_backfill(ctx) {
        let backfill = history::backfill(ctx, &mut op.catalog, &mut op.file_list)?;
        (backfill.inventory, backfill.table)
    } else {
        (
            PriorInventory::published(&ctx.layout, collection)?,
            ChecksumTable::published(&ctx.layout)?,
        )
    };

    let first_pass = inventory::write(ctx, &mut op.catalog, collection, prior_inventory.as_ref())?;
    op.file_list.record(first_pass.path.as_str());
    let collection_label = ProductLabel::new(&first_pass, *interval).write(ctx)?;
    op.file_list.record(collection_label.as_str());

    if let Some(readme) = bundle::write_readme(ctx)? {
        op.file_list.record(readme);
    }
    tracing::info!("-- Generating bundle label.");
    let bundle_label = bundle::write(ctx, &op.catalog, interval)?;
    op.produced(&bundle_label);

    let (version, carried, previous) = match prior_table {
        Some((version, table)) => (version + 1, table, Some(version)),
        None => (1, ChecksumTable::default(), None),
    };
    let mut registrar =
        ChecksumRegistrar::new(op.catalog.bundle_lid(), version, carried, ctx.config.eol);
    if let Some(previous) = previous {
        registrar.carry_table(&ctx.layout, previous)?;
    }
    registrar.register_staged(
        &ctx.layout.staging,
        &mut op.catalog,
        &mut op.registry,
        &mut op.progress,
    )?;
    registrar.emit(&ctx.layout.staging)?;
    let checksum = registrar.product().clone();
    op.catalog.register(checksum.clone())?;
    op.file_list.record(checksum.path.as_str());

    let final_pass = inventory::write(ctx, &mut op.catalog, collection, prior_inventory.as_ref())?;
    ProductLabel::new(&final_pass, *interval).write(ctx)?;
    for relative in [&final_pass.path, &collection_label] {
        registrar.refresh(
            &ctx.layout.staging,
            relative,
            &mut op.catalog,
            &mut op.registry,
        )?;
    }
    registrar.emit(&ctx.layout.staging)?;

    let checksum_label = ProductLabel::new(&checksum, *interval).write(ctx)?;
    op.registry.record(
        checksum_label.as_str(),
        md5_file(&ctx.layout.staged(&checksum_label))?,
    );

    op.produced(&checksum_label);
    super::compare(ctx, &final_pass.path);
    super::compare(ctx, &collection_label);
    super::compare(ctx, &checksum.path);
    Ok(())
}
