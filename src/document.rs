//! SPICE archive description document
//!
//! The configured HTML source is rendered with the producer details and
//! staged as `document/spiceds_v<NNN>.html`. A new version is only kept when
//! it differs from the archived one by more than its update stamp.

use std::path::PathBuf;

use crate::catalog::lid::embedded_version;
use crate::catalog::{Product, ProductCatalog};
use crate::common::fs::{self as cfs, files_under};
use crate::config::Layout;
use crate::context::RunContext;
use crate::diff::DiffReport;
use crate::error::Result;
use crate::error::warning::BundlerWarning;
use crate::template::{self, TemplateValues};

const CRLF: &str = "\r\n";

/// Stage and register the description document
///
/// Returns `None` when no source is configured or when the rendered text
/// carries no change worth a new version.
pub fn write(ctx: &RunContext, catalog: &mut ProductCatalog) -> Result<Option<Product>> {
    let Some(source) = ctx.config.spiceds.as_deref() else {
        tracing::debug!("No spiceds source configured");
        return Ok(None);
    };

    let prior = latest_published(&ctx.layout);
    let version = prior.as_ref().map_or(1, |(v, _)| v + 1);
    if prior.is_none() && ctx.release.is_increment {
        BundlerWarning::lookup("previous spiceds document", "defaulting to version 1").emit();
    }

    let product = Product::document(catalog.bundle_lid(), version);
    let staged = ctx.layout.staged(&product.path);
    let text = template::render(&cfs::read_text(source)?, &values(ctx));
    cfs::write_text(&staged, &template::with_line_endings(&text, CRLF))?;

    if let Some((_, prior_path)) = &prior {
        let report = DiffReport::between(prior_path, &staged)?;
        if only_stamp_changed(&report) {
            cfs::remove_if_exists(&staged)?;
            tracing::warn!("-- spiceds document does not need to be updated.");
            return Ok(None);
        }
    }

    tracing::info!("-- Generated {}", product.path);
    catalog.register(product.clone())?;
    Ok(Some(product))
}

fn values(ctx: &RunContext) -> TemplateValues {
    let producer = ctx.config.producer.as_ref();
    let mut values = TemplateValues::new();
    values.insert(
        "PRODUCT_CREATION_DATE",
        ctx.config.release_date().format("%Y-%m-%d").to_string(),
    );
    values.insert("PRODUCER_NAME", ctx.config.author().to_string());
    values.insert(
        "PRODUCER_EMAIL",
        producer
            .and_then(|p| p.email.clone())
            .unwrap_or_else(|| "N/A".to_string()),
    );
    values.insert(
        "PRODUCER_PHONE",
        producer
            .and_then(|p| p.phone.clone())
            .unwrap_or_else(|| "N/A".to_string()),
    );
    values
}

/// True when every changed line is blank or an update stamp
fn only_stamp_changed(report: &DiffReport) -> bool {
    report
        .inserted_lines
        .iter()
        .chain(&report.removed_lines)
        .all(|line| line.trim().is_empty() || line.contains("Last update"))
}

fn latest_published(layout: &Layout) -> Option<(u32, PathBuf)> {
    let dir = layout.archived("document");
    files_under(&dir)
        .into_iter()
        .filter(|name| name.starts_with("spiceds_v") && name.ends_with(".html"))
        .filter_map(|name| embedded_version(&name).map(|v| (v, dir.join(&name))))
        .max()
}
