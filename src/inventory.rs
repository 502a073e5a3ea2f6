//! Collection inventories
//!
//! An inventory lists every member of a collection as `P,<lidvid>` (new in
//! this release) or `S,<lidvid>` (carried over), CRLF-terminated. The prior
//! inventory is copied forward with its primary entries turned secondary,
//! then the new members are appended in catalog order.

use std::path::PathBuf;

use crate::catalog::lid::{embedded_version, inventory_path};
use crate::catalog::{Collection, CollectionName, Product, ProductCatalog};
use crate::common::fs::{self as cfs, files_under};
use crate::config::Layout;
use crate::context::RunContext;
use crate::error::warning::BundlerWarning;
use crate::error::{Result, catalog as catalog_err};

const CRLF: &str = "\r\n";

/// Inventory of the previous version of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorInventory {
    pub version: u32,
    pub text: String,
}

impl PriorInventory {
    /// Latest inventory of `collection` in the archive
    pub fn published(layout: &Layout, collection: CollectionName) -> Result<Option<Self>> {
        match latest_published(layout, collection) {
            Some((version, path)) => {
                tracing::info!("-- Previous inventory file is: {}", path.display());
                Ok(Some(Self {
                    version,
                    text: cfs::read_text(&path)?,
                }))
            }
            None => Ok(None),
        }
    }
}

fn latest_published(layout: &Layout, collection: CollectionName) -> Option<(u32, PathBuf)> {
    let dir = layout.archived(collection.as_str());
    let prefix = format!("collection_{}_inventory_v", collection);
    files_under(&dir)
        .into_iter()
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".csv"))
        .filter_map(|name| embedded_version(&name).map(|v| (v, dir.join(&name))))
        .max()
}

/// Inventory text from the prior inventory and the new members
pub fn build(prior: Option<&str>, new_products: &[&Product]) -> String {
    let mut text = String::new();
    for line in prior.unwrap_or_default().lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix("P,") {
            Some(rest) => {
                text.push_str("S,");
                text.push_str(rest);
            }
            None => text.push_str(line),
        }
        text.push_str(CRLF);
    }
    for product in new_products {
        text.push_str(&product.inventory_line('P'));
        text.push_str(CRLF);
    }
    text
}

/// Every member LID must appear in the inventory text
pub fn validate(text: &str, collection: &Collection, inventory_name: &str) -> Result<()> {
    tracing::info!("-- Validating {}...", inventory_name);
    if let Some(missing) = collection
        .products()
        .iter()
        .find(|p| !text.contains(&p.lidvid.lid))
    {
        tracing::error!("     Product {} not found.", missing.lidvid.lid);
        return Err(catalog_err::inventory_missing_product(
            &missing.lidvid.lid,
            inventory_name,
        ));
    }
    tracing::info!("     OK");
    Ok(())
}

/// Write the inventory of `collection` to staging and register it
///
/// Writing again within the same run replaces the earlier pass.
pub fn write(
    ctx: &RunContext,
    catalog: &mut ProductCatalog,
    collection: CollectionName,
    prior: Option<&PriorInventory>,
) -> Result<Product> {
    let version = prior.map_or(1, |p| p.version + 1);
    if prior.is_none() && ctx.release.is_increment {
        BundlerWarning::lookup(
            format!("previous {} inventory", collection),
            "defaulting to version 1",
        )
        .emit();
    }

    let product = Product::inventory(catalog.bundle_lid(), collection, version);
    let members = catalog.collection(collection);
    let new_products: Vec<&Product> = members.new_products().collect();
    let text = build(prior.map(|p| p.text.as_str()), &new_products);

    cfs::write_text(&ctx.layout.staged(&product.path), &text)?;
    tracing::info!("-- Generated {}", inventory_path(collection, version));
    validate(&text, members, &product.name)?;

    catalog.set_inventory(product.clone())?;
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BundlerError;
    use crate::kernels::KernelType;
    use crate::release::ReleaseState;
    use crate::test_fixtures::MissionFixture;

    const BUNDLE: &str = "urn:nasa:pds:maven.spice";

    #[test]
    fn test_build_first_inventory() {
        let lsk = Product::kernel(BUNDLE, KernelType::Lsk, "naif0012.tls");
        let text = build(None, &[&lsk]);
        assert_eq!(
            text,
            "P,urn:nasa:pds:maven.spice:spice_kernels:lsk_naif0012.tls::1.0\r\n"
        );
    }

    #[test]
    fn test_build_flips_prior_primaries() {
        let prior = "P,urn:a::1.0\r\nS,urn:b::1.0\r\n";
        let spk = Product::kernel(BUNDLE, KernelType::Spk, "orb.bsp");
        let text = build(Some(prior), &[&spk]);
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(lines[0], "S,urn:a::1.0");
        assert_eq!(lines[1], "S,urn:b::1.0");
        assert_eq!(lines[2], "P,urn:nasa:pds:maven.spice:spice_kernels:spk_orb.bsp::1.0");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_build_normalizes_line_endings() {
        let text = build(Some("P,urn:a::1.0\nS,urn:b::1.0"), &[]);
        assert_eq!(text, "S,urn:a::1.0\r\nS,urn:b::1.0\r\n");
    }

    #[test]
    fn test_build_without_new_products_is_idempotent() {
        let once = build(Some("P,urn:a::1.0\r\nS,urn:b::1.0\r\n"), &[]);
        let twice = build(Some(&once), &[]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_detects_missing_member() {
        let mut catalog = ProductCatalog::new(BUNDLE);
        catalog
            .register(Product::kernel(BUNDLE, KernelType::Lsk, "naif0012.tls"))
            .unwrap();
        let collection = catalog.collection(CollectionName::SpiceKernels);

        let err = validate("S,urn:other::1.0\r\n", collection, "inv.csv").unwrap_err();
        assert!(matches!(err, BundlerError::InventoryMissingProduct { .. }));

        let text = build(None, &collection.new_products().collect::<Vec<_>>());
        validate(&text, collection, "inv.csv").unwrap();
    }

    #[test]
    fn test_write_uses_published_version() {
        let fixture = MissionFixture::new();
        fixture.archive_file(
            "spice_kernels/collection_spice_kernels_inventory_v001.csv",
            "P,urn:nasa:pds:maven.spice:spice_kernels:lsk_naif0011.tls::1.0\r\n",
        );
        let ctx = fixture.context(ReleaseState::after(1));
        let mut catalog = ProductCatalog::new(ctx.config.bundle_lid());
        catalog
            .register(Product::kernel(
                catalog.bundle_lid(),
                KernelType::Lsk,
                "naif0012.tls",
            ))
            .unwrap();

        let prior = PriorInventory::published(&ctx.layout, CollectionName::SpiceKernels)
            .unwrap()
            .unwrap();
        assert_eq!(prior.version, 1);

        let product = write(&ctx, &mut catalog, CollectionName::SpiceKernels, Some(&prior)).unwrap();
        assert_eq!(
            product.path,
            "spice_kernels/collection_spice_kernels_inventory_v002.csv"
        );
        let text = std::fs::read_to_string(ctx.layout.staged(&product.path)).unwrap();
        assert_eq!(
            text,
            "S,urn:nasa:pds:maven.spice:spice_kernels:lsk_naif0011.tls::1.0\r\n\
             P,urn:nasa:pds:maven.spice:spice_kernels:lsk_naif0012.tls::1.0\r\n"
        );
        assert!(
            catalog
                .collection(CollectionName::SpiceKernels)
                .inventory()
                .is_some()
        );
    }
}
