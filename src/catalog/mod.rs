//! Product catalog
//!
//! Ownership tree Bundle -> Collection -> Product. The catalog hands out
//! LIDVIDs, remembers the versions already published in the archive and
//! refuses any registration that would reuse or lower one of them.
//!
//! Products are never removed: a product of an earlier release stays in the
//! tree as carried over.

pub mod lid;
pub mod product;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::common::fs::files_under;
use crate::error::{Result, catalog as catalog_err};

pub use lid::Lidvid;
pub use product::{Product, ProductKind};

/// Collections of a SPICE archive, in bundle label order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionName {
    SpiceKernels,
    Document,
    Miscellaneous,
}

impl CollectionName {
    pub const ALL: [CollectionName; 3] = [
        CollectionName::SpiceKernels,
        CollectionName::Document,
        CollectionName::Miscellaneous,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SpiceKernels => "spice_kernels",
            Self::Document => "document",
            Self::Miscellaneous => "miscellaneous",
        }
    }

    pub fn from_dir(dir: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == dir)
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named group of products of one kind
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: CollectionName,
    products: Vec<Product>,
    inventory: Option<Product>,
}

impl Collection {
    fn new(name: CollectionName) -> Self {
        Self {
            name,
            products: Vec::new(),
            inventory: None,
        }
    }

    /// Members in registration order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Members registered as new in this release
    pub fn new_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.new_in_this_release)
    }

    /// True iff at least one member is new in this release
    pub fn updated(&self) -> bool {
        self.products.iter().any(|p| p.new_in_this_release)
    }

    /// Inventory written for this release, if any
    pub fn inventory(&self) -> Option<&Product> {
        self.inventory.as_ref()
    }
}

/// Catalog of one run
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    bundle_lid: String,
    collections: Vec<Collection>,
    /// Highest published VID per LID
    published: BTreeMap<String, u32>,
}

impl ProductCatalog {
    pub fn new(bundle_lid: impl Into<String>) -> Self {
        Self {
            bundle_lid: bundle_lid.into(),
            collections: CollectionName::ALL.into_iter().map(Collection::new).collect(),
            published: BTreeMap::new(),
        }
    }

    pub fn bundle_lid(&self) -> &str {
        &self.bundle_lid
    }

    /// Record every product already present in the archive
    ///
    /// Returns the number of identified files.
    pub fn load_history(&mut self, archive_root: &Path) -> usize {
        let mut count = 0;
        for relative in files_under(archive_root) {
            if let Some((_, lidvid)) = lid::identify(&self.bundle_lid, &relative) {
                self.mark_published(&lidvid);
                count += 1;
            }
        }
        tracing::debug!(
            "Loaded {} published products from {}",
            count,
            archive_root.display()
        );
        count
    }

    pub fn mark_published(&mut self, lidvid: &Lidvid) {
        let entry = self.published.entry(lidvid.lid.clone()).or_insert(lidvid.vid);
        *entry = (*entry).max(lidvid.vid);
    }

    /// Highest VID of `lid` in the archive
    pub fn published_version(&self, lid: &str) -> Option<u32> {
        self.published.get(lid).copied()
    }

    /// Add a product to its collection
    ///
    /// A LIDVID may appear only once per run. New products must also carry
    /// a VID above the highest published one for their LID.
    pub fn register(&mut self, product: Product) -> Result<()> {
        if self.contains(&product.lidvid) {
            return Err(catalog_err::duplicate_lidvid(product.lidvid.to_string()));
        }
        self.check_history(&product)?;
        tracing::debug!(
            "Registered {} ({})",
            product.lidvid,
            if product.new_in_this_release { "new" } else { "carried over" }
        );
        let collection = product.collection();
        self.collection_mut(collection).products.push(product);
        Ok(())
    }

    /// Set the inventory of a collection, replacing an earlier pass
    pub fn set_inventory(&mut self, product: Product) -> Result<()> {
        self.check_history(&product)?;
        let collection = product.collection();
        self.collection_mut(collection).inventory = Some(product);
        Ok(())
    }

    fn check_history(&self, product: &Product) -> Result<()> {
        if !product.new_in_this_release {
            return Ok(());
        }
        let lidvid = &product.lidvid;
        match self.published.get(&lidvid.lid) {
            Some(&published) if published == lidvid.vid => {
                Err(catalog_err::duplicate_lidvid(lidvid.to_string()))
            }
            Some(&published) if published > lidvid.vid => Err(catalog_err::version_regression(
                &lidvid.lid,
                lidvid.vid_label(),
                format!("{}.0", published),
            )),
            _ => Ok(()),
        }
    }

    fn contains(&self, lidvid: &Lidvid) -> bool {
        self.products().any(|p| &p.lidvid == lidvid)
    }

    /// Latest registered version of `lid`
    pub fn find(&self, lid: &str) -> Option<&Product> {
        self.products()
            .filter(|p| p.lidvid.lid == lid)
            .max_by_key(|p| p.lidvid.vid)
    }

    /// Product registered under an archive-relative path
    #[cfg(test)]
    pub fn find_path(&self, path: &str) -> Option<&Product> {
        self.products().find(|p| p.path == path)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.collections.iter().flat_map(|c| c.products.iter())
    }

    pub fn collection(&self, name: CollectionName) -> &Collection {
        &self.collections[name as usize]
    }

    fn collection_mut(&mut self, name: CollectionName) -> &mut Collection {
        &mut self.collections[name as usize]
    }

    /// Record measured size and MD5 of the product at `path`
    pub fn stamp(&mut self, path: &str, size: u64, checksum: &str) {
        let stamped = self
            .collections
            .iter_mut()
            .flat_map(|c| c.products.iter_mut().chain(c.inventory.iter_mut()))
            .find(|p| p.path == path);
        if let Some(product) = stamped {
            product.size = Some(size);
            product.checksum = Some(checksum.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BundlerError;
    use crate::kernels::KernelType;
    use tempfile::TempDir;

    const BUNDLE: &str = "urn:nasa:pds:maven.spice";

    fn lsk() -> Product {
        Product::kernel(BUNDLE, KernelType::Lsk, "naif0012.tls")
    }

    #[test]
    fn test_register_and_find() {
        let mut catalog = ProductCatalog::new(BUNDLE);
        catalog.register(lsk()).unwrap();
        catalog
            .register(Product::meta_kernel(BUNDLE, "maven_v01.tm", 1))
            .unwrap();

        let found = catalog.find(&lsk().lidvid.lid).unwrap();
        assert_eq!(found.name, "naif0012.tls");
        assert!(catalog.collection(CollectionName::SpiceKernels).updated());
        assert!(!catalog.collection(CollectionName::Document).updated());
        assert_eq!(
            catalog.collection(CollectionName::SpiceKernels).products().len(),
            2
        );
        assert!(catalog.find_path("spice_kernels/mk/maven_v01.tm").is_some());
    }

    #[test]
    fn test_duplicate_lidvid_in_run() {
        let mut catalog = ProductCatalog::new(BUNDLE);
        catalog.register(lsk()).unwrap();
        let err = catalog.register(lsk()).unwrap_err();
        assert!(matches!(err, BundlerError::DuplicateLidvid { .. }));
    }

    #[test]
    fn test_duplicate_lidvid_against_history() {
        let mut catalog = ProductCatalog::new(BUNDLE);
        catalog.mark_published(&Product::meta_kernel(BUNDLE, "maven_v02.tm", 2).lidvid);

        let err = catalog
            .register(Product::meta_kernel(BUNDLE, "maven_v02.tm", 2))
            .unwrap_err();
        assert!(matches!(err, BundlerError::DuplicateLidvid { .. }));

        let err = catalog
            .register(Product::meta_kernel(BUNDLE, "maven_v01.tm", 1))
            .unwrap_err();
        assert!(matches!(err, BundlerError::VersionRegression { .. }));

        catalog
            .register(Product::meta_kernel(BUNDLE, "maven_v03.tm", 3))
            .unwrap();
    }

    #[test]
    fn test_carried_over_products_skip_history_checks() {
        let mut catalog = ProductCatalog::new(BUNDLE);
        catalog.mark_published(&Product::checksum(BUNDLE, 1).lidvid);
        catalog
            .register(Product::checksum(BUNDLE, 1).carried_over())
            .unwrap();
        assert!(!catalog.collection(CollectionName::Miscellaneous).updated());
    }

    #[test]
    fn test_set_inventory_replaces_first_pass() {
        let mut catalog = ProductCatalog::new(BUNDLE);
        let first = Product::inventory(BUNDLE, CollectionName::Miscellaneous, 1);
        catalog.set_inventory(first.clone()).unwrap();
        catalog.set_inventory(first).unwrap();
        let inventory = catalog
            .collection(CollectionName::Miscellaneous)
            .inventory()
            .unwrap();
        assert_eq!(inventory.lidvid.vid, 1);
    }

    #[test]
    fn test_load_history() {
        let temp = TempDir::new().unwrap();
        for path in [
            "spice_kernels/lsk/naif0012.tls",
            "spice_kernels/mk/maven_v01.tm",
            "spice_kernels/mk/maven_v02.tm",
            "spice_kernels/collection_spice_kernels_inventory_v002.csv",
            "bundle_maven_spice_v002.xml",
        ] {
            let full = temp.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, "x").unwrap();
        }

        let mut catalog = ProductCatalog::new(BUNDLE);
        assert_eq!(catalog.load_history(temp.path()), 4);
        assert_eq!(
            catalog.published_version(&lid::meta_kernel_lid(BUNDLE, "maven_v02.tm")),
            Some(2)
        );
        let err = catalog.register(lsk()).unwrap_err();
        assert!(matches!(err, BundlerError::DuplicateLidvid { .. }));
    }

    #[test]
    fn test_stamp() {
        let mut catalog = ProductCatalog::new(BUNDLE);
        catalog.register(lsk()).unwrap();
        catalog.stamp("spice_kernels/lsk/naif0012.tls", 42, "abc");
        let product = catalog.find_path("spice_kernels/lsk/naif0012.tls").unwrap();
        assert_eq!(product.size, Some(42));
        assert_eq!(product.checksum.as_deref(), Some("abc"));
    }
}
