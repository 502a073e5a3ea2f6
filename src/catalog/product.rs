//! Archive products

use super::CollectionName;
use super::lid::{self, Lidvid};
use crate::coverage::Interval;
use crate::kernels::{self, KernelType};

/// Product variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    Kernel,
    MetaKernel,
    Inventory(CollectionName),
    Checksum,
    Document,
}

/// One archived file with its identity and measured attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub kind: ProductKind,
    /// File name
    pub name: String,
    /// Path relative to the archive root
    pub path: String,
    pub lidvid: Lidvid,
    /// False for products carried over from a previous release
    pub new_in_this_release: bool,
    pub coverage: Option<Interval>,
    pub size: Option<u64>,
    pub checksum: Option<String>,
}

impl Product {
    fn new(kind: ProductKind, path: String, lidvid: Lidvid) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path.as_str()).to_string();
        Self {
            kind,
            name,
            path,
            lidvid,
            new_in_this_release: true,
            coverage: None,
            size: None,
            checksum: None,
        }
    }

    /// Kernels are immutable once archived, so their VID is always 1
    pub fn kernel(bundle_lid: &str, kernel_type: KernelType, name: &str) -> Self {
        Self::new(
            ProductKind::Kernel,
            kernels::staging_path(kernel_type, name),
            Lidvid::new(lid::kernel_lid(bundle_lid, kernel_type, name), 1),
        )
    }

    /// Meta-kernel with the version taken from its `_v<N>` suffix
    pub fn meta_kernel(bundle_lid: &str, name: &str, version: u32) -> Self {
        Self::new(
            ProductKind::MetaKernel,
            kernels::staging_path(KernelType::Mk, name),
            Lidvid::new(lid::meta_kernel_lid(bundle_lid, name), version),
        )
    }

    pub fn inventory(bundle_lid: &str, collection: CollectionName, version: u32) -> Self {
        Self::new(
            ProductKind::Inventory(collection),
            lid::inventory_path(collection, version),
            Lidvid::new(lid::inventory_lid(bundle_lid, collection), version),
        )
    }

    pub fn checksum(bundle_lid: &str, version: u32) -> Self {
        Self::new(
            ProductKind::Checksum,
            lid::checksum_path(version),
            Lidvid::new(lid::checksum_lid(bundle_lid), version),
        )
    }

    pub fn document(bundle_lid: &str, version: u32) -> Self {
        Self::new(
            ProductKind::Document,
            lid::document_path(version),
            Lidvid::new(lid::document_lid(bundle_lid), version),
        )
    }

    /// Product of an archive-relative path, when the path is one
    pub fn identify(bundle_lid: &str, relative: &str) -> Option<Self> {
        lid::identify(bundle_lid, relative)
            .map(|(kind, lidvid)| Self::new(kind, relative.to_string(), lidvid))
    }

    pub fn with_coverage(mut self, coverage: Option<Interval>) -> Self {
        self.coverage = coverage;
        self
    }

    /// Mark as carried over from a previous release
    pub fn carried_over(mut self) -> Self {
        self.new_in_this_release = false;
        self
    }

    /// Collection the product belongs to
    pub fn collection(&self) -> CollectionName {
        match self.kind {
            ProductKind::Kernel | ProductKind::MetaKernel => CollectionName::SpiceKernels,
            ProductKind::Inventory(collection) => collection,
            ProductKind::Checksum => CollectionName::Miscellaneous,
            ProductKind::Document => CollectionName::Document,
        }
    }

    /// Inventory entry with the given status letter
    pub fn inventory_line(&self, status: char) -> String {
        format!("{},{}", status, self.lidvid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = "urn:nasa:pds:maven.spice";

    #[test]
    fn test_kernel_product() {
        let product = Product::kernel(BUNDLE, KernelType::Lsk, "naif0012.tls");
        assert_eq!(product.path, "spice_kernels/lsk/naif0012.tls");
        assert_eq!(product.name, "naif0012.tls");
        assert_eq!(product.lidvid.vid, 1);
        assert!(product.new_in_this_release);
        assert_eq!(product.collection(), CollectionName::SpiceKernels);
        assert_eq!(
            product.inventory_line('P'),
            "P,urn:nasa:pds:maven.spice:spice_kernels:lsk_naif0012.tls::1.0"
        );
    }

    #[test]
    fn test_identify_matches_constructors() {
        let constructed = [
            Product::kernel(BUNDLE, KernelType::Ck, "maven_att.bc"),
            Product::meta_kernel(BUNDLE, "maven_v04.tm", 4),
            Product::inventory(BUNDLE, CollectionName::Document, 2),
            Product::checksum(BUNDLE, 3),
            Product::document(BUNDLE, 1),
        ];
        for product in constructed {
            assert_eq!(Product::identify(BUNDLE, &product.path), Some(product));
        }
    }

    #[test]
    fn test_carried_over() {
        let product = Product::checksum(BUNDLE, 1).carried_over();
        assert!(!product.new_in_this_release);
        assert_eq!(product.collection(), CollectionName::Miscellaneous);
    }
}
