//! Logical identifiers
//!
//! A LID never changes across versions of a product; the VID `N.0` grows
//! with every new version. Both are derived from the archive-relative path,
//! which lets [`identify`] recover them from files already in the archive.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::{CollectionName, ProductKind};
use crate::common::pattern::static_regex;
use crate::kernels::KernelType;

static VERSIONED_NAME: LazyLock<Regex> = LazyLock::new(|| static_regex(r"_v(\d+)\.[^.]+$"));

/// LID and integer VID of a product
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lidvid {
    pub lid: String,
    pub vid: u32,
}

impl Lidvid {
    pub fn new(lid: impl Into<String>, vid: u32) -> Self {
        Self {
            lid: lid.into(),
            vid,
        }
    }

    /// VID as written in labels and inventories
    pub fn vid_label(&self) -> String {
        format!("{}.0", self.vid)
    }

    /// Parse `<lid>::<major>.<minor>`
    pub fn parse(text: &str) -> Option<Self> {
        let (lid, vid) = text.trim().split_once("::")?;
        let major = vid.split('.').next()?.parse().ok()?;
        Some(Self::new(lid, major))
    }
}

impl fmt::Display for Lidvid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}.0", self.lid, self.vid)
    }
}

pub fn collection_lid(bundle_lid: &str, collection: CollectionName) -> String {
    format!("{}:{}", bundle_lid, collection)
}

pub fn kernel_lid(bundle_lid: &str, kernel_type: KernelType, name: &str) -> String {
    format!("{}:spice_kernels:{}_{}", bundle_lid, kernel_type, name)
}

/// Meta-kernel LIDs drop the version suffix so every version shares one LID
pub fn meta_kernel_lid(bundle_lid: &str, name: &str) -> String {
    format!("{}:spice_kernels:mk_{}", bundle_lid, meta_kernel_base(name))
}

pub fn inventory_lid(bundle_lid: &str, collection: CollectionName) -> String {
    format!(
        "{}:{}:collection_{}_inventory",
        bundle_lid, collection, collection
    )
}

pub fn checksum_lid(bundle_lid: &str) -> String {
    format!("{}:miscellaneous:checksum_checksum", bundle_lid)
}

pub fn document_lid(bundle_lid: &str) -> String {
    format!("{}:document:spiceds", bundle_lid)
}

/// Name of a meta-kernel without its `_v<N>` suffix and extension
///
/// Only a `_v` followed by digits and the extension is a version suffix, so
/// `maven_vis_v01.tm` keeps `maven_vis`.
pub fn meta_kernel_base(name: &str) -> &str {
    match VERSIONED_NAME.find(name) {
        Some(suffix) => &name[..suffix.start()],
        None => name.rsplit_once('.').map_or(name, |(stem, _)| stem),
    }
}

/// Version embedded as `_v<N>.<ext>` at the end of a file name
pub fn embedded_version(name: &str) -> Option<u32> {
    VERSIONED_NAME
        .captures(name)
        .and_then(|c| c[1].parse().ok())
}

/// Archive-relative path of a collection inventory
pub fn inventory_path(collection: CollectionName, version: u32) -> String {
    format!(
        "{}/collection_{}_inventory_v{:03}.csv",
        collection, collection, version
    )
}

pub fn checksum_path(version: u32) -> String {
    format!("miscellaneous/checksum/checksum_v{:03}.tab", version)
}

pub fn document_path(version: u32) -> String {
    format!("document/spiceds_v{:03}.html", version)
}

/// Archive-relative path of the PDS4 label of a product
///
/// The extension becomes `.xml`; collection labels also drop `_inventory`.
pub fn label_path(relative: &str) -> String {
    let (dir, name) = match relative.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, relative),
    };
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let stem = if stem.starts_with("collection_") {
        stem.replacen("_inventory_v", "_v", 1)
    } else {
        stem.to_string()
    };
    match dir {
        Some(dir) => format!("{}/{}.xml", dir, stem),
        None => format!("{}.xml", stem),
    }
}

/// Recover kind and LIDVID of an archive-relative path
///
/// Files that are not archive products (bundle labels, readme files, ...)
/// are not identified.
pub fn identify(bundle_lid: &str, relative: &str) -> Option<(ProductKind, Lidvid)> {
    let parts: Vec<&str> = relative.split('/').collect();
    match parts.as_slice() {
        ["spice_kernels", "mk", name] if name.ends_with(".tm") => {
            let version = embedded_version(name)?;
            Some((
                ProductKind::MetaKernel,
                Lidvid::new(meta_kernel_lid(bundle_lid, name), version),
            ))
        }
        ["spice_kernels", dir, name] => {
            let kernel_type = KernelType::from_dir(dir)?;
            (KernelType::from_file_name(name) == Some(kernel_type)).then(|| {
                (
                    ProductKind::Kernel,
                    Lidvid::new(kernel_lid(bundle_lid, kernel_type, name), 1),
                )
            })
        }
        ["miscellaneous", "checksum", name]
            if name.starts_with("checksum_v") && name.ends_with(".tab") =>
        {
            let version = embedded_version(name)?;
            Some((
                ProductKind::Checksum,
                Lidvid::new(checksum_lid(bundle_lid), version),
            ))
        }
        ["document", name] if name.starts_with("spiceds_v") && name.ends_with(".html") => {
            let version = embedded_version(name)?;
            Some((
                ProductKind::Document,
                Lidvid::new(document_lid(bundle_lid), version),
            ))
        }
        [dir, name] => {
            let collection = CollectionName::from_dir(dir)?;
            let prefix = format!("collection_{}_inventory_v", collection);
            if !name.starts_with(&prefix) || !name.ends_with(".csv") {
                return None;
            }
            let version = embedded_version(name)?;
            Some((
                ProductKind::Inventory(collection),
                Lidvid::new(inventory_lid(bundle_lid, collection), version),
            ))
        }
        _ => None,
    }
}
