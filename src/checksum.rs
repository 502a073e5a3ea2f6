//! MD5 checksums of archive files
//!
//! The checksum table lists every file of the archive as
//! `<relative-path> <md5>`, except the table itself and its label. Each
//! release carries the rows of the previous table forward, adds that table
//! and its label, and then adds the files it stages.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::catalog::lid::{self, embedded_version};
use crate::catalog::{Product, ProductCatalog};
use crate::common::fs::{self as cfs, files_under};
use crate::config::{Layout, LineEnding};
use crate::error::{Result, fs as fs_err};
use crate::progress::ProgressDisplay;

/// Calculate the MD5 digest of a file as lower-case hex
pub fn md5_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| fs_err::read_failed(path, &e))?;

    let mut reader = BufReader::new(file);
    let mut context = md5::Context::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| fs_err::read_failed(path, &e))?;

        if bytes_read == 0 {
            break;
        }

        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Rows of a checksum table keyed by archive-relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumTable {
    rows: BTreeMap<String, String>,
}

impl ChecksumTable {
    /// Parse `<path> <md5>` rows, ignoring malformed lines
    pub fn parse(text: &str) -> Self {
        let rows = text
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                match (fields.next(), fields.next(), fields.next()) {
                    (Some(path), Some(md5), None) => Some((path.to_string(), md5.to_string())),
                    _ => None,
                }
            })
            .collect();
        Self { rows }
    }

    /// Latest table in the archive with its version
    pub fn published(layout: &Layout) -> Result<Option<(u32, Self)>> {
        let dir = layout.archived("miscellaneous/checksum");
        let latest = files_under(&dir)
            .into_iter()
            .filter(|name| name.starts_with("checksum_v") && name.ends_with(".tab"))
            .filter_map(|name| embedded_version(&name).map(|v| (v, dir.join(&name))))
            .max();
        match latest {
            Some((version, path)) => {
                tracing::info!("-- Previous checksum file is: {}", path.display());
                Ok(Some((version, Self::parse(&cfs::read_text(&path)?))))
            }
            None => Ok(None),
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, md5: impl Into<String>) {
        self.rows.insert(path.into(), md5.into());
    }

    #[cfg(test)]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.rows.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.rows.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, eol: &str) -> String {
        self.rows
            .iter()
            .map(|(path, md5)| format!("{} {}{}", path, md5, eol))
            .collect()
    }
}

/// Checksums of the products staged by this run
///
/// Written to the working directory as `<mission>_<run_type>_<NN>.checksum`.
#[derive(Debug, Clone, Default)]
pub struct ChecksumRegistry {
    table: ChecksumTable,
}

impl ChecksumRegistry {
    pub fn record(&mut self, path: impl Into<String>, md5: impl Into<String>) {
        self.table.insert(path, md5);
    }

    #[cfg(test)]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.table.get(path)
    }

    /// Write the registry, skipping an empty one
    pub fn write(&self, path: &Path) -> Result<bool> {
        if self.table.is_empty() {
            return Ok(false);
        }
        cfs::write_text(path, &self.table.render("\n"))?;
        tracing::info!("-- Checksum registry written to {}", path.display());
        Ok(true)
    }
}

/// Builds one checksum table product
#[derive(Debug, Clone)]
pub struct ChecksumRegistrar {
    product: Product,
    table: ChecksumTable,
    eol: LineEnding,
}

impl ChecksumRegistrar {
    /// Start table `version` from the rows of the previous table
    pub fn new(bundle_lid: &str, version: u32, carried: ChecksumTable, eol: LineEnding) -> Self {
        Self {
            product: Product::checksum(bundle_lid, version),
            table: carried,
            eol,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn table(&self) -> &ChecksumTable {
        &self.table
    }

    pub fn register(&mut self, path: impl Into<String>, md5: impl Into<String>) {
        self.table.insert(path, md5);
    }

    /// Add the table of release `version` and its label
    ///
    /// A table never lists itself, so the next one lists it. The staged copy
    /// is preferred over the archived one. Returns the number of rows added.
    pub fn carry_table(&mut self, layout: &Layout, version: u32) -> Result<usize> {
        let table = lid::checksum_path(version);
        let label = lid::label_path(&table);
        let mut carried = 0;
        for relative in [table, label] {
            let Some(path) = [layout.staged(&relative), layout.archived(&relative)]
                .into_iter()
                .find(|path| path.is_file())
            else {
                tracing::debug!("{} not found; not carried.", relative);
                continue;
            };
            self.table.insert(relative, md5_file(&path)?);
            carried += 1;
        }
        if carried == 0 {
            tracing::warn!("     Checksum table v{:03} not found.", version);
        }
        Ok(carried)
    }

    /// Checksum every file under `root` except the table itself
    ///
    /// Staged files are also recorded in the registry and stamped on their
    /// catalog products.
    pub fn register_staged(
        &mut self,
        root: &Path,
        catalog: &mut ProductCatalog,
        registry: &mut ChecksumRegistry,
        progress: &mut ProgressDisplay,
    ) -> Result<usize> {
        let label = lid::label_path(&self.product.path);
        let files: Vec<String> = files_under(root)
            .into_iter()
            .filter(|relative| *relative != self.product.path && *relative != label)
            .collect();
        progress.start(files.len() as u64, "checksums");
        for relative in &files {
            self.measure(root, relative, catalog, registry)?;
            progress.advance(relative);
        }
        progress.finish();
        Ok(files.len())
    }

    /// Recompute the row of one file that changed after registration
    pub fn refresh(
        &mut self,
        root: &Path,
        relative: &str,
        catalog: &mut ProductCatalog,
        registry: &mut ChecksumRegistry,
    ) -> Result<()> {
        tracing::info!("     Updating checksum of {}.", relative);
        self.measure(root, relative, catalog, registry)
    }

    fn measure(
        &mut self,
        root: &Path,
        relative: &str,
        catalog: &mut ProductCatalog,
        registry: &mut ChecksumRegistry,
    ) -> Result<()> {
        let path = root.join(relative);
        let md5 = md5_file(&path)?;
        let size = std::fs::metadata(&path)
            .map_err(|e| fs_err::read_failed(&path, &e))?
            .len();
        catalog.stamp(relative, size, &md5);
        registry.record(relative, md5.as_str());
        self.table.insert(relative, md5);
        Ok(())
    }

    /// Write the table under `root`, returning its path
    pub fn emit(&self, root: &Path) -> Result<PathBuf> {
        let path = root.join(&self.product.path);
        cfs::write_text(&path, &self.table.render(self.eol.as_str()))?;
        tracing::info!(
            "-- Generated {} with {} entries.",
            self.product.path,
            self.table.len()
        );
        Ok(path)
    }
}
