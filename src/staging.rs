//! Staging and archive areas
//!
//! Kernels are copied from the kernel pools into the staging area, which
//! mirrors the archive root. Once every product is staged the whole area is
//! copied into `<bundle>/<mission>_spice/`.

use std::path::Path;

use crate::catalog::{Product, ProductCatalog};
use crate::checksum::md5_file;
use crate::common::fs::{self as cfs, files_under};
use crate::context::RunContext;
use crate::error::{Result, config as config_err, fs as fs_err};
use crate::file_list::{BYPRODUCT_PREFIX, FileList};
use crate::kernels::{self, KernelType};
use crate::progress::ProgressDisplay;

/// Copy a kernel to staging and register it
///
/// A kernel already in staging or in the archive is logged as an error and
/// registered as not new.
pub fn stage_kernel(
    ctx: &RunContext,
    catalog: &mut ProductCatalog,
    file_list: &mut FileList,
    name: &str,
) -> Result<Product> {
    let kernel_type = KernelType::from_file_name(name)
        .ok_or_else(|| config_err::plan_invalid(format!("{} is not a SPICE kernel", name)))?;
    let relative = kernels::staging_path(kernel_type, name);
    let staged = ctx.layout.staged(&relative);
    let archived = ctx.layout.archived(&relative);

    let product = Product::kernel(catalog.bundle_lid(), kernel_type, name);
    let product = if staged.is_file() {
        tracing::error!("     {} already present in staging directory.", name);
        product
            .with_coverage(ctx.coverage.coverage(&staged))
            .carried_over()
    } else if archived.is_file() {
        tracing::error!("     {} already present in the archive.", name);
        product
            .with_coverage(ctx.coverage.coverage(&archived))
            .carried_over()
    } else {
        let source = cfs::find_in_dirs(&ctx.layout.kernels, name)
            .ok_or_else(|| fs_err::kernel_not_found(name))?;
        tracing::info!("-- Copy {} to staging directory.", name);
        cfs::copy_file(&source, &staged)?;
        file_list.record(relative.as_str());
        product.with_coverage(ctx.coverage.coverage(&staged))
    };

    catalog.register(product.clone())?;
    Ok(product)
}

/// Stage every kernel of the plan, meta-kernels excluded
pub fn stage_kernels(
    ctx: &RunContext,
    catalog: &mut ProductCatalog,
    file_list: &mut FileList,
    names: &[String],
    progress: &mut ProgressDisplay,
) -> Result<Vec<Product>> {
    let names: Vec<&String> = names
        .iter()
        .filter(|name| KernelType::from_file_name(name) != Some(KernelType::Mk))
        .collect();

    progress.start(names.len() as u64, "kernels");
    let mut staged = Vec::with_capacity(names.len());
    for name in names {
        match stage_kernel(ctx, catalog, file_list, name) {
            Ok(product) => staged.push(product),
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        }
        progress.advance(name);
    }
    progress.finish();
    Ok(staged)
}

/// Copy the staging area into the archive root
///
/// Files already archived with the same content are left alone and not
/// recorded, so the staging area may still hold earlier releases.
pub fn copy_to_archive(ctx: &RunContext, file_list: &mut FileList) -> Result<usize> {
    let root = ctx.layout.archive_root();
    tracing::info!("-- Copying staging area to {}.", root.display());

    let mut copied = 0;
    for relative in files_under(&ctx.layout.staging) {
        let staged = ctx.layout.staged(&relative);
        let target = root.join(&relative);
        if target.is_file() && md5_file(&target)? == md5_file(&staged)? {
            tracing::debug!("Already archived {}", relative);
            continue;
        }
        cfs::copy_file(&staged, &target)?;
        file_list.record(relative.as_str());
        tracing::debug!("Copied {}", relative);
        copied += 1;
    }
    tracing::info!("     {} files copied.", copied);
    Ok(copied)
}

/// Remove the files recorded by an earlier run
///
/// Products are removed from both the staging area and the archive; the
/// plan and kernel list of that run are removed from the working
/// directory. Directories are kept.
pub fn clear(ctx: &RunContext, file_list: &Path) -> Result<usize> {
    let entries = FileList::read(file_list)?;
    let mut removed = 0;

    tracing::info!(
        "-- Removing files from staging area: {}.",
        ctx.layout.staging.display()
    );
    let products: Vec<&String> = entries
        .iter()
        .filter(|e| !e.starts_with(BYPRODUCT_PREFIX))
        .collect();
    for entry in &products {
        removed += remove_or_warn(&ctx.layout.staged(entry), entry)?;
    }

    tracing::info!(
        "-- Removing files from final area: {}.",
        ctx.layout.archive_root().display()
    );
    for entry in &products {
        removed += remove_or_warn(&ctx.layout.archived(entry), entry)?;
    }

    for name in entries
        .iter()
        .filter_map(|e| e.strip_prefix(BYPRODUCT_PREFIX))
        .filter(|name| name.ends_with(".plan") || name.ends_with(".kernel_list"))
    {
        tracing::info!("-- Removing previous run by-product: {}.", name);
        removed += remove_or_warn(&ctx.layout.working.join(name), name)?;
    }
    Ok(removed)
}

fn remove_or_warn(path: &Path, entry: &str) -> Result<usize> {
    if cfs::remove_if_exists(path)? {
        Ok(1)
    } else {
        tracing::warn!("     File {} not found.", entry);
        Ok(0)
    }
}
