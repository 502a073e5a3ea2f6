//! Meta-kernel generation
//!
//! A meta-kernel lists the latest qualifying kernel of every grammar token.
//! It is either rendered from the grammar or taken verbatim from the
//! configured input file; in both cases its entries must resolve to a
//! coverage interval, from this release or from the archive.

pub mod grammar;
pub mod matcher;
pub mod render;

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::catalog::lid::{self, embedded_version};
use crate::catalog::{Product, ProductCatalog};
use crate::common::fs::{self as cfs, files_under};
use crate::config::{Layout, MetaKernelConfig};
use crate::context::RunContext;
use crate::coverage::Interval;
use crate::error::warning::BundlerWarning;
use crate::error::{Result, catalog as catalog_err, config as config_err};
use crate::kernels::{self, KernelType};
use crate::template;

pub use grammar::Grammar;
pub use render::{bump_version, mk2list};

/// Write the meta-kernel `name` to staging and describe it as a product
pub fn generate(ctx: &RunContext, catalog: &ProductCatalog, name: &str) -> Result<Product> {
    let config = ctx.config.meta_kernel.as_ref().ok_or_else(|| {
        config_err::invalid(format!(
            "meta-kernel {} is planned but no meta_kernel section is configured",
            name
        ))
    })?;
    let version = embedded_version(name).ok_or_else(|| {
        config_err::plan_invalid(format!("meta-kernel {} has no _v<N> version", name))
    })?;

    tracing::info!("-- Generating meta-kernel {}.", name);
    check_version(ctx, name, version);

    let relative = kernels::staging_path(KernelType::Mk, name);
    let target = ctx.layout.staged(&relative);
    let text = match &config.input {
        Some(input) => {
            tracing::info!("     Using {} as provided.", input.display());
            cfs::copy_file(input, &target)?;
            cfs::read_text(&target)?
        }
        None => {
            let text = render_from_grammar(ctx, config, name)?;
            cfs::write_text(&target, &text)?;
            text
        }
    };

    let listed = mk2list(&text);
    tracing::info!("     {} kernels listed.", listed.len());
    let coverage = listed_coverage(ctx, catalog, config, &listed)?;
    Ok(Product::meta_kernel(catalog.bundle_lid(), name, version).with_coverage(coverage))
}

fn render_from_grammar(ctx: &RunContext, config: &MetaKernelConfig, name: &str) -> Result<String> {
    let grammar = Grammar::parse(&config.grammar)?;
    let staged = staged_kernels(&ctx.layout.staging);
    let mut prior_references = Vec::new();
    for path in prior_meta_kernels(&ctx.layout, name) {
        prior_references.extend(mk2list(&cfs::read_text(&path)?));
    }

    let kernels = matcher::build_manifest(&grammar, &staged, &prior_references);
    let template_text = template::load_or_default(
        ctx.layout.templates_dir(),
        template::META_KERNEL_TEMPLATE_NAME,
        template::META_KERNEL_TEMPLATE,
    )?;
    let current_date = ctx.config.release_date().format("%Y-%m-%d").to_string();
    Ok(render::MetaKernelText {
        file_name: name,
        mission_name: &ctx.config.mission.name,
        author: ctx.config.author(),
        current_date: &current_date,
        kernels: &kernels,
    }
    .render(&template_text))
}

/// Declared version against the lineage of published meta-kernels
fn check_version(ctx: &RunContext, name: &str, declared: u32) {
    let latest = prior_meta_kernels(&ctx.layout, name)
        .last()
        .and_then(|path| embedded_version(&cfs::file_name(path)));
    match latest {
        Some(latest) if latest + 1 != declared => {
            BundlerWarning::VersionMismatch {
                product: name.to_string(),
                declared,
                expected: latest + 1,
            }
            .emit();
        }
        Some(_) => {}
        None if ctx.release.is_increment => {
            BundlerWarning::lookup(
                format!("previous meta-kernel for {}", name),
                format!("version {} from the file name is used", declared),
            )
            .emit();
        }
        None => {}
    }
}

/// Union of the coverage of the listed kernels
///
/// Kernels missing from the catalog are looked up in the archive. When
/// `coverage_kernels` is set only matching kernels count towards the union.
fn listed_coverage(
    ctx: &RunContext,
    catalog: &ProductCatalog,
    config: &MetaKernelConfig,
    listed: &[String],
) -> Result<Option<Interval>> {
    let filters = config
        .coverage_kernels
        .iter()
        .map(|p| Regex::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut intervals = Vec::new();
    for name in listed {
        let kernel_type =
            KernelType::from_file_name(name).ok_or_else(|| catalog_err::missing_coverage(name))?;
        let interval = match catalog.find(&lid::kernel_lid(catalog.bundle_lid(), kernel_type, name)) {
            Some(product) => product.coverage,
            None => {
                tracing::warn!("     {} is not part of this release; using the archived file.", name);
                let archived = ctx
                    .layout
                    .archived(&kernels::staging_path(kernel_type, name));
                ctx.coverage.coverage(&archived)
            }
        }
        .ok_or_else(|| catalog_err::missing_coverage(name))?;

        if filters.is_empty() || filters.iter().any(|f| f.is_match(name)) {
            intervals.push(interval);
        }
    }
    Ok(Interval::span(intervals))
}

/// Check that every kernel listed by an archived meta-kernel is archived
pub fn validate_archived(layout: &Layout, meta_kernel: &Product) -> Result<()> {
    tracing::info!("-- Validating meta-kernel {}.", meta_kernel.name);
    let text = cfs::read_text(&layout.archived(&meta_kernel.path))?;
    for name in mk2list(&text) {
        let archived = KernelType::from_file_name(&name)
            .map(|kernel_type| layout.archived(&kernels::staging_path(kernel_type, &name)));
        if !archived.is_some_and(|path| path.is_file()) {
            tracing::error!("     {} not found in the archive.", name);
            return Err(catalog_err::meta_kernel_unresolved(&meta_kernel.name, name));
        }
    }
    tracing::info!("     OK");
    Ok(())
}

/// Kernel names in the staging area, meta-kernels excluded
pub fn staged_kernels(staging: &Path) -> Vec<String> {
    files_under(&staging.join("spice_kernels"))
        .into_iter()
        .filter_map(|relative| relative.rsplit('/').next().map(str::to_string))
        .filter(|name| {
            KernelType::from_file_name(name).is_some_and(|t| t != KernelType::Mk)
        })
        .collect()
}

/// Published meta-kernels sharing the base name of `name`, oldest first
pub fn prior_meta_kernels(layout: &Layout, name: &str) -> Vec<PathBuf> {
    let base = lid::meta_kernel_base(name);
    let dir = layout.archived("spice_kernels/mk");
    let mut found: Vec<(u32, PathBuf)> = files_under(&dir)
        .into_iter()
        .filter(|file| !file.contains('/'))
        .filter(|file| lid::meta_kernel_base(file) == base && file.ends_with(".tm"))
        .filter_map(|file| embedded_version(&file).map(|v| (v, dir.join(&file))))
        .collect();
    found.sort();
    found.into_iter().map(|(_, path)| path).collect()
}
