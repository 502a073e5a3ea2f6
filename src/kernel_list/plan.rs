//! Release plan
//!
//! The plan is a plain list of file names, one per line. It is either
//! written from the kernel pools or read from a file given on the command
//! line.

use std::path::Path;

use walkdir::WalkDir;

use super::KernelPatterns;
use crate::common::fs::{self as cfs, files_under};
use crate::context::{Faucet, RunContext};
use crate::error::{Result, config as config_err, fs as fs_err};
use crate::file_list::FileList;
use crate::metakernel::bump_version;

/// Plan of the run from the `-p` argument, or from the kernel pools
///
/// Returns `None` when no input for the release was found.
pub fn resolve(
    ctx: &RunContext,
    patterns: &KernelPatterns,
    plan: Option<&Path>,
    file_list: &mut FileList,
) -> Result<Option<Vec<String>>> {
    match plan {
        None => write_plan(ctx, patterns, None, file_list),
        Some(path) if path.extension().is_some_and(|e| e == "plan") => {
            read_plan(patterns, path).map(Some)
        }
        Some(path) if ctx.stops_at(Faucet::Labels) => {
            let name = cfs::file_name(path);
            write_plan(ctx, patterns, Some(&name), file_list)
        }
        Some(path) => Err(config_err::plan_invalid(format!(
            "{} is not a *.plan file; single kernels are only allowed when labeling",
            path.display()
        ))),
    }
}

/// Write the plan of the run to the working directory
///
/// The plan holds every kernel of the pools matching a kernel list pattern
/// and, unless labeling, the meta-kernel of the release. Nothing is written
/// when no input is found.
pub fn write_plan(
    ctx: &RunContext,
    patterns: &KernelPatterns,
    single: Option<&str>,
    file_list: &mut FileList,
) -> Result<Option<Vec<String>>> {
    let labeling = ctx.stops_at(Faucet::Labels);

    let candidates = match single {
        Some(name) if labeling => {
            tracing::info!("-- Generate archiving plan from input kernel: {}", name);
            vec![name.to_string()]
        }
        _ => {
            tracing::info!("-- Generate archiving plan from kernel directories:");
            for dir in &ctx.layout.kernels {
                tracing::info!("   {}", dir.display());
            }
            pool_kernels(&ctx.layout.kernels)
        }
    };

    let mut kernels: Vec<String> = candidates
        .into_iter()
        .filter(|name| patterns.matches_start(name))
        .collect();

    if labeling {
        tracing::info!("-- Meta-kernels not generated in labeling mode.");
    } else if let Some(name) = planned_meta_kernel(ctx, patterns, !kernels.is_empty())? {
        tracing::warn!("-- Plan will include {}", name);
        kernels.push(name);
    }

    if kernels.is_empty() {
        tracing::warn!("-- Inputs for the release not found.");
        return Ok(None);
    }

    let name = ctx.byproduct_name("plan");
    let mut text = kernels.join("\n");
    text.push('\n');
    cfs::write_text(&ctx.layout.working.join(&name), &text)?;
    file_list.record_byproduct(&name);

    report(&kernels);
    Ok(Some(kernels))
}

/// Read a plan, keeping the first match of every pattern on each line
pub fn read_plan(patterns: &KernelPatterns, path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(fs_err::not_found(path.display().to_string()));
    }
    tracing::info!("-- Reading release plan {}.", path.display());

    let mut kernels = Vec::new();
    for line in cfs::read_text(path)?.lines() {
        let found = patterns.search(line);
        if found.is_empty() && !line.trim().is_empty() {
            tracing::warn!("-- The following release plan line has not been matched:");
            tracing::warn!("   {}", line.trim_end());
        }
        kernels.extend(found);
    }

    report(&kernels);
    Ok(kernels)
}

/// File names of the kernel pools, meta-kernels excluded, sorted
fn pool_kernels(pools: &[std::path::PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = pools
        .iter()
        .flat_map(|pool| WalkDir::new(pool).into_iter().filter_map(|e| e.ok()))
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.contains(".tm"))
        .collect();
    names.sort();
    names
}

/// Meta-kernel the plan should include
///
/// A configured input is used as is. Otherwise the latest meta-kernel of
/// the archive is bumped, provided the release has kernels and the bumped
/// name is covered by the kernel list.
fn planned_meta_kernel(
    ctx: &RunContext,
    patterns: &KernelPatterns,
    has_kernels: bool,
) -> Result<Option<String>> {
    let Some(config) = ctx.config.meta_kernel.as_ref() else {
        return Ok(None);
    };
    if let Some(input) = &config.input {
        if !input.is_file() {
            return Err(config_err::invalid(format!(
                "meta-kernel input {} does not exist",
                input.display()
            )));
        }
        return Ok(Some(cfs::file_name(input)));
    }

    let mut archived: Vec<String> = files_under(&ctx.layout.archive_root())
        .into_iter()
        .filter(|relative| relative.contains("mk/") && relative.to_lowercase().ends_with(".tm"))
        .filter_map(|relative| relative.rsplit('/').next().map(str::to_string))
        .collect();
    archived.sort();

    let Some(latest) = archived.last() else {
        tracing::warn!("-- No former meta-kernel found to generate meta-kernel for the list.");
        return Ok(None);
    };
    let bumped = bump_version(latest).filter(|name| has_kernels && patterns.matches_start(name));
    if bumped.is_none() {
        tracing::error!("-- No former meta-kernel found to generate meta-kernel for the list.");
    }
    Ok(bumped)
}

fn report(kernels: &[String]) {
    tracing::info!("-- Reporting the products in Plan:");
    for kernel in kernels {
        tracing::info!("     {}", kernel);
    }
}
