//! Release plan and kernel list
//!
//! The kernel list describes every kernel of the release with the fields
//! of its matching `kernel_list` setup entry. It is a by-product of the
//! working directory and is validated before any product is registered.

pub mod plan;
pub mod record;

use std::path::{Path, PathBuf};

use chrono::Utc;
use regex::Regex;

use crate::common::fs::{self as cfs, files_under};
use crate::config::KernelPattern;
use crate::context::RunContext;
use crate::diff::{DiffReport, DiffValidator};
use crate::error::{BundlerError, Result, catalog as catalog_err, config as config_err};
use crate::file_list::FileList;
use crate::kernels::{self, KernelType};
use crate::template::{self, TemplateValues};

pub use record::{KernelRecord, ListSummary};

/// Compiled `kernel_list` patterns with their mappings
#[derive(Debug, Clone)]
pub struct KernelPatterns {
    entries: Vec<(Regex, KernelPattern)>,
    mappings: Vec<Regex>,
}

impl KernelPatterns {
    pub fn compile(entries: &[KernelPattern]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(entries.len());
        let mut mappings = Vec::new();
        for entry in entries {
            compiled.push((Regex::new(&entry.pattern)?, entry.clone()));
            if let Some(mapping) = entry.mapping.as_deref().filter(|m| !m.trim().is_empty()) {
                mappings.push(Regex::new(mapping)?);
            }
        }
        Ok(Self {
            entries: compiled,
            mappings,
        })
    }

    fn all(&self) -> impl Iterator<Item = &Regex> {
        self.entries.iter().map(|(re, _)| re).chain(&self.mappings)
    }

    /// True when a pattern or mapping matches at the start of `name`
    pub fn matches_start(&self, name: &str) -> bool {
        self.all()
            .any(|re| re.find(name).is_some_and(|m| m.start() == 0))
    }

    /// First match of every pattern and mapping anywhere in `line`
    pub fn search(&self, line: &str) -> Vec<String> {
        self.all()
            .filter_map(|re| re.find(line))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// First entry whose pattern matches at the start of `name`
    pub fn entry_for(&self, name: &str) -> Option<&KernelPattern> {
        self.entries
            .iter()
            .find(|(re, _)| re.find(name).is_some_and(|m| m.start() == 0))
            .map(|(_, entry)| entry)
    }
}

/// Write the kernel list of the plan, returning its file name
pub fn write_list(
    ctx: &RunContext,
    patterns: &KernelPatterns,
    plan: &[String],
    file_list: &mut FileList,
) -> Result<String> {
    let name = ctx.byproduct_name("kernel_list");
    let template_text = template::load_or_default(
        ctx.layout.templates_dir(),
        template::KERNEL_LIST_TEMPLATE_NAME,
        template::KERNEL_LIST_TEMPLATE,
    )?;
    let mut text = template::with_line_endings(
        &template::render(&template_text, &header_values(ctx)),
        "\n",
    );

    for kernel in plan {
        let record = KernelType::from_file_name(kernel)
            .zip(patterns.entry_for(kernel))
            .map(|(kernel_type, entry)| KernelRecord::new(kernel_type, kernel, entry));
        match record {
            Some(record) => {
                if let Some(mapping) = &record.mapping {
                    tracing::info!("-- Mapping {} to {}", kernel, mapping);
                }
                text.push_str(&record.render());
            }
            None => tracing::warn!("-- No kernel list entry describes {}; not listed.", kernel),
        }
    }

    cfs::write_text(&ctx.layout.working.join(&name), &text)?;
    file_list.record_byproduct(&name);
    tracing::info!("-- Generated kernel list {}", name);
    Ok(name)
}

fn header_values(ctx: &RunContext) -> TemplateValues {
    let config = &ctx.config;
    let producer = config.producer.as_ref();
    let na = || "N/A".to_string();
    let mut values = TemplateValues::new();
    values.insert("CURRENTDATE", Utc::now().format("%Y-%m-%d").to_string());
    values.insert(
        "OBS",
        config
            .mission
            .observer
            .clone()
            .unwrap_or_else(|| config.mission.name.clone()),
    );
    values.insert("AUTHOR", config.author().to_string());
    values.insert("PHONE", producer.and_then(|p| p.phone.clone()).unwrap_or_else(na));
    values.insert("EMAIL", producer.and_then(|p| p.email.clone()).unwrap_or_else(na));
    values.insert("DATASETID", config.bundle_lid());
    values.insert("VOLID", format!("{}_spice", ctx.acronym()));
    values.insert("RELID", format!("{:04}", ctx.release.new_release));
    values.insert("RELDATE", config.release_date().format("%Y-%m-%d").to_string());
    values
}

/// Copy a user-supplied kernel list into the working directory
///
/// Returns the canonical list name and the kernels of its `FILE` records,
/// which stand in for the plan.
pub fn read_list(ctx: &RunContext, source: &Path) -> Result<(String, Vec<String>)> {
    if !source.is_file() {
        return Err(config_err::invalid(format!(
            "kernel list {} does not exist",
            source.display()
        )));
    }
    let name = ctx.byproduct_name("kernel_list");
    let target = ctx.layout.working.join(&name);
    let same_file = dunce::canonicalize(source).ok() == dunce::canonicalize(&target).ok();
    if !same_file {
        cfs::copy_file(source, &target)?;
    }
    tracing::info!("-- Using kernel list {} as {}", source.display(), name);

    let kernels = ListSummary::parse(&cfs::read_text(&target)?).kernels;
    Ok((name, kernels))
}

/// Check the kernel list against the plan, the pools and earlier lists
pub fn validate(ctx: &RunContext, list_name: &str, plan: &[String]) -> Result<()> {
    let list_path = ctx.layout.working.join(list_name);
    tracing::info!("-- Validating kernel list {}.", list_name);
    let summary = ListSummary::parse(&cfs::read_text(&list_path)?);

    if !summary.counts_match() {
        tracing::error!("List does not have the same number of entries for:");
        tracing::error!("   FILE             ({})", summary.file_count());
        tracing::error!("   MAKLABEL_OPTIONS ({})", summary.option_count);
        tracing::error!("   DESCRIPTION      ({})", summary.description_count);
        return Err(BundlerError::KernelListCountMismatch {
            list: list_name.to_string(),
            files: summary.file_count(),
            options: summary.option_count,
            descriptions: summary.description_count,
        });
    }

    if let Some(missing) = summary.kernels.iter().find(|k| !plan.contains(k)) {
        return Err(config_err::invalid(format!(
            "{} of kernel list {} is not in the plan",
            missing, list_name
        )));
    }

    let repeated = record::duplicates(&summary.kernels);
    if !repeated.is_empty() {
        return Err(catalog_err::duplicate_kernel(&repeated));
    }

    check_pools(ctx, &summary.kernels);
    check_archive(ctx, &summary.kernels);

    let mut options = summary.options.clone();
    options.sort();
    options.dedup();
    tracing::info!("-- Display all the MAKLABEL_OPTIONS:");
    for option in &options {
        tracing::info!("     {}", option);
    }

    let release_lists = release_lists(ctx);
    check_release_lists(&release_lists)?;

    if ctx.diff.is_some() && ctx.release.is_increment {
        compare_with_previous(ctx, &release_lists)?;
    }
    Ok(())
}

fn check_pools(ctx: &RunContext, kernels: &[String]) {
    tracing::info!("-- Checking that kernels are present in the kernel directories.");
    let mut all_present = true;
    for kernel in kernels {
        if cfs::find_in_dirs(&ctx.layout.kernels, kernel).is_some() {
            continue;
        }
        if kernel.contains(".tm") {
            tracing::info!("     {} not present as expected.", kernel);
        } else {
            tracing::warn!("     {} not present. Kernel might be mapped.", kernel);
            all_present = false;
        }
    }
    if all_present {
        tracing::info!("     All kernels present in directory.");
    }
}

fn check_archive(ctx: &RunContext, kernels: &[String]) {
    tracing::info!(
        "-- Checking that kernels are present in {}:",
        ctx.layout.bundle.display()
    );
    let mut present = false;
    for kernel in kernels {
        let Some(kernel_type) = KernelType::from_file_name(kernel) else {
            continue;
        };
        if ctx
            .layout
            .archived(&kernels::staging_path(kernel_type, kernel))
            .is_file()
        {
            tracing::error!("     {} present.", kernel);
            present = true;
        }
    }
    if !present {
        tracing::info!("     No kernels present in final area.");
    }
}

/// Release kernel lists of the working directory, oldest first
///
/// Ordered by release number: `_release_100` follows `_release_99`.
fn release_lists(ctx: &RunContext) -> Vec<PathBuf> {
    let prefix = format!("{}_release_", ctx.acronym());
    let mut lists: Vec<(u32, String)> = files_under(&ctx.layout.working)
        .into_iter()
        .filter(|name| !name.contains('/'))
        .filter_map(|name| {
            let release = name
                .strip_prefix(&prefix)?
                .strip_suffix(".kernel_list")?
                .parse()
                .ok()?;
            Some((release, name))
        })
        .collect();
    lists.sort();
    lists
        .into_iter()
        .map(|(_, name)| ctx.layout.working.join(name))
        .collect()
}

fn check_release_lists(lists: &[PathBuf]) -> Result<()> {
    tracing::info!("-- Checking for duplicates in complete kernel list:");
    let mut kernels = Vec::new();
    for list in lists {
        tracing::info!("     Adding {} in check.", cfs::file_name(list));
        kernels.extend(ListSummary::parse(&cfs::read_text(list)?).kernels);
    }
    let repeated = record::duplicates(&kernels);
    if !repeated.is_empty() {
        return Err(catalog_err::duplicate_kernel(&repeated));
    }
    tracing::info!("     List contains no duplicates.");
    Ok(())
}

fn compare_with_previous(ctx: &RunContext, lists: &[PathBuf]) -> Result<()> {
    tracing::info!("-- Comparing current list with previous list:");
    match lists {
        [.., previous, current] => {
            let report = DiffReport::between(previous, current)?;
            DiffValidator::new(ctx).publish(&report)
        }
        _ => {
            tracing::warn!("-- Previous list not available.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DiffMode;
    use crate::release::ReleaseState;
    use crate::test_fixtures::MissionFixture;

    fn patterns(ctx: &RunContext) -> KernelPatterns {
        KernelPatterns::compile(&ctx.config.kernel_list).unwrap()
    }

    fn plan(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_patterns_match_at_start() {
        let patterns = KernelPatterns::compile(&[KernelPattern {
            pattern: r"naif[0-9]{4}\.tls".to_string(),
            description: "LSK".to_string(),
            options: None,
            mapping: Some(r"maven_sclk\.tsc".to_string()),
        }])
        .unwrap();
        assert!(patterns.matches_start("naif0012.tls"));
        assert!(patterns.matches_start("maven_sclk.tsc"));
        assert!(!patterns.matches_start("old_naif0012.tls"));
        assert_eq!(patterns.search("lsk/naif0012.tls"), ["naif0012.tls"]);
        assert!(patterns.entry_for("maven_sclk.tsc").is_none());
    }

    #[test]
    fn test_write_and_validate_list() {
        let fixture = MissionFixture::new();
        fixture.kernel_file("lsk/naif0012.tls", "KPL/LSK");
        let ctx = fixture.context(ReleaseState::first());
        let mut file_list = FileList::detached();
        let plan = plan(&["naif0012.tls", "maven_v01.tm"]);

        let name = write_list(&ctx, &patterns(&ctx), &plan, &mut file_list).unwrap();
        assert_eq!(name, "maven_release_01.kernel_list");
        let text = std::fs::read_to_string(ctx.layout.working.join(&name)).unwrap();
        assert!(text.contains("DATASETID = urn:nasa:pds:maven.spice\n"));
        assert!(text.contains("RELEASE_ID = 0001\n"));
        assert!(text.contains("EMAIL = N/A\n"));
        assert!(text.contains("FILE             = spice_kernels/mk/maven_v01.tm\n"));
        assert_eq!(
            file_list.entries(),
            ["working_directory/maven_release_01.kernel_list"]
        );

        validate(&ctx, &name, &plan).unwrap();
    }

    #[test]
    fn test_count_mismatch() {
        let fixture = MissionFixture::new();
        let ctx = fixture.context(ReleaseState::first());
        fixture.write_input(
            "working/maven_release_01.kernel_list",
            "EOH\n\
             FILE             = spice_kernels/lsk/naif0012.tls\n\
             DESCRIPTION      = LSK.\n",
        );
        let err = validate(&ctx, "maven_release_01.kernel_list", &plan(&["naif0012.tls"]))
            .unwrap_err();
        assert!(matches!(
            err,
            BundlerError::KernelListCountMismatch {
                files: 1,
                options: 0,
                descriptions: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_list_outside_plan() {
        let fixture = MissionFixture::new();
        let ctx = fixture.context(ReleaseState::first());
        let name = write_list(
            &ctx,
            &patterns(&ctx),
            &plan(&["naif0012.tls"]),
            &mut FileList::detached(),
        )
        .unwrap();
        let err = validate(&ctx, &name, &plan(&["naif0011.tls"])).unwrap_err();
        assert!(matches!(err, BundlerError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_duplicate_in_list() {
        let fixture = MissionFixture::new();
        let ctx = fixture.context(ReleaseState::first());
        let plan = plan(&["naif0012.tls", "naif0012.tls"]);
        let name = write_list(&ctx, &patterns(&ctx), &plan, &mut FileList::detached()).unwrap();
        let err = validate(&ctx, &name, &plan).unwrap_err();
        assert!(matches!(err, BundlerError::DuplicateKernel { .. }));
    }

    #[test]
    fn test_duplicate_across_releases() {
        let fixture = MissionFixture::new();
        fixture.write_input(
            "working/maven_release_01.kernel_list",
            "FILE             = spice_kernels/lsk/naif0012.tls\n\
             MAKLABEL_OPTIONS =\n\
             DESCRIPTION      = LSK.\n",
        );
        let ctx = fixture.context(ReleaseState::after(1));
        let plan = plan(&["naif0012.tls"]);
        let name = write_list(&ctx, &patterns(&ctx), &plan, &mut FileList::detached()).unwrap();
        assert_eq!(name, "maven_release_02.kernel_list");

        let err = validate(&ctx, &name, &plan).unwrap_err();
        assert!(matches!(err, BundlerError::DuplicateKernel { .. }));
    }

    #[test]
    fn test_diff_with_previous_list() {
        let fixture = MissionFixture::new();
        fixture.write_input(
            "working/maven_release_01.kernel_list",
            "FILE             = spice_kernels/lsk/naif0011.tls\n\
             MAKLABEL_OPTIONS =\n\
             DESCRIPTION      = LSK.\n",
        );
        let ctx = fixture.context_with_diff(ReleaseState::after(1), DiffMode::Files);
        let plan = plan(&["naif0012.tls"]);
        let name = write_list(&ctx, &patterns(&ctx), &plan, &mut FileList::detached()).unwrap();

        validate(&ctx, &name, &plan).unwrap();
        assert!(
            ctx.layout
                .working
                .join("diff/diff_maven_release_02.kernel_list.txt")
                .is_file()
        );
    }

    #[test]
    fn test_release_lists_ordered_by_number() {
        let fixture = MissionFixture::new();
        for release in ["99", "100", "07"] {
            fixture.write_input(
                &format!("working/maven_release_{}.kernel_list", release),
                "",
            );
        }
        fixture.write_input("working/maven_release_notes.kernel_list", "");
        let ctx = fixture.context(ReleaseState::after(100));

        let names: Vec<String> = release_lists(&ctx).iter().map(|p| cfs::file_name(p)).collect();
        assert_eq!(
            names,
            [
                "maven_release_07.kernel_list",
                "maven_release_99.kernel_list",
                "maven_release_100.kernel_list"
            ]
        );
    }

    #[test]
    fn test_read_list_uses_canonical_name() {
        let fixture = MissionFixture::new();
        let source = fixture.write_input(
            "custom.kernel_list",
            "FILE             = spice_kernels/lsk/naif0012.tls\n\
             MAKLABEL_OPTIONS =\n\
             DESCRIPTION      = LSK.\n",
        );
        let ctx = fixture.context(ReleaseState::first());

        let (name, kernels) = read_list(&ctx, &source).unwrap();
        assert_eq!(name, "maven_release_01.kernel_list");
        assert_eq!(kernels, ["naif0012.tls"]);
        validate(&ctx, &name, &kernels).unwrap();
    }
}
