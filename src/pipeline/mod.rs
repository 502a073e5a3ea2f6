//! Release pipeline
//!
//! Phases run in a fixed order, each one a possible stopping point:
//! clear, plan, kernel list, kernels and meta-kernels with their labels,
//! collection inventories, miscellaneous collection and bundle label,
//! staging, bundle. A complete run then checks the meta-kernels and the
//! bundle history of the archive.

mod miscellaneous;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalog::{CollectionName, Product, ProductCatalog};
use crate::checksum::ChecksumRegistry;
use crate::cli::RunArgs;
use crate::config::{Config, Layout};
use crate::context::{DiffMode, Faucet, RunContext};
use crate::coverage::Interval;
use crate::diff::DiffValidator;
use crate::common::fs as cfs;
use crate::document;
use crate::error::{Result, config as config_err};
use crate::file_list::FileList;
use crate::history;
use crate::inventory::{self, PriorInventory};
use crate::kernel_list::{self, KernelPatterns, ListSummary, plan};
use crate::kernels::KernelType;
use crate::label::product::ProductLabel;
use crate::metakernel;
use crate::progress::ProgressDisplay;
use crate::release;
use crate::staging;

/// Options of a run, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub plan: Option<PathBuf>,
    pub faucet: Option<Faucet>,
    pub diff: Option<DiffMode>,
    /// File list of an earlier run to roll back first
    pub clear: Option<PathBuf>,
    pub kernel_list: Option<PathBuf>,
    pub show_progress: bool,
}

impl From<&RunArgs> for RunOptions {
    fn from(args: &RunArgs) -> Self {
        Self {
            plan: args.plan.clone(),
            faucet: args.faucet,
            diff: args.diff,
            clear: args.clear.clone(),
            kernel_list: args.kernel_list.clone(),
            show_progress: true,
        }
    }
}

impl RunOptions {
    /// Faucet of the run; a clear without a faucet stops after clearing
    pub fn effective_faucet(&self) -> Option<Faucet> {
        match (self.faucet, &self.clear) {
            (None, Some(_)) => Some(Faucet::Clear),
            (faucet, _) => faucet,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The plan found no input for the release
    NoInput,
    /// Stopped at a faucet
    Stopped(Faucet),
    /// Every phase ran and the archive holds the new release
    Complete,
}

/// Resolve the release of `config` and run the pipeline
pub fn run(config: Config, options: &RunOptions) -> Result<Outcome> {
    let faucet = options.effective_faucet();
    if faucet == Some(Faucet::Clear) && options.clear.is_none() {
        return Err(config_err::invalid(
            "the clear faucet requires the file list of a previous run",
        ));
    }

    let layout = Layout::new(&config);
    let release = release::resolve_from_disk(&layout, options.clear.as_deref())?;
    let ctx = RunContext::new(config, release, faucet, options.diff);
    ReleaseOperation::new(&ctx, options).execute()
}

/// One pipeline run over a resolved context
pub struct ReleaseOperation<'a> {
    ctx: &'a RunContext,
    options: &'a RunOptions,
    catalog: ProductCatalog,
    file_list: FileList,
    registry: ChecksumRegistry,
    progress: ProgressDisplay,
    /// Kernel list descriptions keyed by kernel name
    descriptions: BTreeMap<String, String>,
}

impl<'a> ReleaseOperation<'a> {
    pub fn new(ctx: &'a RunContext, options: &'a RunOptions) -> Self {
        let file_list = FileList::new(ctx.layout.byproduct_path(
            ctx.run_type,
            ctx.release.new_release,
            "file_list",
        ));
        Self {
            ctx,
            options,
            catalog: ProductCatalog::new(ctx.config.bundle_lid()),
            file_list,
            registry: ChecksumRegistry::default(),
            progress: ProgressDisplay::new(options.show_progress),
            descriptions: BTreeMap::new(),
        }
    }

    /// Run every phase up to the faucet
    pub fn execute(mut self) -> Result<Outcome> {
        let ctx = self.ctx;
        tracing::info!("-- Generating {} of {}.", ctx.release, ctx.config.mission.name);

        if let Some(list) = &self.options.clear {
            staging::clear(ctx, list)?;
            if ctx.stops_at(Faucet::Clear) {
                return self.finish(Outcome::Stopped(Faucet::Clear));
            }
        }

        let Some(plan) = self.plan_and_list()? else {
            return self.finish(Outcome::NoInput);
        };
        if let Some(faucet) = [Faucet::Plan, Faucet::List]
            .into_iter()
            .find(|f| ctx.stops_at(*f))
        {
            return self.finish(Outcome::Stopped(faucet));
        }

        self.catalog.load_history(&ctx.layout.archive_root());
        let kernels = staging::stage_kernels(
            ctx,
            &mut self.catalog,
            &mut self.file_list,
            &plan,
            &mut self.progress,
        )?;
        let mission = ctx.config.mission_interval();
        for kernel in kernels.iter().filter(|k| k.new_in_this_release) {
            self.label(kernel, mission)?;
        }
        let meta_kernels = self.meta_kernels(&plan)?;

        if ctx.stops_at(Faucet::Labels) {
            staging::copy_to_archive(ctx, &mut self.file_list)?;
            return self.finish(Outcome::Stopped(Faucet::Labels));
        }

        let interval = increment_interval(ctx, &meta_kernels, &kernels);
        tracing::info!(
            "-- Increment interval: {} - {}",
            interval.start_label(),
            interval.stop_label()
        );

        if self.catalog.collection(CollectionName::SpiceKernels).updated() {
            self.inventory(CollectionName::SpiceKernels, interval)?;
        } else {
            tracing::warn!("-- spice_kernels collection not updated; no inventory written.");
        }

        if let Some(product) = document::write(ctx, &mut self.catalog)? {
            self.produced(&product.path);
            self.label(&product, mission)?;
            self.inventory(CollectionName::Document, interval)?;
        }

        miscellaneous::write(&mut self, &interval)?;

        if ctx.stops_at(Faucet::Staging) {
            return self.finish(Outcome::Stopped(Faucet::Staging));
        }
        staging::copy_to_archive(ctx, &mut self.file_list)?;
        if ctx.stops_at(Faucet::Bundle) {
            return self.finish(Outcome::Stopped(Faucet::Bundle));
        }

        for meta_kernel in &meta_kernels {
            metakernel::validate_archived(&ctx.layout, meta_kernel)?;
        }
        history::validate(&ctx.layout, self.catalog.bundle_lid())?;
        self.finish(Outcome::Complete)
    }

    /// Plan and kernel list phases, returning the kernels of the release
    fn plan_and_list(&mut self) -> Result<Option<Vec<String>>> {
        let ctx = self.ctx;
        let patterns = KernelPatterns::compile(&ctx.config.kernel_list)?;

        let (list_name, plan) = match &self.options.kernel_list {
            Some(source) => kernel_list::read_list(ctx, source)?,
            None => {
                let Some(plan) =
                    plan::resolve(ctx, &patterns, self.options.plan.as_deref(), &mut self.file_list)?
                else {
                    return Ok(None);
                };
                if ctx.stops_at(Faucet::Plan) {
                    return Ok(Some(plan));
                }
                let name = kernel_list::write_list(ctx, &patterns, &plan, &mut self.file_list)?;
                (name, plan)
            }
        };

        kernel_list::validate(ctx, &list_name, &plan)?;
        let list_text = cfs::read_text(&ctx.layout.working.join(&list_name))?;
        self.descriptions = ListSummary::parse(&list_text).descriptions;
        Ok(Some(plan))
    }

    /// Generate, register and label the meta-kernels of the plan
    fn meta_kernels(&mut self, plan: &[String]) -> Result<Vec<Product>> {
        let mission = self.ctx.config.mission_interval();
        let mut products = Vec::new();
        for name in plan
            .iter()
            .filter(|name| KernelType::from_file_name(name) == Some(KernelType::Mk))
        {
            let product = metakernel::generate(self.ctx, &self.catalog, name)?;
            self.catalog.register(product.clone())?;
            self.produced(&product.path);
            self.label(&product, mission)?;
            products.push(product);
        }
        Ok(products)
    }

    /// Write and label the inventory of a collection on top of its
    /// published one
    fn inventory(&mut self, collection: CollectionName, interval: Interval) -> Result<Product> {
        let prior = PriorInventory::published(&self.ctx.layout, collection)?;
        let product = inventory::write(self.ctx, &mut self.catalog, collection, prior.as_ref())?;
        self.produced(&product.path);
        self.label(&product, interval)?;
        Ok(product)
    }

    /// Stage the label of a product, returning its archive-relative path
    ///
    /// `span` stands in for a product without coverage of its own.
    fn label(&mut self, product: &Product, span: Interval) -> Result<String> {
        let description = self.descriptions.get(&product.name).map(String::as_str);
        let relative = ProductLabel::new(product, span)
            .with_description(description)
            .write(self.ctx)?;
        self.produced(&relative);
        Ok(relative)
    }

    /// Record a staged product and compare it with its earlier version
    fn produced(&mut self, relative: &str) {
        self.file_list.record(relative);
        compare(self.ctx, relative);
    }

    /// Write the run by-products and report the outcome
    fn finish(self, outcome: Outcome) -> Result<Outcome> {
        let ctx = self.ctx;
        self.registry
            .write(&ctx.layout.working.join(ctx.byproduct_name("checksum")))?;
        self.file_list.commit()?;
        match outcome {
            Outcome::NoInput => tracing::warn!("-- No input for {}.", ctx.release),
            Outcome::Stopped(faucet) => tracing::info!(
                "-- Execution stopped at the {} faucet.",
                format!("{:?}", faucet).to_lowercase()
            ),
            Outcome::Complete => tracing::info!("-- Execution finished."),
        }
        Ok(outcome)
    }
}

/// Compare a staged file with its earlier version, never failing the run
fn compare(ctx: &RunContext, relative: &str) {
    if let Err(e) = DiffValidator::new(ctx).validate(relative) {
        tracing::warn!("-- Comparison of {} skipped: {}", relative, e);
    }
}

/// Time span of the release
///
/// The coverage of the meta-kernels, else the span of the new kernels,
/// else the whole mission.
fn increment_interval(ctx: &RunContext, meta_kernels: &[Product], kernels: &[Product]) -> Interval {
    Interval::span(meta_kernels.iter().filter_map(|p| p.coverage))
        .or_else(|| {
            Interval::span(
                kernels
                    .iter()
                    .filter(|p| p.new_in_this_release)
                    .filter_map(|p| p.coverage),
            )
        })
        .unwrap_or_else(|| ctx.config.mission_interval())
}
