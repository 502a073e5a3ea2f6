//! Product labels
//!
//! A label carries the identifier, size, MD5 and time span of the staged
//! file it describes. Kernel labels add the kernel type and the description
//! from the kernel list; meta-kernel labels reference every listed kernel;
//! collection labels count the inventory records.

use crate::catalog::lid;
use crate::catalog::{CollectionName, Product, ProductKind};
use crate::checksum::md5_file;
use crate::common::fs as cfs;
use crate::context::RunContext;
use crate::coverage::Interval;
use crate::error::{Result, fs as fs_err};
use crate::kernels::{self, KernelType};
use crate::metakernel::mk2list;
use crate::template::{self, TemplateValues};

/// Label of one staged product
pub struct ProductLabel<'a> {
    product: &'a Product,
    /// Time span used when the product has no coverage of its own
    span: Interval,
    description: Option<&'a str>,
}

impl<'a> ProductLabel<'a> {
    pub fn new(product: &'a Product, span: Interval) -> Self {
        Self {
            product,
            span,
            description: None,
        }
    }

    /// Kernel description from the kernel list
    pub fn with_description(mut self, description: Option<&'a str>) -> Self {
        self.description = description;
        self
    }

    /// Render and stage the label, returning its archive-relative path
    pub fn write(&self, ctx: &RunContext) -> Result<String> {
        let product = self.product;
        let relative = lid::label_path(&product.path);
        let staged = ctx.layout.staged(&product.path);
        let size = std::fs::metadata(&staged)
            .map_err(|e| fs_err::read_failed(&staged, &e))?
            .len();

        let span = product.coverage.unwrap_or(self.span);
        let mut values = super::common_values(ctx);
        values.insert("PRODUCT_LID", product.lidvid.lid.clone());
        values.insert("PRODUCT_VID", product.lidvid.vid_label());
        values.insert("FILE_NAME", product.name.clone());
        values.insert("FILE_SIZE", size.to_string());
        values.insert("FILE_CHECKSUM", md5_file(&staged)?);
        values.insert("START_TIME", span.start_label());
        values.insert("STOP_TIME", span.stop_label());

        let template = match product.kind {
            ProductKind::Kernel => {
                self.kernel_values(&mut values);
                (
                    template::KERNEL_LABEL_TEMPLATE_NAME,
                    template::KERNEL_LABEL_TEMPLATE,
                )
            }
            ProductKind::MetaKernel => {
                self.kernel_values(&mut values);
                let listed = mk2list(&cfs::read_text(&staged)?);
                values.insert(
                    "KERNEL_INTERNAL_REFERENCES",
                    internal_references(ctx, &listed),
                );
                (
                    template::META_KERNEL_LABEL_TEMPLATE_NAME,
                    template::META_KERNEL_LABEL_TEMPLATE,
                )
            }
            ProductKind::Inventory(collection) => {
                let records = cfs::read_text(&staged)?
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .count();
                values.insert(
                    "COLLECTION_LID",
                    lid::collection_lid(&ctx.config.bundle_lid(), collection),
                );
                values.insert("COLLECTION_VID", product.lidvid.vid_label());
                values.insert("COLLECTION_TYPE", collection_type(collection).to_string());
                values.insert("N_RECORDS", records.to_string());
                (
                    template::COLLECTION_LABEL_TEMPLATE_NAME,
                    template::COLLECTION_LABEL_TEMPLATE,
                )
            }
            ProductKind::Checksum => (
                template::CHECKSUM_LABEL_TEMPLATE_NAME,
                template::CHECKSUM_LABEL_TEMPLATE,
            ),
            ProductKind::Document => (
                template::DOCUMENT_LABEL_TEMPLATE_NAME,
                template::DOCUMENT_LABEL_TEMPLATE,
            ),
        };

        super::stage(ctx, &relative, template, &values)?;
        tracing::info!("-- Created {}", relative);
        Ok(relative)
    }

    fn kernel_values(&self, values: &mut TemplateValues) {
        let name = &self.product.name;
        let kernel_type = KernelType::from_file_name(name).unwrap_or(KernelType::Mk);
        values.insert("KERNEL_TYPE_ID", kernel_type.as_str().to_ascii_uppercase());
        values.insert("FILE_FORMAT", kernels::file_format(name).to_string());
        let description = self.description.unwrap_or_else(|| {
            tracing::warn!("     No description for {}.", name);
            "N/A"
        });
        values.insert("SPICE_KERNEL_DESCRIPTION", description.to_string());
    }
}

fn collection_type(collection: CollectionName) -> &'static str {
    match collection {
        CollectionName::SpiceKernels => "SPICE Kernel",
        CollectionName::Document => "Document",
        CollectionName::Miscellaneous => "Miscellaneous",
    }
}

/// One `Internal_Reference` per kernel listed by a meta-kernel
fn internal_references(ctx: &RunContext, listed: &[String]) -> String {
    let bundle_lid = ctx.config.bundle_lid();
    listed
        .iter()
        .filter_map(|name| {
            let kernel_type = KernelType::from_file_name(name)?;
            Some(format!(
                "    <Internal_Reference>\n      \
                 <lid_reference>{}</lid_reference>\n      \
                 <reference_type>data_to_associate</reference_type>\n    \
                 </Internal_Reference>",
                lid::kernel_lid(&bundle_lid, kernel_type, name)
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
