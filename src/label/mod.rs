//! PDS4 labels
//!
//! Every product staged by a run is described by a label next to it, named
//! after the product with an `.xml` extension (see
//! [`label_path`](crate::catalog::lid::label_path)).
//! The bundle label at the archive root names the collections of the
//! release.

pub mod bundle;
pub mod product;

use crate::common::fs as cfs;
use crate::context::RunContext;
use crate::error::Result;
use crate::template::{self, TemplateValues};

pub use bundle::{README_FILE, lidvid_references};

/// Values shared by every label
fn common_values(ctx: &RunContext) -> TemplateValues {
    let config = &ctx.config;
    let release_date = config.release_date().format("%Y-%m-%d").to_string();
    let mut values = TemplateValues::new();
    values.insert("MISSION_NAME", config.mission.name.clone());
    values.insert("AUTHOR", config.author().to_string());
    values.insert(
        "PDS4_MISSION_LID",
        format!(
            "urn:{}:{}:context:investigation:mission.{}",
            config.identifiers.national_agency,
            config.identifiers.archiving_agency,
            ctx.acronym()
        ),
    );
    values.insert("PRODUCT_CREATION_TIME", format!("{}T00:00:00", release_date));
    values.insert("PRODUCT_CREATION_DATE", release_date);
    values.insert("END_OF_LINE", config.eol.pds4_name().to_string());
    values
}

/// Render a label template, built-in unless overridden, and stage it
fn stage(
    ctx: &RunContext,
    relative: &str,
    (template_name, default): (&str, &str),
    values: &TemplateValues,
) -> Result<()> {
    let template_text =
        template::load_or_default(ctx.layout.templates_dir(), template_name, default)?;
    let text = template::with_line_endings(
        &template::render(&template_text, values),
        ctx.config.eol.as_str(),
    );
    cfs::write_text(&ctx.layout.staged(relative), &text)
}
