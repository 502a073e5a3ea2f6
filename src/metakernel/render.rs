//! Meta-kernel text

use std::sync::LazyLock;

use regex::Regex;

use crate::common::pattern::static_regex;
use crate::kernels::{self, KernelType};
use crate::template::{self, TemplateValues};

static KERNEL_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"\$KERNELS/([a-z]+)/([^'\s]+)"));

static VERSION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| static_regex(r"_v(\d+)(\.[^.]+)$"));

/// Column at which kernel entries start
const KERNEL_INDENT: usize = 26;

/// Values of the meta-kernel template
pub struct MetaKernelText<'a> {
    pub file_name: &'a str,
    pub mission_name: &'a str,
    pub author: &'a str,
    pub current_date: &'a str,
    pub kernels: &'a [String],
}

impl MetaKernelText<'_> {
    pub fn render(&self, template_text: &str) -> String {
        let mut values = TemplateValues::new();
        values.insert("FILE_NAME", self.file_name.to_string());
        values.insert("PDS4_MISSION_NAME", self.mission_name.to_string());
        values.insert("AUTHOR", self.author.to_string());
        values.insert("CURRENT_DATE", self.current_date.to_string());
        values.insert("KERNELPATH", "..".to_string());
        values.insert("KERNELS_IN_METAKERNEL", kernel_block(self.kernels));
        template::render(template_text, &values)
    }
}

/// `KERNELS_TO_LOAD` entries, one per line
///
/// A blank line separates entries whose extensions differ. The block has no
/// trailing newline.
pub fn kernel_block(names: &[String]) -> String {
    let mut block = String::new();
    let mut previous: Option<&str> = None;
    for name in names {
        let kernel_type = KernelType::from_file_name(name).map_or("", KernelType::as_str);
        let extension = kernels::extension(name);
        if let Some(previous) = previous {
            block.push('\n');
            if Some(previous) != extension {
                block.push('\n');
            }
        }
        block.push_str(&" ".repeat(KERNEL_INDENT));
        block.push_str(&format!("'$KERNELS/{}/{}'", kernel_type, name));
        previous = Some(extension.unwrap_or(""));
    }
    block
}

/// Kernel names referenced by a meta-kernel text, in order
pub fn mk2list(text: &str) -> Vec<String> {
    KERNEL_REFERENCE
        .captures_iter(text)
        .map(|c| c[2].to_string())
        .collect()
}

/// Same name with the `_v<N>` version incremented, keeping its width
pub fn bump_version(name: &str) -> Option<String> {
    let captures = VERSION_SUFFIX.captures(name)?;
    let digits = &captures[1];
    let version: u32 = digits.parse().ok()?;
    let whole = captures.get(0)?;
    Some(format!(
        "{}_v{:0width$}{}",
        &name[..whole.start()],
        version + 1,
        &captures[2],
        width = digits.len()
    ))
}
