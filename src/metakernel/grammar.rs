//! Meta-kernel grammar
//!
//! A grammar is an ordered list of file name globs. A token may be prefixed
//! with `date:`, ranking its candidates by the date embedded in their names,
//! or with `exclude:`, naming files that are never selected.

use crate::common::pattern::{check_glob, matches_glob};
use crate::error::{Result, config as config_err};
use crate::kernels::{KernelType, META_KERNEL_ORDER};

const DATE_QUALIFIER: &str = "date:";
const EXCLUDE_QUALIFIER: &str = "exclude:";

/// Selection token for one kernel category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub pattern: String,
    /// Rank candidates by embedded date instead of name
    pub dated: bool,
    pub kernel_type: KernelType,
}

impl Token {
    pub fn matches(&self, name: &str) -> bool {
        KernelType::from_file_name(name) == Some(self.kernel_type)
            && matches_glob(&self.pattern, name)
    }
}

/// Parsed grammar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    tokens: Vec<Token>,
    excludes: Vec<String>,
}

impl Grammar {
    /// Parse grammar lines
    ///
    /// Qualifiers are stripped before the category is derived from the
    /// pattern's extension.
    pub fn parse(lines: &[String]) -> Result<Self> {
        let mut grammar = Self::default();
        for line in lines {
            let line = line.trim();
            if let Some(pattern) = line.strip_prefix(EXCLUDE_QUALIFIER) {
                let pattern = checked_pattern(line, pattern)?;
                grammar.excludes.push(pattern.to_string());
                continue;
            }
            let (pattern, dated) = match line.strip_prefix(DATE_QUALIFIER) {
                Some(rest) => (rest, true),
                None => (line, false),
            };
            let pattern = checked_pattern(line, pattern)?;
            let kernel_type = KernelType::from_file_name(pattern)
                .filter(|t| META_KERNEL_ORDER.contains(t))
                .ok_or_else(|| {
                    config_err::grammar_invalid(line, "extension is not a loadable kernel type")
                })?;
            grammar.tokens.push(Token {
                pattern: pattern.to_string(),
                dated,
                kernel_type,
            });
        }
        Ok(grammar)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens of one category, in grammar order
    pub fn tokens_for(&self, kernel_type: KernelType) -> impl Iterator<Item = &Token> {
        self.tokens
            .iter()
            .filter(move |t| t.kernel_type == kernel_type)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|p| matches_glob(p, name))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn checked_pattern<'a>(line: &str, pattern: &'a str) -> Result<&'a str> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(config_err::grammar_invalid(line, "empty pattern"));
    }
    check_glob(pattern).map_err(|reason| config_err::grammar_invalid(line, reason))?;
    Ok(pattern)
}
