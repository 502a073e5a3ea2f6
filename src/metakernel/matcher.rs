//! Latest-file selection
//!
//! For every loadable category, in load order, each grammar token picks the
//! single most recent candidate it matches. Results are concatenated and
//! de-duplicated keeping the first occurrence.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::grammar::{Grammar, Token};
use crate::common::pattern::static_regex;
use crate::kernels::META_KERNEL_ORDER;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| static_regex(r"\d+"));

/// Build the ordered kernel list of a meta-kernel
///
/// `staged` holds the kernel names of the staging area and
/// `prior_references` the names listed by meta-kernels of earlier releases.
pub fn build_manifest(
    grammar: &Grammar,
    staged: &[String],
    prior_references: &[String],
) -> Vec<String> {
    let candidates: BTreeSet<&str> = staged
        .iter()
        .chain(prior_references)
        .map(String::as_str)
        .filter(|name| !grammar.is_excluded(name))
        .collect();

    let mut seen = BTreeSet::new();
    let mut manifest = Vec::new();
    for kernel_type in META_KERNEL_ORDER {
        for token in grammar.tokens_for(kernel_type) {
            match select_latest(token, candidates.iter().copied()) {
                Some(name) => {
                    if seen.insert(name) {
                        manifest.push(name.to_string());
                    }
                }
                None => tracing::warn!("     No kernel matches meta-kernel token {}.", token.pattern),
            }
        }
    }
    manifest
}

/// Most recent candidate matching `token`
///
/// Dated tokens compare the embedded date first; undated candidates rank
/// below dated ones. Names break ties.
pub fn select_latest<'a>(token: &Token, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let matching = candidates.filter(|name| token.matches(name));
    if token.dated {
        matching.max_by_key(|name| (embedded_date(name), *name))
    } else {
        matching.max()
    }
}

/// First `YYYYMMDD` or `YYMMDD` digit run of a name, as `YYYYMMDD`
pub fn embedded_date(name: &str) -> Option<u32> {
    DIGIT_RUN
        .find_iter(name)
        .map(|m| m.as_str())
        .find(|run| run.len() == 8 || run.len() == 6)
        .and_then(|run| {
            let value: u32 = run.parse().ok()?;
            Some(if run.len() == 6 { 20_000_000 + value } else { value })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar(lines: &[&str]) -> Grammar {
        let lines: Vec<String> = lines.iter().map(ToString::to_string).collect();
        Grammar::parse(&lines).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_embedded_date() {
        assert_eq!(embedded_date("maven_orb_20200115.bsp"), Some(20200115));
        assert_eq!(embedded_date("maven_orb_200115_v1.bsp"), Some(20200115));
        assert_eq!(embedded_date("maven_sc_1_20200115.bc"), Some(20200115));
        assert_eq!(embedded_date("naif0012.tls"), None);
    }

    #[test]
    fn test_lexicographic_latest() {
        let manifest = build_manifest(
            &grammar(&["naif????.tls"]),
            &names(&["naif0011.tls", "naif0012.tls", "naif0010.tls"]),
            &[],
        );
        assert_eq!(manifest, ["naif0012.tls"]);
    }

    #[test]
    fn test_date_qualifier_beats_lexicographic_order() {
        let candidates = names(&["maven_orb_b_20200101.bsp", "maven_orb_a_20210101.bsp"]);
        let undated = build_manifest(&grammar(&["maven_orb_*.bsp"]), &candidates, &[]);
        assert_eq!(undated, ["maven_orb_b_20200101.bsp"]);

        let dated = build_manifest(&grammar(&["date:maven_orb_*.bsp"]), &candidates, &[]);
        assert_eq!(dated, ["maven_orb_a_20210101.bsp"]);
    }

    #[test]
    fn test_undated_candidates_rank_lowest() {
        let candidates = names(&["maven_orb_zzz.bsp", "maven_orb_20200101.bsp"]);
        let manifest = build_manifest(&grammar(&["date:maven_orb_*.bsp"]), &candidates, &[]);
        assert_eq!(manifest, ["maven_orb_20200101.bsp"]);
    }

    #[test]
    fn test_excluded_candidate_never_selected() {
        let candidates = names(&["maven_orb_20200101.bsp", "maven_orb_20990101_test.bsp"]);
        let manifest = build_manifest(
            &grammar(&["date:maven_orb_*.bsp", "exclude:*_test.bsp"]),
            &candidates,
            &[],
        );
        assert_eq!(manifest, ["maven_orb_20200101.bsp"]);
    }

    #[test]
    fn test_category_order_and_stable_dedup() {
        let candidates = names(&[
            "maven_sc.bc",
            "maven_orb.bsp",
            "naif0012.tls",
            "maven_v09.tf",
        ]);
        let manifest = build_manifest(
            &grammar(&["maven_*.bc", "maven_*.bsp", "maven_sc*.bc", "naif*.tls", "maven_v*.tf"]),
            &candidates,
            &[],
        );
        assert_eq!(
            manifest,
            ["naif0012.tls", "maven_v09.tf", "maven_orb.bsp", "maven_sc.bc"]
        );
    }

    #[test]
    fn test_prior_references_are_candidates() {
        let manifest = build_manifest(
            &grammar(&["naif????.tls", "maven_orb_*.bsp"]),
            &names(&["naif0012.tls"]),
            &names(&["maven_orb_20190101.bsp", "naif0011.tls"]),
        );
        assert_eq!(manifest, ["naif0012.tls", "maven_orb_20190101.bsp"]);
    }

    #[test]
    fn test_token_without_match_is_skipped() {
        let manifest = build_manifest(&grammar(&["maven_*.bds"]), &names(&["naif0012.tls"]), &[]);
        assert!(manifest.is_empty());
    }
}
