// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed extraction patterns for EIP filenames and author lists

use regex::Regex;

/// Matches correctly formatted EIP filenames, capturing the number.
pub fn eip_filename_re() -> Regex {
    Regex::new(r"^EIPS/eip-(\d+)\.md$").expect("valid regex")
}

/// Matches one author entry, capturing the text between `(`/`<` and `)`/`>`.
pub fn author_re() -> Regex {
    Regex::new(r"[(<]([^>)]+)[>)]").expect("valid regex")
}

/// Extract the EIP number from a filename such as `EIPS/eip-1234.md`
/// or `eip-1234.md`.
pub fn filename_eip_number(filename: &str) -> Option<u64> {
    let re = Regex::new(r"eip-(\d+)\.md").expect("valid regex");
    re.captures(filename)?.get(1)?.as_str().parse().ok()
}

/// Pull every parenthesized or angle-bracketed entry out of a raw
/// front-matter author list, in order of appearance.
pub fn author_entries(raw: &str) -> Vec<String> {
    author_re()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
