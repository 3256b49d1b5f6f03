// SPDX-License-Identifier: PMPL-1.0-or-later

//! Front-matter extraction for EIP documents
//!
//! An EIP file starts with a `---`-delimited YAML preamble carrying the
//! document's metadata. Only the three fields the merge decision depends on
//! are kept; missing or mistyped required fields fail at this boundary with
//! an error naming the field.

use serde::Deserialize;

use crate::error::{AutomergeError, Result};

/// The raw front-matter fields of one document at one commit.
#[derive(Debug, Clone)]
pub struct FrontMatter {
    pub eip: u64,
    pub status: String,
    pub author: String,
}

#[derive(Debug, Deserialize)]
struct RawFrontMatter {
    eip: Option<u64>,
    status: Option<String>,
    author: Option<String>,
}

/// Parse the preamble of `raw`, which must begin the file.
///
/// `name` is only used in error messages.
pub fn parse(name: &str, raw: &str) -> Result<FrontMatter> {
    let block = preamble(raw).ok_or_else(|| AutomergeError::FrontMatter {
        file: name.to_string(),
        reason: "missing front matter block".to_string(),
    })?;

    let parsed: RawFrontMatter =
        serde_yaml::from_str(block).map_err(|err| AutomergeError::FrontMatter {
            file: name.to_string(),
            reason: err.to_string(),
        })?;

    Ok(FrontMatter {
        eip: required(name, "eip", parsed.eip)?,
        status: required(name, "status", parsed.status)?,
        author: required(name, "author", parsed.author)?,
    })
}

fn required<T>(name: &str, field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| AutomergeError::FrontMatter {
        file: name.to_string(),
        reason: format!("missing required field `{}`", field),
    })
}

/// The text between the opening `---` line and the closing `---` line.
fn preamble(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;
    let end = rest.find("\n---")?;
    Some(&rest[..end])
}
