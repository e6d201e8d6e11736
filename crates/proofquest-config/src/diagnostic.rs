// SPDX-FileCopyrightText: 2026 ProofQuest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config diagnostics rendered through miette.
//!
//! Figment errors are flattened into [`ConfigError`]s. Unknown keys and
//! preset names get a Jaro-Winkler "did you mean" hint and, when the TOML
//! source is available, a label pointing at the offending line.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity below which no correction is offered.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem found while loading or validating.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(proofquest::config::unknown_key),
        help("{}", hint(suggestion.as_deref(), "valid keys", valid_keys))
    )]
    UnknownKey {
        /// Dotted path of the unrecognized key, e.g. `gemini.modle`.
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a ProofQuest setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that must be one of a fixed set, such as `verification.prompt`.
    #[error("`{value}` is not a valid value for `{key}`")]
    #[diagnostic(
        code(proofquest::config::unknown_variant),
        help("{}", hint(suggestion.as_deref(), "expected one of", allowed))
    )]
    UnknownVariant {
        key: String,
        value: String,
        suggestion: Option<String>,
        allowed: String,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(proofquest::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(proofquest::config::missing_key),
        help("add `{key} = <value>` to proofquest.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but cannot be used.
    #[error("invalid `{key}`: {message}")]
    #[diagnostic(
        code(proofquest::config::validation),
        help("set `{key}` in proofquest.toml or via PROOFQUEST_{}", key.replace('.', "_").to_ascii_uppercase())
    )]
    Validation { key: String, message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(proofquest::config::other))]
    Other(String),
}

impl ConfigError {
    /// Builds a validation error for the setting at `key`.
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Dotted key this error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::UnknownKey { key, .. }
            | ConfigError::UnknownVariant { key, .. }
            | ConfigError::InvalidType { key, .. }
            | ConfigError::MissingKey { key }
            | ConfigError::Validation { key, .. } => Some(key),
            ConfigError::Other(_) => None,
        }
    }
}

fn hint(suggestion: Option<&str>, label: &str, choices: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {label}: {choices}"),
        None => format!("{label}: {choices}"),
    }
}

/// Dotted key for `field`. Figment paths usually end with the field already.
fn dotted(path: &[String], field: &str) -> String {
    let table = table_of(path, field);
    table
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(field))
        .collect::<Vec<_>>()
        .join(".")
}

/// The table part of `path`, without a trailing `field`.
fn table_of<'a>(path: &'a [String], field: &str) -> &'a [String] {
    match path.split_last() {
        Some((last, table)) if last == field => table,
        _ => path,
    }
}

/// Flattens a figment error chain into one [`ConfigError`] per failure.
///
/// `toml_sources` pairs a display path with file content and is only used
/// to attach source labels to unknown keys.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let (span, src) = locate(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: dotted(&error.path, field),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::UnknownVariant(value, allowed) => ConfigError::UnknownVariant {
                key: error.path.join("."),
                value: value.clone(),
                suggestion: suggest_key(value, allowed),
                allowed: allowed.join(", "),
            },
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: dotted(&error.path, field),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Attaches a source label when the failing file is one of `toml_sources`.
fn locate(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let found = match file {
        Some(file) => toml_sources.iter().find(|(p, _)| *p == file),
        // Inline strings carry no file path.
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    found
        .and_then(|(path, content)| {
            let offset = find_key_offset(content, table_of(&error.path, field), field)?;
            Some((
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(path, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field` inside the `[section]` table named by `path`.
///
/// An empty `path` matches keys before the first table header.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let wanted = path.join(".");
    let mut table = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            table = header.trim().to_string();
        } else if table == wanted {
            let indent = line.len() - line.trim_start().len();
            let key = line[indent..].split(['=', ' ', '\t']).next().unwrap_or_default();
            if key == field {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }

    None
}

/// Closest candidate to `unknown` by Jaro-Winkler similarity, if close enough.
pub fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

/// Renders diagnostics into a single string.
pub fn render_to_string(errors: &[ConfigError]) -> String {
    let handler = miette::GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        let before = out.len();
        if handler.render_report(&mut out, error as &dyn Diagnostic).is_err() {
            out.truncate(before);
            out.push_str(&format!("Error: {error}\n"));
        }
    }
    out
}

/// Prints diagnostics to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    eprint!("{}", render_to_string(errors));
}
