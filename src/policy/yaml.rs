//! Support policy document parser
//!
//! A repository opts in to support tracking with a small YAML document:
//!
//! ```yaml
//! library: true
//! maintained_minor_versions: 2
//! maintained_major_months: 6
//! ```

use indexmap::IndexMap;
use tracing::warn;

use crate::policy::traits::{PolicyError, PolicySource};
use crate::source::types::Repository;
use crate::support::window::SupportPolicy;

const LIBRARY_KEY: &str = "library";
const MINOR_VERSIONS_KEY: &str = "maintained_minor_versions";
const MAJOR_MONTHS_KEY: &str = "maintained_major_months";

/// Parse a policy document.
///
/// Returns `Ok(None)` when the document does not declare `library: true`.
pub fn parse_policy(content: &str) -> Result<Option<SupportPolicy>, PolicyError> {
    let entries = parse_top_level_entries(content)?;

    let library = match entries.get(LIBRARY_KEY) {
        Some(value) => parse_bool(LIBRARY_KEY, value)?,
        None => false,
    };
    if !library {
        return Ok(None);
    }

    Ok(Some(SupportPolicy {
        maintained_minor_versions: parse_count(&entries, MINOR_VERSIONS_KEY)?,
        maintained_major_months: parse_count(&entries, MAJOR_MONTHS_KEY)?,
    }))
}

/// Collect the scalar key/value pairs of the document's top-level mapping
fn parse_top_level_entries(content: &str) -> Result<IndexMap<String, String>, PolicyError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_yaml::LANGUAGE;
    parser.set_language(&language.into()).map_err(|e| {
        warn!("Failed to set YAML language for tree-sitter: {}", e);
        PolicyError::TreeSitter(e.to_string())
    })?;

    let tree = parser.parse(content, None).ok_or_else(|| {
        warn!("Failed to parse YAML content");
        PolicyError::ParseFailed("Failed to parse YAML".to_string())
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(PolicyError::InvalidSyntax(
            "policy document is not valid YAML".to_string(),
        ));
    }

    let mut entries = IndexMap::new();
    let Some(mapping) = find_first_mapping(root) else {
        if has_content(content) {
            return Err(PolicyError::ParseFailed(
                "policy document is not a mapping".to_string(),
            ));
        }
        return Ok(entries);
    };

    let mut cursor = mapping.walk();
    for pair in mapping.children(&mut cursor) {
        if pair.kind() != "block_mapping_pair" {
            continue;
        }
        if let Some(key_node) = pair.child_by_field_name("key")
            && let Some(value_node) = pair.child_by_field_name("value")
        {
            entries.insert(
                get_node_text(key_node, content),
                get_node_text(value_node, content),
            );
        }
    }

    Ok(entries)
}

/// Find the outermost block mapping, depth first
fn find_first_mapping(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    if node.kind() == "block_mapping" {
        return Some(node);
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).find_map(find_first_mapping)
}

/// Whether the document holds anything besides blank lines and comments
fn has_content(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#') && line != "---")
}

/// Get text content of a node, removing quotes if present
fn get_node_text(node: tree_sitter::Node, content: &str) -> String {
    let text = &content[node.byte_range()];
    text.trim()
        .trim_start_matches('"')
        .trim_end_matches('"')
        .trim_start_matches('\'')
        .trim_end_matches('\'')
        .to_string()
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, PolicyError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(PolicyError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_count(entries: &IndexMap<String, String>, key: &'static str) -> Result<u32, PolicyError> {
    let value = entries.get(key).ok_or(PolicyError::MissingField(key))?;
    value.parse().map_err(|_| PolicyError::InvalidValue {
        key,
        value: value.clone(),
    })
}

/// Policy source that reads the policy document stored in each repository
#[derive(Debug, Default)]
pub struct DocumentPolicySource;

impl PolicySource for DocumentPolicySource {
    fn resolve(&self, repository: &Repository) -> Result<Option<SupportPolicy>, PolicyError> {
        match repository.policy_document.as_deref() {
            Some(document) => parse_policy(document),
            None => Ok(None),
        }
    }
}
