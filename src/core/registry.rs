//! Registry of component kinds: one enum-style text file where each kind is
//! declared as
//!
//! ```text
//!   KubernetesMicroservice = 42 [(kind_meta) = {provider: kubernetes, id_prefix: "k8sms"}];
//! ```
//!
//! Edits are byte-surgical: only the identifier token and the `id_prefix`
//! value are ever rewritten.

use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::utils::io;

static ANY_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^  (\w+)\s*=\s*(\d+)\s*\[(.*?)\];").unwrap());

static PROVIDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"provider:\s*(\w+)").unwrap());

static ID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id_prefix:\s*"([^"]+)""#).unwrap());

/// One parsed registry declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub identifier: String,
    /// Kept as written; never renumbered.
    pub enum_value: String,
    /// Empty when the metadata carries no `provider:` key.
    pub provider: String,
    pub id_prefix: Option<String>,
    #[serde(skip)]
    pub entry_text: String,
    #[serde(skip)]
    pub span: Range<usize>,
    #[serde(skip)]
    metadata_span: Range<usize>,
}

impl RegistryEntry {
    fn from_captures(content: &str, caps: &regex::Captures<'_>) -> Option<Self> {
        let whole = caps.get(0)?;
        let metadata = caps.get(3)?;
        let metadata_text = metadata.as_str();

        Some(Self {
            identifier: caps.get(1)?.as_str().to_string(),
            enum_value: caps.get(2)?.as_str().to_string(),
            provider: PROVIDER
                .captures(metadata_text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            id_prefix: ID_PREFIX
                .captures(metadata_text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
            entry_text: content[whole.range()].to_string(),
            span: whole.range(),
            metadata_span: metadata.range(),
        })
    }
}

fn entry_pattern(identifier: &str) -> Result<Regex> {
    let pattern = format!(
        r"(?ms)^  ({})\s*=\s*(\d+)\s*\[(.*?)\];",
        regex::escape(identifier)
    );
    Regex::new(&pattern).map_err(|e| Error::internal_unexpected(e.to_string()))
}

fn find_in(content: &str, identifier: &str) -> Result<Option<RegistryEntry>> {
    let pattern = entry_pattern(identifier)?;
    Ok(pattern
        .captures(content)
        .and_then(|caps| RegistryEntry::from_captures(content, &caps)))
}

fn read_registry(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    io::read_file(path, &format!("read registry {}", path.display())).map(Some)
}

/// Find the entry declared for `identifier`.
///
/// A missing registry file reads as "not registered".
pub fn locate(registry_path: &Path, identifier: &str) -> Result<Option<RegistryEntry>> {
    match read_registry(registry_path)? {
        Some(content) => find_in(&content, identifier),
        None => Ok(None),
    }
}

/// Every entry in file order.
pub fn list(registry_path: &Path) -> Result<Vec<RegistryEntry>> {
    let Some(content) = read_registry(registry_path)? else {
        return Ok(Vec::new());
    };

    Ok(ANY_ENTRY
        .captures_iter(&content)
        .filter_map(|caps| RegistryEntry::from_captures(&content, &caps))
        .collect())
}

/// Rename the `old` entry to `new`, optionally replacing its `id_prefix`.
///
/// The numeric value and all other metadata bytes are kept. An entry without
/// an `id_prefix` key keeps having none. Returns the rewritten entry.
pub fn update(
    registry_path: &Path,
    old: &str,
    new: &str,
    new_id_prefix: Option<&str>,
) -> Result<RegistryEntry> {
    let display = registry_path.display().to_string();
    let content = read_registry(registry_path)?
        .ok_or_else(|| Error::registry_entry_not_found(old, &display))?;

    let entry = find_in(&content, old)?
        .ok_or_else(|| Error::registry_entry_not_found(old, &display))?;

    let mut metadata = content[entry.metadata_span.clone()].to_string();
    if let Some(prefix) = new_id_prefix.filter(|p| !p.is_empty()) {
        let replacement = format!("id_prefix: \"{}\"", prefix);
        metadata = ID_PREFIX
            .replace(&metadata, regex::NoExpand(&replacement))
            .into_owned();
    }

    // `  <old>` is the fixed-width head of every match.
    let ident_end = entry.span.start + 2 + old.len();
    let mut updated = String::with_capacity(content.len() + new.len());
    updated.push_str(&content[..entry.span.start]);
    updated.push_str("  ");
    updated.push_str(new);
    updated.push_str(&content[ident_end..entry.metadata_span.start]);
    updated.push_str(&metadata);
    updated.push_str(&content[entry.metadata_span.end..]);

    io::write_file(registry_path, &updated, &format!("write registry {}", display))?;

    find_in(&updated, new)?.ok_or_else(|| {
        Error::internal_unexpected(format!("Rewritten entry {} not found after update", new))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const REGISTRY: &str = r#"syntax = "proto3";

enum CloudResourceKind {
  unspecified = 0;
  KubernetesMicroservice = 42 [(kind_meta) = {
    provider: kubernetes
    version: v1
    id_prefix: "k8sms"
  }];
  AwsS3Bucket = 7 [(kind_meta) = {provider: aws, id_prefix: "s3b"}];
  KubernetesMicroserviceAddon = 43 [(kind_meta) = {provider: kubernetes}];
}
"#;

    fn registry() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cloud_resource_kind.proto");
        fs::write(&path, REGISTRY).unwrap();
        (dir, path)
    }

    #[test]
    fn locate_parses_multiline_entry() {
        let (_dir, path) = registry();
        let entry = locate(&path, "KubernetesMicroservice").unwrap().unwrap();

        assert_eq!(entry.enum_value, "42");
        assert_eq!(entry.provider, "kubernetes");
        assert_eq!(entry.id_prefix.as_deref(), Some("k8sms"));
        assert!(entry.entry_text.starts_with("  KubernetesMicroservice = 42"));
        assert!(entry.entry_text.ends_with("}];"));
    }

    #[test]
    fn locate_does_not_match_identifier_prefix() {
        let (_dir, path) = registry();
        let entry = locate(&path, "KubernetesMicroserviceAddon").unwrap().unwrap();
        assert_eq!(entry.enum_value, "43");
        assert_eq!(entry.id_prefix, None);

        assert!(locate(&path, "Kubernetes").unwrap().is_none());
    }

    #[test]
    fn locate_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(locate(&dir.path().join("absent.proto"), "Foo").unwrap().is_none());
    }

    #[test]
    fn list_returns_entries_in_file_order() {
        let (_dir, path) = registry();
        let names: Vec<String> = list(&path).unwrap().into_iter().map(|e| e.identifier).collect();
        assert_eq!(
            names,
            vec!["KubernetesMicroservice", "AwsS3Bucket", "KubernetesMicroserviceAddon"]
        );
    }

    #[test]
    fn update_rewrites_identifier_and_id_prefix_only() {
        let (_dir, path) = registry();
        let entry = update(&path, "KubernetesMicroservice", "KubernetesDeployment", Some("k8sdpl"))
            .unwrap();

        assert_eq!(entry.identifier, "KubernetesDeployment");
        assert_eq!(entry.enum_value, "42");
        assert_eq!(entry.id_prefix.as_deref(), Some("k8sdpl"));

        let expected = REGISTRY
            .replace("  KubernetesMicroservice = 42", "  KubernetesDeployment = 42")
            .replace("id_prefix: \"k8sms\"", "id_prefix: \"k8sdpl\"");
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    }

    #[test]
    fn update_without_prefix_keeps_metadata() {
        let (_dir, path) = registry();
        update(&path, "AwsS3Bucket", "AwsS3Storage", None).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(
            "  AwsS3Storage = 7 [(kind_meta) = {provider: aws, id_prefix: \"s3b\"}];"
        ));
        assert_eq!(content.len(), REGISTRY.len() + 1);
    }

    #[test]
    fn update_never_adds_missing_id_prefix() {
        let (_dir, path) = registry();
        let entry = update(&path, "KubernetesMicroserviceAddon", "KubernetesPlugin", Some("k8sp"))
            .unwrap();
        assert_eq!(entry.id_prefix, None);
    }

    #[test]
    fn update_missing_entry_is_fatal_and_leaves_file() {
        let (_dir, path) = registry();
        let err = update(&path, "GcpBucket", "GcpStorage", None).unwrap_err();

        assert_eq!(err.code.as_str(), "registry.entry_not_found");
        assert_eq!(fs::read_to_string(&path).unwrap(), REGISTRY);
    }

    #[test]
    fn update_round_trip_restores_bytes() {
        let (_dir, path) = registry();
        update(&path, "KubernetesMicroservice", "KubernetesDeployment", Some("k8sdpl")).unwrap();
        update(&path, "KubernetesDeployment", "KubernetesMicroservice", Some("k8sms")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), REGISTRY);
    }
}
