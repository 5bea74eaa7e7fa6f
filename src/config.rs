use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

/// Settings applied to every library namespace unless overridden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobalLibraryConfig {
    /// Page size used when the caller does not pass a limit.
    pub default_page_size: usize,
    /// Upper bound for caller-supplied limits; larger values are clamped.
    pub max_page_size: usize,
    /// Remove the owner's access record when a rebuild finds a dangling reference.
    pub cleanup_dangling_references: bool,
    /// Optional JSON-lines audit file receiving every library event.
    pub audit_log_path: Option<String>,
    /// Per-namespace overrides keyed by namespace name (e.g. "meetings").
    pub namespaces: HashMap<String, NamespaceLibraryConfig>,
}

impl Default for GlobalLibraryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 25,
            cleanup_dangling_references: true,
            audit_log_path: None,
            namespaces: HashMap::new(),
        }
    }
}

/// Per-namespace configuration. Unspecified values inherit from Global.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NamespaceLibraryConfig {
    /// Resource type listed by this namespace; defaults to the namespace name without a trailing 's'.
    pub resource_type: Option<String>,
    pub default_page_size: Option<usize>,
    pub max_page_size: Option<usize>,
    pub cleanup_dangling_references: Option<bool>,
}

/// Fully resolved config for one namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectiveConfig {
    pub namespace: String,
    pub resource_type: String,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub cleanup_dangling_references: bool,
}

impl EffectiveConfig {
    /// Build an effective config from Global + optional namespace override.
    pub fn from_layers(namespace: &str, global: &GlobalLibraryConfig, ns: Option<&NamespaceLibraryConfig>) -> Self {
        let ns_default = NamespaceLibraryConfig::default();
        let ns = ns.unwrap_or(&ns_default);
        let resource_type = ns.resource_type.clone()
            .unwrap_or_else(|| namespace.strip_suffix('s').unwrap_or(namespace).to_string());
        let max_page_size = ns.max_page_size.unwrap_or(global.max_page_size).max(1);
        // Default never exceeds the maximum
        let default_page_size = ns.default_page_size.unwrap_or(global.default_page_size).clamp(1, max_page_size);
        Self {
            namespace: namespace.to_string(),
            resource_type,
            default_page_size,
            max_page_size,
            cleanup_dangling_references: ns.cleanup_dangling_references.unwrap_or(global.cleanup_dangling_references),
        }
    }
}

impl GlobalLibraryConfig {
    pub fn effective(&self, namespace: &str) -> EffectiveConfig {
        EffectiveConfig::from_layers(namespace, self, self.namespaces.get(namespace))
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("reading library config {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes).with_context(|| format!("parsing library config {}", path.display()))?;
        Ok(cfg)
    }

    /// Apply `MEETING_LIBRARY_*` environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.apply_overrides(|k| std::env::var(k).ok())?;
        Ok(self)
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = get("MEETING_LIBRARY_DEFAULT_PAGE_SIZE") {
            self.default_page_size = v.parse().with_context(|| format!("MEETING_LIBRARY_DEFAULT_PAGE_SIZE='{}'", v))?;
        }
        if let Some(v) = get("MEETING_LIBRARY_MAX_PAGE_SIZE") {
            self.max_page_size = v.parse().with_context(|| format!("MEETING_LIBRARY_MAX_PAGE_SIZE='{}'", v))?;
        }
        if let Some(v) = get("MEETING_LIBRARY_CLEANUP_DANGLING") {
            self.cleanup_dangling_references = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = get("MEETING_LIBRARY_AUDIT_LOG") {
            self.audit_log_path = if v.is_empty() { None } else { Some(v) };
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
