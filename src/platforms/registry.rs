use std::sync::Arc;

use super::{DjinniAdapter, DouAdapter, LinkedInAdapter, PlatformAdapter, WorkUaAdapter};
use crate::utils::error::AppError;

pub type PlatformAdapterRef = Arc<dyn PlatformAdapter>;

/// Identifier that expands to every registered platform.
pub const ALL_PLATFORMS: &str = "all";

/// Read-only set of supported platforms, in a fixed order.
#[derive(Clone)]
pub struct PlatformRegistry {
    adapters: Vec<PlatformAdapterRef>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::with_adapters(vec![
            Arc::new(LinkedInAdapter::new()),
            Arc::new(DouAdapter::new()),
            Arc::new(DjinniAdapter::new()),
            Arc::new(WorkUaAdapter::new()),
        ])
    }

    pub fn with_adapters(adapters: Vec<PlatformAdapterRef>) -> Self {
        Self { adapters }
    }

    /// Looks up a platform by id or display name, ignoring case.
    pub fn get(&self, name: &str) -> Option<PlatformAdapterRef> {
        let needle = name.trim();
        self.adapters
            .iter()
            .find(|a| a.id().eq_ignore_ascii_case(needle) || a.name().eq_ignore_ascii_case(needle))
            .cloned()
    }

    pub fn all(&self) -> &[PlatformAdapterRef] {
        &self.adapters
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.id()).collect()
    }

    /// Turns requested platform names into adapters.
    ///
    /// `"all"` or an empty list selects every platform in registry order.
    /// Repeated names are kept once, first occurrence wins. Any unknown name
    /// fails the whole call.
    pub fn resolve(&self, requested: &[String]) -> Result<Vec<PlatformAdapterRef>, AppError> {
        if requested.is_empty()
            || requested.iter().any(|p| p.trim().eq_ignore_ascii_case(ALL_PLATFORMS))
        {
            return Ok(self.adapters.clone());
        }

        let unknown: Vec<&str> = requested
            .iter()
            .map(String::as_str)
            .filter(|p| self.get(p).is_none())
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::Validation(format!(
                "Unknown platform(s): {}. Supported: {}",
                unknown.join(", "),
                self.ids().join(", ")
            )));
        }

        let mut resolved: Vec<PlatformAdapterRef> = Vec::with_capacity(requested.len());
        for name in requested {
            if let Some(adapter) = self.get(name) {
                if !resolved.iter().any(|r| r.id() == adapter.id()) {
                    resolved.push(adapter);
                }
            }
        }
        Ok(resolved)
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}
