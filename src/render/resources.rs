//! Process-wide table of shader text fragments, grouped by name.
//!
//! Groups are registered at most once and never change afterwards. Lookups
//! hand out `&'static str` so a [`ResourceBundle`] can be held freely.

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::shaders::flat_shaders;
use crate::utils::error::{Result, ShaderError};

pub const FLAT_SHADERS_GROUP: &str = "FlatShaders";

type ResourceGroup = HashMap<&'static str, &'static str>;

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<ResourceGroup>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn has_group(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// Registers `entries` under `name` unless the group already exists.
/// Returns whether this call performed the registration.
pub fn register_group(name: &str, entries: &[(&'static str, &'static str)]) -> bool {
    let mut registry = REGISTRY.write();
    if registry.contains_key(name) {
        return false;
    }
    let group: ResourceGroup = entries.iter().copied().collect();
    debug!("Registered resource group '{}' ({} entries)", name, group.len());
    registry.insert(name.to_string(), Arc::new(group));
    true
}

/// Registers the flat shader sources if nothing has done so yet.
pub fn ensure_shader_resources() {
    if !has_group(FLAT_SHADERS_GROUP) {
        register_group(FLAT_SHADERS_GROUP, &flat_shaders::ENTRIES);
    }
}

/// Read-only view of one registered group.
#[derive(Debug, Clone)]
pub struct ResourceBundle {
    name: String,
    group: Arc<ResourceGroup>,
}

impl ResourceBundle {
    pub fn open(name: &str) -> Result<Self> {
        let group = REGISTRY
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ShaderError::MissingGroup(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            group,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Result<&'static str> {
        self.group
            .get(key)
            .copied()
            .ok_or_else(|| ShaderError::MissingResource {
                group: self.name.clone(),
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.group.contains_key(key)
    }
}
