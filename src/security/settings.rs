//! Channel-scoped settings store.
//!
//! # Design Decisions
//! - Lookups fall back from the most specific scope to the global default:
//!   (channel, scope) → (channel, -) → (-, scope) → (-, -)
//! - Reads never block each other; the store is a `DashMap`

use dashmap::DashMap;
use serde_json::Value;

use crate::config::GateConfig;
use crate::security::channel::Channel;

/// Settings key holding the firewall contexts a channel disables.
pub const DISABLED_FIREWALL_CONTEXTS: &str = "disabled_firewall_contexts";

/// Read-only keyed settings lookup.
pub trait SettingsProvider: Send + Sync {
    fn current_value(&self, channel: &Channel, scope: Option<&str>, key: &str) -> Option<Value>;
}

type SettingsKey = (Option<String>, Option<String>, String);

/// In-memory settings, usually seeded from configuration.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: DashMap<SettingsKey, Value>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from the `[feature_gate]` defaults and `[[channels]]`.
    pub fn from_config(config: &GateConfig) -> Self {
        let settings = Self::new();

        if let Some(contexts) = &config.feature_gate.disabled_firewall_contexts {
            settings.set_value(None, None, DISABLED_FIREWALL_CONTEXTS, Value::from(contexts.clone()));
        }
        for channel in &config.channels {
            if let Some(contexts) = &channel.disabled_firewall_contexts {
                settings.set_value(
                    Some(channel.code.as_str()),
                    None,
                    DISABLED_FIREWALL_CONTEXTS,
                    Value::from(contexts.clone()),
                );
            }
        }

        settings
    }

    pub fn set_value(&self, channel: Option<&str>, scope: Option<&str>, key: &str, value: Value) {
        self.values.insert(
            (
                channel.map(str::to_string),
                scope.map(str::to_string),
                key.to_string(),
            ),
            value,
        );
    }

    fn get(&self, channel: Option<&str>, scope: Option<&str>, key: &str) -> Option<Value> {
        let lookup = (
            channel.map(str::to_string),
            scope.map(str::to_string),
            key.to_string(),
        );
        self.values.get(&lookup).map(|entry| entry.value().clone())
    }
}

impl SettingsProvider for InMemorySettings {
    fn current_value(&self, channel: &Channel, scope: Option<&str>, key: &str) -> Option<Value> {
        let code = Some(channel.code.as_str());

        let mut candidates = vec![(code, scope), (code, None), (None, scope), (None, None)];
        candidates.dedup();

        candidates
            .into_iter()
            .find_map(|(channel, scope)| self.get(channel, scope, key))
    }
}

/// Disabled firewall contexts for a channel.
///
/// Missing, null, false or empty values mean "nothing disabled"; a single
/// string counts as a one-element list.
pub fn disabled_firewall_contexts(settings: &dyn SettingsProvider, channel: &Channel) -> Vec<String> {
    match settings.current_value(channel, None, DISABLED_FIREWALL_CONTEXTS) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect(),
        Some(Value::String(name)) if !name.is_empty() => vec![name],
        _ => Vec::new(),
    }
}
