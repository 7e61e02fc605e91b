//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default channel exists)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate channel codes, hostnames and firewall names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GateConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address \"{value}\"")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroTimeout,

    #[error("channel code must not be empty")]
    EmptyChannelCode,

    #[error("channel \"{0}\" is defined more than once")]
    DuplicateChannel(String),

    #[error("hostname \"{0}\" is assigned to more than one channel")]
    DuplicateHostname(String),

    #[error("default channel \"{0}\" is not defined")]
    UnknownDefaultChannel(String),

    #[error("firewall name must not be empty")]
    EmptyFirewallName,

    #[error("firewall \"{0}\" is defined more than once")]
    DuplicateFirewall(String),

    #[error("firewall \"{name}\" path prefix \"{prefix}\" must start with '/'")]
    InvalidFirewallPrefix { name: String, prefix: String },

    #[error("routing import resource must not be empty")]
    EmptyImportResource,

    #[error("routing import \"{resource}\" prefix \"{prefix}\" must start with '/'")]
    InvalidImportPrefix { resource: String, prefix: String },
}

pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut codes = HashSet::new();
    let mut hostnames = HashSet::new();
    for channel in &config.channels {
        if channel.code.is_empty() {
            errors.push(ValidationError::EmptyChannelCode);
        } else if !codes.insert(channel.code.as_str()) {
            errors.push(ValidationError::DuplicateChannel(channel.code.clone()));
        }

        for hostname in &channel.hostnames {
            if !hostnames.insert(hostname.to_lowercase()) {
                errors.push(ValidationError::DuplicateHostname(hostname.clone()));
            }
        }
    }

    if let Some(default) = &config.feature_gate.default_channel {
        if !codes.contains(default.as_str()) {
            errors.push(ValidationError::UnknownDefaultChannel(default.clone()));
        }
    }

    let mut firewalls = HashSet::new();
    for firewall in &config.firewalls {
        if firewall.name.is_empty() {
            errors.push(ValidationError::EmptyFirewallName);
        } else if !firewalls.insert(firewall.name.as_str()) {
            errors.push(ValidationError::DuplicateFirewall(firewall.name.clone()));
        }

        if let Some(prefix) = &firewall.path_prefix {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::InvalidFirewallPrefix {
                    name: firewall.name.clone(),
                    prefix: prefix.clone(),
                });
            }
        }
    }

    for import in &config.routing.imports {
        if import.resource.is_empty() {
            errors.push(ValidationError::EmptyImportResource);
        }
        if !import.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidImportPrefix {
                resource: import.resource.clone(),
                prefix: import.prefix.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
