//! Sales channel resolution.

use axum::body::Body;
use axum::http::Request;
use serde::Serialize;
use thiserror::Error;

use crate::config::ChannelConfig;
use crate::routing::matcher::request_host;

/// A storefront identity used to scope settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub code: String,
    pub hostnames: Vec<String>,
}

impl Channel {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            hostnames: Vec::new(),
        }
    }
}

impl From<&ChannelConfig> for Channel {
    fn from(config: &ChannelConfig) -> Self {
        Self {
            code: config.code.clone(),
            hostnames: config.hostnames.iter().map(|h| h.to_lowercase()).collect(),
        }
    }
}

/// No channel is active for the current request.
#[derive(Debug, Clone, Error)]
#[error("Channel not found")]
pub struct ChannelNotFound;

/// Resolves the channel a request belongs to.
pub trait ChannelContext: Send + Sync {
    fn channel(&self, req: &Request<Body>) -> Result<Channel, ChannelNotFound>;
}

/// Resolution order: Host header, configured default, sole channel.
#[derive(Debug, Clone, Default)]
pub struct HostnameChannelContext {
    channels: Vec<Channel>,
    default_channel: Option<String>,
}

impl HostnameChannelContext {
    pub fn new(channels: Vec<Channel>, default_channel: Option<String>) -> Self {
        Self {
            channels,
            default_channel,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}

impl ChannelContext for HostnameChannelContext {
    fn channel(&self, req: &Request<Body>) -> Result<Channel, ChannelNotFound> {
        if let Some(host) = request_host(req) {
            if let Some(channel) = self.channels.iter().find(|c| c.hostnames.contains(&host)) {
                return Ok(channel.clone());
            }
        }

        if let Some(code) = &self.default_channel {
            if let Some(channel) = self.channels.iter().find(|c| &c.code == code) {
                return Ok(channel.clone());
            }
        }

        match self.channels.as_slice() {
            [only] => Ok(only.clone()),
            _ => Err(ChannelNotFound),
        }
    }
}
