// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Server configuration.
//!
//! Values resolve as defaults, then `UMLPRESS_*` environment variables, then CLI flags.
//! Blank environment values count as unset.

use std::fmt;
use std::net::SocketAddr;

use crate::render::RenderHost;
use crate::token::Framing;

pub const DEFAULT_BIND: SocketAddr =
    SocketAddr::V4(std::net::SocketAddrV4::new(std::net::Ipv4Addr::LOCALHOST, 27436));
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Bind,
    RenderHost,
    Framing,
    MaxBodyBytes,
}

impl ConfigKey {
    pub const ALL: [Self; 4] = [Self::Bind, Self::RenderHost, Self::Framing, Self::MaxBodyBytes];

    pub fn env_var(self) -> &'static str {
        match self {
            Self::Bind => "UMLPRESS_BIND",
            Self::RenderHost => "UMLPRESS_RENDER_HOST",
            Self::Framing => "UMLPRESS_FRAMING",
            Self::MaxBodyBytes => "UMLPRESS_MAX_BODY_BYTES",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::Bind => "--bind",
            Self::RenderHost => "--render-host",
            Self::Framing => "--framing",
            Self::MaxBodyBytes => "--max-body-bytes",
        }
    }

    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.flag() == flag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: ConfigKey,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value '{}' for {} ({}): {}",
            self.value,
            self.key.flag(),
            self.key.env_var(),
            self.reason
        )
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub render_host: RenderHost,
    pub framing: Framing,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND,
            render_host: RenderHost::default(),
            framing: Framing::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::ALL {
            let Some(raw) = lookup(key.env_var()).filter(|value| !value.trim().is_empty()) else {
                continue;
            };
            config.set(key, &raw)?;
        }
        Ok(config)
    }

    pub fn set(&mut self, key: ConfigKey, raw: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError { key, value: raw.to_owned(), reason };
        let value = raw.trim();

        match key {
            ConfigKey::Bind => {
                self.bind = value
                    .parse()
                    .map_err(|err: std::net::AddrParseError| invalid(err.to_string()))?;
            }
            ConfigKey::RenderHost => {
                self.render_host = RenderHost::parse(value).map_err(|err| invalid(err.to_string()))?;
            }
            ConfigKey::Framing => {
                self.framing = value.parse().map_err(|err: crate::token::ParseFramingError| {
                    invalid(err.to_string())
                })?;
            }
            ConfigKey::MaxBodyBytes => {
                let bytes: usize =
                    value.parse().map_err(|err: std::num::ParseIntError| invalid(err.to_string()))?;
                if bytes == 0 {
                    return Err(invalid("must be greater than zero".to_owned()));
                }
                self.max_body_bytes = bytes;
            }
        }
        Ok(())
    }
}
