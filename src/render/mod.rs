// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Render URLs on a remote PlantUML server.
//!
//! The server decodes the token embedded in `<base>/plantuml/<format>/<token>` and
//! answers with the rendered diagram; this module only builds the URLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::token::PlantUmlToken;

pub const DEFAULT_RENDER_HOST: &str = "https://www.plantuml.com";

/// Output format path segment understood by PlantUML servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    Png,
    Svg,
    /// ASCII-art rendering; sequence diagrams only on most servers.
    Txt,
}

impl DiagramFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderHostError {
    Empty,
    UnsupportedScheme { url: String },
    MissingHost { url: String },
    HasQueryOrFragment { url: String },
}

impl fmt::Display for RenderHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("render host must not be empty"),
            Self::UnsupportedScheme { url } => {
                write!(f, "render host '{url}' must start with http:// or https://")
            }
            Self::MissingHost { url } => write!(f, "render host '{url}' has no host name"),
            Self::HasQueryOrFragment { url } => {
                write!(f, "render host '{url}' must not contain a query or fragment")
            }
        }
    }
}

impl std::error::Error for RenderHostError {}

/// Base URL of a PlantUML server, stored without a trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderHost {
    base: String,
}

impl RenderHost {
    pub fn parse(raw: &str) -> Result<Self, RenderHostError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RenderHostError::Empty);
        }

        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .ok_or_else(|| RenderHostError::UnsupportedScheme { url: trimmed.to_owned() })?;
        if rest.contains(['?', '#']) {
            return Err(RenderHostError::HasQueryOrFragment { url: trimmed.to_owned() });
        }
        if rest.split('/').next().map_or(true, str::is_empty) {
            return Err(RenderHostError::MissingHost { url: trimmed.to_owned() });
        }

        Ok(Self { base: trimmed.trim_end_matches('/').to_owned() })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    pub fn url(&self, format: DiagramFormat, token: &PlantUmlToken) -> String {
        format!("{}/plantuml/{}/{}", self.base, format.as_str(), token.as_str())
    }

    pub fn urls(&self, token: &PlantUmlToken) -> RenderUrls {
        RenderUrls {
            image_url: self.url(DiagramFormat::Png, token),
            svg_url: self.url(DiagramFormat::Svg, token),
        }
    }
}

impl Default for RenderHost {
    fn default() -> Self {
        Self { base: DEFAULT_RENDER_HOST.to_owned() }
    }
}

impl fmt::Display for RenderHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

impl FromStr for RenderHost {
    type Err = RenderHostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderUrls {
    pub image_url: String,
    pub svg_url: String,
}
