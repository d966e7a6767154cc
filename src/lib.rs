// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Umlpress — PlantUML source → `~1` token → render URLs.
//!
//! The [`token`] module holds the encoder (and a decoder for verification), [`render`]
//! builds URLs for a PlantUML server, and [`server`] exposes both over HTTP.

pub mod config;
pub mod render;
pub mod server;
pub mod token;

pub use render::{DiagramFormat, RenderHost, RenderUrls};
pub use token::{decode, encode, DecodeError, EncodingError, Framing, PlantUmlToken, TokenEncoder};
