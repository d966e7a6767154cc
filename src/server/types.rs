// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON field carrying the PlantUML source in render requests.
pub const SOURCE_FIELD: &str = "plantUmlCode";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub plant_uml_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    NotAnObject,
    MissingSource,
    SourceNotString { found: &'static str },
    EmptySource,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("request body must be a JSON object"),
            Self::MissingSource => write!(f, "{SOURCE_FIELD} is required"),
            Self::SourceNotString { found } => {
                write!(f, "{SOURCE_FIELD} must be a string (found {found})")
            }
            Self::EmptySource => write!(f, "{SOURCE_FIELD} must not be empty"),
        }
    }
}

impl std::error::Error for RequestError {}

impl RenderRequest {
    /// Validates a decoded JSON body; only the source field is inspected.
    pub fn from_json(body: &Value) -> Result<Self, RequestError> {
        let object = body.as_object().ok_or(RequestError::NotAnObject)?;
        let source = match object.get(SOURCE_FIELD) {
            None | Some(Value::Null) => return Err(RequestError::MissingSource),
            Some(Value::String(source)) => source,
            Some(other) => return Err(RequestError::SourceNotString { found: json_type(other) }),
        };
        if source.is_empty() {
            return Err(RequestError::EmptySource);
        }
        Ok(Self { plant_uml_code: source.clone() })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
