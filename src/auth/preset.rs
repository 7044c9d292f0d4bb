//! Authentication presets and how they are applied to outgoing headers

use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Authentication scheme carried by a preset
#[derive(Clone, Debug, PartialEq)]
pub enum AuthScheme {
    Basic {
        username: String,
        password: String,
    },
    Bearer(String),
    Custom {
        header: String,
        value: String,
        prefix: String,
        /// Raw `"Key: Value"` lines appended after the main header
        extra_headers: Vec<String>,
    },
}

impl AuthScheme {
    pub fn type_name(&self) -> &'static str {
        match self {
            AuthScheme::Basic { .. } => "basic",
            AuthScheme::Bearer(_) => "bearer",
            AuthScheme::Custom { .. } => "custom",
        }
    }
}

/// A named credential descriptor
#[derive(Clone, Debug, PartialEq)]
pub struct AuthPreset {
    pub name: String,
    pub scheme: AuthScheme,
}

/// Flat on-disk shape of a preset; `kind` decides which fields matter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthPresetRecord {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub headers: Vec<String>,
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::Validation(format!("invalid header name: {name}")))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::Validation(format!("invalid value for header {name}")))
}

impl AuthPreset {
    pub fn basic(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let preset = AuthPreset {
            name: name.into(),
            scheme: AuthScheme::Basic {
                username: username.into(),
                password: password.into(),
            },
        };
        preset.validate()?;
        Ok(preset)
    }

    pub fn bearer(name: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let preset = AuthPreset {
            name: name.into(),
            scheme: AuthScheme::Bearer(token.into()),
        };
        preset.validate()?;
        Ok(preset)
    }

    pub fn custom(
        name: impl Into<String>,
        header: impl Into<String>,
        value: impl Into<String>,
        prefix: impl Into<String>,
        extra_headers: Vec<String>,
    ) -> Result<Self> {
        let preset = AuthPreset {
            name: name.into(),
            scheme: AuthScheme::Custom {
                header: header.into(),
                value: value.into(),
                prefix: prefix.into(),
                extra_headers,
            },
        };
        preset.validate()?;
        Ok(preset)
    }

    /// Checks the fields the scheme requires.
    pub fn validate(&self) -> Result<()> {
        match &self.scheme {
            AuthScheme::Basic { username, .. } if username.is_empty() => Err(
                Error::Validation("basic auth requires username".to_string()),
            ),
            AuthScheme::Bearer(token) if token.is_empty() => {
                Err(Error::Validation("bearer auth requires token".to_string()))
            }
            AuthScheme::Custom { header, .. } if header.is_empty() => Err(Error::Validation(
                "custom auth requires header name".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Sets (or overrides) the auth headers on an outgoing request.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        self.validate()?;
        match &self.scheme {
            AuthScheme::Basic { username, password } => {
                let credentials = format!("{}:{}", username, password);
                let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
                headers.insert(
                    AUTHORIZATION,
                    header_value("Authorization", &format!("Basic {}", encoded))?,
                );
            }
            AuthScheme::Bearer(token) => {
                headers.insert(
                    AUTHORIZATION,
                    header_value("Authorization", &format!("Bearer {}", token))?,
                );
            }
            AuthScheme::Custom {
                header,
                value,
                prefix,
                extra_headers,
            } => {
                headers.insert(
                    header_name(header)?,
                    header_value(header, &format!("{}{}", prefix, value))?,
                );
                for line in extra_headers {
                    let Some((key, val)) = line.split_once(':') else {
                        tracing::debug!(line = %line, "Skipping malformed extra auth header");
                        continue;
                    };
                    let (key, val) = (key.trim(), val.trim());
                    match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(val)) {
                        (Ok(name), Ok(value)) => {
                            headers.append(name, value);
                        }
                        _ => tracing::debug!(line = %line, "Skipping invalid extra auth header"),
                    }
                }
            }
        }
        Ok(())
    }

    /// Converts an on-disk record; the type is matched case-insensitively.
    pub fn from_record(record: AuthPresetRecord) -> Result<Self> {
        let scheme = match record.kind.to_lowercase().as_str() {
            "basic" => AuthScheme::Basic {
                username: record.username,
                password: record.password,
            },
            "bearer" => AuthScheme::Bearer(record.token),
            "custom" => AuthScheme::Custom {
                header: record.header,
                value: record.value,
                prefix: record.prefix,
                extra_headers: record.headers,
            },
            _ => {
                return Err(Error::Validation(format!(
                    "unknown auth type: {}",
                    record.kind
                )))
            }
        };
        Ok(AuthPreset {
            name: record.name,
            scheme,
        })
    }

    pub fn to_record(&self) -> AuthPresetRecord {
        let mut record = AuthPresetRecord {
            name: self.name.clone(),
            kind: self.scheme.type_name().to_string(),
            ..Default::default()
        };
        match &self.scheme {
            AuthScheme::Basic { username, password } => {
                record.username = username.clone();
                record.password = password.clone();
            }
            AuthScheme::Bearer(token) => record.token = token.clone(),
            AuthScheme::Custom {
                header,
                value,
                prefix,
                extra_headers,
            } => {
                record.header = header.clone();
                record.value = value.clone();
                record.prefix = prefix.clone();
                record.headers = extra_headers.clone();
            }
        }
        record
    }
}
