//! Transport-agnostic request routing

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::Pitwall;
use crate::{Result, TelemetryError};

/// Liveness probe document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Health {
    pub alive: bool,
}

/// Whether the simulator is currently writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Running {
    pub active: bool,
}

/// One of the documents a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Root,
    Health,
    Scoring,
    Telemetry,
    Running,
    Session,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Root,
        Endpoint::Health,
        Endpoint::Scoring,
        Endpoint::Telemetry,
        Endpoint::Running,
        Endpoint::Session,
    ];

    /// Canonical path of the endpoint.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Root => "/",
            Endpoint::Health => "/healthz",
            Endpoint::Scoring => "/scoring/",
            Endpoint::Telemetry => "/telemetry/",
            Endpoint::Running => "/running/",
            Endpoint::Session => "/session/",
        }
    }

    /// Resolve a request path. The trailing slash is optional.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        let name = trimmed.strip_prefix('/').unwrap_or(trimmed);

        match name {
            "" => Ok(Endpoint::Root),
            "healthz" => Ok(Endpoint::Health),
            "scoring" => Ok(Endpoint::Scoring),
            "telemetry" => Ok(Endpoint::Telemetry),
            "running" => Ok(Endpoint::Running),
            "session" => Ok(Endpoint::Session),
            _ => Err(TelemetryError::UnknownEndpoint { path: path.to_string() }),
        }
    }
}

impl FromStr for Endpoint {
    type Err = TelemetryError;

    fn from_str(path: &str) -> Result<Self> {
        Self::parse(path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A rendered document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub document: Value,
    /// Built from a snapshot that stayed torn through every retry.
    pub stale: bool,
}

impl Response {
    fn fresh<T: Serialize>(document: &T) -> Result<Self> {
        Ok(Self { document: serde_json::to_value(document)?, stale: false })
    }
}

impl Pitwall {
    /// Render the document behind `endpoint`.
    pub fn handle(&self, endpoint: Endpoint) -> Result<Response> {
        match endpoint {
            Endpoint::Root => Ok(Response { document: Value::Object(Map::new()), stale: false }),
            Endpoint::Health => Response::fresh(&self.health()),
            Endpoint::Running => Response::fresh(&self.running()),
            Endpoint::Scoring => {
                let snapshot = self.scoring()?;
                Ok(Response { document: serde_json::to_value(&snapshot.value)?, stale: snapshot.stale })
            }
            Endpoint::Telemetry => {
                let snapshot = self.telemetry()?;
                Ok(Response { document: serde_json::to_value(&snapshot.value)?, stale: snapshot.stale })
            }
            Endpoint::Session => {
                let snapshot = self.session()?;
                Ok(Response { document: serde_json::to_value(&snapshot.value)?, stale: snapshot.stale })
            }
        }
    }

    /// Resolve `path` and render its document.
    pub fn handle_path(&self, path: &str) -> Result<Response> {
        self.handle(Endpoint::parse(path)?)
    }
}
