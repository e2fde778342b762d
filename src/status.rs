//! Point-in-time status snapshot from `/api/status`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientStatus {
    #[serde(default)]
    pub status: String,
    /// Seconds since the client started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Per-service connection states and anything else the server adds.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientStatus {
    pub fn is_connected(&self) -> bool {
        self.status == "connected"
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_connected() {
            "Connected"
        } else {
            "Unknown"
        }
    }

    /// Human readable lines for the status command.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!("Status: {}", self.status_text())];
        if let Some(version) = &self.version {
            lines.push(format!("Version: v{version}"));
        }
        lines.push(format!("Uptime: {}", format_uptime(self.uptime)));
        for (key, value) in &self.extra {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("{key}: {shown}"));
        }
        lines
    }
}

/// `1h 2m 3s`, `2m 3s` or `3s`; `N/A` when missing or zero.
pub fn format_uptime(seconds: Option<f64>) -> String {
    let total = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s.floor() as u64,
        _ => return "N/A".to_string(),
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
