//! Validation rules for content lists, client configuration and message templates.
//!
//! All validators accumulate. Input that parsed but breaks the rules never
//! short-circuits: every violated rule ends up in the report, in a fixed
//! order, so an operator can fix everything in one pass.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client_config::{ClientConfig, IntegrationMode, NumericInput};
use crate::content::{
    ContentDocument, FLAT_FILLER_ITEMS, FLAT_ITEMS, FLAT_LOCATIONS, FLAT_PROG_ITEMS,
    FLAT_PROG_LOCATIONS, FLAT_TRAP_ITEMS, ITEM_GROUPS, LOCATION_GROUPS,
};

/// Pass/fail plus every message collected along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Exact list sizes required by the legacy flat layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatCounts {
    pub items: usize,
    pub prog_items: usize,
    pub trap_items: usize,
    /// `None` skips the filler check entirely.
    pub filler_items: Option<usize>,
    pub locations: usize,
    pub prog_locations: usize,
}

impl FlatCounts {
    /// 60 generic, 3 progression, 3 trap, 3 filler, 50 locations, 10 priority.
    pub fn current() -> Self {
        FlatCounts {
            items: 60,
            prog_items: 3,
            trap_items: 3,
            filler_items: Some(3),
            locations: 50,
            prog_locations: 10,
        }
    }

    /// Older builder: 10 progression and 10 trap items, no filler list.
    pub fn legacy() -> Self {
        FlatCounts {
            items: 60,
            prog_items: 10,
            trap_items: 10,
            filler_items: None,
            locations: 50,
            prog_locations: 10,
        }
    }
}

impl Default for FlatCounts {
    fn default() -> Self {
        FlatCounts::current()
    }
}

const CURRENT_VARIABLES: &[&str] = &["{item}", "{player}", "{location}", "{receiver}"];
const LEGACY_VARIABLES: &[&str] = &["{item}", "{player}", "{location}", "{count}", "{time}"];

/// Placeholders a message template may use, braces included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSet {
    tokens: &'static [&'static str],
}

impl VariableSet {
    pub fn current() -> Self {
        VariableSet {
            tokens: CURRENT_VARIABLES,
        }
    }

    pub fn legacy() -> Self {
        VariableSet {
            tokens: LEGACY_VARIABLES,
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(&token)
    }
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet::current()
    }
}

/// Named pairing of list counts and placeholder whitelist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    #[default]
    Current,
    Legacy,
}

impl ValidationProfile {
    pub fn flat_counts(&self) -> FlatCounts {
        match self {
            ValidationProfile::Current => FlatCounts::current(),
            ValidationProfile::Legacy => FlatCounts::legacy(),
        }
    }

    pub fn variables(&self) -> VariableSet {
        match self {
            ValidationProfile::Current => VariableSet::current(),
            ValidationProfile::Legacy => VariableSet::legacy(),
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Check a content document against the rules of its layout.
///
/// Nested documents only need the right groups holding lists; list sizes are
/// advisory there. Flat documents need exact sizes from `counts`.
pub fn validate_content(doc: &ContentDocument, counts: &FlatCounts) -> ValidationReport {
    let mut report = ValidationReport::default();
    match doc {
        ContentDocument::Nested(map) => validate_nested(map, &mut report),
        ContentDocument::Flat(map) => validate_flat(map, counts, &mut report),
        ContentDocument::Unrecognized(_) => {
            report.push("content must be a mapping with items and locations")
        }
    }
    report
}

fn validate_nested(map: &Map<String, Value>, report: &mut ValidationReport) {
    match map.get(FLAT_ITEMS) {
        Some(Value::Object(items)) => {
            for group in ITEM_GROUPS {
                if !matches!(items.get(group), Some(Value::Array(_))) {
                    report.push(format!("items.{group} must be an array"));
                }
            }
        }
        _ => report.push("items must be an object with normal, trap, filler, and prog properties"),
    }

    match map.get(FLAT_LOCATIONS) {
        Some(Value::Object(locations)) => {
            for group in LOCATION_GROUPS {
                if !matches!(locations.get(group), Some(Value::Array(_))) {
                    report.push(format!("locations.{group} must be an array"));
                }
            }
        }
        _ => report.push("locations must be an object with chatroom and prog properties"),
    }
}

fn validate_flat(map: &Map<String, Value>, counts: &FlatCounts, report: &mut ValidationReport) {
    let checks = [
        (FLAT_ITEMS, Some(counts.items)),
        (FLAT_PROG_ITEMS, Some(counts.prog_items)),
        (FLAT_TRAP_ITEMS, Some(counts.trap_items)),
        (FLAT_FILLER_ITEMS, counts.filler_items),
        (FLAT_LOCATIONS, Some(counts.locations)),
        (FLAT_PROG_LOCATIONS, Some(counts.prog_locations)),
    ];

    for (field, expected) in checks {
        let Some(expected) = expected else {
            continue;
        };
        let found = match map.get(field) {
            Some(Value::Array(list)) if list.len() == expected => continue,
            Some(Value::Array(list)) => format!("found {}", list.len()),
            None | Some(Value::Null) => "missing".to_string(),
            Some(_) => "not a list".to_string(),
        };
        report.push(format!(
            "{field} must contain exactly {expected} items ({found})"
        ));
    }
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

pub const HOSTNAME_REQUIRED: &str = "Hostname is required";
pub const PLAYER_NAME_REQUIRED: &str = "Player name is required";
pub const PORT_RANGE: &str = "Port must be between 1 and 65535";
pub const PASSWORD_REQUIRED: &str = "Password is required for Streamer.bot";
pub const RETRIES_RANGE: &str = "Retries must be 0 or greater";
pub const SEARCH_ATTEMPTS_RANGE: &str = "Search attempts must be at least 1";
pub const LOOT_ATTEMPTS_RANGE: &str = "Loot attempts must be at least 1";
pub const LOOT_CHANCE_RANGE: &str = "Loot chance must be between 0 and 1";
pub const CHECK_COOLDOWN_RANGE: &str = "Check cooldown must be 0 or greater";
pub const WEBHOOK_URL_FORMAT: &str = "Invalid webhook URL format";

/// One violated configuration rule, addressed by its wire path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted camelCase path, e.g. `connectionInfo.hostname`.
    pub path: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigReport {
    errors: Vec<FieldError>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for a path, if that rule failed.
    pub fn get(&self, path: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.message)
    }

    /// Project into per-section maps, e.g.
    /// `{"connectionInfo": {"hostname": "Hostname is required"}}`.
    pub fn to_nested(&self) -> Value {
        let mut root = Map::new();
        for error in &self.errors {
            match error.path.split_once('.') {
                Some((section, field)) => {
                    let entry = root
                        .entry(section.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(fields) = entry {
                        fields.insert(field.to_string(), Value::from(error.message));
                    }
                }
                None => {
                    root.insert(error.path.to_string(), Value::from(error.message));
                }
            }
        }
        Value::Object(root)
    }

    fn push(&mut self, path: &'static str, message: &'static str) {
        self.errors.push(FieldError { path, message });
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

fn check_integer(
    report: &mut ConfigReport,
    path: &'static str,
    message: &'static str,
    value: Option<&NumericInput>,
    accept: impl Fn(i64) -> bool,
) {
    if let Some(value) = value {
        if !value.as_integer().is_some_and(accept) {
            report.push(path, message);
        }
    }
}

fn valid_port(port: i64) -> bool {
    (1..=65535).contains(&port)
}

/// Check a client configuration.
///
/// Streamer.bot settings are only checked in Streamer.bot mode and the webhook
/// URL only in MixItUp mode.
pub fn validate_config(config: &ClientConfig) -> ConfigReport {
    let mut report = ConfigReport::default();
    let conn = &config.connection_info;

    if is_blank(Some(&conn.hostname)) {
        report.push("connectionInfo.hostname", HOSTNAME_REQUIRED);
    }
    if is_blank(Some(&conn.player_name)) {
        report.push("connectionInfo.playerName", PLAYER_NAME_REQUIRED);
    }
    check_integer(
        &mut report,
        "connectionInfo.port",
        PORT_RANGE,
        conn.port.as_ref(),
        valid_port,
    );

    if config.integration == IntegrationMode::StreamerBot {
        let sb = config.streamerbot_config.as_ref();
        check_integer(
            &mut report,
            "streamerbotConfig.port",
            PORT_RANGE,
            sb.and_then(|s| s.port.as_ref()),
            valid_port,
        );
        if is_blank(sb.and_then(|s| s.password.as_deref())) {
            report.push("streamerbotConfig.password", PASSWORD_REQUIRED);
        }
        check_integer(
            &mut report,
            "streamerbotConfig.retries",
            RETRIES_RANGE,
            sb.and_then(|s| s.retries.as_ref()),
            |n| n >= 0,
        );
    }

    if let Some(game) = &config.game_settings {
        check_integer(
            &mut report,
            "gameSettings.searchAttemptsRequired",
            SEARCH_ATTEMPTS_RANGE,
            game.search_attempts_required.as_ref(),
            |n| n >= 1,
        );
        check_integer(
            &mut report,
            "gameSettings.lootAttemptsRequired",
            LOOT_ATTEMPTS_RANGE,
            game.loot_attempts_required.as_ref(),
            |n| n >= 1,
        );
        if let Some(chance) = &game.loot_chance {
            if !chance
                .as_float()
                .is_some_and(|c| (0.0..=1.0).contains(&c))
            {
                report.push("gameSettings.lootChance", LOOT_CHANCE_RANGE);
            }
        }
        check_integer(
            &mut report,
            "gameSettings.checkCooldown",
            CHECK_COOLDOWN_RANGE,
            game.check_cooldown.as_ref(),
            |n| n >= 0,
        );
    }

    if config.integration == IntegrationMode::MixItUp {
        let webhook = config
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());
        if let Some(url) = webhook {
            if url::Url::parse(url).is_err() {
                report.push("webhookUrl", WEBHOOK_URL_FORMAT);
            }
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Message templates
// ---------------------------------------------------------------------------

/// Every `{...}` token in `text`, leftmost first, non-overlapping.
///
/// A token is an opening brace, at least one character that is not a closing
/// brace, then a closing brace. `{}` on its own is not a token.
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut start = 0;
    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        match text[open + 1..].find('}') {
            Some(0) => start = open + 1,
            Some(len) => {
                let close = open + 1 + len;
                found.push(&text[open..=close]);
                start = close + 1;
            }
            None => break,
        }
    }
    found
}

/// Check a message template in list form: `{"messages": ["...", ...]}`.
///
/// Key/value templates (the miscellaneous file) are a separate shape and are
/// not expected here; see [`crate::template::MessageTemplate`].
pub fn validate_template(template: &Value, variables: &VariableSet) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Value::Object(map) = template else {
        report.push("Template must be a valid JSON object");
        return report;
    };

    let messages = match map.get("messages") {
        Some(Value::Array(messages)) => messages,
        _ => {
            report.push("Template must contain a \"messages\" array");
            return report;
        }
    };

    if messages.is_empty() {
        report.push("Template must contain at least one message");
    }

    for (index, message) in messages.iter().enumerate() {
        let number = index + 1;
        let Some(text) = message.as_str() else {
            report.push(format!("Message {number} must be a string"));
            continue;
        };
        for token in placeholders(text) {
            if !variables.contains(token) {
                report.push(format!(
                    "Message {number} contains invalid variable: {token}"
                ));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_scan_matches_brace_tokens() {
        assert_eq!(placeholders("Hello {player}!"), vec!["{player}"]);
        assert_eq!(placeholders("{item} to {receiver}"), vec!["{item}", "{receiver}"]);
        assert_eq!(placeholders("{}{a}"), vec!["{a}"]);
        assert_eq!(placeholders("{{a}"), vec!["{{a}"]);
        assert_eq!(placeholders("open { only"), Vec::<&str>::new());
        assert_eq!(placeholders("héllo {lieu} ✓"), vec!["{lieu}"]);
    }

    #[test]
    fn variable_sets_differ_by_version() {
        assert!(VariableSet::current().contains("{receiver}"));
        assert!(!VariableSet::current().contains("{count}"));
        assert!(VariableSet::legacy().contains("{time}"));
        assert!(!VariableSet::legacy().contains("{receiver}"));
    }

    #[test]
    fn profiles_resolve_constants() {
        assert_eq!(ValidationProfile::default().flat_counts(), FlatCounts::current());
        assert_eq!(ValidationProfile::Legacy.flat_counts().prog_items, 10);
        assert_eq!(ValidationProfile::Legacy.variables(), VariableSet::legacy());
    }

    #[test]
    fn flat_errors_describe_what_was_found() {
        let doc = ContentDocument::from_value(json!({
            "items": ["a"],
            "trapitems": "x",
        }));
        let report = validate_content(&doc, &FlatCounts::legacy());
        assert_eq!(
            report.errors(),
            &[
                "items must contain exactly 60 items (found 1)",
                "progitems must contain exactly 10 items (missing)",
                "trapitems must contain exactly 10 items (not a list)",
                "locations must contain exactly 50 items (missing)",
                "proglocations must contain exactly 10 items (missing)",
            ]
        );
    }

    #[test]
    fn nested_report_projects_by_section() {
        let mut report = ConfigReport::default();
        report.push("connectionInfo.hostname", HOSTNAME_REQUIRED);
        report.push("connectionInfo.port", PORT_RANGE);
        report.push("webhookUrl", WEBHOOK_URL_FORMAT);
        assert_eq!(
            report.to_nested(),
            json!({
                "connectionInfo": {
                    "hostname": HOSTNAME_REQUIRED,
                    "port": PORT_RANGE,
                },
                "webhookUrl": WEBHOOK_URL_FORMAT,
            })
        );
        assert_eq!(report.get("connectionInfo.port"), Some(PORT_RANGE));
        assert_eq!(report.get("gameSettings.lootChance"), None);
    }
}
