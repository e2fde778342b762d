//! # Client Configuration
//!
//! The Chatipelago client's configuration as served by the admin API at
//! `/api/config`. The wire format is camelCase JSON with two booleans,
//! `mixitup` and `streamerbot`, that are folded into a single
//! [`IntegrationMode`] on load and written back on save.
//!
//! Numeric fields are kept as [`NumericInput`] so that a value typed into a
//! form as text (or out of range) still loads and is reported by
//! [`crate::validation::validate_config`] instead of failing to parse.
//! Keys this crate does not know about are kept and written back unchanged.
//!
//! Loading never fails on a mistyped or `null` field. Text fields read `null`
//! as blank, flags read anything but `true` as off, and a section that is not
//! an object reads as missing, so the validator reports the problem instead.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::validation::{validate_config, ConfigReport};

/// Which chat-bot platform the client talks to. Exactly one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegrationMode {
    #[default]
    None,
    MixItUp,
    StreamerBot,
}

impl IntegrationMode {
    fn from_flags(mixitup: bool, streamerbot: bool) -> Self {
        match (mixitup, streamerbot) {
            (true, true) => {
                warn!("Configuration enables both MixItUp and Streamer.bot; using MixItUp");
                IntegrationMode::MixItUp
            }
            (true, false) => IntegrationMode::MixItUp,
            (false, true) => IntegrationMode::StreamerBot,
            (false, false) => IntegrationMode::None,
        }
    }

    fn flags(self) -> (bool, bool) {
        (
            self == IntegrationMode::MixItUp,
            self == IntegrationMode::StreamerBot,
        )
    }
}

impl std::fmt::Display for IntegrationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrationMode::None => write!(f, "none"),
            IntegrationMode::MixItUp => write!(f, "MixItUp"),
            IntegrationMode::StreamerBot => write!(f, "Streamer.bot"),
        }
    }
}

/// A number as entered: a JSON number, text, or some other JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(Number),
    Text(String),
    /// Booleans, lists and objects; never a valid number.
    Other(Value),
}

/// Whole numbers saturate to the `i64` range.
fn whole_number(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.as_u64().is_some() {
        return Some(i64::MAX);
    }
    n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)
}

impl NumericInput {
    /// Integer value, if there is one.
    ///
    /// Floats count only with a zero fraction. Text is read as a JSON number
    /// after trimming, so `"8080.0"` and `8080.0` agree and trailing garbage
    /// such as `80abc` is rejected.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            NumericInput::Number(n) => whole_number(n),
            NumericInput::Text(t) => t.trim().parse::<Number>().ok().as_ref().and_then(whole_number),
            NumericInput::Other(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            NumericInput::Number(n) => n.as_f64(),
            NumericInput::Text(t) => t.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
            NumericInput::Other(_) => None,
        }
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        NumericInput::Number(value.into())
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(NumericInput::Number)
            .unwrap_or_else(|| NumericInput::Text(value.to_string()))
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Field readers that fold mistyped values into their blank form.
mod lenient {
    use serde::de::{DeserializeOwned, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
    }

    pub fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(entries) => entries.into_iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        })
    }

    pub fn section<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_section<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            value => serde_json::from_value(value).ok(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    #[serde(default, deserialize_with = "lenient::text")]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<NumericInput>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub player_name: String,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConnectionInfo {
    /// Replace tags from a comma separated list, dropping blanks.
    pub fn set_tags_from_csv(&mut self, csv: &str) {
        self.tags = csv
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamerbotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_text")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_text")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_text")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<NumericInput>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub immediate: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub auto_reconnect: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Streamer.bot action IDs, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamerbotActions {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_text")]
    pub trap_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_text")]
    pub bounced_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_attempts_required: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loot_attempts_required: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loot_chance: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_cooldown: Option<NumericInput>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireConfig", into = "WireConfig")]
pub struct ClientConfig {
    pub integration: IntegrationMode,
    pub webhook_url: Option<String>,
    pub connection_info: ConnectionInfo,
    /// Only meaningful in Streamer.bot mode; kept across mode switches.
    pub streamerbot_config: Option<StreamerbotConfig>,
    pub streamerbot_actions: Option<StreamerbotActions>,
    pub game_settings: Option<GameSettings>,
    pub extra: Map<String, Value>,
}

impl ClientConfig {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Select one integration, clearing the other.
    pub fn set_integration(&mut self, mode: IntegrationMode) {
        self.integration = mode;
        if mode == IntegrationMode::StreamerBot && self.streamerbot_config.is_none() {
            self.streamerbot_config = Some(StreamerbotConfig::default());
        }
    }

    pub fn validate(&self) -> ConfigReport {
        validate_config(self)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConfig {
    #[serde(default, deserialize_with = "lenient::flag")]
    mixitup: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    streamerbot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_text")]
    webhook_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::section")]
    connection_info: ConnectionInfo,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_section")]
    streamerbot_config: Option<StreamerbotConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_section")]
    streamerbot_actions: Option<StreamerbotActions>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_section")]
    game_settings: Option<GameSettings>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<WireConfig> for ClientConfig {
    fn from(wire: WireConfig) -> Self {
        ClientConfig {
            integration: IntegrationMode::from_flags(wire.mixitup, wire.streamerbot),
            webhook_url: wire.webhook_url,
            connection_info: wire.connection_info,
            streamerbot_config: wire.streamerbot_config,
            streamerbot_actions: wire.streamerbot_actions,
            game_settings: wire.game_settings,
            extra: wire.extra,
        }
    }
}

impl From<ClientConfig> for WireConfig {
    fn from(config: ClientConfig) -> Self {
        let (mixitup, streamerbot) = config.integration.flags();
        WireConfig {
            mixitup,
            streamerbot,
            webhook_url: config.webhook_url,
            connection_info: config.connection_info,
            streamerbot_config: config.streamerbot_config,
            streamerbot_actions: config.streamerbot_actions,
            game_settings: config.game_settings,
            extra: config.extra,
        }
    }
}

/// Local editable copy of a fetched configuration.
///
/// Edits go to the local copy; the saved copy only changes on
/// [`ConfigDraft::mark_saved`] or [`ConfigDraft::replace`].
#[derive(Debug, Clone)]
pub struct ConfigDraft {
    saved: ClientConfig,
    local: ClientConfig,
}

impl ConfigDraft {
    pub fn new(saved: ClientConfig) -> Self {
        ConfigDraft {
            local: saved.clone(),
            saved,
        }
    }

    pub fn saved(&self) -> &ClientConfig {
        &self.saved
    }

    pub fn local(&self) -> &ClientConfig {
        &self.local
    }

    pub fn edit(&mut self, f: impl FnOnce(&mut ClientConfig)) {
        f(&mut self.local);
    }

    pub fn has_changes(&self) -> bool {
        self.local != self.saved
    }

    pub fn validate(&self) -> ConfigReport {
        validate_config(&self.local)
    }

    /// Throw away local edits.
    pub fn revert(&mut self) {
        self.local = self.saved.clone();
    }

    /// The local copy was accepted by the server.
    pub fn mark_saved(&mut self) {
        self.saved = self.local.clone();
    }

    /// A fresh copy arrived from the server; local edits are dropped.
    pub fn replace(&mut self, fetched: ClientConfig) {
        self.local = fetched.clone();
        self.saved = fetched;
    }
}
