//! Test utilities & fixtures.
//! Builders for content documents and client configurations with known list sizes.
#![allow(dead_code)] // Each test binary uses a different subset.

use serde_json::{json, Map, Value};

/// `n` distinct names with a common prefix.
pub fn names(prefix: &str, n: usize) -> Vec<Value> {
    (1..=n).map(|i| Value::String(format!("{prefix} {i}"))).collect()
}

/// Flat document with the given list sizes; `None` leaves a field out.
pub fn flat_doc(
    items: usize,
    prog_items: usize,
    trap_items: usize,
    filler_items: Option<usize>,
    locations: usize,
    prog_locations: usize,
) -> Value {
    let mut map = Map::new();
    map.insert("items".into(), Value::Array(names("Item", items)));
    map.insert("progitems".into(), Value::Array(names("Key", prog_items)));
    map.insert("trapitems".into(), Value::Array(names("Trap", trap_items)));
    if let Some(n) = filler_items {
        map.insert("filleritems".into(), Value::Array(names("Filler", n)));
    }
    map.insert("locations".into(), Value::Array(names("Room", locations)));
    map.insert(
        "proglocations".into(),
        Value::Array(names("Vault", prog_locations)),
    );
    Value::Object(map)
}

/// Flat document matching the current builder exactly (60/3/3/3/50/10).
pub fn valid_flat_doc() -> Value {
    flat_doc(60, 3, 3, Some(3), 50, 10)
}

/// Small nested document with every group present.
pub fn nested_doc() -> Value {
    json!({
        "items": {
            "normal": ["Sword", "Shield"],
            "trap": ["Banana Peel"],
            "filler": [],
            "prog": ["Golden Key"],
        },
        "locations": {
            "chatroom": ["Lobby", "Kitchen"],
            "prog": ["Vault"],
        }
    })
}

/// Client configuration that passes every rule in Streamer.bot mode.
pub fn streamerbot_config() -> Value {
    json!({
        "mixitup": false,
        "streamerbot": true,
        "connectionInfo": {
            "hostname": "archipelago.gg",
            "port": 38281,
            "playerName": "Streamer",
            "tags": ["AP", "TextOnly"]
        },
        "streamerbotConfig": {
            "host": "127.0.0.1",
            "port": 8080,
            "endpoint": "/",
            "password": "hunter2",
            "retries": 5,
            "immediate": true,
            "autoReconnect": true
        },
        "gameSettings": {
            "searchAttemptsRequired": 5,
            "lootAttemptsRequired": 3,
            "lootChance": 0.5,
            "checkCooldown": 240
        }
    })
}
