//! Save payload for the decision core.
//!
//! Three independent sections are persisted: triggered event ids, rival pair
//! progress, and flags. Each section decodes on its own, so a damaged or
//! missing section falls back to its default without losing the others.
//!
//! ```json
//! {
//!   "version": 1,
//!   "triggered_events": ["cook_heart1", "cook_heart2"],
//!   "rival_pairs": [{"main_id": "char_01", "rival_id": "rival_01", "stage": 3, "married": false}],
//!   "flags": {"festival": true}
//! }
//! ```

use island_rules::{CharacterId, EventId, FlagId, FlagStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::events::{EventRegistry, TriggeredEvents};
use crate::rival::{RivalPairState, RivalTracker};

/// Current payload version.
pub const SAVE_VERSION: u32 = 1;

/// Errors from encoding or decoding a save payload.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to encode save payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("save payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("save payload is not a JSON object")]
    NotAnObject,
}

/// One rival pair as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalPairRecord {
    pub main_id: CharacterId,
    pub rival_id: CharacterId,
    /// Stored wide so out-of-range values survive decoding and can be
    /// normalized on restore.
    #[serde(default)]
    pub stage: i64,
    #[serde(default)]
    pub married: bool,
}

impl From<&RivalPairRecord> for RivalPairState {
    fn from(record: &RivalPairRecord) -> Self {
        Self {
            main: record.main_id.clone(),
            rival: record.rival_id.clone(),
            stage: record.stage,
            married: record.married,
        }
    }
}

impl From<RivalPairState> for RivalPairRecord {
    fn from(state: RivalPairState) -> Self {
        Self {
            main_id: state.main,
            rival_id: state.rival,
            stage: state.stage,
            married: state.married,
        }
    }
}

/// Everything the core needs to resume a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveState {
    pub version: u32,
    pub triggered_events: TriggeredEvents,
    pub rival_pairs: Vec<RivalPairRecord>,
    pub flags: FlagStore,
}

impl Default for SaveState {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            triggered_events: TriggeredEvents::default(),
            rival_pairs: Vec::new(),
            flags: FlagStore::default(),
        }
    }
}

impl SaveState {
    /// Snapshot the mutable state of a session.
    pub fn capture(triggered: &TriggeredEvents, rivals: &RivalTracker, flags: &FlagStore) -> Self {
        Self {
            version: SAVE_VERSION,
            triggered_events: triggered.clone(),
            rival_pairs: rivals.records().into_iter().map(Into::into).collect(),
            flags: flags.clone(),
        }
    }

    /// Encode as pretty-printed JSON.
    pub fn encode(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(PersistenceError::Encode)
    }

    /// Decode a payload section by section.
    ///
    /// An empty payload yields the default state. A section that is missing
    /// or has the wrong shape is logged and left at its default; only a
    /// payload that is not a JSON object at all is an error.
    pub fn decode(input: &str) -> Result<Self, PersistenceError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(input)?;
        let Value::Object(root) = value else {
            return Err(PersistenceError::NotAnObject);
        };

        Ok(Self {
            version: decode_version(&root),
            triggered_events: decode_triggered(&root),
            rival_pairs: decode_rival_pairs(&root),
            flags: decode_flags(&root),
        })
    }

    /// Decode, falling back to the default state on any error.
    pub fn decode_or_default(input: &str) -> Self {
        Self::decode(input).unwrap_or_else(|err| {
            tracing::warn!(%err, "unreadable save payload; starting fresh");
            Self::default()
        })
    }

    /// Triggered ids to resume with. With a registry, ids it does not define
    /// are dropped.
    pub fn restore_triggered(&self, registry: Option<&EventRegistry>) -> TriggeredEvents {
        self.triggered_events
            .iter()
            .filter(|id| match registry {
                Some(registry) if !registry.contains(id) => {
                    tracing::warn!(event = %id, "saved event is no longer defined; dropping");
                    false
                }
                _ => true,
            })
            .cloned()
            .collect()
    }

    /// Replace a tracker's progress with the saved rival records. Pairs the
    /// payload does not mention go back to stage 0. Returns the number of
    /// pairs restored.
    pub fn restore_rivals(&self, tracker: &mut RivalTracker) -> usize {
        let states: Vec<RivalPairState> = self.rival_pairs.iter().map(Into::into).collect();
        tracker.restore(&states)
    }
}

fn decode_version(root: &Map<String, Value>) -> u32 {
    match root.get("version") {
        None => SAVE_VERSION,
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or_else(|| {
                tracing::warn!(?value, "invalid save version; assuming current");
                SAVE_VERSION
            }),
    }
}

fn decode_triggered(root: &Map<String, Value>) -> TriggeredEvents {
    let Some(section) = root.get("triggered_events") else {
        return TriggeredEvents::default();
    };
    let Some(items) = section.as_array() else {
        tracing::warn!("triggered_events section is not a list; ignoring");
        return TriggeredEvents::default();
    };
    items
        .iter()
        .filter_map(|item| match item.as_str() {
            Some(id) if !id.trim().is_empty() => Some(EventId::new(id)),
            _ => {
                tracing::warn!(?item, "skipping invalid triggered event id");
                None
            }
        })
        .collect()
}

fn decode_rival_pairs(root: &Map<String, Value>) -> Vec<RivalPairRecord> {
    let Some(section) = root.get("rival_pairs") else {
        return Vec::new();
    };
    let Some(items) = section.as_array() else {
        tracing::warn!("rival_pairs section is not a list; ignoring");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match RivalPairRecord::deserialize(item) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(%err, "skipping malformed rival pair record");
                None
            }
        })
        .collect()
}

/// Flags come either as a map or as parallel `flag_keys`/`flag_values` lists,
/// nested under `flags` or at the top level.
fn decode_flags(root: &Map<String, Value>) -> FlagStore {
    match root.get("flags") {
        Some(Value::Object(section)) if section.contains_key("flag_keys") => {
            decode_flag_lists(section)
        }
        Some(Value::Object(section)) => section
            .iter()
            .filter_map(|(key, value)| match value.as_bool() {
                Some(enabled) => Some((FlagId::new(key.as_str()), enabled)),
                None => {
                    tracing::warn!(flag = %key, "skipping non-boolean flag");
                    None
                }
            })
            .collect(),
        Some(_) => {
            tracing::warn!("flags section has an unknown layout; ignoring");
            FlagStore::default()
        }
        None if root.contains_key("flag_keys") => decode_flag_lists(root),
        None => FlagStore::default(),
    }
}

fn decode_flag_lists(section: &Map<String, Value>) -> FlagStore {
    let keys = section.get("flag_keys").and_then(Value::as_array);
    let values = section.get("flag_values").and_then(Value::as_array);
    let (Some(keys), Some(values)) = (keys, values) else {
        tracing::warn!("flag lists are incomplete; ignoring");
        return FlagStore::default();
    };
    if keys.len() != values.len() {
        tracing::warn!(
            keys = keys.len(),
            values = values.len(),
            "flag lists differ in length; keeping the common prefix"
        );
    }
    keys.iter()
        .zip(values)
        .filter_map(|(key, value)| Some((FlagId::new(key.as_str()?), value.as_bool()?)))
        .collect()
}
