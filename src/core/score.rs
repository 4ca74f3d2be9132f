use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::StoreError;
use crate::core::storage::Storage;

/// Best result of one game: a magnitude or an ordinal state tag such as
/// `"Win"`. Serialized untagged, so the stored JSON is a bare number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Numeric(f64),
    Label(String),
}

impl ScoreValue {
    /// Whether `self` should replace `stored` as the best value.
    pub fn improves_on(&self, stored: &ScoreValue) -> bool {
        match (stored, self) {
            (ScoreValue::Numeric(old), ScoreValue::Numeric(new)) => new > old,
            (_, ScoreValue::Label(new)) => !matches!(stored, ScoreValue::Label(old) if old == new),
            // A number after a label: latest wins.
            (ScoreValue::Label(_), ScoreValue::Numeric(_)) => true,
        }
    }

    fn is_storable(&self) -> bool {
        match self {
            ScoreValue::Numeric(n) => n.is_finite(),
            ScoreValue::Label(_) => true,
        }
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreValue::Numeric(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            ScoreValue::Numeric(n) => write!(f, "{n}"),
            ScoreValue::Label(label) => f.write_str(label),
        }
    }
}

impl From<f64> for ScoreValue {
    fn from(value: f64) -> Self {
        ScoreValue::Numeric(value)
    }
}

impl From<i64> for ScoreValue {
    fn from(value: i64) -> Self {
        ScoreValue::Numeric(value as f64)
    }
}

impl From<i32> for ScoreValue {
    fn from(value: i32) -> Self {
        ScoreValue::Numeric(f64::from(value))
    }
}

impl From<u32> for ScoreValue {
    fn from(value: u32) -> Self {
        ScoreValue::Numeric(f64::from(value))
    }
}

impl From<&str> for ScoreValue {
    fn from(value: &str) -> Self {
        ScoreValue::Label(value.to_string())
    }
}

impl From<String> for ScoreValue {
    fn from(value: String) -> Self {
        ScoreValue::Label(value)
    }
}

/// Shared score store; the host and the shell hold clones.
pub type SharedScores = Rc<RefCell<ScoreStore>>;

/// Per-game best results, persisted under `hs_<id>`.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    storage: Storage,
}

impl ScoreStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn shared(storage: Storage) -> SharedScores {
        Rc::new(RefCell::new(Self::new(storage)))
    }

    pub fn key(id: &str) -> String {
        format!("hs_{id}")
    }

    pub fn get(&self, id: &str) -> Option<ScoreValue> {
        self.storage.load(&Self::key(id))
    }

    /// Offers `value` as the new best for `id`. Returns `Ok(true)` when the
    /// record changed (and was persisted), `Ok(false)` when it was not better.
    pub fn set(&mut self, id: &str, value: impl Into<ScoreValue>) -> Result<bool, StoreError> {
        let value = value.into();
        if !value.is_storable() {
            warn!(game = id, ?value, "rejecting non-finite score");
            return Ok(false);
        }

        let replace = match self.get(id) {
            None => true,
            Some(stored) => value.improves_on(&stored),
        };
        if !replace {
            return Ok(false);
        }

        self.storage.store(&Self::key(id), &value)?;
        debug!(game = id, %value, "best score updated");
        Ok(true)
    }

    /// Best score formatted for display, `-` when there is none.
    pub fn display(&self, id: &str) -> String {
        self.get(id).map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    }
}
