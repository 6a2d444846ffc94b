//! Prompt records and the persisted library snapshot.
//!
//! Prompts are values: every change produces a new `Prompt` with a refreshed
//! `updated_at`, so a copy handed to a subscriber never changes underneath it.
//! Decoding from JSON is deliberately forgiving (see [`Prompt::from_value`]).

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LibraryError, LibraryResult};

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "general";

/// Name used when a stored record has no usable name.
const FALLBACK_NAME: &str = "Unnamed";

/// Rank bonus that puts every favorite above every non-favorite.
const FAVORITE_BONUS: u64 = 10_000;

/// Role a prompt plays during composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    #[default]
    Body,
    Prefix,
    Suffix,
}

impl PromptRole {
    pub const ALL: [PromptRole; 3] = [PromptRole::Body, PromptRole::Prefix, PromptRole::Suffix];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptRole::Body => "body",
            PromptRole::Prefix => "prefix",
            PromptRole::Suffix => "suffix",
        }
    }

    /// Parses a stored role, falling back to `Body` for anything unknown.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Cycles Body -> Prefix -> Suffix -> Body.
    pub fn next(self) -> Self {
        match self {
            PromptRole::Body => PromptRole::Prefix,
            PromptRole::Prefix => PromptRole::Suffix,
            PromptRole::Suffix => PromptRole::Body,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }
}

impl fmt::Display for PromptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(PromptRole::Body),
            "prefix" => Ok(PromptRole::Prefix),
            "suffix" => Ok(PromptRole::Suffix),
            other => Err(format!(
                "unknown role '{}' (expected body, prefix or suffix)",
                other
            )),
        }
    }
}

/// A named, reusable snippet of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub content: String,
    pub role: PromptRole,
    pub category: String,
    pub usage_count: u64,
    pub is_favorite: bool,
    /// Seconds since the Unix epoch.
    pub created_at: f64,
    /// Seconds since the Unix epoch.
    pub updated_at: f64,
}

/// Field overrides applied by [`Prompt::with_updated_fields`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
    pub role: Option<PromptRole>,
    pub category: Option<String>,
    pub usage_count: Option<u64>,
    pub is_favorite: Option<bool>,
}

impl PromptUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn role(mut self, role: PromptRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn usage_count(mut self, usage_count: u64) -> Self {
        self.usage_count = Some(usage_count);
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = Some(is_favorite);
        self
    }

    /// Rejects an explicit blank name.
    pub fn validate(&self) -> LibraryResult<()> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(LibraryError::Validation(
                "name must not be blank".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Current wall-clock time as fractional epoch seconds.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

impl Prompt {
    /// Creates a fresh prompt with a new id and both timestamps set to now.
    pub fn create(
        name: &str,
        content: &str,
        role: PromptRole,
        category: &str,
    ) -> LibraryResult<Prompt> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::Validation(
                "name must not be blank".to_string(),
            ));
        }

        let now = now_secs();
        Ok(Prompt {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            content: content.to_string(),
            role,
            category: normalize_category(category),
            usage_count: 0,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns a copy with `update` applied and `updated_at` refreshed.
    ///
    /// `id` and `created_at` are never touched. A blank name is ignored here;
    /// callers that accept user input run [`PromptUpdate::validate`] first.
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn with_updated_fields(&self, update: &PromptUpdate) -> Prompt {
        let mut next = self.clone();

        if let Some(name) = &update.name
            && !name.trim().is_empty()
        {
            next.name = name.trim().to_string();
        }
        if let Some(content) = &update.content {
            next.content = content.clone();
        }
        if let Some(role) = update.role {
            next.role = role;
        }
        if let Some(category) = &update.category {
            next.category = normalize_category(category);
        }
        if let Some(usage_count) = update.usage_count {
            next.usage_count = usage_count;
        }
        if let Some(is_favorite) = update.is_favorite {
            next.is_favorite = is_favorite;
        }

        next.updated_at = now_secs().max(self.updated_at);
        next
    }

    /// Display ordering score. Never persisted.
    pub fn rank_score(&self) -> u64 {
        let bonus = if self.is_favorite { FAVORITE_BONUS } else { 0 };
        self.usage_count.saturating_add(bonus)
    }

    /// Decodes one stored record.
    ///
    /// Returns `None` only when `value` is not an object. Every field has a
    /// fallback: missing or unusable values take their default, numbers and
    /// strings are converted where that makes sense, and an unknown role
    /// becomes `Body`.
    pub fn from_value(value: &Value) -> Option<Prompt> {
        let obj = value.as_object()?;
        let now = now_secs();

        let id = coerce_string(obj.get("id"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let name = coerce_string(obj.get("name"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());
        let role = coerce_string(obj.get("role"))
            .map(|s| PromptRole::parse_lenient(&s))
            .unwrap_or_default();
        let category = coerce_string(obj.get("category"))
            .map(|s| normalize_category(&s))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let created_at = coerce_f64(obj.get("created_at")).unwrap_or(now);
        let updated_at = coerce_f64(obj.get("updated_at")).unwrap_or(created_at);

        Some(Prompt {
            id,
            name,
            content: coerce_string(obj.get("content")).unwrap_or_default(),
            role,
            category,
            usage_count: coerce_u64(obj.get("usage_count")).unwrap_or(0),
            is_favorite: coerce_bool(obj.get("is_favorite")).unwrap_or(false),
            created_at,
            updated_at,
        })
    }
}

fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn coerce_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.max(0.0) as u64)
            })
        }
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}

fn coerce_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "0" | "no" | "off" => Some(false),
            _ => Some(true),
        },
        _ => None,
    }
}

/// Full persisted snapshot of the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryState {
    pub schema_version: u32,
    pub prompts: Vec<Prompt>,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self::empty()
    }
}

impl LibraryState {
    pub fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            prompts: Vec::new(),
        }
    }

    /// Decodes a snapshot. Returns `None` only when `value` is not an object.
    ///
    /// A `prompts` entry that is not an array yields no prompts; array
    /// elements that are not objects are skipped.
    pub fn from_value(value: &Value) -> Option<LibraryState> {
        let obj = value.as_object()?;

        let schema_version = coerce_u64(obj.get("schema_version"))
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(SCHEMA_VERSION);
        let prompts = obj
            .get("prompts")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Prompt::from_value).collect())
            .unwrap_or_default();

        Some(LibraryState {
            schema_version,
            prompts,
        })
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
