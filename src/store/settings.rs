//! # Reader Settings
//!
//! One record per user: font, translation, reciter, theme. Reads merge the
//! stored record over defaults, writes replace the whole record.
//!
//! Stored as `{ "version": 2, "updated_at": ..., "settings": {...} }`.
//! Version 1 is the bare camelCase record the web reader kept in local
//! storage; it is migrated on read and rewritten on the next save.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{KeyValueStore, StoreError};
use crate::quran::data::{find_reciter, find_theme, find_translation};

pub const SETTINGS_KEY: &str = "settings";
pub const SETTINGS_VERSION: u32 = 2;

pub const FONT_SIZE_RANGE: RangeInclusive<u8> = 16..=48;
pub const DEFAULT_FONT_SIZE: u8 = 28;
pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_RECITER: u16 = 7;
pub const DEFAULT_TRANSLATION: u16 = 131;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Default,
    Uthmanic,
    Indopak,
}

impl FromStr for FontStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(FontStyle::Default),
            "uthmanic" => Ok(FontStyle::Uthmanic),
            "indopak" => Ok(FontStyle::Indopak),
            other => Err(format!("{other:?} is not one of default, uthmanic, indopak")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub font_size: u8,
    pub font_style: FontStyle,
    pub show_translation: bool,
    pub theme: String,
    pub reciter: u16,
    pub translation: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_style: FontStyle::Default,
            show_translation: true,
            theme: DEFAULT_THEME.to_string(),
            reciter: DEFAULT_RECITER,
            translation: DEFAULT_TRANSLATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    FontSize,
    FontStyle,
    ShowTranslation,
    Theme,
    Reciter,
    Translation,
}

impl SettingKey {
    pub const ALL: [SettingKey; 6] = [
        SettingKey::FontSize,
        SettingKey::FontStyle,
        SettingKey::ShowTranslation,
        SettingKey::Theme,
        SettingKey::Reciter,
        SettingKey::Translation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::FontSize => "font_size",
            SettingKey::FontStyle => "font_style",
            SettingKey::ShowTranslation => "show_translation",
            SettingKey::Theme => "theme",
            SettingKey::Reciter => "reciter",
            SettingKey::Translation => "translation",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = StoreError;

    /// Accepts `font_size`, `fontSize` and `font-size` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        SettingKey::ALL
            .into_iter()
            .find(|k| k.name().replace('_', "") == folded)
            .ok_or_else(|| StoreError::UnknownSetting(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct SettingsEnvelope {
    version: u32,
    updated_at: DateTime<Utc>,
    settings: Settings,
}

/// The web reader's record. Every field is optional and loosely typed.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct LegacySettings {
    font_size: Option<f64>,
    font_style: Option<String>,
    show_translation: Option<bool>,
    theme: Option<String>,
    reciter: Option<Value>,
    translation: Option<Value>,
}

/// Ids were stored either as numbers or numeric strings.
fn legacy_id(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn clamp_font_size(size: i64) -> u8 {
    size.clamp(*FONT_SIZE_RANGE.start() as i64, *FONT_SIZE_RANGE.end() as i64) as u8
}

fn migrate_legacy(legacy: LegacySettings) -> Settings {
    let mut settings = Settings::default();
    if let Some(size) = legacy.font_size {
        settings.font_size = clamp_font_size(size.round() as i64);
    }
    if let Some(style) = legacy.font_style.as_deref() {
        match style.parse() {
            Ok(style) => settings.font_style = style,
            Err(e) => warn!("Dropping legacy font style: {}", e),
        }
    }
    if let Some(show) = legacy.show_translation {
        settings.show_translation = show;
    }
    if let Some(theme) = legacy.theme.as_deref().and_then(find_theme) {
        settings.theme = theme.id.to_string();
    }
    if let Some(reciter) = legacy.reciter.as_ref().and_then(legacy_id).and_then(find_reciter) {
        settings.reciter = reciter.id;
    }
    if let Some(t) = legacy
        .translation
        .as_ref()
        .and_then(legacy_id)
        .and_then(find_translation)
    {
        settings.translation = t.id;
    }
    settings
}

fn decode(value: Value) -> Result<Settings, StoreError> {
    match value.get("version").and_then(Value::as_u64) {
        Some(version) if version > SETTINGS_VERSION as u64 => Err(StoreError::UnsupportedVersion {
            key: SETTINGS_KEY.to_string(),
            version: version as u32,
        }),
        Some(_) => Ok(serde_json::from_value::<SettingsEnvelope>(value)?.settings),
        None => {
            info!("Migrating legacy settings record");
            Ok(migrate_legacy(serde_json::from_value(value)?))
        }
    }
}

fn invalid(key: SettingKey, message: impl Into<String>) -> StoreError {
    StoreError::InvalidValue {
        key: key.name().to_string(),
        message: message.into(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Applies one field. Font size is clamped into range like the reader's slider;
/// ids and theme must exist in the reference tables.
fn apply(settings: &mut Settings, key: SettingKey, raw: &str) -> Result<(), StoreError> {
    let raw = raw.trim();
    match key {
        SettingKey::FontSize => {
            let size: i64 = raw.parse().map_err(|_| invalid(key, "expected a number"))?;
            settings.font_size = clamp_font_size(size);
        }
        SettingKey::FontStyle => {
            settings.font_style = raw.parse().map_err(|e: String| invalid(key, e))?;
        }
        SettingKey::ShowTranslation => {
            settings.show_translation =
                parse_bool(raw).ok_or_else(|| invalid(key, "expected true or false"))?;
        }
        SettingKey::Theme => {
            let theme = find_theme(raw).ok_or_else(|| invalid(key, format!("unknown theme {raw:?}")))?;
            settings.theme = theme.id.to_string();
        }
        SettingKey::Reciter => {
            let reciter = raw
                .parse()
                .ok()
                .and_then(find_reciter)
                .ok_or_else(|| invalid(key, format!("unknown reciter {raw:?}")))?;
            settings.reciter = reciter.id;
        }
        SettingKey::Translation => {
            let translation = raw
                .parse()
                .ok()
                .and_then(find_translation)
                .ok_or_else(|| invalid(key, format!("unknown translation {raw:?}")))?;
            settings.translation = translation.id;
        }
    }
    Ok(())
}

pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored settings merged over defaults. A corrupt record reads as defaults.
    pub fn get(&self) -> Result<Settings, StoreError> {
        let value = match self.store.get(SETTINGS_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(Settings::default()),
            Err(StoreError::Serde(e)) => {
                warn!("Settings record unreadable, using defaults: {}", e);
                return Ok(Settings::default());
            }
            Err(e) => return Err(e),
        };
        match decode(value) {
            Err(StoreError::Serde(e)) => {
                warn!("Settings record malformed, using defaults: {}", e);
                Ok(Settings::default())
            }
            other => other,
        }
    }

    /// Sets one field from its textual value and persists the whole record.
    pub fn set(&self, key: SettingKey, raw: &str) -> Result<Settings, StoreError> {
        let mut settings = self.get()?;
        apply(&mut settings, key, raw)?;
        self.save(&settings)?;
        debug!("Setting {} = {:?}", key, raw);
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let envelope = SettingsEnvelope {
            version: SETTINGS_VERSION,
            updated_at: Utc::now(),
            settings: settings.clone(),
        };
        self.store.set(SETTINGS_KEY, &serde_json::to_value(envelope)?)
    }

    pub fn reset(&self) -> Result<(), StoreError> {
        info!("Resetting settings to defaults");
        self.store.remove(SETTINGS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use serde_json::json;

    fn memory() -> (Arc<MemoryStore>, SettingsStore) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), SettingsStore::new(kv))
    }

    #[test]
    fn test_defaults_when_empty() {
        let (_, store) = memory();
        assert_eq!(store.get().unwrap(), Settings::default());
    }

    #[test]
    fn test_font_size_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SettingsStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
            store.set(SettingKey::FontSize, "32").unwrap();
        }
        let reloaded = SettingsStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        let settings = reloaded.get().unwrap();
        assert_eq!(
            settings,
            Settings {
                font_size: 32,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn test_set_clamps_font_size() {
        let (_, store) = memory();
        assert_eq!(store.set(SettingKey::FontSize, "100").unwrap().font_size, 48);
        assert_eq!(store.set(SettingKey::FontSize, "-3").unwrap().font_size, 16);
        assert!(store.set(SettingKey::FontSize, "big").is_err());
    }

    #[test]
    fn test_set_validates_against_tables() {
        let (_, store) = memory();
        assert_eq!(store.set(SettingKey::Reciter, "9").unwrap().reciter, 9);
        assert!(matches!(
            store.set(SettingKey::Reciter, "999"),
            Err(StoreError::InvalidValue { .. })
        ));
        assert_eq!(store.set(SettingKey::Theme, "Dark").unwrap().theme, "dark");
        assert!(store.set(SettingKey::Theme, "neon").is_err());
        assert_eq!(store.set(SettingKey::Translation, "20").unwrap().translation, 20);
        assert_eq!(
            store.set(SettingKey::FontStyle, "indopak").unwrap().font_style,
            FontStyle::Indopak
        );
        assert!(!store.set(SettingKey::ShowTranslation, "off").unwrap().show_translation);
        // Failed writes leave earlier ones intact
        assert_eq!(store.get().unwrap().reciter, 9);
    }

    #[test]
    fn test_setting_key_spellings() {
        assert_eq!("font_size".parse::<SettingKey>().unwrap(), SettingKey::FontSize);
        assert_eq!("fontSize".parse::<SettingKey>().unwrap(), SettingKey::FontSize);
        assert_eq!("show-translation".parse::<SettingKey>().unwrap(), SettingKey::ShowTranslation);
        assert!(matches!("volume".parse::<SettingKey>(), Err(StoreError::UnknownSetting(_))));
    }

    #[test]
    fn test_migrates_legacy_record() {
        let (kv, store) = memory();
        kv.set(
            SETTINGS_KEY,
            &json!({"fontSize": 32, "fontStyle": "uthmanic", "reciter": "3", "theme": "sepia"}),
        )
        .unwrap();
        let settings = store.get().unwrap();
        assert_eq!(settings.font_size, 32);
        assert_eq!(settings.font_style, FontStyle::Uthmanic);
        assert_eq!(settings.reciter, 3);
        assert_eq!(settings.theme, "sepia");
        assert_eq!(settings.translation, DEFAULT_TRANSLATION);
        assert!(settings.show_translation);
    }

    #[test]
    fn test_legacy_bad_values_fall_back() {
        let (kv, store) = memory();
        kv.set(SETTINGS_KEY, &json!({"fontStyle": "gothic", "translation": 4242})).unwrap();
        assert_eq!(store.get().unwrap(), Settings::default());
    }

    #[test]
    fn test_saved_record_is_versioned() {
        let (kv, store) = memory();
        store.set(SettingKey::Theme, "dark").unwrap();
        let raw = kv.get(SETTINGS_KEY).unwrap().unwrap();
        assert_eq!(raw["version"], json!(SETTINGS_VERSION));
        assert_eq!(raw["settings"]["theme"], json!("dark"));
    }

    #[test]
    fn test_rejects_newer_schema() {
        let (kv, store) = memory();
        kv.set(SETTINGS_KEY, &json!({"version": 99, "settings": {}})).unwrap();
        assert!(matches!(
            store.get(),
            Err(StoreError::UnsupportedVersion { version: 99, .. })
        ));
    }

    #[test]
    fn test_reset() {
        let (_, store) = memory();
        store.set(SettingKey::FontSize, "40").unwrap();
        store.reset().unwrap();
        assert_eq!(store.get().unwrap(), Settings::default());
    }
}
