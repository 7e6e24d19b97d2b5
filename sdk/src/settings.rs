// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Run configuration.
//!
//! [`Settings`] are plain values owned by the caller. Partial JSON or TOML
//! documents are layered on top of the current values, so only the keys
//! that change need to be given:
//!
//! ```toml
//! [verify]
//! validation_time = "2024-01-10T00:00:00Z"
//! record_revocation_poe = true
//! ```

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use config::{Config, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{time::parse_date, Error, Result};

const VERSION: u32 = 1;

// trait used to validate user input to make sure user supplied configurations are valid
pub(crate) trait SettingsValidate {
    // returns error if settings are invalid
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Settings for configuring validation runs.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Verify {
    /// Time at which signatures are validated (RFC 3339).
    ///
    /// When unset, the snapshot's `validation_time` is used, and failing that
    /// the current time.
    pub validation_time: Option<String>,

    /// Whether timestamps also provide proof of existence for the revocation
    /// data they cover.
    ///
    /// The default value is false.
    pub record_revocation_poe: bool,

    /// Whether a trust anchor with an unknown trust-service status makes
    /// control-time sliding fail instead of producing a warning.
    ///
    /// The default value is false.
    pub strict_trust_service_status: bool,

    /// Maximum age of revocation data, in seconds, used when the policy does
    /// not define a revocation freshness.
    ///
    /// When unset, revocation data is always considered fresh.
    pub default_revocation_freshness_secs: Option<i64>,
}

#[allow(clippy::derivable_impls)]
impl Default for Verify {
    fn default() -> Self {
        Self {
            validation_time: None,
            record_revocation_poe: false,
            strict_trust_service_status: false,
            default_revocation_freshness_secs: None,
        }
    }
}

impl Verify {
    /// Configured validation time, if any.
    pub fn validation_time(&self) -> Result<Option<DateTime<Utc>>> {
        self.validation_time
            .as_deref()
            .map(|s| {
                parse_date(s).ok_or_else(|| Error::BadParam(format!("invalid validation time: {s}")))
            })
            .transpose()
    }

    /// Configured default revocation freshness, if any and in range.
    pub fn default_revocation_freshness(&self) -> Option<TimeDelta> {
        self.default_revocation_freshness_secs
            .and_then(TimeDelta::try_seconds)
    }
}

impl SettingsValidate for Verify {
    fn validate(&self) -> Result<()> {
        self.validation_time()?;

        if let Some(secs) = self.default_revocation_freshness_secs {
            if secs < 0 {
                return Err(Error::BadParam(
                    "default_revocation_freshness_secs must not be negative".into(),
                ));
            }
            if TimeDelta::try_seconds(secs).is_none() {
                return Err(Error::BadParam(format!(
                    "default_revocation_freshness_secs out of range: {secs}"
                )));
            }
        }
        Ok(())
    }
}

/// Settings for configuring all aspects of trustval.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Version of the configuration.
    pub version: u32,

    /// Settings for configuring validation runs.
    pub verify: Verify,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: VERSION,
            verify: Default::default(),
        }
    }
}

impl SettingsValidate for Settings {
    fn validate(&self) -> Result<()> {
        if self.version > VERSION {
            return Err(Error::VersionCompatibility(
                "settings version too new".into(),
            ));
        }
        self.verify.validate()
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load [Settings] from a `.json` or `.toml` file, on top of the
    /// defaults.
    pub fn from_file<P: AsRef<Path>>(settings_path: P) -> Result<Self> {
        let ext = settings_path
            .as_ref()
            .extension()
            .ok_or_else(|| {
                Error::BadParam("settings file must have json or toml extension".into())
            })?
            .to_string_lossy()
            .into_owned();

        let setting_buf = std::fs::read(&settings_path)?;
        Settings::from_string(&String::from_utf8_lossy(&setting_buf), &ext)
    }

    /// Load [Settings] from string representation of the configuration, on
    /// top of the defaults. Format of configuration must be supplied (json or
    /// toml).
    pub fn from_string(settings_str: &str, format: &str) -> Result<Self> {
        let mut settings = Settings::default();
        settings.update_from_str(settings_str, format)?;
        Ok(settings)
    }

    /// Overlays a partial configuration on these settings.
    ///
    /// The settings are left unchanged if the result is not valid.
    pub fn update_from_str(&mut self, settings_str: &str, format: &str) -> Result<()> {
        let file_format = file_format(format)?;

        // Convert current settings to Config
        let current_config = Config::try_from(&*self)
            .map_err(|e| Error::BadParam(format!("could not convert settings: {e}")))?;

        // Build new config with the source
        let merged_config = Config::builder()
            .add_source(current_config)
            .add_source(config::File::from_str(settings_str, file_format))
            .build()
            .map_err(|e| Error::BadParam(format!("could not merge configuration: {e}")))?;

        // Deserialize and validate
        let updated_settings = merged_config
            .try_deserialize::<Settings>()
            .map_err(|e| Error::BadParam(e.to_string()))?;

        updated_settings.validate()?;

        *self = updated_settings;
        Ok(())
    }

    /// Sets a value at the specified path using the builder pattern.
    ///
    /// The path uses dot notation, for example `verify.record_revocation_poe`.
    pub fn with_value<T: Into<config::Value>>(self, path: &str, value: T) -> Result<Self> {
        let config = Config::try_from(&self)?;

        let updated_config = Config::builder()
            .add_source(config)
            .set_override(path, value)
            .map_err(|e| Error::BadParam(format!("Invalid path '{path}': {e}")))?
            .build()?;

        let updated_settings = updated_config
            .try_deserialize::<Settings>()
            .map_err(|e| Error::BadParam(format!("Invalid value for '{path}': {e}")))?;

        updated_settings.validate()?;

        Ok(updated_settings)
    }

    /// Gets a value at the specified path.
    pub fn get_value<'de, T: Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let config = Config::try_from(self)?;

        config
            .get::<T>(path)
            .map_err(|e| Error::BadParam(format!("Failed to get value at '{path}': {e}")))
    }

    /// Serializes the settings into a pretty (formatted) toml string.
    pub fn to_pretty_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn file_format(format: &str) -> Result<FileFormat> {
    match format.to_lowercase().as_str() {
        "json" => Ok(FileFormat::Json),
        "toml" => Ok(FileFormat::Toml),
        _ => Err(Error::UnsupportedFormat(format.to_string())),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::utils::test::date;

    #[test]
    fn defaults() {
        let settings = Settings::default();

        assert_eq!(settings.version, VERSION);
        assert!(!settings.verify.record_revocation_poe);
        assert!(!settings.verify.strict_trust_service_status);
        assert_eq!(settings.verify.validation_time().unwrap(), None);
        assert_eq!(settings.verify.default_revocation_freshness(), None);
    }

    #[test]
    fn partial_toml() {
        let settings = Settings::from_string(
            r#"
                [verify]
                record_revocation_poe = true
                validation_time = "2024-01-10T00:00:00Z"
            "#,
            "toml",
        )
        .unwrap();

        assert!(settings.verify.record_revocation_poe);
        assert!(!settings.verify.strict_trust_service_status);
        assert_eq!(
            settings.verify.validation_time().unwrap(),
            Some(date(2024, 1, 10))
        );
    }

    #[test]
    fn update_from_json_keeps_other_values() {
        let mut settings = Settings::default();
        settings
            .update_from_str(r#"{ "verify": { "strict_trust_service_status": true } }"#, "json")
            .unwrap();
        settings
            .update_from_str(
                r#"{ "verify": { "default_revocation_freshness_secs": 86400 } }"#,
                "json",
            )
            .unwrap();

        assert!(settings.verify.strict_trust_service_status);
        assert_eq!(
            settings.verify.default_revocation_freshness(),
            Some(TimeDelta::days(1))
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut settings = Settings::default();

        assert!(settings
            .update_from_str(r#"{ "verify": { "validation_time": "soon" } }"#, "json")
            .is_err());
        assert!(settings
            .update_from_str(r#"{ "version": 99 }"#, "json")
            .is_err());
        assert!(matches!(
            settings.update_from_str("", "yaml"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn out_of_range_freshness_is_rejected() {
        assert!(matches!(
            Settings::default().with_value("verify.default_revocation_freshness_secs", i64::MAX),
            Err(Error::BadParam(_))
        ));
        assert!(matches!(
            Settings::default().with_value("verify.default_revocation_freshness_secs", -5_i64),
            Err(Error::BadParam(_))
        ));

        // values set directly bypass validation but never panic
        let mut settings = Settings::default();
        settings.verify.default_revocation_freshness_secs = Some(i64::MAX);
        assert!(settings.validate().is_err());
        assert_eq!(settings.verify.default_revocation_freshness(), None);
    }

    #[test]
    fn with_and_get_value() {
        let settings = Settings::default()
            .with_value("verify.record_revocation_poe", true)
            .unwrap();

        assert!(settings
            .get_value::<bool>("verify.record_revocation_poe")
            .unwrap());
        assert!(settings.get_value::<bool>("verify.nothing").is_err());
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[verify]\nstrict_trust_service_status = true\n").unwrap();

        assert!(
            Settings::from_file(&path)
                .unwrap()
                .verify
                .strict_trust_service_status
        );
    }

    #[test]
    fn toml_round_trip() {
        let settings = Settings::default()
            .with_value("verify.validation_time", "2024-01-10T00:00:00Z")
            .unwrap();
        let toml = settings.to_pretty_toml().unwrap();

        assert_eq!(Settings::from_string(&toml, "toml").unwrap(), settings);
    }
}
