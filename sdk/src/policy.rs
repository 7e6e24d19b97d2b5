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

//! Declarative validation policy.
//!
//! A [`Policy`] groups [`ConstraintSpec`]s per validation [`Context`] (and
//! optional [`SubContext`]). A check the policy does not mention is not
//! evaluated at all; see [`Policy::constraint`].
//!
//! Policies are loaded from JSON or TOML:
//!
//! ```toml
//! name = "basic"
//!
//! [revocation_freshness]
//! value = 1
//! unit = "days"
//!
//! [cryptographic]
//! acceptable_encryption_algos = ["RSA", "ECDSA"]
//! acceptable_digest_algos = ["SHA1", "SHA256"]
//! min_key_sizes = { RSA = 2048 }
//! algorithm_expiration = { SHA1 = "2017-01-01" }
//!
//! [contexts.signature.constraints]
//! signature_intact = { level = "FAIL" }
//! claimed_roles = { level = "WARN", identifiers = ["*"] }
//! ```

use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{time::parse_date, Error, Result};

/// Severity of a constraint.
///
/// Levels are totally ordered: `Ignore < Inform < Warn < Fail`.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(try_from = "String", rename_all = "UPPERCASE")]
pub enum Level {
    /// The check is not evaluated.
    Ignore,

    /// The observed value is disclosed; the verdict is never affected.
    Inform,

    /// A failure is recorded as a warning; validation continues.
    Warn,

    /// A failure determines the verdict and stops the enclosing process.
    #[default]
    Fail,
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IGNORE" => Ok(Level::Ignore),
            "INFORM" => Ok(Level::Inform),
            "WARN" => Ok(Level::Warn),
            "FAIL" => Ok(Level::Fail),
            _ => Err(Error::UnknownLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Ignore => "IGNORE",
            Level::Inform => "INFORM",
            Level::Warn => "WARN",
            Level::Fail => "FAIL",
        };
        f.write_str(s)
    }
}

/// Policy description of one check: its severity and what is expected.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintSpec {
    pub level: Level,

    /// Expected value for exact-match checks. `"*"` accepts any value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Acceptable values for membership checks. `"*"` accepts any value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,

    /// Lower bound (inclusive) for numeric-range checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    /// Upper bound (inclusive) for numeric-range checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl ConstraintSpec {
    /// Creates a spec with the given level and no expectations.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Creates a spec from a level string as found in policy documents.
    ///
    /// Fails with [`Error::UnknownLevel`] if the level is not recognized.
    pub fn with_level(level: &str) -> Result<Self> {
        Ok(Self::new(level.parse()?))
    }

    #[must_use]
    pub fn value<S: Into<String>>(mut self, value: S) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn identifiers<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifiers = identifiers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// Names of the checks a policy can configure.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintName {
    // -- cryptographic verification --
    ReferenceDataExistence,
    ReferenceDataIntact,
    SignatureIntact,
    ManifestReferenceIntact,

    // -- signature acceptance validation --
    StructuralValidation,
    SigningTime,
    ContentType,
    ContentHints,
    ContentIdentifier,
    CommitmentTypeIndication,
    SignerLocation,
    ContentTimestamp,
    ContentTimestampImprint,
    ClaimedRoles,
    CertifiedRoles,
    SignatureTimestampCount,
}

/// Validation context a constraint applies to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    Signature,
    CounterSignature,
    Timestamp,
    Revocation,
}

/// Refinement of a context for certificate-level constraints.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubContext {
    SigningCertificate,
    CaCertificate,
}

/// A date in a policy document.
///
/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyDate(pub DateTime<Utc>);

impl TryFrom<String> for PolicyDate {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        if let Some(dt) = parse_date(&s) {
            return Ok(PolicyDate(dt));
        }

        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| PolicyDate(dt.and_utc()))
            .ok_or_else(|| Error::BadParam(format!("invalid policy date: {s}")))
    }
}

impl From<PolicyDate> for String {
    fn from(date: PolicyDate) -> Self {
        date.0.to_rfc3339()
    }
}

/// Cryptographic constraint: acceptable algorithms, minimum key sizes, and
/// algorithm expiration dates.
///
/// Empty algorithm lists accept every algorithm.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CryptographicSpec {
    #[serde(default)]
    pub level: Level,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptable_encryption_algos: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptable_digest_algos: Vec<String>,

    /// Minimum key size per encryption algorithm.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub min_key_sizes: BTreeMap<String, i64>,

    /// Expiration date per algorithm name. Encryption algorithms may also be
    /// listed with their key size (`RSA1024`), which takes precedence over
    /// the bare name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub algorithm_expiration: BTreeMap<String, PolicyDate>,
}

impl CryptographicSpec {
    /// Expiration date of an algorithm, matched case-insensitively.
    pub fn algorithm_expiration_date(&self, algorithm: &str) -> Option<DateTime<Utc>> {
        self.algorithm_expiration
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(algorithm))
            .map(|(_, date)| date.0)
    }

    /// Expiration date of an encryption algorithm used with a given key size.
    pub fn encryption_expiration_date(
        &self,
        algorithm: &str,
        key_length: Option<i64>,
    ) -> Option<DateTime<Utc>> {
        key_length
            .and_then(|len| self.algorithm_expiration_date(&format!("{algorithm}{len}")))
            .or_else(|| self.algorithm_expiration_date(algorithm))
    }

    /// Minimum key size configured for an encryption algorithm.
    pub fn min_key_size(&self, algorithm: &str) -> Option<i64> {
        self.min_key_sizes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(algorithm))
            .map(|(_, size)| *size)
    }
}

/// Unit of a [`FreshnessSpec`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    #[default]
    Days,
}

/// Maximum age of revocation data relative to the time it is relied upon.
///
/// Negative values and values beyond the range of [`TimeDelta`] are
/// rejected when the policy is loaded.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "RawFreshnessSpec")]
pub struct FreshnessSpec {
    pub value: i64,
    pub unit: TimeUnit,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFreshnessSpec {
    value: i64,

    #[serde(default)]
    unit: TimeUnit,
}

impl TryFrom<RawFreshnessSpec> for FreshnessSpec {
    type Error = Error;

    fn try_from(raw: RawFreshnessSpec) -> Result<Self> {
        let spec = FreshnessSpec {
            value: raw.value,
            unit: raw.unit,
        };
        spec.duration()?;
        Ok(spec)
    }
}

impl FreshnessSpec {
    pub fn duration(&self) -> Result<TimeDelta> {
        let duration = match self.unit {
            TimeUnit::Seconds => TimeDelta::try_seconds(self.value),
            TimeUnit::Minutes => TimeDelta::try_minutes(self.value),
            TimeUnit::Hours => TimeDelta::try_hours(self.value),
            TimeUnit::Days => TimeDelta::try_days(self.value),
        };

        duration
            .filter(|d| *d >= TimeDelta::zero())
            .ok_or_else(|| {
                Error::BadParam(format!(
                    "invalid revocation freshness: {} {:?}",
                    self.value, self.unit
                ))
            })
    }
}

/// Constraints of one [`SubContext`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubContextPolicy {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constraints: BTreeMap<ConstraintName, ConstraintSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cryptographic: Option<CryptographicSpec>,
}

/// Constraints of one [`Context`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextPolicy {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constraints: BTreeMap<ConstraintName, ConstraintSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cryptographic: Option<CryptographicSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_contexts: BTreeMap<SubContext, SubContextPolicy>,
}

/// A named, immutable validation policy.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cryptographic constraint used where a context does not define one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cryptographic: Option<CryptographicSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_freshness: Option<FreshnessSpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contexts: BTreeMap<Context, ContextPolicy>,
}

impl Policy {
    /// Creates an empty policy: no check is configured.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses a policy from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a policy from TOML.
    pub fn from_toml(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Parses a policy given its format (`json` or `toml`).
    pub fn from_string(policy: &str, format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "json" => Self::from_json(policy),
            "toml" => Self::from_toml(policy),
            _ => Err(Error::UnsupportedFormat(format.to_string())),
        }
    }

    /// Loads a policy from a `.json` or `.toml` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .ok_or_else(|| Error::UnsupportedFormat(path.as_ref().display().to_string()))?;

        let policy = std::fs::read_to_string(&path)?;
        Self::from_string(&policy, &ext)
    }

    /// Returns the constraint configured for a check, or `None` if the policy
    /// does not define it (meaning: skip the check).
    ///
    /// When a sub-context is given, only that sub-context is consulted.
    pub fn constraint(
        &self,
        name: ConstraintName,
        context: Context,
        sub_context: Option<SubContext>,
    ) -> Option<&ConstraintSpec> {
        let context = self.contexts.get(&context)?;
        match sub_context {
            Some(sub) => context.sub_contexts.get(&sub)?.constraints.get(&name),
            None => context.constraints.get(&name),
        }
    }

    /// Returns the cryptographic constraint for a context.
    ///
    /// Resolution order: sub-context, context, policy default.
    pub fn cryptographic(
        &self,
        context: Context,
        sub_context: Option<SubContext>,
    ) -> Option<&CryptographicSpec> {
        let context = self.contexts.get(&context);

        let from_sub = sub_context.and_then(|sub| {
            context
                .and_then(|c| c.sub_contexts.get(&sub))
                .and_then(|s| s.cryptographic.as_ref())
        });

        from_sub
            .or_else(|| context.and_then(|c| c.cryptographic.as_ref()))
            .or(self.cryptographic.as_ref())
    }

    /// Expiration date of an algorithm in the given context, if configured.
    pub fn algorithm_expiration(
        &self,
        context: Context,
        sub_context: Option<SubContext>,
        algorithm: &str,
    ) -> Option<DateTime<Utc>> {
        self.cryptographic(context, sub_context)?
            .algorithm_expiration_date(algorithm)
    }

    /// Maximum revocation freshness, if configured and in range.
    pub fn max_revocation_freshness(&self) -> Option<TimeDelta> {
        self.revocation_freshness.and_then(|f| f.duration().ok())
    }

    /// Adds or replaces the constraint for a check.
    pub fn set_constraint(
        &mut self,
        name: ConstraintName,
        context: Context,
        spec: ConstraintSpec,
    ) -> &mut Self {
        self.contexts
            .entry(context)
            .or_default()
            .constraints
            .insert(name, spec);
        self
    }
}
