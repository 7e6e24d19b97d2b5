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

use std::{fmt, str::FromStr};

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use trustval_status_tracker::{ErrorBehavior, LogItem, LogKind, StatusTracker};

use crate::{
    constraint::{ConstraintOutcome, ValidationTrace},
    Constraint, Error, Result,
};

/// Terminal verdict of a validation process.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Indication {
    Valid,
    Invalid,
    Indeterminate,
}

impl Indication {
    /// `true` for `INVALID` and `INDETERMINATE`.
    pub fn is_terminal_failure(&self) -> bool {
        !matches!(self, Indication::Valid)
    }
}

impl FromStr for Indication {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VALID" | "PASSED" | "TOTAL_PASSED" => Ok(Indication::Valid),
            "INVALID" | "FAILED" | "TOTAL_FAILED" => Ok(Indication::Invalid),
            "INDETERMINATE" => Ok(Indication::Indeterminate),
            _ => Err(Error::UnknownIndication(s.to_string())),
        }
    }
}

impl fmt::Display for Indication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Indication::Valid => "VALID",
            Indication::Invalid => "INVALID",
            Indication::Indeterminate => "INDETERMINATE",
        })
    }
}

/// Reason accompanying an `INVALID` or `INDETERMINATE` indication.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubIndication {
    // -- INVALID --
    HashFailure,
    SigCryptoFailure,
    SigConstraintsFailure,

    // -- INDETERMINATE --
    SignedDataNotFound,
    NoPoe,
    CryptoConstraintsFailureNoPoe,
}

impl FromStr for SubIndication {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HASH_FAILURE" => Ok(SubIndication::HashFailure),
            "SIG_CRYPTO_FAILURE" => Ok(SubIndication::SigCryptoFailure),
            "SIG_CONSTRAINTS_FAILURE" => Ok(SubIndication::SigConstraintsFailure),
            "SIGNED_DATA_NOT_FOUND" => Ok(SubIndication::SignedDataNotFound),
            "NO_POE" => Ok(SubIndication::NoPoe),
            "CRYPTO_CONSTRAINTS_FAILURE_NO_POE" => Ok(SubIndication::CryptoConstraintsFailureNoPoe),
            _ => Err(Error::UnknownIndication(s.to_string())),
        }
    }
}

impl fmt::Display for SubIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubIndication::HashFailure => "HASH_FAILURE",
            SubIndication::SigCryptoFailure => "SIG_CRYPTO_FAILURE",
            SubIndication::SigConstraintsFailure => "SIG_CONSTRAINTS_FAILURE",
            SubIndication::SignedDataNotFound => "SIGNED_DATA_NOT_FOUND",
            SubIndication::NoPoe => "NO_POE",
            SubIndication::CryptoConstraintsFailureNoPoe => "CRYPTO_CONSTRAINTS_FAILURE_NO_POE",
        })
    }
}

/// Indication / sub-indication pair a constraint reports when it fails at
/// level `FAIL`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Failure {
    pub indication: Indication,
    pub sub_indication: SubIndication,
}

impl Failure {
    pub const HASH_FAILURE: Failure = Failure::invalid(SubIndication::HashFailure);
    pub const SIG_CRYPTO_FAILURE: Failure = Failure::invalid(SubIndication::SigCryptoFailure);
    pub const SIG_CONSTRAINTS_FAILURE: Failure =
        Failure::invalid(SubIndication::SigConstraintsFailure);
    pub const SIGNED_DATA_NOT_FOUND: Failure =
        Failure::indeterminate(SubIndication::SignedDataNotFound);
    pub const NO_POE: Failure = Failure::indeterminate(SubIndication::NoPoe);
    pub const CRYPTO_CONSTRAINTS_FAILURE_NO_POE: Failure =
        Failure::indeterminate(SubIndication::CryptoConstraintsFailureNoPoe);

    pub const fn new(indication: Indication, sub_indication: SubIndication) -> Self {
        Self {
            indication,
            sub_indication,
        }
    }

    pub const fn invalid(sub_indication: SubIndication) -> Self {
        Self::new(Indication::Invalid, sub_indication)
    }

    pub const fn indeterminate(sub_indication: SubIndication) -> Self {
        Self::new(Indication::Indeterminate, sub_indication)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.indication, self.sub_indication)
    }
}

/// Accumulates the verdict and the ordered diagnostics of one validation
/// run.
///
/// Once the indication is `INVALID` or `INDETERMINATE` it is only replaced
/// through [`Conclusion::supersede`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conclusion {
    indication: Option<Indication>,
    sub_indication: Option<SubIndication>,
    log: StatusTracker,
}

impl Default for Conclusion {
    fn default() -> Self {
        Self {
            indication: None,
            sub_indication: None,
            log: StatusTracker::with_error_behavior(ErrorBehavior::StopOnFirstError),
        }
    }
}

impl Conclusion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indication, or `None` while the run is still in progress.
    pub fn indication(&self) -> Option<Indication> {
        self.indication
    }

    pub fn sub_indication(&self) -> Option<SubIndication> {
        self.sub_indication
    }

    /// `true` if the indication is `VALID`.
    pub fn is_valid(&self) -> bool {
        self.indication == Some(Indication::Valid)
    }

    /// `true` if the indication is `INVALID` or `INDETERMINATE`.
    pub fn is_failed(&self) -> bool {
        self.indication
            .is_some_and(|indication| indication.is_terminal_failure())
    }

    /// Returns the failure pair, if the run failed.
    pub fn failure(&self) -> Option<Failure> {
        match (self.indication, self.sub_indication) {
            (Some(indication), Some(sub_indication)) if indication.is_terminal_failure() => {
                Some(Failure::new(indication, sub_indication))
            }
            _ => None,
        }
    }

    /// Marks the run as `VALID` unless it already failed.
    pub fn set_valid(&mut self) {
        if !self.is_failed() {
            self.indication = Some(Indication::Valid);
            self.sub_indication = None;
        }
    }

    /// Records a failure pair unless the run already failed.
    ///
    /// Returns `true` if the pair was recorded.
    pub fn fail(&mut self, failure: Failure) -> bool {
        if self.is_failed() {
            return false;
        }
        self.indication = Some(failure.indication);
        self.sub_indication = Some(failure.sub_indication);
        true
    }

    /// Replaces the indication unconditionally.
    pub fn supersede(&mut self, failure: Failure) {
        self.indication = Some(failure.indication);
        self.sub_indication = Some(failure.sub_indication);
    }

    /// Appends an informational item.
    pub fn add_info(&mut self, item: LogItem) {
        item.informational(&mut self.log);
    }

    /// Appends a warning.
    pub fn add_warning(&mut self, item: LogItem) {
        item.warning(&mut self.log);
    }

    /// Records `failure` and appends an error.
    ///
    /// Always returns `Err(failure)` so that callers can stop with `?`.
    pub fn add_error(&mut self, item: LogItem, failure: Failure) -> std::result::Result<(), Failure> {
        self.fail(failure);
        item.failure(&mut self.log, failure)
    }

    pub fn errors(&self) -> impl Iterator<Item = &LogItem> {
        self.log.filter_kind(LogKind::Failure)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LogItem> {
        self.log.filter_kind(LogKind::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &LogItem> {
        self.log.filter_kind(LogKind::Informational)
    }

    /// All diagnostics in recording order.
    pub fn log(&self) -> &StatusTracker {
        &self.log
    }

    /// Scopes subsequent diagnostics to a validation object.
    pub fn push_scope<S: Into<String>>(&mut self, scope: S) {
        self.log.push_scope(scope);
    }

    pub fn pop_scope(&mut self) -> Option<String> {
        self.log.pop_scope()
    }

    /// Folds the result of a sub-process into this conclusion.
    ///
    /// Diagnostics are appended; the sub-process verdict is adopted only if
    /// this run has not failed yet and the sub-process did.
    pub fn merge(&mut self, other: &Conclusion) {
        self.log.append(&other.log);
        if let Some(failure) = other.failure() {
            self.fail(failure);
        }
    }
}

impl Serialize for Conclusion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Conclusion", 5)?;
        state.serialize_field("indication", &self.indication)?;
        state.serialize_field("sub_indication", &self.sub_indication)?;
        state.serialize_field("errors", &self.errors().collect::<Vec<_>>())?;
        state.serialize_field("warnings", &self.warnings().collect::<Vec<_>>())?;
        state.serialize_field("infos", &self.infos().collect::<Vec<_>>())?;
        state.end()
    }
}

/// Conclusion and validation trace of one validation process.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ProcessReport {
    pub conclusion: Conclusion,
    pub trace: ValidationTrace,
}

impl ProcessReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a constraint outcome.
    ///
    /// Returns `Err` with the failure pair if the constraint failed at level
    /// `FAIL`; the enclosing process must stop.
    pub fn apply(&mut self, outcome: ConstraintOutcome) -> std::result::Result<(), Failure> {
        outcome.apply(&mut self.conclusion, &mut self.trace)
    }

    /// Evaluates a configured constraint. `None` (not configured) is skipped
    /// without leaving a trace.
    pub fn check(&mut self, constraint: Option<Constraint<'_>>) -> std::result::Result<(), Failure> {
        match constraint {
            Some(constraint) => self.apply(constraint.check()),
            None => Ok(()),
        }
    }

    /// Completes the process: `VALID` if every constraint passed.
    pub fn finish(mut self, result: std::result::Result<(), Failure>) -> Self {
        if result.is_ok() {
            self.conclusion.set_valid();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use trustval_status_tracker::log_item;

    use super::*;

    #[test]
    fn indication_strings() {
        assert_eq!("valid".parse::<Indication>().unwrap(), Indication::Valid);
        assert_eq!(
            "INDETERMINATE".parse::<Indication>().unwrap(),
            Indication::Indeterminate
        );
        assert!("MAYBE".parse::<Indication>().is_err());

        assert_eq!(
            "NO_POE".parse::<SubIndication>().unwrap(),
            SubIndication::NoPoe
        );
        assert_eq!(SubIndication::CryptoConstraintsFailureNoPoe.to_string(), "CRYPTO_CONSTRAINTS_FAILURE_NO_POE");
        assert!("NOPE".parse::<SubIndication>().is_err());
    }

    #[test]
    fn first_failure_wins() {
        let mut conclusion = Conclusion::new();

        assert!(conclusion.fail(Failure::HASH_FAILURE));
        assert!(!conclusion.fail(Failure::NO_POE));
        conclusion.set_valid();

        assert_eq!(conclusion.failure(), Some(Failure::HASH_FAILURE));
        assert!(!conclusion.is_valid());
    }

    #[test]
    fn supersede_replaces() {
        let mut conclusion = Conclusion::new();
        conclusion.fail(Failure::SIG_CONSTRAINTS_FAILURE);
        conclusion.supersede(Failure::CRYPTO_CONSTRAINTS_FAILURE_NO_POE);

        assert_eq!(
            conclusion.sub_indication(),
            Some(SubIndication::CryptoConstraintsFailureNoPoe)
        );
    }

    #[test]
    fn add_error_stops_and_records() {
        let mut conclusion = Conclusion::new();
        conclusion.add_warning(log_item!("W", "warning", "test"));

        let err = conclusion
            .add_error(log_item!("E", "error", "test"), Failure::SIG_CRYPTO_FAILURE)
            .unwrap_err();

        assert_eq!(err, Failure::SIG_CRYPTO_FAILURE);
        assert_eq!(conclusion.errors().count(), 1);
        assert_eq!(conclusion.warnings().count(), 1);
        assert_eq!(conclusion.infos().count(), 0);
        assert_eq!(conclusion.indication(), Some(Indication::Invalid));
    }

    #[test]
    fn merge_keeps_own_failure() {
        let mut outer = Conclusion::new();
        outer.fail(Failure::HASH_FAILURE);

        let mut inner = Conclusion::new();
        let _ = inner.add_error(log_item!("E", "error", "test"), Failure::NO_POE);

        outer.merge(&inner);

        assert_eq!(outer.failure(), Some(Failure::HASH_FAILURE));
        assert_eq!(outer.errors().count(), 1);
    }

    #[test]
    fn serializes_lists() {
        let mut conclusion = Conclusion::new();
        conclusion.add_info(log_item!("I", "info", "test"));
        conclusion.set_valid();

        let json = serde_json::to_value(&conclusion).unwrap();

        assert_eq!(json["indication"], "VALID");
        assert!(json["sub_indication"].is_null());
        assert_eq!(json["infos"][0]["tag"], "I");
        assert_eq!(json["errors"].as_array().unwrap().len(), 0);
    }
}
