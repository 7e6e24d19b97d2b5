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

//! Evaluation of a single policy check.
//!
//! A [`Constraint`] binds a policy entry to the value observed in the facts.
//! [`Constraint::check`] is pure: it returns a [`ConstraintOutcome`] which
//! the owning process applies to its [`Conclusion`] and [`ValidationTrace`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use trustval_status_tracker::{log_item, LogItem};

use crate::{
    facts::BasicSignatureFacts,
    policy::{ConstraintSpec, CryptographicSpec, Level},
    validation_codes, Conclusion, Failure,
};

/// Wildcard accepting any non-blank value.
pub const ANY_VALUE: &str = "*";

/// Status of one evaluated check in the validation trace.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Ignored,
    Information,
    Warning,
    NotOk,
}

/// One evaluated check.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConstraintNode {
    /// Message tag of the check.
    pub tag: &'static str,

    /// The question the check asks.
    pub description: &'static str,

    pub status: Status,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// Why the check failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Ordered record of the checks a process evaluated.
///
/// Checks that were not reached (after a short-circuit) or not configured do
/// not appear.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationTrace(Vec<ConstraintNode>);

impl ValidationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: ConstraintNode) {
        self.0.push(node);
    }

    pub fn nodes(&self) -> &[ConstraintNode] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the node of a check, if it was evaluated.
    pub fn node(&self, tag: &str) -> Option<&ConstraintNode> {
        self.0.iter().find(|n| n.tag == tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.node(tag).is_some()
    }

    /// Message tags in evaluation order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.0.iter().map(|n| n.tag).collect()
    }
}

/// Algorithms a signed object was produced with, and the time at which
/// they must still be reliable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AlgorithmUse {
    pub encryption_algo: Option<String>,
    pub digest_algo: Option<String>,
    pub key_length: Option<i64>,
    pub at: DateTime<Utc>,
}

impl AlgorithmUse {
    pub fn from_basic_signature(facts: &BasicSignatureFacts<'_>, at: DateTime<Utc>) -> Self {
        Self {
            encryption_algo: facts.encryption_algo().map(str::to_string),
            digest_algo: facts.digest_algo().map(str::to_string),
            key_length: facts.key_length(),
            at,
        }
    }
}

/// Value observed in the facts for one check.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Observed {
    #[default]
    Missing,
    Text(String),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    Algorithms(AlgorithmUse),
}

impl Observed {
    /// `true` for a missing value, blank text, or an empty list.
    pub fn is_blank(&self) -> bool {
        match self {
            Observed::Missing => true,
            Observed::Text(s) => s.trim().is_empty(),
            Observed::List(items) => items.iter().all(|s| s.trim().is_empty()),
            _ => false,
        }
    }

    /// Scalar rendering used for comparisons and reports.
    pub fn render(&self) -> String {
        match self {
            Observed::Missing => String::new(),
            Observed::Text(s) => s.clone(),
            Observed::Bool(b) => b.to_string(),
            Observed::Int(i) => i.to_string(),
            Observed::List(items) => items.join(", "),
            Observed::Algorithms(a) => [
                a.encryption_algo.clone().unwrap_or_default(),
                a.digest_algo.clone().unwrap_or_default(),
                a.key_length.map(|l| l.to_string()).unwrap_or_default(),
            ]
            .join("/"),
        }
    }
}

impl From<&str> for Observed {
    fn from(s: &str) -> Self {
        Observed::Text(s.to_string())
    }
}

impl From<Option<&str>> for Observed {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Observed::Missing, Observed::from)
    }
}

impl From<Option<String>> for Observed {
    fn from(s: Option<String>) -> Self {
        s.map_or(Observed::Missing, Observed::Text)
    }
}

impl From<bool> for Observed {
    fn from(b: bool) -> Self {
        Observed::Bool(b)
    }
}

impl From<Option<bool>> for Observed {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Observed::Missing, Observed::Bool)
    }
}

impl From<i64> for Observed {
    fn from(i: i64) -> Self {
        Observed::Int(i)
    }
}

impl From<Option<i64>> for Observed {
    fn from(i: Option<i64>) -> Self {
        i.map_or(Observed::Missing, Observed::Int)
    }
}

impl From<Vec<&str>> for Observed {
    fn from(items: Vec<&str>) -> Self {
        Observed::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<AlgorithmUse> for Observed {
    fn from(a: AlgorithmUse) -> Self {
        Observed::Algorithms(a)
    }
}

/// How the observed value is evaluated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expectation<'p> {
    /// Equal to the expected value; `None` or [`ANY_VALUE`] accepts any
    /// non-blank value.
    ExactMatch(Option<String>),

    /// Among the identifiers. For list values, every element must be.
    Membership(&'p [String]),

    /// Within inclusive bounds.
    NumericRange { min: Option<i64>, max: Option<i64> },

    /// Algorithms acceptable and not expired.
    Cryptographic(&'p CryptographicSpec),
}

impl Expectation<'_> {
    fn render(&self) -> Option<String> {
        match self {
            Expectation::ExactMatch(expected) => expected.clone(),
            Expectation::Membership(ids) => Some(format!("[{}]", ids.join(", "))),
            Expectation::NumericRange { min, max } => Some(format!(
                "[{}, {}]",
                bound(*min),
                bound(*max)
            )),
            Expectation::Cryptographic(_) => None,
        }
    }
}

fn bound(b: Option<i64>) -> String {
    b.map_or_else(|| ANY_VALUE.to_string(), |b| b.to_string())
}

/// One check bound to its policy entry and observed value.
#[derive(Clone, Debug)]
pub struct Constraint<'p> {
    level: Level,
    tag: &'static str,
    failure: Failure,
    expectation: Expectation<'p>,
    value: Observed,
    attributes: BTreeMap<String, String>,
}

impl<'p> Constraint<'p> {
    /// Creates a check from a policy entry.
    ///
    /// The entry's identifiers select membership evaluation, its bounds
    /// select range evaluation, otherwise its value is matched exactly.
    pub fn new(spec: &'p ConstraintSpec, tag: &'static str, failure: Failure) -> Self {
        let expectation = if !spec.identifiers.is_empty() {
            Expectation::Membership(&spec.identifiers)
        } else if spec.min.is_some() || spec.max.is_some() {
            Expectation::NumericRange {
                min: spec.min,
                max: spec.max,
            }
        } else {
            Expectation::ExactMatch(spec.value.clone())
        };

        Self {
            level: spec.level,
            tag,
            failure,
            expectation,
            value: Observed::Missing,
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a check for a configured policy entry; `None` if the policy
    /// does not define it.
    pub fn configured(
        spec: Option<&'p ConstraintSpec>,
        tag: &'static str,
        failure: Failure,
    ) -> Option<Self> {
        spec.map(|spec| Self::new(spec, tag, failure))
    }

    /// Creates a cryptographic check.
    pub fn cryptographic(spec: &'p CryptographicSpec, tag: &'static str, failure: Failure) -> Self {
        Self {
            level: spec.level,
            tag,
            failure,
            expectation: Expectation::Cryptographic(spec),
            value: Observed::Missing,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the observed value.
    #[must_use]
    pub fn value<V: Into<Observed>>(mut self, value: V) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the expected value of an exact-match check.
    ///
    /// Has no effect when the policy entry configures identifiers or bounds.
    #[must_use]
    pub fn expected<S: Into<String>>(mut self, expected: S) -> Self {
        if let Expectation::ExactMatch(_) = self.expectation {
            self.expectation = Expectation::ExactMatch(Some(expected.into()));
        }
        self
    }

    /// Attaches extra information to the trace node and to the failure
    /// item, if any.
    #[must_use]
    pub fn attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn expectation(&self) -> &Expectation<'p> {
        &self.expectation
    }

    /// Evaluates the check.
    pub fn check(&self) -> ConstraintOutcome {
        let mut node = ConstraintNode {
            tag: self.tag,
            description: validation_codes::question(self.tag).unwrap_or(self.tag),
            status: Status::Ignored,
            observed: None,
            expected: None,
            message: None,
            attributes: self.attributes.clone(),
        };

        match self.level {
            Level::Ignore => return ConstraintOutcome::passed(node),
            Level::Inform => {
                node.status = Status::Information;
                node.observed = Some(self.value.render());
                return ConstraintOutcome::passed(node);
            }
            Level::Warn | Level::Fail => (),
        }

        node.observed = Some(self.value.render());
        node.expected = self.expectation.render();

        match evaluate(&self.expectation, &self.value) {
            Ok(attributes) => {
                node.status = Status::Ok;
                node.attributes.extend(attributes);
                ConstraintOutcome::passed(node)
            }
            Err(message) => {
                debug!("{} failed at level {}: {message}", self.tag, self.level);

                let mut item = log_item!(
                    self.tag,
                    validation_codes::failure_message(self.tag).unwrap_or(self.tag),
                    "check"
                )
                .attribute("message", message.clone());
                if let Some(observed) = &node.observed {
                    item = item.attribute("observed", observed.clone());
                }
                if let Some(expected) = &node.expected {
                    item = item.attribute("expected", expected.clone());
                }
                for (key, value) in &self.attributes {
                    item = item.attribute(key.clone(), value.clone());
                }

                node.message = Some(message);

                if self.level == Level::Warn {
                    node.status = Status::Warning;
                    ConstraintOutcome {
                        passed: true,
                        node,
                        effect: Effect::Warning(item),
                    }
                } else {
                    node.status = Status::NotOk;
                    ConstraintOutcome {
                        passed: false,
                        node,
                        effect: Effect::Error(item, self.failure),
                    }
                }
            }
        }
    }
}

/// Pending effect of an evaluated check on the conclusion.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Effect {
    None,
    Warning(LogItem),
    Error(LogItem, Failure),
}

/// Result of [`Constraint::check`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstraintOutcome {
    /// `false` only if the check failed at level `FAIL`.
    pub passed: bool,

    pub node: ConstraintNode,

    effect: Effect,
}

impl ConstraintOutcome {
    fn passed(node: ConstraintNode) -> Self {
        Self {
            passed: true,
            node,
            effect: Effect::None,
        }
    }

    /// Records the outcome: the trace node is appended and the conclusion
    /// receives the warning or the failure.
    ///
    /// Returns `Err` with the failure pair if the check failed at level
    /// `FAIL`.
    pub fn apply(
        self,
        conclusion: &mut Conclusion,
        trace: &mut ValidationTrace,
    ) -> std::result::Result<(), Failure> {
        trace.push(self.node);
        match self.effect {
            Effect::None => Ok(()),
            Effect::Warning(item) => {
                conclusion.add_warning(item);
                Ok(())
            }
            Effect::Error(item, failure) => conclusion.add_error(item, failure),
        }
    }
}

type Evaluation = std::result::Result<BTreeMap<String, String>, String>;

fn evaluate(expectation: &Expectation<'_>, value: &Observed) -> Evaluation {
    if let Expectation::Cryptographic(spec) = expectation {
        return match value {
            Observed::Algorithms(used) => check_algorithms(spec, used),
            _ => Err("no algorithm information found".to_string()),
        };
    }

    let rendered = value.render();
    let passed = !value.is_blank()
        && match expectation {
            Expectation::ExactMatch(None) => true,
            Expectation::ExactMatch(Some(expected)) => {
                expected == ANY_VALUE
                    || match value {
                        Observed::List(items) => items.iter().any(|v| v == expected),
                        _ => &rendered == expected,
                    }
            }
            Expectation::Membership(ids) => {
                ids.iter().any(|id| id == ANY_VALUE)
                    || match value {
                        Observed::List(items) => items.iter().all(|v| ids.contains(v)),
                        _ => ids.contains(&rendered),
                    }
            }
            Expectation::NumericRange { min, max } => {
                let number = match value {
                    Observed::Int(i) => Some(*i),
                    Observed::Text(s) => s.trim().parse().ok(),
                    Observed::List(items) => i64::try_from(items.len()).ok(),
                    _ => None,
                };
                number.is_some_and(|n| {
                    min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
                })
            }
            Expectation::Cryptographic(_) => false,
        };

    if passed {
        return Ok(BTreeMap::new());
    }

    Err(match expectation {
        Expectation::ExactMatch(expected) => format!(
            "expected '{}', found '{rendered}'",
            expected.as_deref().unwrap_or(ANY_VALUE)
        ),
        Expectation::Membership(ids) => format!(
            "'{rendered}' is not among the acceptable values [{}]",
            ids.join(", ")
        ),
        Expectation::NumericRange { min, max } => format!(
            "{rendered} is outside the range [{}, {}]",
            bound(*min),
            bound(*max)
        ),
        Expectation::Cryptographic(_) => "no algorithm information found".to_string(),
    })
}

fn accepts(list: &[String], algorithm: Option<&str>) -> bool {
    list.is_empty()
        || algorithm.is_some_and(|a| list.iter().any(|l| l.eq_ignore_ascii_case(a)))
}

fn check_algorithms(spec: &CryptographicSpec, used: &AlgorithmUse) -> Evaluation {
    let encryption = used.encryption_algo.as_deref();
    let digest = used.digest_algo.as_deref();

    if !accepts(&spec.acceptable_encryption_algos, encryption) {
        return Err(format!(
            "encryption algorithm '{}' is not acceptable",
            encryption.unwrap_or_default()
        ));
    }

    if !accepts(&spec.acceptable_digest_algos, digest) {
        return Err(format!(
            "digest algorithm '{}' is not acceptable",
            digest.unwrap_or_default()
        ));
    }

    if let Some(encryption) = encryption {
        if let Some(min) = spec.min_key_size(encryption) {
            match used.key_length {
                Some(length) if length >= min => (),
                Some(length) => {
                    return Err(format!(
                        "key size {length} of {encryption} is below the minimum {min}"
                    ))
                }
                None => return Err(format!("key size of {encryption} is unknown")),
            }
        }
    }

    let mut attributes = BTreeMap::new();

    if let Some(digest) = digest {
        if let Some(expiration) = spec.algorithm_expiration_date(digest) {
            if expiration <= used.at {
                return Err(format!(
                    "digest algorithm {digest} expired on {}",
                    expiration.to_rfc3339()
                ));
            }
            attributes.insert(
                format!("{digest} expiration"),
                expiration.to_rfc3339(),
            );
        }
    }

    if let Some(encryption) = encryption {
        if let Some(expiration) = spec.encryption_expiration_date(encryption, used.key_length) {
            if expiration <= used.at {
                return Err(format!(
                    "encryption algorithm {encryption} expired on {}",
                    expiration.to_rfc3339()
                ));
            }
            attributes.insert(
                format!("{encryption} expiration"),
                expiration.to_rfc3339(),
            );
        }
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::{
        policy::PolicyDate, utils::test::date, validation_codes::*, Indication, ProcessReport,
    };

    fn spec(level: Level) -> ConstraintSpec {
        ConstraintSpec::new(level)
    }

    #[test]
    fn ignore_and_inform_never_touch_the_conclusion() {
        for level in [Level::Ignore, Level::Inform] {
            let spec = spec(level).value("text/plain");
            let mut report = ProcessReport::new();

            let outcome = Constraint::new(&spec, BBB_SAV_ISQPCTP, Failure::SIG_CONSTRAINTS_FAILURE)
                .value("application/pdf")
                .check();
            assert!(outcome.passed);
            report.apply(outcome).unwrap();

            assert_eq!(report.conclusion, Conclusion::new());
            assert_eq!(report.conclusion.log().logged_items().len(), 0);
        }
    }

    #[test]
    fn inform_discloses_observed_value() {
        let spec = spec(Level::Inform);
        let outcome = Constraint::new(&spec, BBB_SAV_ISQPCTP, Failure::SIG_CONSTRAINTS_FAILURE)
            .value("text/xml")
            .check();

        assert_eq!(outcome.node.status, Status::Information);
        assert_eq!(outcome.node.observed.as_deref(), Some("text/xml"));
    }

    #[test]
    fn ignore_traces_ignored() {
        let spec = spec(Level::Ignore);
        let outcome = Constraint::new(&spec, BBB_SAV_ISQPSTP, Failure::SIG_CONSTRAINTS_FAILURE)
            .check();

        assert_eq!(outcome.node.status, Status::Ignored);
        assert!(outcome.node.observed.is_none());
    }

    #[test]
    fn warn_passes_with_one_warning() {
        let spec = spec(Level::Warn).value("text/plain");
        let mut report = ProcessReport::new();

        let outcome = Constraint::new(&spec, BBB_SAV_ISQPCTP, Failure::SIG_CONSTRAINTS_FAILURE)
            .value("application/pdf")
            .check();
        assert!(outcome.passed);
        assert!(report.apply(outcome).is_ok());

        let warnings: Vec<_> = report.conclusion.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].label, BBB_SAV_ISQPCTP);
        assert_eq!(
            warnings[0].attributes.get("observed").map(String::as_str),
            Some("application/pdf")
        );
        assert_eq!(
            warnings[0].attributes.get("expected").map(String::as_str),
            Some("text/plain")
        );
        assert_eq!(report.conclusion.errors().count(), 0);
        assert_eq!(report.conclusion.indication(), None);
        assert_eq!(report.trace.nodes()[0].status, Status::Warning);
    }

    #[test]
    fn fail_short_circuits() {
        let fail = spec(Level::Fail);
        let checks = [
            (BBB_CV_IRDOF, true, Failure::SIGNED_DATA_NOT_FOUND),
            (BBB_CV_IRDOI, false, Failure::HASH_FAILURE),
            (BBB_CV_ISI, false, Failure::SIG_CRYPTO_FAILURE),
            (BBB_CV_IMRI, true, Failure::SIG_CRYPTO_FAILURE),
        ];

        let mut report = ProcessReport::new();
        let result = checks.iter().try_for_each(|(tag, observed, failure)| {
            report.check(Some(
                Constraint::new(&fail, *tag, *failure)
                    .value(*observed)
                    .expected("true"),
            ))
        });

        assert_eq!(result, Err(Failure::HASH_FAILURE));
        assert_eq!(report.trace.tags(), vec![BBB_CV_IRDOF, BBB_CV_IRDOI]);
        assert_eq!(report.conclusion.indication(), Some(Indication::Invalid));
        assert_eq!(report.conclusion.errors().count(), 1);
        assert_eq!(report.trace.nodes()[1].status, Status::NotOk);
    }

    #[test]
    fn unconfigured_check_is_skipped() {
        let mut report = ProcessReport::new();

        assert!(report
            .check(Constraint::configured(None, BBB_SAV_ISQPSTP, Failure::SIG_CONSTRAINTS_FAILURE))
            .is_ok());
        assert!(report.trace.is_empty());
    }

    #[test]
    fn exact_match() {
        let any = spec(Level::Fail).value(ANY_VALUE);
        let plain = spec(Level::Fail).value("text/plain");

        let check = |spec: &ConstraintSpec, value: Observed| {
            Constraint::new(spec, BBB_SAV_ISQPCTP, Failure::SIG_CONSTRAINTS_FAILURE)
                .value(value)
                .check()
        };

        assert!(check(&any, "anything".into()).passed);
        assert!(!check(&any, "  ".into()).passed);
        assert!(!check(&any, Observed::Missing).passed);
        assert!(check(&plain, "text/plain".into()).passed);

        let outcome = check(&plain, "text/xml".into());
        assert!(!outcome.passed);
        assert_eq!(
            outcome.node.message.as_deref(),
            Some("expected 'text/plain', found 'text/xml'")
        );
    }

    #[test]
    fn membership() {
        let roles = spec(Level::Fail).identifiers(["Manager", "Clerk"]);
        let check = |value: Observed| {
            Constraint::new(&roles, BBB_SAV_ICRM, Failure::SIG_CONSTRAINTS_FAILURE)
                .value(value)
                .check()
        };

        assert!(check(vec!["Manager"].into()).passed);
        assert!(check(vec!["Manager", "Clerk"].into()).passed);
        assert!(!check(vec!["Manager", "CEO"].into()).passed);
        assert!(!check(Observed::List(vec![])).passed);

        let outcome = check("CEO".into());
        assert_eq!(
            outcome.node.message.as_deref(),
            Some("'CEO' is not among the acceptable values [Manager, Clerk]")
        );

        let wildcard = spec(Level::Fail).identifiers([ANY_VALUE]);
        assert!(
            Constraint::new(&wildcard, BBB_SAV_ICRM, Failure::SIG_CONSTRAINTS_FAILURE)
                .value(vec!["Anyone"])
                .check()
                .passed
        );
    }

    #[test]
    fn identifiers_win_over_value() {
        let spec = spec(Level::Fail).value("a").identifiers(["b"]);
        let constraint = Constraint::new(&spec, BBB_SAV_ISQPCTP, Failure::SIG_CONSTRAINTS_FAILURE)
            .expected("a")
            .value("b");

        assert!(matches!(constraint.expectation(), Expectation::Membership(_)));
        assert!(constraint.check().passed);
    }

    #[test]
    fn numeric_range() {
        let range = spec(Level::Fail).range(Some(1), Some(2));
        let check = |value: i64| {
            Constraint::new(&range, BBB_SAV_ISTCA, Failure::SIG_CONSTRAINTS_FAILURE)
                .value(value)
                .check()
        };

        assert!(!check(0).passed);
        assert!(check(1).passed);
        assert!(check(2).passed);

        let outcome = check(3);
        assert_eq!(
            outcome.node.message.as_deref(),
            Some("3 is outside the range [1, 2]")
        );
    }

    #[test]
    fn cryptographic() {
        let spec = CryptographicSpec {
            acceptable_encryption_algos: vec!["RSA".into()],
            acceptable_digest_algos: vec!["SHA1".into(), "SHA256".into()],
            min_key_sizes: BTreeMap::from([("RSA".into(), 2048)]),
            algorithm_expiration: BTreeMap::from([("SHA1".into(), PolicyDate(date(2017, 1, 1)))]),
            ..Default::default()
        };

        let check = |enc: &str, digest: &str, len: i64, at| {
            Constraint::cryptographic(&spec, ASCCM, Failure::CRYPTO_CONSTRAINTS_FAILURE_NO_POE)
                .value(AlgorithmUse {
                    encryption_algo: Some(enc.into()),
                    digest_algo: Some(digest.into()),
                    key_length: Some(len),
                    at,
                })
                .check()
        };

        assert!(check("RSA", "SHA256", 2048, date(2024, 1, 1)).passed);
        assert!(check("rsa", "sha1", 4096, date(2016, 1, 1)).passed);

        let outcome = check("ECDSA", "SHA256", 256, date(2024, 1, 1));
        assert!(outcome.node.message.unwrap().contains("encryption algorithm 'ECDSA'"));

        let outcome = check("RSA", "SHA256", 1024, date(2024, 1, 1));
        assert!(outcome.node.message.unwrap().contains("below the minimum 2048"));

        let outcome = check("RSA", "SHA1", 2048, date(2020, 1, 1));
        assert!(!outcome.passed);
        assert!(outcome.node.message.unwrap().contains("SHA1 expired on 2017-01-01"));
    }

    #[test]
    fn cryptographic_without_facts_fails() {
        let spec = CryptographicSpec::default();
        let outcome =
            Constraint::cryptographic(&spec, ASCCM, Failure::CRYPTO_CONSTRAINTS_FAILURE_NO_POE)
                .check();

        assert!(!outcome.passed);
    }
}
