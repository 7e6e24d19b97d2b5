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

//! Control-time sliding.
//!
//! Walks a certificate chain from the trust anchor to the signing
//! certificate and moves the control time backward to the latest instant at
//! which every certificate and its revocation data can still be trusted.
//! The control time never increases.

use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use serde::Serialize;
use trustval_status_tracker::{log_item, LogItem};

use crate::{
    constraint::ValidationTrace,
    facts::{BasicSignatureFacts, CertificateChain, CertificateFacts},
    policy::{ConstraintSpec, Context, Level, SubContext},
    validation_codes::*,
    Conclusion, Constraint, Failure, Policy, PoeExtraction, ProcessReport,
};

/// Status of a trust service as published in a trusted list.
///
/// Parses both bare names (`undersupervision`) and ETSI URIs
/// (`http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/undersupervision`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustServiceStatus {
    UnderSupervision,
    SupervisionInCessation,
    Accredited,
    Granted,
    Withdrawn,
    SupervisionRevoked,
    AccreditationRevoked,
    RecognisedAtNationalLevel,
    DeprecatedAtNationalLevel,
}

impl TrustServiceStatus {
    /// Statuses under which the anchor is trusted without restriction.
    pub const ACCEPTABLE: [&'static str; 4] = [
        "undersupervision",
        "supervisionincessation",
        "accredited",
        "granted",
    ];

    pub fn is_acceptable(&self) -> bool {
        matches!(
            self,
            TrustServiceStatus::UnderSupervision
                | TrustServiceStatus::SupervisionInCessation
                | TrustServiceStatus::Accredited
                | TrustServiceStatus::Granted
        )
    }

    fn name(&self) -> &'static str {
        match self {
            TrustServiceStatus::UnderSupervision => "undersupervision",
            TrustServiceStatus::SupervisionInCessation => "supervisionincessation",
            TrustServiceStatus::Accredited => "accredited",
            TrustServiceStatus::Granted => "granted",
            TrustServiceStatus::Withdrawn => "withdrawn",
            TrustServiceStatus::SupervisionRevoked => "supervisionrevoked",
            TrustServiceStatus::AccreditationRevoked => "accreditationrevoked",
            TrustServiceStatus::RecognisedAtNationalLevel => "recognisedatnationallevel",
            TrustServiceStatus::DeprecatedAtNationalLevel => "deprecatedatnationallevel",
        }
    }
}

impl FromStr for TrustServiceStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let name = s.trim().trim_end_matches('/');
        let name = name.rsplit('/').next().unwrap_or(name).to_ascii_lowercase();

        Ok(match name.as_str() {
            "undersupervision" => TrustServiceStatus::UnderSupervision,
            "supervisionincessation" => TrustServiceStatus::SupervisionInCessation,
            "accredited" => TrustServiceStatus::Accredited,
            "granted" => TrustServiceStatus::Granted,
            "withdrawn" => TrustServiceStatus::Withdrawn,
            "supervisionrevoked" => TrustServiceStatus::SupervisionRevoked,
            "accreditationrevoked" => TrustServiceStatus::AccreditationRevoked,
            "recognisedatnationallevel" => TrustServiceStatus::RecognisedAtNationalLevel,
            "deprecatedatnationallevel" => TrustServiceStatus::DeprecatedAtNationalLevel,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for TrustServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a control-time sliding run.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ControlTimeSlidingConclusion {
    pub conclusion: Conclusion,

    /// Final control time.
    pub control_time: DateTime<Utc>,

    pub trace: ValidationTrace,

    /// Every control-time value, starting with the initial one.
    pub history: Vec<DateTime<Utc>>,
}

/// Control-time sliding over one certificate chain.
#[derive(Clone, Debug)]
pub struct ControlTimeSliding<'a> {
    policy: &'a Policy,
    poe: &'a PoeExtraction,
    context: Context,
    strict_trust_service_status: bool,
    default_revocation_freshness: Option<TimeDelta>,
}

impl<'a> ControlTimeSliding<'a> {
    pub fn new(policy: &'a Policy, poe: &'a PoeExtraction) -> Self {
        Self {
            policy,
            poe,
            context: Context::Signature,
            strict_trust_service_status: false,
            default_revocation_freshness: None,
        }
    }

    /// Policy context of the chain's certificates. Defaults to
    /// [`Context::Signature`].
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Treat an unknown trust-service status as `INDETERMINATE/NO_POE`
    /// instead of a warning.
    #[must_use]
    pub fn strict_trust_service_status(mut self, strict: bool) -> Self {
        self.strict_trust_service_status = strict;
        self
    }

    /// Revocation freshness used when the policy does not define one.
    #[must_use]
    pub fn default_revocation_freshness(mut self, freshness: Option<TimeDelta>) -> Self {
        self.default_revocation_freshness = freshness;
        self
    }

    /// Slides the control time over `chain`, starting at `current_time`.
    pub fn run(
        &self,
        chain: &CertificateChain<'_>,
        current_time: DateTime<Utc>,
    ) -> ControlTimeSlidingConclusion {
        let mut state = SlidingState {
            report: ProcessReport::new(),
            control_time: current_time,
            history: vec![current_time],
        };

        let result = chain.0.iter().enumerate().rev().try_for_each(|(index, certificate)| {
            let sub_context = if index == 0 {
                SubContext::SigningCertificate
            } else {
                SubContext::CaCertificate
            };

            state.report.conclusion.push_scope(certificate.id());
            let result = self.slide_certificate(&mut state, certificate, sub_context);
            state.report.conclusion.pop_scope();
            result
        });

        let report = state.report.finish(result);
        debug!(
            "control time sliding finished at {} ({:?})",
            state.control_time,
            report.conclusion.indication()
        );

        ControlTimeSlidingConclusion {
            conclusion: report.conclusion,
            control_time: state.control_time,
            trace: report.trace,
            history: state.history,
        }
    }

    fn slide_certificate(
        &self,
        state: &mut SlidingState,
        certificate: &CertificateFacts<'_>,
        sub_context: SubContext,
    ) -> Result<(), Failure> {
        // only an anchor that signed the object itself is checked
        if certificate.is_trusted() {
            return match sub_context {
                SubContext::SigningCertificate => self.check_trust_anchor(state, certificate),
                SubContext::CaCertificate => Ok(()),
            };
        }

        let revocation = certificate.revocation();
        state.require(CTS_DRIE, revocation.is_some())?;
        let Some(revocation) = revocation else {
            return Err(Failure::NO_POE);
        };

        let issuing_time = revocation.issuing_time();
        let within_validity = match (
            issuing_time,
            certificate.not_before(),
            certificate.not_after(),
        ) {
            (Some(issued), Some(not_before), Some(not_after)) => {
                not_before <= issued && issued <= not_after
            }
            _ => false,
        };
        state.require(CTS_IIDOCWVPOC, within_validity)?;

        let control_time = state.control_time;
        state.require(
            CTS_IRIBCT,
            issuing_time.is_some_and(|issued| issued < control_time),
        )?;

        state.require(
            CTS_DSOPCPOEOC,
            self.poe.has_certificate_poe(certificate.id(), control_time)
                && issuing_time.is_some_and(|issued| issued <= control_time),
        )?;

        if revocation.is_revoked() {
            let revoked_at = revocation.revocation_date().or(issuing_time);
            if let Some(revoked_at) = revoked_at {
                state.slide_revoked(revoked_at, certificate.id(), revocation.reason());
            }
        } else if let (Some(issued), Some(max_age)) = (issuing_time, self.max_freshness()) {
            if state.control_time - issued > max_age {
                state.slide(issued, certificate.id(), "revocation data not fresh");
            }
        }

        self.clamp_to_algorithm_expiration(
            state,
            certificate.id(),
            &certificate.basic_signature(),
            self.context,
            Some(sub_context),
        );
        self.clamp_to_algorithm_expiration(
            state,
            certificate.id(),
            &revocation.basic_signature(),
            Context::Revocation,
            None,
        );

        Ok(())
    }

    fn check_trust_anchor(
        &self,
        state: &mut SlidingState,
        certificate: &CertificateFacts<'_>,
    ) -> Result<(), Failure> {
        let raw = certificate.trust_service_status().unwrap_or_default();
        let status = raw.parse::<TrustServiceStatus>().ok();

        let level = match status {
            Some(status) if !status.is_acceptable() => Level::Inform,
            Some(_) => Level::Fail,
            None if self.strict_trust_service_status => Level::Fail,
            None => {
                warn!(
                    "trust anchor {} has unknown trust service status '{raw}'",
                    certificate.id()
                );
                Level::Warn
            }
        };

        let spec = ConstraintSpec::new(level).identifiers(TrustServiceStatus::ACCEPTABLE);
        let observed = status.map_or_else(|| raw.to_string(), |s| s.to_string());
        state.report.apply(
            Constraint::new(&spec, CTS_ITACS, Failure::NO_POE)
                .value(observed.as_str())
                .check(),
        )?;

        if let (Some(status), Some(end_date)) = (status, certificate.trust_service_end_date()) {
            if !status.is_acceptable() {
                state.slide(end_date, certificate.id(), "trust service status ended");
            }
        }
        Ok(())
    }

    fn clamp_to_algorithm_expiration(
        &self,
        state: &mut SlidingState,
        certificate_id: &str,
        facts: &BasicSignatureFacts<'_>,
        context: Context,
        sub_context: Option<SubContext>,
    ) {
        let Some(crypto) = self.policy.cryptographic(context, sub_context) else {
            return;
        };

        if let Some(expiration) = facts
            .digest_algo()
            .and_then(|algo| crypto.algorithm_expiration_date(algo))
        {
            state.slide(expiration, certificate_id, "digest algorithm expired");
        }

        if let Some(expiration) = facts
            .encryption_algo()
            .and_then(|algo| crypto.encryption_expiration_date(algo, facts.key_length()))
        {
            state.slide(expiration, certificate_id, "encryption algorithm expired");
        }
    }

    fn max_freshness(&self) -> Option<TimeDelta> {
        self.policy
            .max_revocation_freshness()
            .or(self.default_revocation_freshness)
    }
}

struct SlidingState {
    report: ProcessReport,
    control_time: DateTime<Utc>,
    history: Vec<DateTime<Utc>>,
}

impl SlidingState {
    /// Evaluates a mandatory step; failure is `INDETERMINATE/NO_POE`.
    fn require(&mut self, tag: &'static str, passed: bool) -> Result<(), Failure> {
        let spec = ConstraintSpec::new(Level::Fail);
        self.report.apply(
            Constraint::new(&spec, tag, Failure::NO_POE)
                .value(passed)
                .expected("true")
                .check(),
        )
    }

    /// Moves the control time to `candidate` if that is earlier.
    fn slide(&mut self, candidate: DateTime<Utc>, certificate_id: &str, reason: &'static str) {
        if let Some(item) = self.slide_item(candidate, certificate_id, reason) {
            self.report.conclusion.add_info(item);
        }
    }

    /// Slides to the revocation date of a revoked certificate.
    fn slide_revoked(
        &mut self,
        candidate: DateTime<Utc>,
        certificate_id: &str,
        revocation_reason: Option<&str>,
    ) {
        if let Some(mut item) = self.slide_item(candidate, certificate_id, "certificate revoked") {
            if let Some(revocation_reason) = revocation_reason {
                item = item.attribute("revocation_reason", revocation_reason);
            }
            self.report.conclusion.add_info(item);
        }
    }

    fn slide_item(
        &mut self,
        candidate: DateTime<Utc>,
        certificate_id: &str,
        reason: &'static str,
    ) -> Option<LogItem> {
        if candidate >= self.control_time {
            return None;
        }

        debug!(
            "control time slides from {} to {candidate} ({certificate_id}: {reason})",
            self.control_time
        );
        self.control_time = candidate;
        self.history.push(candidate);

        Some(
            log_item!(CTS_SCT, reason, "slide")
                .attribute("certificate", certificate_id)
                .attribute("control_time", candidate.to_rfc3339()),
        )
    }
}
