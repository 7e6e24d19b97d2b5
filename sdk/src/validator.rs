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

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

use crate::{
    control_time::{ControlTimeSliding, ControlTimeSlidingConclusion},
    crypto_verification::CryptographicVerification,
    facts::SignatureFacts,
    settings::Settings,
    signature_acceptance::SignatureAcceptanceValidation,
    time::utc_now,
    Conclusion, Error, FactSnapshot, Policy, PoeExtraction, ProcessReport, Result,
};

/// Validation result of one signature.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SignatureReport {
    pub id: String,

    pub cryptographic_verification: ProcessReport,

    pub signature_acceptance: ProcessReport,

    /// Present if both previous processes passed and the signature has a
    /// certificate chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_time: Option<ControlTimeSlidingConclusion>,

    /// Overall verdict; the first process that did not pass determines it.
    pub conclusion: Conclusion,

    /// Earliest proof of existence of the signature at or before the final
    /// control time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_signature_poe: Option<DateTime<Utc>>,
}

/// Validation result of every signature of a snapshot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Name of the policy the signatures were validated against.
    pub policy: String,

    pub validation_time: DateTime<Utc>,

    pub signatures: Vec<SignatureReport>,
}

impl ValidationReport {
    /// `true` if every signature is `VALID`.
    pub fn is_valid(&self) -> bool {
        !self.signatures.is_empty() && self.signatures.iter().all(|s| s.conclusion.is_valid())
    }

    pub fn signature(&self, id: &str) -> Option<&SignatureReport> {
        self.signatures.iter().find(|s| s.id == id)
    }
}

/// Runs every validation process over the signatures of a snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Validator<'a> {
    policy: &'a Policy,
    settings: &'a Settings,
}

impl<'a> Validator<'a> {
    pub fn new(policy: &'a Policy, settings: &'a Settings) -> Self {
        Self { policy, settings }
    }

    /// Validates every signature of `snapshot`.
    ///
    /// Fails only for malformed input: an invalid configured validation
    /// time, a signature without id, a certificate chain naming an unknown
    /// certificate, or a valid timestamp without production time.
    pub fn validate(&self, snapshot: &FactSnapshot) -> Result<ValidationReport> {
        let validation_time = match self.settings.verify.validation_time()? {
            Some(time) => time,
            None => snapshot.validation_time().unwrap_or_else(utc_now),
        };
        info!(
            "validating {} signature(s) against policy '{}' at {validation_time}",
            snapshot.signatures().count(),
            self.policy.name
        );

        let mut poe =
            PoeExtraction::new().with_revocation_poe(self.settings.verify.record_revocation_poe);
        poe.init(snapshot, validation_time);
        poe.populate(snapshot)?;

        let signatures = snapshot
            .signatures()
            .enumerate()
            .map(|(index, signature)| {
                if signature.id().is_empty() {
                    return Err(Error::FactMissing {
                        path: format!("signatures/{index}/id"),
                    });
                }
                self.validate_signature(snapshot, &signature, &poe, validation_time)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidationReport {
            policy: self.policy.name.clone(),
            validation_time,
            signatures,
        })
    }

    fn validate_signature(
        &self,
        snapshot: &FactSnapshot,
        signature: &SignatureFacts<'_>,
        poe: &PoeExtraction,
        validation_time: DateTime<Utc>,
    ) -> Result<SignatureReport> {
        let chain = snapshot.certificate_chain(signature)?;

        let cryptographic_verification = CryptographicVerification::new(self.policy).run(signature);
        let signature_acceptance =
            SignatureAcceptanceValidation::new(self.policy).run(signature, validation_time);

        let mut conclusion = Conclusion::new();
        conclusion.merge(&cryptographic_verification.conclusion);
        conclusion.merge(&signature_acceptance.conclusion);

        let control_time = if conclusion.is_failed() || chain.is_empty() {
            None
        } else {
            let sliding = ControlTimeSliding::new(self.policy, poe)
                .strict_trust_service_status(self.settings.verify.strict_trust_service_status)
                .default_revocation_freshness(self.settings.verify.default_revocation_freshness())
                .run(&chain, validation_time);
            conclusion.merge(&sliding.conclusion);
            Some(sliding)
        };

        conclusion.set_valid();

        let final_time = control_time
            .as_ref()
            .map_or(validation_time, |c| c.control_time);
        let lowest_signature_poe = poe.lowest_signature_poe(signature.id(), final_time);

        debug!(
            "signature {}: {:?}/{:?}",
            signature.id(),
            conclusion.indication(),
            conclusion.sub_indication()
        );

        Ok(SignatureReport {
            id: signature.id().to_string(),
            cryptographic_verification,
            signature_acceptance,
            control_time,
            conclusion,
            lowest_signature_poe,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;
    use crate::{
        utils::test::{date, sample_policy, sample_snapshot, sample_snapshot_json},
        Indication, SubIndication,
    };

    #[test]
    fn sample_is_valid() {
        let report = Validator::new(&sample_policy(), &Settings::default())
            .validate(&sample_snapshot())
            .unwrap();

        assert!(report.is_valid());
        assert_eq!(report.validation_time, date(2024, 1, 10));

        let signature = report.signature("S-1").unwrap();
        let sliding = signature.control_time.as_ref().unwrap();
        assert_eq!(sliding.control_time, date(2024, 1, 10));
        assert_eq!(signature.lowest_signature_poe, Some(date(2023, 7, 1)));
    }

    #[test]
    fn settings_override_validation_time() {
        let settings = Settings::default()
            .with_value("verify.validation_time", "2023-12-31T12:00:00Z")
            .unwrap();

        let report = Validator::new(&sample_policy(), &settings)
            .validate(&sample_snapshot())
            .unwrap();

        assert_eq!(
            report.validation_time,
            "2023-12-31T12:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn first_failing_process_wins() {
        let mut facts = sample_snapshot_json();
        facts["signatures"][0]["basic_signature"]["signature_intact"] = json!(false);
        facts["signatures"][0]
            .as_object_mut()
            .unwrap()
            .remove("signing_time");
        let snapshot = FactSnapshot::from_value(facts).unwrap();

        let report = Validator::new(&sample_policy(), &Settings::default())
            .validate(&snapshot)
            .unwrap();
        let signature = report.signature("S-1").unwrap();

        assert_eq!(signature.conclusion.indication(), Some(Indication::Invalid));
        assert_eq!(
            signature.conclusion.sub_indication(),
            Some(SubIndication::SigCryptoFailure)
        );
        assert_eq!(signature.conclusion.errors().count(), 2);
        assert!(signature.control_time.is_none());
        assert!(!report.is_valid());
    }

    #[test]
    fn stale_revocation_from_settings_freshness() {
        let settings = Settings::default()
            .with_value("verify.default_revocation_freshness_secs", 86400_i64)
            .unwrap();

        let report = Validator::new(&sample_policy(), &settings)
            .validate(&sample_snapshot())
            .unwrap();
        let signature = report.signature("S-1").unwrap();

        // C-CA's revocation data slides the control time to 2023-12-30,
        // before C-LEAF's revocation data was issued.
        assert_eq!(signature.conclusion.sub_indication(), Some(SubIndication::NoPoe));
        assert_eq!(
            signature.control_time.as_ref().unwrap().control_time,
            date(2023, 12, 30)
        );
    }

    #[test]
    fn unknown_chain_certificate_is_an_error() {
        let mut facts = sample_snapshot_json();
        facts["signatures"][0]["certificate_chain"] = json!(["C-LEAF", "C-NOWHERE"]);
        let snapshot = FactSnapshot::from_value(facts).unwrap();

        assert!(matches!(
            Validator::new(&sample_policy(), &Settings::default()).validate(&snapshot),
            Err(Error::CertificateNotFound { id }) if id == "C-NOWHERE"
        ));
    }

    #[test]
    fn signature_without_id_is_an_error() {
        let mut facts = sample_snapshot_json();
        facts["signatures"][0]
            .as_object_mut()
            .unwrap()
            .remove("id");
        let snapshot = FactSnapshot::from_value(facts).unwrap();

        assert!(matches!(
            Validator::new(&sample_policy(), &Settings::default()).validate(&snapshot),
            Err(Error::FactMissing { path }) if path == "signatures/0/id"
        ));
    }
}
