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

//! Signature acceptance validation.
//!
//! Checks the signed attributes of a signature against the policy, then the
//! cryptographic constraints of the signature's algorithms.

use chrono::{DateTime, Utc};

use crate::{
    constraint::{AlgorithmUse, Observed},
    facts::SignatureFacts,
    policy::{ConstraintName, Context, CryptographicSpec},
    validation_codes::*,
    Constraint, Failure, Policy, ProcessReport,
};

/// Signature acceptance validation process.
#[derive(Clone, Copy, Debug)]
pub struct SignatureAcceptanceValidation<'a> {
    policy: &'a Policy,
    context: Context,
}

impl<'a> SignatureAcceptanceValidation<'a> {
    pub fn new(policy: &'a Policy) -> Self {
        Self {
            policy,
            context: Context::Signature,
        }
    }

    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Runs the checks in order, stopping at the first failure at level
    /// `FAIL`.
    ///
    /// The algorithms of the signature must be reliable at
    /// `validation_time`.
    pub fn run(
        &self,
        signature: &SignatureFacts<'_>,
        validation_time: DateTime<Utc>,
    ) -> ProcessReport {
        let mut report = ProcessReport::new();
        report.conclusion.push_scope(signature.id());

        let result = self
            .attribute_checks(&mut report, signature)
            .and_then(|_| self.cryptographic_check(&mut report, signature, validation_time));

        report.conclusion.pop_scope();
        report.finish(result)
    }

    fn attribute_checks(
        &self,
        report: &mut ProcessReport,
        signature: &SignatureFacts<'_>,
    ) -> Result<(), Failure> {
        report.check(
            self.constraint(ConstraintName::StructuralValidation, BBB_SAV_ISSV)
                .map(|c| {
                    let c = c.value(signature.structural_validity()).expected("true");
                    match signature.structural_validation_message() {
                        Some(message) => c.attribute("structural_validation_message", message),
                        None => c,
                    }
                }),
        )?;

        report.check(
            self.constraint(ConstraintName::SigningTime, BBB_SAV_ISQPSTP)
                .map(|c| c.value(signature.signing_time().map(|t| t.to_rfc3339()))),
        )?;

        report.check(
            self.constraint(ConstraintName::ContentType, BBB_SAV_ISQPCTP)
                .map(|c| c.value(signature.content_type())),
        )?;

        report.check(
            self.constraint(ConstraintName::ContentHints, BBB_SAV_ISQPCHP)
                .map(|c| c.value(signature.content_hints())),
        )?;

        report.check(
            self.constraint(ConstraintName::ContentIdentifier, BBB_SAV_ISQPCIP)
                .map(|c| c.value(signature.content_identifier())),
        )?;

        report.check(
            self.constraint(ConstraintName::CommitmentTypeIndication, BBB_SAV_ISQPXTIP)
                .map(|c| c.value(signature.commitment_type_indications())),
        )?;

        report.check(
            self.constraint(ConstraintName::SignerLocation, BBB_SAV_ISQPSLP)
                .map(|c| {
                    c.value(signature.has_signature_production_place())
                        .expected("true")
                }),
        )?;

        report.check(
            self.constraint(ConstraintName::ContentTimestamp, BBB_SAV_ISQPCTSIP)
                .map(|c| {
                    c.value(signature.content_timestamps().next().is_some())
                        .expected("true")
                }),
        )?;

        report.check(
            self.constraint(ConstraintName::ContentTimestampImprint, BBB_SAV_DMICTSTMCMI)
                .map(|c| {
                    let intact = signature.content_timestamps().all(|ts| {
                        ts.message_imprint_found().unwrap_or(false)
                            && ts.message_imprint_intact().unwrap_or(false)
                    });
                    c.value(intact).expected("true")
                }),
        )?;

        report.check(
            self.constraint(ConstraintName::ClaimedRoles, BBB_SAV_ICRM)
                .map(|c| c.value(signature.claimed_roles())),
        )?;

        report.check(
            self.constraint(ConstraintName::CertifiedRoles, BBB_SAV_ICERRM)
                .map(|c| c.value(signature.certified_roles())),
        )?;

        report.check(
            self.constraint(ConstraintName::SignatureTimestampCount, BBB_SAV_ISTCA)
                .map(|c| {
                    let count = signature.signature_timestamp_ids().len();
                    c.value(Observed::from(i64::try_from(count).unwrap_or(i64::MAX)))
                }),
        )
    }

    fn cryptographic_check(
        &self,
        report: &mut ProcessReport,
        signature: &SignatureFacts<'_>,
        validation_time: DateTime<Utc>,
    ) -> Result<(), Failure> {
        let default = CryptographicSpec::default();
        let spec = self
            .policy
            .cryptographic(self.context, None)
            .unwrap_or(&default);

        report.check(Some(
            Constraint::cryptographic(spec, ASCCM, Failure::CRYPTO_CONSTRAINTS_FAILURE_NO_POE)
                .value(AlgorithmUse::from_basic_signature(
                    &signature.basic_signature(),
                    validation_time,
                )),
        ))
    }

    fn constraint(&self, name: ConstraintName, tag: &'static str) -> Option<Constraint<'a>> {
        Constraint::configured(
            self.policy.constraint(name, self.context, None),
            tag,
            Failure::SIG_CONSTRAINTS_FAILURE,
        )
    }
}
