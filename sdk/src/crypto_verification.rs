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

//! Cryptographic verification of a signature.
//!
//! Only reads the outcome of the byte-level checks already performed by the
//! extractor (reference data found and intact, signature value intact).

use crate::{
    facts::SignatureFacts,
    policy::{ConstraintName, Context},
    validation_codes::*,
    Constraint, Failure, Policy, ProcessReport,
};

/// Cryptographic verification process.
#[derive(Clone, Copy, Debug)]
pub struct CryptographicVerification<'a> {
    policy: &'a Policy,
    context: Context,
}

impl<'a> CryptographicVerification<'a> {
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
    /// `FAIL`. The manifest reference is only checked if the signature
    /// carries one.
    pub fn run(&self, signature: &SignatureFacts<'_>) -> ProcessReport {
        let mut report = ProcessReport::new();
        report.conclusion.push_scope(signature.id());

        let result = self.checks(&mut report, signature);

        report.conclusion.pop_scope();
        report.finish(result)
    }

    fn checks(
        &self,
        report: &mut ProcessReport,
        signature: &SignatureFacts<'_>,
    ) -> Result<(), Failure> {
        let basic = signature.basic_signature();

        report.check(
            self.constraint(
                ConstraintName::ReferenceDataExistence,
                BBB_CV_IRDOF,
                Failure::SIGNED_DATA_NOT_FOUND,
            )
            .map(|c| c.value(basic.reference_data_found()).expected("true")),
        )?;

        report.check(
            self.constraint(
                ConstraintName::ReferenceDataIntact,
                BBB_CV_IRDOI,
                Failure::HASH_FAILURE,
            )
            .map(|c| c.value(basic.reference_data_intact()).expected("true")),
        )?;

        report.check(
            self.constraint(
                ConstraintName::SignatureIntact,
                BBB_CV_ISI,
                Failure::SIG_CRYPTO_FAILURE,
            )
            .map(|c| c.value(basic.signature_intact()).expected("true")),
        )?;

        if signature.has_manifest() {
            report.check(
                self.constraint(
                    ConstraintName::ManifestReferenceIntact,
                    BBB_CV_IMRI,
                    Failure::SIG_CRYPTO_FAILURE,
                )
                .map(|c| {
                    let intact = signature.manifest_reference_found().unwrap_or(false)
                        && signature.manifest_reference_intact().unwrap_or(false);
                    c.value(intact).expected("true")
                }),
            )?;
        }

        Ok(())
    }

    fn constraint(
        &self,
        name: ConstraintName,
        tag: &'static str,
        failure: Failure,
    ) -> Option<Constraint<'a>> {
        Constraint::configured(self.policy.constraint(name, self.context, None), tag, failure)
    }
}
