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

//! Proof-of-existence registry.
//!
//! A proof of existence (POE) states that an object existed at a given
//! time. POEs come from the validation time itself ([`PoeExtraction::init`])
//! and from the objects covered by valid timestamps
//! ([`PoeExtraction::add_poe`]).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;

use crate::{
    facts::{SignedObjectCategory, SignedObjectFacts, TimestampFacts},
    Error, FactSnapshot, Indication, Result,
};

type PoeDates = BTreeMap<String, BTreeSet<DateTime<Utc>>>;

/// Append-only registry of POE dates per signature, certificate, and
/// (optionally) revocation data.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PoeExtraction {
    signatures: PoeDates,
    certificates: PoeDates,
    revocations: PoeDates,

    #[serde(skip)]
    record_revocations: bool,
}

impl PoeExtraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record POEs for revocation data covered by timestamps.
    #[must_use]
    pub fn with_revocation_poe(mut self, record: bool) -> Self {
        self.record_revocations = record;
        self
    }

    /// Every signature and certificate of the snapshot exists at
    /// `current_time`.
    pub fn init(&mut self, snapshot: &FactSnapshot, current_time: DateTime<Utc>) {
        for signature in snapshot.signatures() {
            self.add_signature_poe(signature.id(), current_time);
        }

        for certificate in snapshot.certificates() {
            self.add_certificate_poe(certificate.id(), current_time);

            if self.record_revocations {
                if let Some(id) = certificate.revocation().and_then(|r| r.id()) {
                    self.add_revocation_poe(id, current_time);
                }
            }
        }
    }

    /// Adds the POEs of every timestamp whose own validation was `VALID`.
    pub fn populate(&mut self, snapshot: &FactSnapshot) -> Result<()> {
        for timestamp in snapshot.timestamps() {
            let valid = timestamp
                .indication()
                .and_then(|i| i.parse::<Indication>().ok())
                == Some(Indication::Valid);

            if valid {
                self.add_poe(&timestamp, snapshot)?;
            } else {
                debug!(
                    "timestamp {} is not valid ({}), no POE extracted",
                    timestamp.id(),
                    timestamp.indication().unwrap_or("no indication")
                );
            }
        }
        Ok(())
    }

    /// Records the production time of `timestamp` as POE of every object it
    /// covers.
    ///
    /// Certificates are matched against the snapshot's certificate pool by
    /// digest; unknown certificates are skipped.
    pub fn add_poe(&mut self, timestamp: &TimestampFacts<'_>, snapshot: &FactSnapshot) -> Result<()> {
        let production_time =
            timestamp
                .production_time()
                .ok_or_else(|| Error::MissingProductionTime {
                    timestamp_id: timestamp.id().to_string(),
                })?;

        for object in timestamp.signed_objects() {
            match object.category() {
                Some(SignedObjectCategory::Signature) => match object.id() {
                    Some(id) => self.add_signature_poe(id, production_time),
                    None => warn!("timestamp {} covers a signature without id", timestamp.id()),
                },
                Some(SignedObjectCategory::Certificate) => {
                    match certificate_id(&object, snapshot) {
                        Some(id) => self.add_certificate_poe(id, production_time),
                        None => warn!(
                            "timestamp {} covers a certificate not in the pool ({} {})",
                            timestamp.id(),
                            object.digest_algo().unwrap_or("?"),
                            object.digest_value().unwrap_or("?")
                        ),
                    }
                }
                Some(SignedObjectCategory::Revocation) if self.record_revocations => {
                    match object.id() {
                        Some(id) => self.add_revocation_poe(id, production_time),
                        None => warn!(
                            "timestamp {} covers revocation data without id",
                            timestamp.id()
                        ),
                    }
                }
                Some(SignedObjectCategory::Revocation) | Some(SignedObjectCategory::Timestamp) => {}
                None => debug!(
                    "timestamp {} covers an object of unknown category",
                    timestamp.id()
                ),
            }
        }
        Ok(())
    }

    pub fn add_signature_poe(&mut self, id: &str, date: DateTime<Utc>) {
        insert(&mut self.signatures, id, date);
    }

    pub fn add_certificate_poe(&mut self, id: &str, date: DateTime<Utc>) {
        insert(&mut self.certificates, id, date);
    }

    pub fn add_revocation_poe(&mut self, id: &str, date: DateTime<Utc>) {
        insert(&mut self.revocations, id, date);
    }

    /// `true` if the certificate existed at or before `at_or_before`.
    pub fn has_certificate_poe(&self, id: &str, at_or_before: DateTime<Utc>) -> bool {
        lowest(&self.certificates, id, at_or_before).is_some()
    }

    /// `true` if the revocation data existed at or before `at_or_before`.
    pub fn has_revocation_poe(&self, id: &str, at_or_before: DateTime<Utc>) -> bool {
        lowest(&self.revocations, id, at_or_before).is_some()
    }

    /// Earliest POE of the signature at or before `at_or_before`.
    pub fn lowest_signature_poe(
        &self,
        id: &str,
        at_or_before: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        lowest(&self.signatures, id, at_or_before)
    }
}

fn certificate_id<'a>(object: &SignedObjectFacts<'a>, snapshot: &'a FactSnapshot) -> Option<&'a str> {
    match (object.digest_algo(), object.digest_value()) {
        (Some(algo), Some(value)) => snapshot.certificate_by_digest(algo, value).map(|c| c.id()),
        _ => object
            .id()
            .and_then(|id| snapshot.certificate(id))
            .map(|c| c.id()),
    }
}

fn insert(dates: &mut PoeDates, id: &str, date: DateTime<Utc>) {
    if id.is_empty() {
        warn!("POE for an object without id ignored");
        return;
    }
    dates.entry(id.to_string()).or_default().insert(date);
}

fn lowest(dates: &PoeDates, id: &str, at_or_before: DateTime<Utc>) -> Option<DateTime<Utc>> {
    dates
        .get(id)?
        .first()
        .filter(|date| **date <= at_or_before)
        .copied()
}
