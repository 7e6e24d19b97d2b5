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

//! Read-only access to the facts extracted from a signed document.
//!
//! A [`FactSnapshot`] is a tree of [`FactNode`]s addressed by `/`-separated
//! paths such as `certificates/7/revocation/issuing_time`. List elements are
//! addressed by their index. Every accessor returns `None` when the path does
//! not resolve to a value of the requested type, so evaluation code never has
//! to handle a failed lookup as an error.
//!
//! The typed views ([`SignatureFacts`], [`CertificateFacts`],
//! [`RevocationFacts`], [`TimestampFacts`]) name the paths the validation
//! engine reads.

use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{time::parse_date, utils::digest::digests_match, Error, Result};

/// One node of the fact tree.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactNode {
    /// Absent or explicitly `null` value.
    #[default]
    Null,

    /// Boolean fact.
    Bool(bool),

    /// Integral fact (key lengths, counters).
    Int(i64),

    /// Non-integral number; kept so that any JSON document can be loaded.
    Float(f64),

    /// Textual fact. Dates are RFC 3339 strings.
    Text(String),

    /// Ordered list of facts.
    List(Vec<FactNode>),

    /// Named sub-facts.
    Record(BTreeMap<String, FactNode>),
}

impl FactNode {
    /// Resolve a `/`-separated path relative to this node.
    pub fn node_at(&self, path: &str) -> Option<&FactNode> {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = match node {
                FactNode::Record(map) => map.get(segment)?,
                FactNode::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Returns `true` if the path resolves to a non-null value.
    pub fn exists(&self, path: &str) -> bool {
        !matches!(self.node_at(path), None | Some(FactNode::Null))
    }

    /// Returns the text stored at `path`.
    pub fn text_at(&self, path: &str) -> Option<&str> {
        match self.node_at(path)? {
            FactNode::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the scalar stored at `path` rendered as a string.
    pub fn value_at(&self, path: &str) -> Option<String> {
        match self.node_at(path)? {
            FactNode::Text(s) => Some(s.clone()),
            FactNode::Bool(b) => Some(b.to_string()),
            FactNode::Int(i) => Some(i.to_string()),
            FactNode::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// Returns the boolean stored at `path`.
    ///
    /// The strings `"true"` and `"false"` are accepted as well.
    pub fn bool_at(&self, path: &str) -> Option<bool> {
        match self.node_at(path)? {
            FactNode::Bool(b) => Some(*b),
            FactNode::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the integer stored at `path`.
    pub fn int_at(&self, path: &str) -> Option<i64> {
        match self.node_at(path)? {
            FactNode::Int(i) => Some(*i),
            FactNode::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the date stored at `path`.
    pub fn date_at(&self, path: &str) -> Option<DateTime<Utc>> {
        match self.node_at(path)? {
            FactNode::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Returns the list stored at `path`.
    pub fn list_at(&self, path: &str) -> Option<&[FactNode]> {
        match self.node_at(path)? {
            FactNode::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns the textual elements of the list stored at `path`.
    ///
    /// Returns an empty list when the path is absent.
    pub fn strings_at(&self, path: &str) -> Vec<&str> {
        self.list_at(path)
            .unwrap_or_default()
            .iter()
            .filter_map(|n| match n {
                FactNode::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Immutable snapshot of everything extracted about the signatures,
/// certificates, revocation data, and timestamps of one document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FactSnapshot {
    root: FactNode,
}

impl FactSnapshot {
    /// Wraps an existing fact tree.
    pub fn new(root: FactNode) -> Self {
        Self { root }
    }

    /// Parses a snapshot from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Converts an already-parsed JSON value into a snapshot.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Loads a JSON snapshot from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Root of the fact tree.
    pub fn root(&self) -> &FactNode {
        &self.root
    }

    /// See [`FactNode::node_at`].
    pub fn node_at(&self, path: &str) -> Option<&FactNode> {
        self.root.node_at(path)
    }

    /// See [`FactNode::exists`].
    pub fn exists(&self, path: &str) -> bool {
        self.root.exists(path)
    }

    /// See [`FactNode::value_at`].
    pub fn value_at(&self, path: &str) -> Option<String> {
        self.root.value_at(path)
    }

    /// See [`FactNode::bool_at`].
    pub fn bool_at(&self, path: &str) -> Option<bool> {
        self.root.bool_at(path)
    }

    /// See [`FactNode::int_at`].
    pub fn int_at(&self, path: &str) -> Option<i64> {
        self.root.int_at(path)
    }

    /// See [`FactNode::date_at`].
    pub fn date_at(&self, path: &str) -> Option<DateTime<Utc>> {
        self.root.date_at(path)
    }

    /// See [`FactNode::list_at`].
    pub fn list_at(&self, path: &str) -> Option<&[FactNode]> {
        self.root.list_at(path)
    }

    /// Validation time recorded by the extractor, if any.
    pub fn validation_time(&self) -> Option<DateTime<Utc>> {
        self.root.date_at("validation_time")
    }

    /// All signatures in document order.
    pub fn signatures(&self) -> impl Iterator<Item = SignatureFacts<'_>> {
        self.elements("signatures").map(SignatureFacts::new)
    }

    /// Looks up a signature by id.
    pub fn signature(&self, id: &str) -> Option<SignatureFacts<'_>> {
        self.signatures().find(|s| s.id() == id)
    }

    /// All certificates of the certificate pool.
    pub fn certificates(&self) -> impl Iterator<Item = CertificateFacts<'_>> {
        self.elements("certificates").map(CertificateFacts::new)
    }

    /// Looks up a certificate of the pool by id.
    pub fn certificate(&self, id: &str) -> Option<CertificateFacts<'_>> {
        self.certificates().find(|c| c.id() == id)
    }

    /// Looks up a certificate of the pool by the digest of its encoding.
    ///
    /// Digest values may be hex or Base64 encoded on either side.
    pub fn certificate_by_digest(
        &self,
        digest_algo: &str,
        digest_value: &str,
    ) -> Option<CertificateFacts<'_>> {
        self.certificates().find(|c| {
            c.digest(digest_algo)
                .is_some_and(|own| digests_match(own, digest_value))
        })
    }

    /// All timestamps in document order.
    pub fn timestamps(&self) -> impl Iterator<Item = TimestampFacts<'_>> {
        self.elements("timestamps").map(TimestampFacts::new)
    }

    /// Looks up a timestamp by id.
    pub fn timestamp(&self, id: &str) -> Option<TimestampFacts<'_>> {
        self.timestamps().find(|t| t.id() == id)
    }

    /// Resolves the certificate chain of a signature, leaf first.
    ///
    /// Fails if the chain names a certificate that is not in the pool.
    pub fn certificate_chain(&self, signature: &SignatureFacts<'_>) -> Result<CertificateChain<'_>> {
        signature
            .certificate_chain_ids()
            .into_iter()
            .map(|id| {
                self.certificate(id)
                    .ok_or_else(|| Error::CertificateNotFound { id: id.to_string() })
            })
            .collect::<Result<Vec<_>>>()
            .map(CertificateChain)
    }

    fn elements(&self, path: &str) -> impl Iterator<Item = &FactNode> {
        self.root.list_at(path).unwrap_or_default().iter()
    }
}

/// Signature facts.
#[derive(Clone, Copy, Debug)]
pub struct SignatureFacts<'a> {
    node: &'a FactNode,
}

impl<'a> SignatureFacts<'a> {
    /// Wraps a signature node.
    pub fn new(node: &'a FactNode) -> Self {
        Self { node }
    }

    /// Underlying fact node.
    pub fn node(&self) -> &'a FactNode {
        self.node
    }

    /// Signature id; empty if the extractor did not provide one.
    pub fn id(&self) -> &'a str {
        self.node.text_at("id").unwrap_or_default()
    }

    pub fn structural_validity(&self) -> Option<bool> {
        self.node.bool_at("structural_validation/valid")
    }

    pub fn structural_validation_message(&self) -> Option<&'a str> {
        self.node.text_at("structural_validation/message")
    }

    /// Claimed signing time (signed attribute).
    pub fn signing_time(&self) -> Option<DateTime<Utc>> {
        self.node.date_at("signing_time")
    }

    pub fn content_type(&self) -> Option<&'a str> {
        self.node.text_at("content_type")
    }

    pub fn content_hints(&self) -> Option<&'a str> {
        self.node.text_at("content_hints")
    }

    pub fn content_identifier(&self) -> Option<&'a str> {
        self.node.text_at("content_identifier")
    }

    pub fn commitment_type_indications(&self) -> Vec<&'a str> {
        self.node.strings_at("commitment_type_indications")
    }

    /// Whether a signature production place (signer location) is present.
    pub fn has_signature_production_place(&self) -> bool {
        self.node
            .bool_at("signature_production_place")
            .unwrap_or(false)
    }

    pub fn claimed_roles(&self) -> Vec<&'a str> {
        self.node.strings_at("claimed_roles")
    }

    pub fn certified_roles(&self) -> Vec<&'a str> {
        self.node.strings_at("certified_roles")
    }

    /// Content timestamps (signed attribute).
    pub fn content_timestamps(&self) -> impl Iterator<Item = ContentTimestampFacts<'a>> {
        self.node
            .list_at("content_timestamps")
            .unwrap_or_default()
            .iter()
            .map(|node| ContentTimestampFacts { node })
    }

    /// Ids of the signature timestamps covering this signature.
    pub fn signature_timestamp_ids(&self) -> Vec<&'a str> {
        self.node.strings_at("signature_timestamps")
    }

    /// Results of the byte-level checks on the signature value.
    pub fn basic_signature(&self) -> BasicSignatureFacts<'a> {
        BasicSignatureFacts::at(self.node, "basic_signature")
    }

    /// `true` if the signature carries a manifest reference.
    pub fn has_manifest(&self) -> bool {
        self.node.exists("manifest")
    }

    pub fn manifest_reference_found(&self) -> Option<bool> {
        self.node.bool_at("manifest/reference_found")
    }

    pub fn manifest_reference_intact(&self) -> Option<bool> {
        self.node.bool_at("manifest/reference_intact")
    }

    /// Id of the signing certificate.
    ///
    /// Falls back to the first element of the certificate chain.
    pub fn signing_certificate_id(&self) -> Option<&'a str> {
        self.node
            .text_at("signing_certificate")
            .or_else(|| self.certificate_chain_ids().first().copied())
    }

    /// Certificate ids of the chain, leaf first.
    pub fn certificate_chain_ids(&self) -> Vec<&'a str> {
        self.node.strings_at("certificate_chain")
    }
}

/// Content timestamp facts.
#[derive(Clone, Copy, Debug)]
pub struct ContentTimestampFacts<'a> {
    node: &'a FactNode,
}

impl<'a> ContentTimestampFacts<'a> {
    pub fn id(&self) -> &'a str {
        self.node.text_at("id").unwrap_or_default()
    }

    pub fn message_imprint_found(&self) -> Option<bool> {
        self.node.bool_at("message_imprint_found")
    }

    pub fn message_imprint_intact(&self) -> Option<bool> {
        self.node.bool_at("message_imprint_intact")
    }
}

/// Byte-level signature facts, shared by signatures, certificates, and
/// revocation data.
#[derive(Clone, Copy, Debug)]
pub struct BasicSignatureFacts<'a> {
    node: Option<&'a FactNode>,
}

impl<'a> BasicSignatureFacts<'a> {
    fn at(parent: &'a FactNode, path: &str) -> Self {
        Self {
            node: parent.node_at(path),
        }
    }

    pub fn encryption_algo(&self) -> Option<&'a str> {
        self.node?.text_at("encryption_algo")
    }

    pub fn digest_algo(&self) -> Option<&'a str> {
        self.node?.text_at("digest_algo")
    }

    pub fn key_length(&self) -> Option<i64> {
        self.node?.int_at("key_length")
    }

    pub fn reference_data_found(&self) -> Option<bool> {
        self.node?.bool_at("reference_data_found")
    }

    pub fn reference_data_intact(&self) -> Option<bool> {
        self.node?.bool_at("reference_data_intact")
    }

    pub fn signature_intact(&self) -> Option<bool> {
        self.node?.bool_at("signature_intact")
    }
}

/// Certificate facts from the certificate pool.
#[derive(Clone, Copy, Debug)]
pub struct CertificateFacts<'a> {
    node: &'a FactNode,
}

impl<'a> CertificateFacts<'a> {
    /// Wraps a certificate node.
    pub fn new(node: &'a FactNode) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &'a FactNode {
        self.node
    }

    pub fn id(&self) -> &'a str {
        self.node.text_at("id").unwrap_or_default()
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.node.date_at("not_before")
    }

    pub fn not_after(&self) -> Option<DateTime<Utc>> {
        self.node.date_at("not_after")
    }

    /// `true` if the certificate is a trust anchor.
    pub fn is_trusted(&self) -> bool {
        self.node.bool_at("trusted").unwrap_or(false)
    }

    /// Digest of the certificate encoding for the given algorithm.
    pub fn digest(&self, digest_algo: &str) -> Option<&'a str> {
        match self.node.node_at("digests")? {
            FactNode::Record(map) => map
                .iter()
                .find(|(algo, _)| algo.eq_ignore_ascii_case(digest_algo))
                .and_then(|(_, value)| match value {
                    FactNode::Text(s) => Some(s.as_str()),
                    _ => None,
                }),
            _ => None,
        }
    }

    /// Trust-service status of the anchor, as published in the trusted list.
    pub fn trust_service_status(&self) -> Option<&'a str> {
        self.node.text_at("trust_service/status")
    }

    /// Date at which the trust-service status ended, if known.
    pub fn trust_service_end_date(&self) -> Option<DateTime<Utc>> {
        self.node.date_at("trust_service/end_date")
    }

    pub fn basic_signature(&self) -> BasicSignatureFacts<'a> {
        BasicSignatureFacts::at(self.node, "basic_signature")
    }

    /// Revocation data of the certificate, if any.
    pub fn revocation(&self) -> Option<RevocationFacts<'a>> {
        match self.node.node_at("revocation")? {
            FactNode::Null => None,
            node => Some(RevocationFacts { node }),
        }
    }
}

/// Revocation facts (OCSP response or CRL entry) attached to a certificate.
#[derive(Clone, Copy, Debug)]
pub struct RevocationFacts<'a> {
    node: &'a FactNode,
}

impl<'a> RevocationFacts<'a> {
    pub fn id(&self) -> Option<&'a str> {
        self.node.text_at("id")
    }

    /// Production time of the revocation data.
    pub fn issuing_time(&self) -> Option<DateTime<Utc>> {
        self.node.date_at("issuing_time")
    }

    /// `true` if the revocation data reports the certificate as revoked.
    pub fn is_revoked(&self) -> bool {
        self.node.bool_at("revoked").unwrap_or(false)
    }

    pub fn revocation_date(&self) -> Option<DateTime<Utc>> {
        self.node.date_at("revocation_date")
    }

    pub fn reason(&self) -> Option<&'a str> {
        self.node.text_at("reason")
    }

    pub fn basic_signature(&self) -> BasicSignatureFacts<'a> {
        BasicSignatureFacts::at(self.node, "basic_signature")
    }
}

/// Timestamp facts.
#[derive(Clone, Copy, Debug)]
pub struct TimestampFacts<'a> {
    node: &'a FactNode,
}

impl<'a> TimestampFacts<'a> {
    /// Wraps a timestamp node.
    pub fn new(node: &'a FactNode) -> Self {
        Self { node }
    }

    pub fn id(&self) -> &'a str {
        self.node.text_at("id").unwrap_or_default()
    }

    pub fn production_time(&self) -> Option<DateTime<Utc>> {
        self.node.date_at("production_time")
    }

    /// Indication the timestamp itself was validated with.
    pub fn indication(&self) -> Option<&'a str> {
        self.node.text_at("indication")
    }

    /// Objects covered by the timestamp's message imprint.
    pub fn signed_objects(&self) -> impl Iterator<Item = SignedObjectFacts<'a>> {
        self.node
            .list_at("signed_objects")
            .unwrap_or_default()
            .iter()
            .map(|node| SignedObjectFacts { node })
    }
}

/// Category of an object covered by a timestamp.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignedObjectCategory {
    Signature,
    Certificate,
    Revocation,
    Timestamp,
}

/// Reference to one object covered by a timestamp.
#[derive(Clone, Copy, Debug)]
pub struct SignedObjectFacts<'a> {
    node: &'a FactNode,
}

impl<'a> SignedObjectFacts<'a> {
    /// Category of the covered object; `None` for unknown categories.
    pub fn category(&self) -> Option<SignedObjectCategory> {
        let category = self.node.text_at("category")?;
        match category.to_ascii_lowercase().as_str() {
            "signature" => Some(SignedObjectCategory::Signature),
            "certificate" => Some(SignedObjectCategory::Certificate),
            "revocation" => Some(SignedObjectCategory::Revocation),
            "timestamp" => Some(SignedObjectCategory::Timestamp),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&'a str> {
        self.node.text_at("id")
    }

    pub fn digest_algo(&self) -> Option<&'a str> {
        self.node.text_at("digest_algo")
    }

    pub fn digest_value(&self) -> Option<&'a str> {
        self.node.text_at("digest_value")
    }
}

/// Certificate chain of a signature, leaf (signer) first, trust anchor last.
#[derive(Clone, Debug, Default)]
pub struct CertificateChain<'a>(pub Vec<CertificateFacts<'a>>);

impl<'a> CertificateChain<'a> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Signing certificate.
    pub fn leaf(&self) -> Option<&CertificateFacts<'a>> {
        self.0.first()
    }

    /// Iterates from the leaf toward the anchor.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CertificateFacts<'a>> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::utils::test::sample_snapshot;

    #[test]
    fn paths_resolve_through_records_and_lists() {
        let snapshot = sample_snapshot();

        assert_eq!(
            snapshot.value_at("certificates/0/id").as_deref(),
            Some("C-LEAF")
        );
        assert_eq!(
            snapshot.date_at("certificates/0/revocation/issuing_time"),
            Some(Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap())
        );
        assert_eq!(
            snapshot.int_at("signatures/0/basic_signature/key_length"),
            Some(2048)
        );
        assert!(snapshot.exists("signatures/0/signing_time"));
    }

    #[test]
    fn missing_paths_are_not_found() {
        let snapshot = sample_snapshot();

        assert!(snapshot.node_at("certificates/99").is_none());
        assert!(snapshot.node_at("certificates/x/id").is_none());
        assert!(snapshot.bool_at("signatures/0/nope").is_none());
        assert!(!snapshot.exists("signatures/0/content_hints"));
    }

    #[test]
    fn type_mismatch_is_not_found() {
        let node = FactNode::Record(BTreeMap::from([(
            "when".to_string(),
            FactNode::Int(5),
        )]));

        assert!(node.date_at("when").is_none());
        assert!(node.text_at("when").is_none());
        assert_eq!(node.value_at("when").as_deref(), Some("5"));
    }

    #[test]
    fn null_does_not_exist() {
        let snapshot = FactSnapshot::from_value(json!({ "a": null, "b": false })).unwrap();

        assert!(!snapshot.exists("a"));
        assert!(snapshot.exists("b"));
        assert_eq!(snapshot.bool_at("b"), Some(false));
    }

    #[test]
    fn typed_views() {
        let snapshot = sample_snapshot();
        let signature = snapshot.signature("S-1").unwrap();

        assert_eq!(signature.signing_certificate_id(), Some("C-LEAF"));
        assert_eq!(signature.basic_signature().digest_algo(), Some("SHA256"));
        assert_eq!(signature.commitment_type_indications(), vec!["proofOfOrigin"]);

        let chain = snapshot.certificate_chain(&signature).unwrap();
        assert_eq!(chain.len(), 3);
        assert!(chain.iter().last().unwrap().is_trusted());
        assert!(chain.leaf().unwrap().revocation().is_some());
    }

    #[test]
    fn unknown_chain_member_is_an_error() {
        let snapshot = FactSnapshot::from_value(json!({
            "signatures": [{ "id": "S-1", "certificate_chain": ["C-MISSING"] }],
            "certificates": []
        }))
        .unwrap();

        let signature = snapshot.signature("S-1").unwrap();
        assert!(matches!(
            snapshot.certificate_chain(&signature),
            Err(Error::CertificateNotFound { .. })
        ));
    }

    #[test]
    fn certificate_by_digest_accepts_hex_and_base64() {
        let snapshot = sample_snapshot();

        // "C-CA" digest: 0x0102..., Base64 "AQIDBA=="
        assert_eq!(
            snapshot
                .certificate_by_digest("SHA256", "01020304")
                .map(|c| c.id()),
            Some("C-CA")
        );
        assert_eq!(
            snapshot
                .certificate_by_digest("sha256", "AQIDBA==")
                .map(|c| c.id()),
            Some("C-CA")
        );
        assert!(snapshot.certificate_by_digest("SHA256", "ffff").is_none());
    }

    #[test]
    fn signed_object_categories() {
        let snapshot = sample_snapshot();
        let ts = snapshot.timestamp("T-1").unwrap();
        let categories: Vec<_> = ts.signed_objects().filter_map(|o| o.category()).collect();

        assert_eq!(
            categories,
            vec![
                SignedObjectCategory::Signature,
                SignedObjectCategory::Certificate,
                SignedObjectCategory::Certificate,
            ]
        );
    }
}
