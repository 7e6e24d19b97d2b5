// Copyright 2022 Adobe. All rights reserved.
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

//! Message tags identifying each check of the validation processes.
//!
//! Every tag has a question (what the check asks) and a failure answer
//! (what is reported when the check fails). Both are available through
//! [`question`] and [`failure_message`].

// -- cryptographic verification --

/// Is the reference data object found?
pub const BBB_CV_IRDOF: &str = "BBB_CV_IRDOF";

/// Is the reference data object intact?
pub const BBB_CV_IRDOI: &str = "BBB_CV_IRDOI";

/// Is the signature intact?
pub const BBB_CV_ISI: &str = "BBB_CV_ISI";

/// Is the manifest reference intact?
pub const BBB_CV_IMRI: &str = "BBB_CV_IMRI";

// -- signature acceptance validation --

/// Is the structure of the signature valid?
pub const BBB_SAV_ISSV: &str = "BBB_SAV_ISSV";

/// Is the signed attribute `signing-time` present?
pub const BBB_SAV_ISQPSTP: &str = "BBB_SAV_ISQPSTP";

/// Is the signed attribute `content-type` present and acceptable?
pub const BBB_SAV_ISQPCTP: &str = "BBB_SAV_ISQPCTP";

/// Is the signed attribute `content-hints` present and acceptable?
pub const BBB_SAV_ISQPCHP: &str = "BBB_SAV_ISQPCHP";

/// Is the signed attribute `content-identifier` present and acceptable?
pub const BBB_SAV_ISQPCIP: &str = "BBB_SAV_ISQPCIP";

/// Is the signed attribute `commitment-type-indication` present and
/// acceptable?
pub const BBB_SAV_ISQPXTIP: &str = "BBB_SAV_ISQPXTIP";

/// Is the signed attribute `signer-location` present?
pub const BBB_SAV_ISQPSLP: &str = "BBB_SAV_ISQPSLP";

/// Is the signed attribute `content-time-stamp` present?
pub const BBB_SAV_ISQPCTSIP: &str = "BBB_SAV_ISQPCTSIP";

/// Does the message imprint of every content timestamp match the signed
/// content?
pub const BBB_SAV_DMICTSTMCMI: &str = "BBB_SAV_DMICTSTMCMI";

/// Is the claimed role acceptable?
pub const BBB_SAV_ICRM: &str = "BBB_SAV_ICRM";

/// Is the certified role acceptable?
pub const BBB_SAV_ICERRM: &str = "BBB_SAV_ICERRM";

/// Is the number of signature timestamps acceptable?
pub const BBB_SAV_ISTCA: &str = "BBB_SAV_ISTCA";

/// Are the signature cryptographic constraints met?
pub const ASCCM: &str = "ASCCM";

// -- control-time sliding --

/// Is the service status of the trust anchor acceptable?
pub const CTS_ITACS: &str = "CTS_ITACS";

/// Does revocation information exist for the certificate?
pub const CTS_DRIE: &str = "CTS_DRIE";

/// Is the issuance date of the revocation information within the validity
/// period of the certificate?
pub const CTS_IIDOCWVPOC: &str = "CTS_IIDOCWVPOC";

/// Was the revocation information issued before the control time?
pub const CTS_IRIBCT: &str = "CTS_IRIBCT";

/// Does the set of POEs contain a proof of existence of the certificate
/// and of the revocation information at or before the control time?
pub const CTS_DSOPCPOEOC: &str = "CTS_DSOPCPOEOC";

/// Control time slid to an earlier instant.
pub const CTS_SCT: &str = "CTS_SCT";

/// Returns the question a check asks, or `None` for an unknown tag.
pub fn question(tag: &str) -> Option<&'static str> {
    Some(match tag {
        BBB_CV_IRDOF => "Is the reference data object found?",
        BBB_CV_IRDOI => "Is the reference data object intact?",
        BBB_CV_ISI => "Is the signature intact?",
        BBB_CV_IMRI => "Is the manifest reference intact?",
        BBB_SAV_ISSV => "Is the structure of the signature valid?",
        BBB_SAV_ISQPSTP => "Is the signed attribute 'signing-time' present?",
        BBB_SAV_ISQPCTP => "Is the signed attribute 'content-type' present?",
        BBB_SAV_ISQPCHP => "Is the signed attribute 'content-hints' present?",
        BBB_SAV_ISQPCIP => "Is the signed attribute 'content-identifier' present?",
        BBB_SAV_ISQPXTIP => "Is the signed attribute 'commitment-type-indication' present?",
        BBB_SAV_ISQPSLP => "Is the signed attribute 'signer-location' present?",
        BBB_SAV_ISQPCTSIP => "Is the signed attribute 'content-time-stamp' present?",
        BBB_SAV_DMICTSTMCMI => {
            "Does the message imprint of the content timestamp match the computed value?"
        }
        BBB_SAV_ICRM => "Is the claimed role acceptable?",
        BBB_SAV_ICERRM => "Is the certified role acceptable?",
        BBB_SAV_ISTCA => "Is the number of signature timestamps acceptable?",
        ASCCM => "Are the signature cryptographic constraints met?",
        CTS_ITACS => "Is the service status of the trust anchor acceptable?",
        CTS_DRIE => "Does revocation information exist for the certificate?",
        CTS_IIDOCWVPOC => {
            "Is the issuance date of the revocation information within the validity period of the certificate?"
        }
        CTS_IRIBCT => "Was the revocation information issued before the control time?",
        CTS_DSOPCPOEOC => "Does a proof of existence of the certificate exist at the control time?",
        CTS_SCT => "Control time",
        _ => return None,
    })
}

/// Returns the message reported when a check fails, or `None` for an
/// unknown tag.
pub fn failure_message(tag: &str) -> Option<&'static str> {
    Some(match tag {
        BBB_CV_IRDOF => "The reference data object is not found!",
        BBB_CV_IRDOI => "The reference data object is not intact!",
        BBB_CV_ISI => "The signature is not intact!",
        BBB_CV_IMRI => "The manifest reference is not intact!",
        BBB_SAV_ISSV => "The signature is not structurally valid!",
        BBB_SAV_ISQPSTP => "The signed attribute 'signing-time' is absent!",
        BBB_SAV_ISQPCTP => "The signed attribute 'content-type' is absent or not acceptable!",
        BBB_SAV_ISQPCHP => "The signed attribute 'content-hints' is absent or not acceptable!",
        BBB_SAV_ISQPCIP => {
            "The signed attribute 'content-identifier' is absent or not acceptable!"
        }
        BBB_SAV_ISQPXTIP => {
            "The signed attribute 'commitment-type-indication' is absent or not acceptable!"
        }
        BBB_SAV_ISQPSLP => "The signed attribute 'signer-location' is absent!",
        BBB_SAV_ISQPCTSIP => "The signed attribute 'content-time-stamp' is absent!",
        BBB_SAV_DMICTSTMCMI => "The content timestamp message imprint is not intact!",
        BBB_SAV_ICRM => "The claimed role is not acceptable!",
        BBB_SAV_ICERRM => "The certified role is not acceptable!",
        BBB_SAV_ISTCA => "The number of signature timestamps is not acceptable!",
        ASCCM => "The signature cryptographic constraints are not met!",
        CTS_ITACS => "The service status of the trust anchor is not acceptable!",
        CTS_DRIE => "No revocation information is available for the certificate!",
        CTS_IIDOCWVPOC => {
            "The revocation information was not issued within the validity period of the certificate!"
        }
        CTS_IRIBCT => "The revocation information was not issued before the control time!",
        CTS_DSOPCPOEOC => "No proof of existence of the certificate at the control time!",
        CTS_SCT => "The control time slid to an earlier instant.",
        _ => return None,
    })
}
