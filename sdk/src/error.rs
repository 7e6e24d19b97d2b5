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

use thiserror::Error;

/// `Error` enumerates the configuration and precondition errors returned by
/// `trustval` operations.
///
/// Validation outcomes (a signature that is INVALID or INDETERMINATE) are not
/// errors; they are reported through [`Conclusion`](crate::Conclusion).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A constraint level string is not one of `IGNORE`, `INFORM`, `WARN`,
    /// or `FAIL`.
    #[error("unknown constraint level: {0}")]
    UnknownLevel(String),

    /// An indication or sub-indication string is not part of the closed
    /// vocabulary.
    #[error("unknown indication: {0}")]
    UnknownIndication(String),

    /// A timestamp without a production time was offered as proof of
    /// existence.
    #[error("timestamp {timestamp_id} has no production time")]
    MissingProductionTime { timestamp_id: String },

    /// A required fact is absent from the snapshot.
    #[error("required fact missing: {path}")]
    FactMissing { path: String },

    /// A signature refers to a certificate that is not in the snapshot's
    /// certificate pool.
    #[error("certificate not found in pool: {id}")]
    CertificateNotFound { id: String },

    #[error("bad parameter: {0}")]
    BadParam(String),

    /// The file extension does not identify a supported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The settings document was written for a newer version.
    #[error("version incompatibility: {0}")]
    VersionCompatibility(String),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSerializationError(#[from] toml::ser::Error),

    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// A specialized `Result` type for `trustval` operations.
pub type Result<T> = std::result::Result<T, Error>;
