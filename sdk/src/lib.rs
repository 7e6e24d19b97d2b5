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

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
#![doc = include_str!("../README.md")]

/// Error type and `Result` alias.
mod error;
pub use error::{Error, Result};

/// Read-only fact snapshots and typed views over them.
pub mod facts;
pub use facts::{FactNode, FactSnapshot};

/// Declarative validation policies.
pub mod policy;
pub use policy::{ConstraintName, ConstraintSpec, Context, Level, Policy, SubContext};

/// Evaluation of single checks.
pub mod constraint;
pub use constraint::{Constraint, ConstraintNode, ConstraintOutcome, Status, ValidationTrace};

mod conclusion;
pub use conclusion::{Conclusion, Failure, Indication, ProcessReport, SubIndication};

pub mod validation_codes;

/// Proof-of-existence registry.
pub mod poe;
pub use poe::PoeExtraction;

pub mod control_time;
pub use control_time::{ControlTimeSliding, ControlTimeSlidingConclusion, TrustServiceStatus};

pub mod crypto_verification;
pub use crypto_verification::CryptographicVerification;

pub mod signature_acceptance;
pub use signature_acceptance::SignatureAcceptanceValidation;

/// Run configuration.
pub mod settings;
pub use settings::Settings;

mod validator;
pub use validator::{SignatureReport, ValidationReport, Validator};

pub(crate) mod time;
pub(crate) mod utils;
