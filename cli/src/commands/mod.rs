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

mod show;
mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::info;
use trustval::Settings;

pub use self::{show::Show, validate::Validate};

/// Validate signatures of a fact snapshot against a policy.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Use verbose output (-vv very verbose output).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate every signature of a fact snapshot and print the report.
    Validate(Validate),
    /// Display a policy or the effective settings.
    #[clap(subcommand)]
    Show(Show),
}

#[derive(Debug, Default, Parser)]
pub struct SettingsArgs {
    /// Path to a settings file (.json or .toml).
    #[clap(long, env = "TRUSTVAL_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Validation time (RFC 3339), overriding the settings and the snapshot.
    #[clap(long)]
    pub validation_time: Option<String>,

    /// Let timestamps also prove existence of the revocation data they cover.
    #[clap(long)]
    pub record_revocation_poe: bool,

    /// Fail control-time sliding on trust anchors with an unknown status.
    #[clap(long)]
    pub strict_trust_service_status: bool,
}

impl SettingsArgs {
    /// Layers the command line options on top of the settings file.
    pub fn load(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => {
                info!("loading settings from {}", path.display());
                Settings::from_file(path)
                    .with_context(|| format!("Failed to load settings from {path:?}"))?
            }
            None => Settings::default(),
        };

        if let Some(time) = &self.validation_time {
            settings = settings.with_value("verify.validation_time", time.as_str())?;
        }
        if self.record_revocation_poe {
            settings = settings.with_value("verify.record_revocation_poe", true)?;
        }
        if self.strict_trust_service_status {
            settings = settings.with_value("verify.strict_trust_service_status", true)?;
        }
        Ok(settings)
    }
}

fn ensure_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(())
}
