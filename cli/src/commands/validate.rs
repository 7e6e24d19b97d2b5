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

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use trustval::{FactSnapshot, Policy, ValidationReport, Validator};

use super::{ensure_file, SettingsArgs};

#[derive(Debug, Parser)]
pub struct Validate {
    /// Path to the fact snapshot (JSON).
    #[clap(short, long)]
    pub facts: PathBuf,

    /// Path to the validation policy (.json or .toml).
    #[clap(short, long)]
    pub policy: PathBuf,

    #[clap(flatten)]
    pub settings: SettingsArgs,

    /// Path to output file for the report, defaults to stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Force overwrite of output if it already exists.
    #[clap(long)]
    pub force: bool,

    /// Pretty-print the report.
    #[clap(long)]
    pub pretty: bool,

    /// Exit with an error unless every signature is VALID.
    #[clap(long)]
    pub fail_on_invalid: bool,
}

impl Validate {
    pub fn execute(&self) -> Result<()> {
        ensure_file(&self.facts)?;
        ensure_file(&self.policy)?;

        if let Some(output) = &self.output {
            if output.exists() && !self.force {
                bail!("Output already exists; use --force to overwrite");
            }
        }

        let snapshot = FactSnapshot::from_file(&self.facts)
            .with_context(|| format!("Failed to read facts from {:?}", self.facts))?;
        let policy = Policy::from_file(&self.policy)
            .with_context(|| format!("Failed to read policy from {:?}", self.policy))?;
        let settings = self.settings.load()?;

        let report = Validator::new(&policy, &settings).validate(&snapshot)?;
        self.write_report(&report)?;

        if !report.is_valid() {
            for signature in report.signatures.iter().filter(|s| !s.conclusion.is_valid()) {
                warn!(
                    "signature {} is {:?}/{:?}",
                    signature.id,
                    signature.conclusion.indication(),
                    signature.conclusion.sub_indication()
                );
            }
            if self.fail_on_invalid {
                bail!("Not every signature is VALID");
            }
        }
        Ok(())
    }

    fn write_report(&self, report: &ValidationReport) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };

        match &self.output {
            Some(output) => {
                if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
                    fs::create_dir_all(dir)?;
                }
                fs::write(output, json)
                    .with_context(|| format!("Failed to write report to {output:?}"))?;
                info!("report written to {}", output.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}
