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

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use trustval::Policy;

use super::{ensure_file, SettingsArgs};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Toml,
}

#[derive(Debug, Subcommand)]
pub enum Show {
    /// Display a policy after parsing, with defaults removed.
    Policy {
        /// Input path to the policy (.json or .toml).
        path: PathBuf,

        /// Output format.
        #[clap(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Display the effective settings in .toml format.
    Settings {
        #[clap(flatten)]
        settings: SettingsArgs,
    },
}

impl Show {
    pub fn execute(&self) -> Result<()> {
        match self {
            Show::Policy { path, format } => {
                ensure_file(path)?;
                let policy = Policy::from_file(path)
                    .with_context(|| format!("Failed to read policy from {path:?}"))?;

                let text = match format {
                    Format::Json => serde_json::to_string_pretty(&policy)?,
                    Format::Toml => toml::to_string_pretty(&policy)?,
                };
                println!("{text}");
            }
            Show::Settings { settings } => {
                println!("{}", settings.load()?.to_pretty_toml()?);
            }
        }
        Ok(())
    }
}
