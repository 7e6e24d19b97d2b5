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

use std::{borrow::Cow, collections::BTreeMap, fmt::Debug};

use serde::Serialize;

use crate::StatusTracker;

/// Detailed information about a validation error, warning, or other
/// noteworthy condition.
///
/// Use the [`log_item`](crate::log_item) macro to create a `LogItem`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LogItem {
    /// Kind of log item.
    pub kind: LogKind,

    /// Message tag of the check that produced the item (for example
    /// `BBB_CV_IRDOF`), or other descriptive label.
    #[serde(rename = "tag")]
    pub label: Cow<'static, str>,

    /// Human-readable description of the condition.
    pub description: Cow<'static, str>,

    /// Observed / expected values and other auxiliary details.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Validation object (signature, certificate, timestamp) that was being
    /// evaluated when the item was recorded, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Cow<'static, str>>,

    /// Source file where the condition was detected.
    #[serde(skip)]
    pub file: Cow<'static, str>,

    /// Function where the condition was detected.
    #[serde(skip)]
    pub function: Cow<'static, str>,

    /// Source line number where the condition was detected.
    #[serde(skip)]
    pub line: u32,

    /// Error value as string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err_val: Option<Cow<'static, str>>,
}

impl Default for LogItem {
    fn default() -> Self {
        LogItem {
            kind: LogKind::Informational,
            label: Cow::Borrowed(""),
            description: Cow::Borrowed(""),
            attributes: BTreeMap::new(),
            scope: None,
            file: Cow::Borrowed(""),
            function: Cow::Borrowed(""),
            line: 0,
            err_val: None,
        }
    }
}

impl LogItem {
    /// Creates a `LogItem` with an explicit source location.
    ///
    /// Prefer the [`log_item`](crate::log_item) macro, which fills in the
    /// file and line automatically.
    pub fn new<L, D, F, P>(label: L, description: D, function: F, file: P, line: u32) -> Self
    where
        L: Into<Cow<'static, str>>,
        D: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
        P: Into<Cow<'static, str>>,
    {
        LogItem {
            label: label.into(),
            description: description.into(),
            function: function.into(),
            file: file.into(),
            line,
            ..Default::default()
        }
    }

    /// Adds an auxiliary attribute, such as the observed or expected value of
    /// a check.
    ///
    /// ## Example
    ///
    /// ```
    /// # use trustval_status_tracker::log_item;
    /// let log = log_item!("test1", "test item 1", "test func").attribute("observed", "SHA1");
    ///
    /// assert_eq!(log.attributes.get("observed").map(String::as_str), Some("SHA1"));
    /// ```
    #[must_use]
    pub fn attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the kind to [`LogKind::Informational`] and adds the item to the
    /// [`StatusTracker`].
    pub fn informational(mut self, tracker: &mut StatusTracker) {
        self.kind = LogKind::Informational;
        tracker.add_non_error(self);
    }

    /// Sets the kind to [`LogKind::Warning`] and adds the item to the
    /// [`StatusTracker`].
    pub fn warning(mut self, tracker: &mut StatusTracker) {
        self.kind = LogKind::Warning;
        tracker.add_non_error(self);
    }

    /// Sets the kind to [`LogKind::Failure`] and adds the item to the
    /// [`StatusTracker`].
    ///
    /// Returns `Err(err)` if the tracker is configured to stop on the first
    /// error, `Ok(())` otherwise. _(See [`ErrorBehavior`].)_
    ///
    /// [`ErrorBehavior`]: crate::ErrorBehavior
    pub fn failure<E: Debug>(mut self, tracker: &mut StatusTracker, err: E) -> Result<(), E> {
        self.kind = LogKind::Failure;
        self.err_val = Some(format!("{err:?}").into());
        tracker.add_error(self, err)
    }
}

/// Descriptive nature of a [`LogItem`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Optional disclosure; never affects a verdict.
    Informational,

    /// A check failed but was configured not to block validation.
    Warning,

    /// A check failed and determines the verdict.
    Failure,
}

/// Creates a [`LogItem`] struct that is annotated with the source file and line
/// number where the log condition was discovered.
///
/// Takes three parameters, each of which may be a `&'static str` or `String`:
///
/// * `label`: message tag of the check this `LogItem` references
/// * `description`: human-readable reason for this `LogItem` to have been
///   generated
/// * `function`: name of the function generating this `LogItem`
///
/// ## Example
///
/// ```
/// # use std::borrow::Cow;
/// # use trustval_status_tracker::{log_item, LogItem, LogKind};
/// let log = log_item!("test1", "test item 1", "test func");
///
/// assert_eq!(
///     log,
///     LogItem {
///         kind: LogKind::Informational,
///         label: Cow::Borrowed("test1"),
///         description: Cow::Borrowed("test item 1"),
///         file: Cow::Borrowed(file!()),
///         function: Cow::Borrowed("test func"),
///         line: log.line,
///         ..Default::default()
///     }
/// );
/// #
/// # assert!(log.line > 2);
/// ```
#[macro_export]
macro_rules! log_item {
    ($label:expr, $description:expr, $function:expr) => {{
        $crate::LogItem {
            kind: $crate::LogKind::Informational,
            label: $label.into(),
            file: file!().into(),
            function: $function.into(),
            line: line!(),
            description: $description.into(),
            ..Default::default()
        }
    }};
}
