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

use std::iter::Iterator;

use log::info;

use crate::{LogItem, LogKind};

/// A `StatusTracker` records, in order, the informational, warning, and
/// error items produced while evaluating the constraints of one validation
/// run and controls what happens when an error is recorded.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StatusTracker {
    error_behavior: ErrorBehavior,
    logged_items: Vec<LogItem>,
    scopes: Vec<String>,
}

impl StatusTracker {
    /// Returns a [`StatusTracker`] with the specified [`ErrorBehavior`].
    pub fn with_error_behavior(error_behavior: ErrorBehavior) -> Self {
        Self {
            error_behavior,
            logged_items: vec![],
            scopes: vec![],
        }
    }

    /// Returns the current list of validation log items.
    pub fn logged_items(&self) -> &[LogItem] {
        &self.logged_items
    }

    /// Appends the contents of another [`StatusTracker`] to this list of
    /// validation log items.
    pub fn append(&mut self, other: &StatusTracker) {
        for log_item in other.logged_items() {
            self.add_non_error(log_item.clone());
        }
    }

    /// Adds a non-error [`LogItem`] to this status tracker.
    ///
    /// Primarily intended for use by [`LogItem::informational()`]
    /// or [`LogItem::warning()`].
    pub fn add_non_error(&mut self, log_item: LogItem) {
        let log_item = self.scoped(log_item);
        info!("Validation item: {log_item:?}");
        self.logged_items.push(log_item);
    }

    /// Adds an error-case [`LogItem`] to this status tracker.
    ///
    /// Will return `Err(err)` if configured to stop immediately on errors or
    /// `Ok(())` if configured to continue on errors. _(See [`ErrorBehavior`].)_
    ///
    /// Primarily intended for use by [`LogItem::failure()`].
    pub fn add_error<E>(&mut self, log_item: LogItem, err: E) -> Result<(), E> {
        let log_item = self.scoped(log_item);
        self.logged_items.push(log_item);

        match self.error_behavior {
            ErrorBehavior::StopOnFirstError => Err(err),
            ErrorBehavior::ContinueWhenPossible => Ok(()),
        }
    }

    /// Returns the [`LogItem`]s of a given kind, in the order they were
    /// recorded.
    pub fn filter_kind(&self, kind: LogKind) -> impl Iterator<Item = &LogItem> {
        self.logged_items
            .iter()
            .filter(move |item| item.kind == kind)
    }

    /// Keeps track of the validation object currently being evaluated.
    ///
    /// The scope is attached to any log item added until it is popped.
    pub fn push_scope<S: Into<String>>(&mut self, scope: S) {
        self.scopes.push(scope.into());
    }

    /// Removes the current scope, if any.
    pub fn pop_scope(&mut self) -> Option<String> {
        self.scopes.pop()
    }

    fn scoped(&self, mut log_item: LogItem) -> LogItem {
        if log_item.scope.is_none() {
            if let Some(scope) = self.scopes.last() {
                log_item.scope = Some(scope.clone().into());
            }
        }
        log_item
    }
}

/// `ErrorBehavior` configures the behavior of [`StatusTracker`] when its
/// [`add_error`] function is called.
///
/// [`add_error`]: StatusTracker::add_error
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ErrorBehavior {
    /// If an error is encountered, stop validation immediately.
    StopOnFirstError,

    /// If an error is encountered, log it and continue validation as much as
    /// possible.
    #[default]
    ContinueWhenPossible,
}
