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

use std::fmt::{self, Display, Formatter};

use crate::{log_item, ErrorBehavior, LogKind, StatusTracker};

#[test]
fn aggregates_errors() {
    let mut tracker = StatusTracker::default();

    log_item!("test1", "test item 1", "test func").informational(&mut tracker);

    // Default behavior continues past errors.
    log_item!("test2", "test item 2", "test func")
        .failure(&mut tracker, SampleError {})
        .unwrap();

    assert_eq!(tracker.logged_items().len(), 2);

    let failure = &tracker.logged_items()[1];
    assert_eq!(failure.label, "test2");
    assert_eq!(failure.kind, LogKind::Failure);
    assert_eq!(failure.err_val.as_deref(), Some("SampleError"));
    assert_eq!(tracker.filter_kind(LogKind::Failure).count(), 1);
}

#[test]
fn stops_on_first_error() {
    let mut tracker = StatusTracker::with_error_behavior(ErrorBehavior::StopOnFirstError);

    log_item!("test1", "test item 1", "test func").informational(&mut tracker);

    let err = log_item!("test2", "test item 2 from macro", "test func")
        .failure(&mut tracker, SampleError {})
        .unwrap_err();

    assert_eq!(err, SampleError {});
    assert_eq!(tracker.logged_items().len(), 2);
}

#[test]
fn filter_kind_preserves_order() {
    let mut tracker = StatusTracker::default();

    log_item!("w1", "first warning", "test func").warning(&mut tracker);
    log_item!("i1", "info", "test func").informational(&mut tracker);
    log_item!("w2", "second warning", "test func").warning(&mut tracker);

    let warnings: Vec<&str> = tracker
        .filter_kind(LogKind::Warning)
        .map(|i| i.label.as_ref())
        .collect();

    assert_eq!(warnings, vec!["w1", "w2"]);
    assert_eq!(tracker.filter_kind(LogKind::Failure).count(), 0);
}

#[test]
fn append() {
    let mut tracker1 = StatusTracker::default();
    let mut tracker2 = StatusTracker::default();

    log_item!("test1", "test item 1", "test func").informational(&mut tracker1);

    log_item!("test2", "test item 1", "test func")
        .failure(&mut tracker2, SampleError {})
        .unwrap();

    tracker1.append(&tracker2);

    assert_eq!(tracker1.logged_items().len(), 2);
    assert_eq!(tracker2.logged_items().len(), 1);
    assert_eq!(tracker1.filter_kind(LogKind::Failure).count(), 1);
}

#[test]
fn scope_is_attached_to_items() {
    let mut tracker = StatusTracker::default();

    tracker.push_scope("C-ROOT");
    log_item!("test1", "inside scope", "test func").informational(&mut tracker);
    assert_eq!(tracker.pop_scope().as_deref(), Some("C-ROOT"));
    log_item!("test2", "outside scope", "test func").informational(&mut tracker);

    let items = tracker.logged_items();
    assert_eq!(items[0].scope.as_deref(), Some("C-ROOT"));
    assert_eq!(items[1].scope, None);
}

#[derive(Debug, Eq, PartialEq)]
struct SampleError {}

impl Display for SampleError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "SampleError")
    }
}
