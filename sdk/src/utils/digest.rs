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

//! Digest value convenience functions.

use ::base64::{engine::general_purpose, Engine as _};

/// Decode a digest value given either as hex or as Base64.
///
/// Hex is tried first since every hex string of even length is also a
/// syntactically valid Base64 string.
pub(crate) fn decode_digest(value: &str) -> Option<Vec<u8>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    hex::decode(value)
        .ok()
        .or_else(|| general_purpose::STANDARD.decode(value).ok())
}

/// Returns `true` if both encoded digests decode to the same bytes.
pub(crate) fn digests_match(a: &str, b: &str) -> bool {
    match (decode_digest(a), decode_digest(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_base64_compare_equal() {
        assert!(digests_match("01020304", "AQIDBA=="));
        assert!(digests_match("0A0B", "0a0b"));
    }

    #[test]
    fn mismatch_and_garbage() {
        assert!(!digests_match("01020304", "01020305"));
        assert!(!digests_match("", ""));
        assert!(!digests_match("not a digest!", "not a digest!"));
    }
}
