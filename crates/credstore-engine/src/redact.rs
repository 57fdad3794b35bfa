// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Masking for values shown on a terminal.

/// Values shorter than this are fully masked.
const MIN_PARTIAL_LEN: usize = 10;

/// Mask a secret value for display.
///
/// Shows the first 4 and last 4 characters for values of 10 or more
/// characters (e.g., `sk-a...wxyz`); shorter values are fully masked as `****`.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < MIN_PARTIAL_LEN {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
