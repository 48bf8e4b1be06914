// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Competitive group model, invite codes, and invite-reference parsing.

use rand::distributions::{Alphanumeric, DistString};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Characters usable in invite codes. Excludes `I`, `O`, `0` and `1`,
/// which are easy to misread when shared over a screenshot or read aloud.
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a shareable invite code.
pub const INVITE_CODE_LEN: usize = 6;

const GROUP_ID_LEN: usize = 20;

/// Competitive group stored in the `groups` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Opaque unique identifier (also used as document ID)
    pub id: String,
    /// Group name; non-empty
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The member with rename/delete authority; always present in `member_ids`
    pub admin_id: String,
    /// Shareable join code, unique across live groups
    pub invite_code: String,
    /// Member user ids, including the admin
    pub member_ids: Vec<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl Group {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == user_id)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_id == user_id
    }

    /// Deep link for sharing this group's invite code.
    pub fn share_link(&self, scheme: &str) -> String {
        format!("{}://join/{}", scheme, self.invite_code)
    }
}

/// Generate a fresh invite code. Uniqueness against live groups is checked
/// by the caller, which retries on collision.
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Generate an opaque group document id.
pub fn new_group_id() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), GROUP_ID_LEN)
}

/// Extract an invite code from user-provided input.
///
/// Accepts a bare 6-character code, a deep link (`paceline://join/<code>`),
/// or a query-string form (`...?code=<code>`). The input may be a whole
/// pasted share message; the recognized markers are searched for anywhere in
/// it rather than requiring an exact match. Returns the uppercased code, or
/// `None` if nothing in the input resembles one.
pub fn parse_invite_reference(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.chars().count() == INVITE_CODE_LEN && trimmed.chars().all(is_code_char) {
        return Some(trimmed.to_ascii_uppercase());
    }

    // ASCII lowercasing preserves byte offsets, so marker positions found in
    // the lowered copy index directly into the original input.
    let lowered = input.to_ascii_lowercase();
    for marker in ["join/", "code="] {
        let mut search_from = 0;
        while let Some(found) = lowered[search_from..].find(marker) {
            let code_start = search_from + found + marker.len();
            if let Some(code) = code_following(&input[code_start..]) {
                return Some(code);
            }
            search_from += found + marker.len();
        }
    }

    None
}

/// Read exactly `INVITE_CODE_LEN` code characters from the front of `rest`.
fn code_following(rest: &str) -> Option<String> {
    let mut code = String::with_capacity(INVITE_CODE_LEN);
    for c in rest.chars() {
        if !is_code_char(c) {
            break;
        }
        code.push(c.to_ascii_uppercase());
        if code.len() == INVITE_CODE_LEN {
            return Some(code);
        }
    }
    None
}

fn is_code_char(c: char) -> bool {
    c.is_ascii() && INVITE_CODE_ALPHABET.contains(&(c.to_ascii_uppercase() as u8))
}
