// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Email syntax check.
//!
//! Same acceptance as `^[^\s@]+@[^\s@]+\.[^\s@]+$`: no whitespace anywhere,
//! exactly one `@`, a non-empty local part, and a domain holding some dot
//! with characters on both sides. No length limit and no TLD rules, so
//! `user@example.com.` passes.

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
