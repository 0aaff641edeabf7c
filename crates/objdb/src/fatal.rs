// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Handling for internal invariant violations.
//!
//! A broken property layout or ancestor chain means storage is corrupt. Continuing would spread
//! misattributed values to every descendant, so we log once and abort the operation by
//! panicking. Later violations are not logged again, to avoid flooding.

use std::sync::atomic::{AtomicBool, Ordering};

static INVARIANT_VIOLATION_REPORTED: AtomicBool = AtomicBool::new(false);

/// Report a corrupted-storage condition and abort.
#[cold]
#[track_caller]
pub fn invariant_violation(context: &str, details: &str) -> ! {
    if !INVARIANT_VIOLATION_REPORTED.swap(true, Ordering::SeqCst) {
        tracing::error!(
            "FATAL: object database invariant violated during {context}: {details}. \
            The object graph is in an unrecoverable state."
        );
    }
    panic!("object database invariant violated during {context}: {details}");
}
