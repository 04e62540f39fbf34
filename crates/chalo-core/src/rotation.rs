// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

use std::collections::BTreeSet;

/// Successful category swaps after which every exclusion is forgiven.
pub const AMNESTY_TURNS: u32 = 5;

/// Categories recently swapped away from during one editing session.
///
/// Advisory only: the provider applies its own exclusion rules, this state
/// is kept for display and never sent with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRotation {
    excluded: BTreeSet<String>,
    turns_since_reset: u32,
}

impl CategoryRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful swap away from `old_category`.
    pub fn record_swap(&mut self, old_category: &str) {
        self.excluded.insert(old_category.to_string());
        self.turns_since_reset += 1;

        if self.turns_since_reset >= AMNESTY_TURNS {
            log::debug!(
                "Category rotation amnesty — forgiven={}",
                self.excluded.len()
            );
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.excluded.clear();
        self.turns_since_reset = 0;
    }

    pub fn is_excluded(&self, category: &str) -> bool {
        self.excluded.contains(category)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    pub fn turns_since_reset(&self) -> u32 {
        self.turns_since_reset
    }
}
