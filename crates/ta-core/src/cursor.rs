// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Cursor and scroll position over the match list
//!
//! Invariant after every operation: `scroll_offset <= max(0, len - window)`
//! and, with a current row, `scroll_offset <= row < scroll_offset + window`.

use ta_domain_types::Candidate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Logical index into the matches
    pub current_row: Option<usize>,
    /// First visible logical index
    pub scroll_offset: usize,
}

impl Cursor {
    /// Move by `rows` (negative is up), keeping the row visible.
    /// Returns whether anything changed.
    pub fn move_by(&mut self, rows: isize, len: usize, window: usize) -> bool {
        let old = *self;
        let old_row = self.current_row.map_or(-1, |r| r as isize);
        let len = len as isize;
        let window = window as isize;

        let mut row = old_row.saturating_add(rows);
        if row < 0 {
            row = if old_row < 0 { -1 } else { 0 };
        }
        if row >= len {
            row = len - 1;
        }

        let mut scroll = (self.scroll_offset as isize).min(row).max(0);
        if row >= scroll + window {
            scroll = row - window + 1;
        }

        self.current_row = usize::try_from(row).ok();
        self.scroll_offset = scroll as usize;
        *self != old
    }

    /// Forget the current row without moving the window
    pub fn clear_row(&mut self) {
        self.current_row = None;
    }

    /// Re-seed after the matches were replaced: the row is the exact match
    /// of `previous`, else the longest match that is a prefix of it. The
    /// window moves as little as possible.
    pub fn reseed(&mut self, matches: &[Candidate], previous: Option<&str>, window: usize) {
        let mut exact = None;
        let mut partial: Option<usize> = None;
        if let Some(previous) = previous.filter(|p| !p.is_empty()) {
            for (i, candidate) in matches.iter().enumerate() {
                if candidate.name == previous {
                    exact = Some(i);
                    break;
                }
                let longer = partial.map_or(true, |p| candidate.name.len() > matches[p].name.len());
                if !candidate.name.is_empty()
                    && previous.starts_with(candidate.name.as_str())
                    && longer
                {
                    partial = Some(i);
                }
            }
        }
        let row = exact.or(partial);

        let target = row.map_or(-1, |r| r as isize);
        let len = matches.len() as isize;
        let window = window as isize;
        let mut scroll = self.scroll_offset as isize;
        if scroll > target {
            scroll = target;
        }
        if scroll > len - window {
            scroll = len - window;
        }
        if scroll < target - window + 1 {
            scroll = target - window + 1;
        }

        self.current_row = row;
        self.scroll_offset = scroll.max(0) as usize;
    }

    /// Scroll the window externally (e.g. by dragging a scrollbar),
    /// pulling the row into view. Returns whether anything changed.
    pub fn scroll_to(&mut self, offset: usize, len: usize, window: usize) -> bool {
        if len == 0 {
            return false;
        }
        let old = *self;
        let scroll = offset.min(len.saturating_sub(window));
        let last_visible = (scroll + window - 1).min(len - 1);
        let row = self.current_row.map_or(scroll, |r| r.clamp(scroll, last_visible));

        self.scroll_offset = scroll;
        self.current_row = Some(row);
        *self != old
    }

    /// Offset of the current row inside the window, if visible
    pub fn highlight(&self, window: usize) -> Option<usize> {
        self.current_row
            .and_then(|row| row.checked_sub(self.scroll_offset))
            .filter(|offset| *offset < window)
    }

    /// Whether the window invariant holds for `len` matches
    pub fn is_consistent(&self, len: usize, window: usize) -> bool {
        let scroll_ok = self.scroll_offset <= len.saturating_sub(window);
        let row_ok = self.current_row.map_or(true, |row| {
            row < len && self.scroll_offset <= row && row < self.scroll_offset + window
        });
        scroll_ok && row_ok
    }
}
