// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Plain-text rendering of a field's list window

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ta_core::ListView;
use ta_domain_types::Candidate;

#[derive(Debug, Default)]
struct Window {
    slots: Vec<Option<Candidate>>,
    highlight: Option<usize>,
    open: bool,
    min_width: usize,
    total: u32,
    offset: u32,
}

/// List view backed by a shared buffer; clones see the same window
#[derive(Debug, Clone, Default)]
pub struct ConsoleView {
    window: Arc<Mutex<Window>>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    fn window(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_open(&self) -> bool {
        self.window().open
    }

    /// The visible rows, the highlighted one marked with `>`
    pub fn render(&self) -> String {
        let window = self.window();
        if !window.open {
            return String::new();
        }
        let width = window.min_width;
        let mut out = String::new();
        for (i, slot) in window.slots.iter().enumerate() {
            let Some(candidate) = slot else {
                continue;
            };
            let marker = if window.highlight == Some(i) { '>' } else { ' ' };
            out.push_str(&format!("{marker} {:<width$}  #{}\n", candidate.name, candidate.id));
        }
        if window.total > 0 && window.offset > 0 {
            out.push_str(&format!("  (scrolled {}/{})\n", window.offset, window.total));
        }
        out
    }
}

impl ListView for ConsoleView {
    fn measure_row_height(&mut self) -> u32 {
        1
    }

    fn set_slot(&mut self, index: usize, content: Option<Candidate>) {
        let mut window = self.window();
        if window.slots.len() <= index {
            window.slots.resize(index + 1, None);
        }
        window.slots[index] = content;
    }

    fn set_window_extent(&mut self, total: u32, offset: u32) {
        let mut window = self.window();
        window.total = total;
        window.offset = offset;
    }

    fn set_highlight(&mut self, _old: Option<usize>, new: Option<usize>) {
        self.window().highlight = new;
    }

    fn set_open(&mut self, open: bool) {
        self.window().open = open;
    }

    fn set_min_width(&mut self, columns: usize) {
        self.window().min_width = columns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_open_window_with_highlight() {
        let mut view = ConsoleView::new();
        view.set_slot(0, Some(Candidate::new("Albion", 1)));
        view.set_slot(1, Some(Candidate::new("Corvallis", 2)));
        view.set_min_width(9);
        view.set_highlight(None, Some(1));
        assert_eq!(view.render(), "");

        view.set_open(true);
        assert_eq!(view.render(), "  Albion     #1\n> Corvallis  #2\n");
    }
}
