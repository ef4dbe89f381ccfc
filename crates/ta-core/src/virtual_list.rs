// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Windowed rendering of the match list
//!
//! Only `window_size` slots are ever materialized. The view is told the
//! full scrollable extent so it can present the window as part of a list
//! of any length.

use ta_config::DisplaySettings;
use ta_domain_types::Candidate;
use tracing::trace;
use unicode_width::UnicodeWidthStr;

use crate::cursor::Cursor;

/// Presentation layer driven by [`VirtualList`]
#[cfg_attr(test, mockall::automock)]
pub trait ListView: Send {
    /// Height of one rendered row, zero while it cannot be measured yet
    fn measure_row_height(&mut self) -> u32;
    /// Show `content` in slot `index`, or clear the slot
    fn set_slot(&mut self, index: usize, content: Option<Candidate>);
    /// Full scrollable extent and the window's offset into it
    fn set_window_extent(&mut self, total: u32, offset: u32);
    /// Move the highlighted slot
    fn set_highlight(&mut self, old: Option<usize>, new: Option<usize>);
    fn set_open(&mut self, open: bool);
    /// Minimum width of the list, in columns
    fn set_min_width(&mut self, columns: usize);
}

impl<T: ListView + ?Sized> ListView for Box<T> {
    fn measure_row_height(&mut self) -> u32 {
        (**self).measure_row_height()
    }

    fn set_slot(&mut self, index: usize, content: Option<Candidate>) {
        (**self).set_slot(index, content)
    }

    fn set_window_extent(&mut self, total: u32, offset: u32) {
        (**self).set_window_extent(total, offset)
    }

    fn set_highlight(&mut self, old: Option<usize>, new: Option<usize>) {
        (**self).set_highlight(old, new)
    }

    fn set_open(&mut self, open: bool) {
        (**self).set_open(open)
    }

    fn set_min_width(&mut self, columns: usize) {
        (**self).set_min_width(columns)
    }
}

/// Slot state mirrored from what the view currently shows
#[derive(Debug, Clone)]
pub struct VirtualList {
    window: usize,
    scrollbar_width: usize,
    measure_attempts: u32,
    slots: Vec<Option<Candidate>>,
    row_height: u32,
    highlight: Option<usize>,
    open: bool,
    width: usize,
    /// Whether the last sent min width left room for a scrollbar
    scrollbar: Option<bool>,
}

impl VirtualList {
    pub fn new(display: &DisplaySettings) -> Self {
        VirtualList {
            window: display.window_size,
            scrollbar_width: display.scrollbar_width,
            measure_attempts: display.measure_attempts,
            slots: vec![None; display.window_size],
            row_height: 0,
            highlight: None,
            open: false,
            width: 0,
            scrollbar: None,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// Forget the grown width, e.g. when the record type changes
    pub fn reset_width(&mut self) {
        self.width = 0;
        self.scrollbar = None;
    }

    /// Measure the row height if unknown, trying a bounded number of times
    pub fn ensure_row_height<V: ListView + ?Sized>(&mut self, view: &mut V) -> u32 {
        let mut attempts = 0;
        while self.row_height == 0 && attempts < self.measure_attempts {
            self.row_height = view.measure_row_height();
            attempts += 1;
        }
        self.row_height
    }

    /// Bring the view in line with `matches` and `cursor`. Returns whether
    /// the list is open afterwards.
    pub fn repaint<V: ListView + ?Sized>(
        &mut self,
        view: &mut V,
        matches: &[Candidate],
        cursor: &Cursor,
        token: &str,
    ) -> bool {
        trace!(
            matches = matches.len(),
            scroll = cursor.scroll_offset,
            row = ?cursor.current_row,
            "repaint"
        );
        let row_height = self.ensure_row_height(view);

        for (i, shown) in self.slots.iter_mut().enumerate() {
            let wanted = matches.get(cursor.scroll_offset + i);
            if shown.as_ref() != wanted {
                *shown = wanted.cloned();
                view.set_slot(i, wanted.cloned());
            }
        }

        view.set_window_extent(
            row_height.saturating_mul(to_u32(matches.len())),
            row_height.saturating_mul(to_u32(cursor.scroll_offset)),
        );

        let highlight = cursor.highlight(self.window);
        if highlight != self.highlight {
            view.set_highlight(self.highlight, highlight);
            self.highlight = highlight;
        }

        self.grow_width(view, matches, cursor);

        let open = match matches {
            [] => false,
            [only] => only.name != token,
            _ => true,
        };
        self.set_open(view, open);
        open
    }

    /// Close the list if it is open
    pub fn close<V: ListView + ?Sized>(&mut self, view: &mut V) {
        self.set_open(view, false);
    }

    fn set_open<V: ListView + ?Sized>(&mut self, view: &mut V, open: bool) {
        if self.open != open {
            self.open = open;
            view.set_open(open);
        }
    }

    /// Grow the list to its widest visible row. The view's min width
    /// leaves out the scrollbar allowance while matches exceed the window,
    /// so it is sent again whenever the scrollbar comes or goes.
    fn grow_width<V: ListView + ?Sized>(
        &mut self,
        view: &mut V,
        matches: &[Candidate],
        cursor: &Cursor,
    ) {
        let scrollbar = matches.len() > self.window;
        let allowance = if scrollbar { self.scrollbar_width } else { 0 };
        let widest = matches
            .iter()
            .skip(cursor.scroll_offset)
            .take(self.window)
            .map(|c| c.name.width())
            .max()
            .unwrap_or(0);
        let width = widest + allowance;
        let grown = width > self.width;
        if grown {
            self.width = width;
        }
        if grown || self.scrollbar != Some(scrollbar) {
            self.scrollbar = Some(scrollbar);
            view.set_min_width(self.width.saturating_sub(allowance));
        }
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    fn display(window_size: usize) -> DisplaySettings {
        DisplaySettings {
            window_size,
            ..DisplaySettings::default()
        }
    }

    fn matches(names: &[&str]) -> Vec<Candidate> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Candidate::new(*n, i as i64 + 1))
            .collect()
    }

    fn relaxed_view() -> MockListView {
        let mut view = MockListView::new();
        view.expect_measure_row_height().return_const(20u32);
        view.expect_set_slot().return_const(());
        view.expect_set_window_extent().return_const(());
        view.expect_set_highlight().return_const(());
        view.expect_set_open().return_const(());
        view.expect_set_min_width().return_const(());
        view
    }

    #[test]
    fn only_changed_slots_are_updated() {
        let list_matches = matches(&["Agaricus", "Amanita", "Boletus"]);
        let mut list = VirtualList::new(&display(10));

        let mut view = MockListView::new();
        view.expect_measure_row_height().times(1).return_const(20u32);
        view.expect_set_slot().times(3).return_const(());
        view.expect_set_window_extent().with(eq(60), eq(0)).times(2).return_const(());
        view.expect_set_highlight().times(0);
        view.expect_set_open().with(eq(true)).times(1).return_const(());
        view.expect_set_min_width().with(eq(8)).times(1).return_const(());

        let cursor = Cursor::default();
        assert!(list.repaint(&mut view, &list_matches, &cursor, "a"));
        assert!(list.repaint(&mut view, &list_matches, &cursor, "a"));
        view.checkpoint();
    }

    #[test]
    fn scrolling_rewrites_visible_slots_and_extent() {
        let names: Vec<String> = (0..25).map(|i| format!("Name {i:02}")).collect();
        let list_matches: Vec<Candidate> =
            names.iter().map(|n| Candidate::new(n.clone(), 1)).collect();
        let mut list = VirtualList::new(&display(10));
        let mut view = relaxed_view();
        list.repaint(&mut view, &list_matches, &Cursor::default(), "n");

        let mut view = MockListView::new();
        view.expect_measure_row_height().times(0);
        view.expect_set_slot().times(10).return_const(());
        view.expect_set_window_extent().with(eq(500), eq(100)).times(1).return_const(());
        view.expect_set_highlight().with(eq(None), eq(Some(2))).times(1).return_const(());
        view.expect_set_open().times(0);
        view.expect_set_min_width().times(0);

        let cursor = Cursor {
            current_row: Some(7),
            scroll_offset: 5,
        };
        list.repaint(&mut view, &list_matches, &cursor, "n");
        assert_eq!(list.highlight(), Some(2));
        assert_eq!(list.width(), 8);
    }

    #[test]
    fn single_match_equal_to_token_closes() {
        let mut list = VirtualList::new(&display(10));
        let mut view = relaxed_view();
        let two = matches(&["Agaricus", "Amanita"]);
        assert!(list.repaint(&mut view, &two, &Cursor::default(), "a"));
        assert!(!list.repaint(&mut view, &matches(&["Agaricus"]), &Cursor::default(), "Agaricus"));
        assert!(list.repaint(&mut view, &matches(&["Agaricus"]), &Cursor::default(), "Agar"));
        assert!(!list.repaint(&mut view, &[], &Cursor::default(), "Agar"));
        assert!(!list.is_open());
    }

    #[test]
    fn row_height_measurement_is_bounded_and_retried() {
        let mut list = VirtualList::new(&display(10));
        let mut view = MockListView::new();
        view.expect_measure_row_height().times(3).return_const(0u32);
        assert_eq!(list.ensure_row_height(&mut view), 0);
        view.checkpoint();

        let mut heights = vec![18u32, 0];
        view.expect_measure_row_height().times(2).returning(move || heights.pop().unwrap_or(0));
        assert_eq!(list.ensure_row_height(&mut view), 18);
        assert_eq!(list.ensure_row_height(&mut view), 18);
    }

    #[test]
    fn min_width_is_resent_when_the_scrollbar_goes_away() {
        let mut list = VirtualList::new(&display(2));
        let mut view = relaxed_view();
        list.repaint(&mut view, &matches(&["Agaricus", "B", "C"]), &Cursor::default(), "a");
        assert_eq!(list.width(), 9);

        let mut view = MockListView::new();
        view.expect_set_slot().return_const(());
        view.expect_set_window_extent().return_const(());
        view.expect_set_highlight().return_const(());
        view.expect_set_open().return_const(());
        view.expect_set_min_width().with(eq(9)).times(1).return_const(());
        list.repaint(&mut view, &matches(&["Agaricus", "B"]), &Cursor::default(), "a");
        view.checkpoint();

        view.expect_set_slot().return_const(());
        view.expect_set_window_extent().return_const(());
        view.expect_set_highlight().return_const(());
        view.expect_set_open().return_const(());
        view.expect_set_min_width().times(0);
        list.repaint(&mut view, &matches(&["Agaricus", "C"]), &Cursor::default(), "a");
        view.checkpoint();
    }

    #[test]
    fn width_grows_but_never_shrinks() {
        let mut list = VirtualList::new(&display(2));
        let mut view = relaxed_view();
        let wide = matches(&["Agaricus campestris", "Amanita"]);
        list.repaint(&mut view, &wide, &Cursor::default(), "a");
        assert_eq!(list.width(), 19);
        list.repaint(&mut view, &matches(&["A", "B", "C"]), &Cursor::default(), "a");
        assert_eq!(list.width(), 19);
        list.reset_width();
        list.repaint(&mut view, &matches(&["Ab", "B", "C"]), &Cursor::default(), "a");
        assert_eq!(list.width(), 3);
    }
}
