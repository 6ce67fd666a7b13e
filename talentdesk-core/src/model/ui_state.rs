//! src/model/ui_state.rs
//! ============================================================================
//! # UI state: input mode, search input line, active tab, redraw flags
//!
//! Table data lives in each screen's `TableModel`; this struct only holds
//! what the terminal front end needs between frames.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use compact_str::CompactString;
use ratatui::layout::Rect;

/// Atomic redraw flags for lock-free UI updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RedrawFlag {
    Table = 1,
    StatusBar = 2,
    Search = 4,
    Notification = 8,
    All = 15,
}

impl RedrawFlag {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum UIMode {
    #[default]
    Browse = 0,
    /// Keystrokes edit the search line
    Search = 1,
}

#[derive(Debug)]
pub struct UIState {
    pub redraw_flags: AtomicU32,
    pub frame_count: AtomicU64,

    pub mode: UIMode,
    pub active_tab: usize,

    pub input: CompactString,
    /// Byte offset into `input`, always on a char boundary
    pub input_cursor: usize,

    /// Where the table was last drawn, for mouse hit-testing
    pub table_area: Rect,
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}

impl UIState {
    pub fn new() -> Self {
        Self {
            redraw_flags: AtomicU32::new(u32::from(RedrawFlag::All.bits())),
            frame_count: AtomicU64::new(0),
            mode: UIMode::Browse,
            active_tab: 0,
            input: CompactString::const_new(""),
            input_cursor: 0,
            table_area: Rect::default(),
        }
    }

    #[inline]
    pub fn request_redraw(&self, flag: RedrawFlag) {
        self.redraw_flags
            .fetch_or(u32::from(flag.bits()), Ordering::Relaxed);
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw_flags.load(Ordering::Relaxed) != 0
    }

    #[inline]
    pub fn clear_redraw(&self) {
        self.redraw_flags.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_frame(&self) {
        self.frame_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn enter_search(&mut self) {
        self.mode = UIMode::Search;
        self.input_cursor = self.input.len();
        self.request_redraw(RedrawFlag::Search);
    }

    /// Leaves search mode; the typed term stays applied.
    pub fn exit_search(&mut self) {
        self.mode = UIMode::Browse;
        self.request_redraw(RedrawFlag::Search);
    }

    pub fn clear_input(&mut self) {
        self.input = CompactString::const_new("");
        self.input_cursor = 0;
        self.request_redraw(RedrawFlag::Search);
    }

    pub fn set_input(&mut self, text: impl Into<CompactString>) {
        self.input = text.into();
        self.input_cursor = self.input.len();
        self.request_redraw(RedrawFlag::Search);
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut input_str = self.input.to_string();
        input_str.insert(self.input_cursor, ch);
        self.input = input_str.into();
        self.input_cursor += ch.len_utf8();
        self.request_redraw(RedrawFlag::Search);
    }

    pub fn delete_char_before(&mut self) -> bool {
        let Some((char_pos, _)) = self.input[..self.input_cursor].char_indices().next_back()
        else {
            return false;
        };

        let mut input_str = self.input.to_string();
        input_str.remove(char_pos);
        self.input = input_str.into();
        self.input_cursor = char_pos;
        self.request_redraw(RedrawFlag::Search);
        true
    }

    pub fn move_cursor_left(&mut self) {
        if let Some((pos, _)) = self.input[..self.input_cursor].char_indices().next_back() {
            self.input_cursor = pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(ch) = self.input[self.input_cursor..].chars().next() {
            self.input_cursor += ch.len_utf8();
        }
    }
}
