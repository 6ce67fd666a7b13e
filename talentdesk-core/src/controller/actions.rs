//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Application Commands
//!
//! Defines the `Action` enum, which represents all user inputs and internal
//! events the console responds to. Terminal events are mapped to actions by
//! [`crate::controller::keymap`]; debounced search terms, sort callbacks and
//! background loads arrive as actions through the same channel.

use compact_str::CompactString;

use crate::model::{list_query::SortDirection, records::Workspace};

#[derive(Debug, Clone)]
pub enum Action {
    /// Header clicked; the screen's sort callback answers with `ApplySort`.
    ClickHeader(usize),

    /// Mouse click at terminal coordinates.
    Click { x: u16, y: u16 },

    /// Leave search mode, keeping the typed term.
    ExitSearch,

    /// Start editing the search line.
    EnterSearch,

    ApplySort {
        tab: usize,
        key: CompactString,
        direction: SortDirection,
    },

    /// Clear filters and the search term of the active screen.
    ClearFilters,

    /// Advance the active screen's primary filter to its next value.
    CycleFilter,

    DeleteChar,

    CursorLeft,

    CursorRight,

    DismissAll,

    /// Dismiss the most recent toast.
    DismissNewest,

    FirstPage,

    InsertChar(char),

    LastPage,

    MoveDown,

    MoveUp,

    NextPage,

    NextTab,

    /// No operation. Used when an event is consumed but no state change is needed.
    NoOp,

    PrevPage,

    PrevTab,

    /// Quit the application.
    Quit,

    /// Re-read the workspace file in the background.
    Reload,

    /// A terminal resize event.
    Resize(u16, u16),

    /// Debounced search term for screen `tab`, typed during search `epoch`.
    SearchSettled {
        epoch: u64,
        tab: usize,
        term: CompactString,
    },

    /// An internal tick event for periodic updates.
    Tick,

    /// Result of a background workspace load.
    WorkspaceLoaded(Result<Box<Workspace>, CompactString>),
}
