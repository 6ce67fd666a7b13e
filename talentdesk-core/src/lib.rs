pub mod error;

pub mod config;

pub mod controller {

    pub mod actions;
    pub use actions::Action;

    pub mod action_dispatcher;
    pub use action_dispatcher::ActionDispatcher;

    pub mod keymap;
    pub use keymap::KeyMap;

    pub mod screen;
    pub use screen::{FilterCycle, Screen, TableScreen};

    pub mod screens;
}

pub mod model {
    pub mod data_table;
    pub use data_table::{PageSummary, TableModel};

    pub mod field;
    pub use field::{FieldValue, Record};

    pub mod list_query;
    pub use list_query::{QueryEngine, SortConfig, SortDirection};

    pub mod notifications;
    pub use notifications::{
        Notification, NotificationCenter, NotificationId, NotificationKind, NotificationOptions,
    };

    pub mod pagination;
    pub use pagination::Pagination;

    pub mod records;
    pub use records::Workspace;

    pub mod ui_state;
    pub use ui_state::{RedrawFlag, UIMode, UIState};
}

pub mod view {
    pub mod theme;

    pub mod ui;

    pub mod components {
        pub mod data_table;
        pub use data_table::{Column, DataTable};
        pub mod notification_overlay;
        pub use notification_overlay::NotificationOverlay;
        pub mod search_bar;
        pub use search_bar::SearchBar;
        pub mod status_bar;
        pub use status_bar::StatusBar;
    }

    pub use components::*;
}

pub mod logging;
pub use logging::LoggerBuilder;

pub mod util {
    pub mod debounce;
    pub use debounce::{DebounceConfig, Debouncer};
}

pub use error::AppError;

pub use model::{TableModel, UIState};
