//! Application constants.
//!
//! Centralizes magic numbers and default values for better maintainability.

/// Record defaults applied when the user leaves an optional field blank.
pub mod defaults {
    /// Default event time.
    pub const EVENT_TIME: &str = "10:00";

    /// Default event location.
    pub const EVENT_LOCATION: &str = "TBD";

    /// Event type written for user-added schedule items.
    pub const EVENT_TYPE: &str = "spot";

    /// Expense item name when none is given.
    pub const EXPENSE_ITEM: &str = "Untitled";

    /// Payer recorded on new expenses.
    pub const EXPENSE_PAYER: &str = "Me";

    /// Cover emoji picked at random for new trips.
    pub const COVER_EMOJIS: [&str; 5] = ["🇯🇵", "🇹🇭", "🇺🇸", "🇰🇷", "🇫🇷"];
}

/// Async task constants.
pub mod async_tasks {
    /// Channel buffer size for async task communication.
    pub const CHANNEL_BUFFER_SIZE: usize = 64;
}

/// UI layout constants.
pub mod ui {
    /// Height of the trip header block.
    pub const HEADER_HEIGHT: u16 = 3;

    /// Height of the tab bar.
    pub const TAB_BAR_HEIGHT: u16 = 3;

    /// Width of the add-record form modal.
    pub const FORM_WIDTH: u16 = 56;
}
