//! Bookflow Common Library
//!
//! Verification model for the booking flow: expected dates and payment
//! splits are computed here, independently of the UI, and compared with what
//! the booking app renders.

pub mod booking;
pub mod check;
pub mod date_format;
pub mod error;
pub mod money;

// Re-export commonly used types
pub use booking::{CardDetails, DateRange, Guest};
pub use date_format::{
    format_date, parse_display_date, DateFormat, DayStyle, MonthStyle, WeekdayStyle, YearStyle,
};
pub use error::{Result, VerifyError};
pub use money::{parse_amount, pay_button_label, Money, PaymentBreakdown};

/// Bookflow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
