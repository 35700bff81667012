//! Terminal front end: interactive converter and one-shot commands

pub mod convert;
pub mod rate;
pub mod setup;
pub mod ui;
pub mod watch;
