//! Host integration: XDG directories, logger setup and desktop notifications.
pub mod logging;
pub mod notify;
pub mod paths;
