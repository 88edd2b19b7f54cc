//! Handler modules for inkwell-api.
//!
//! Each entity gets its own module; handlers translate HTTP input into
//! repository calls, enforce ownership, and shape envelope responses.

pub mod auth;
pub mod folders;
pub mod notes;
pub mod tags;
pub mod users;
