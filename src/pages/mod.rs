pub mod challenge;
pub mod explore;
pub mod home;
pub mod not_found;
pub mod timed;
