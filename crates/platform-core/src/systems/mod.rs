pub mod collision;
pub mod contact_filter;
pub mod geometry;
pub mod hooks;
pub mod notify;
