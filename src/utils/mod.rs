pub mod paths;
pub mod persist;
pub mod platform;
pub mod sanitize;
