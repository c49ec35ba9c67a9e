pub mod core;
pub mod data;
pub mod navigation;
pub mod session;
