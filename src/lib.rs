pub mod dashboard;
pub mod fetch;
pub mod process;
pub mod render;
