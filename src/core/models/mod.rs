pub mod cost;
pub mod event;
