pub mod api;
pub mod backend;
pub mod input;
pub mod output;
