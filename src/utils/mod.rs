pub mod lib;
pub mod time;
