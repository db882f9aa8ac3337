pub mod batch;
pub mod catalog;
pub mod display;
pub mod edit;
pub mod format;
pub mod io;
pub mod keys;
pub mod thumbnail;
