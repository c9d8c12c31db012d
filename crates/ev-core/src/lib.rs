pub mod command;
pub mod database;
pub mod error;
pub mod table;

pub use command::*;
pub use database::*;
pub use error::EventError;
pub use table::CommandTable;
