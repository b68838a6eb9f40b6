mod command;
pub mod get;
mod reply;
pub mod set;

pub use command::{args_from_frame, CommandTable, Handler};
pub use get::Get;
pub use reply::Reply;
pub use set::Set;
