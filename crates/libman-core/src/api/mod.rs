//! Construction of the manager and the context shared by handlers.

mod builder;
mod state;

pub use builder::LibraryManagerBuilder;
pub use state::HandlerContext;
