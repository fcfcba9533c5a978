/// Parse check command.
pub mod check;
/// JSON dump command.
pub mod dump;
/// File summary command.
pub mod info;
/// Load-and-write-back command.
pub mod resave;

mod util;

pub use util::Result;
