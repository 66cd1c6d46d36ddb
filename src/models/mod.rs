pub mod git;
pub mod hook;
pub mod input;

pub use git::GitStatus;
pub use hook::HookJson;
pub use input::StatusInput;
