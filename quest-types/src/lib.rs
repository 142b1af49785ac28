pub mod errors;
pub mod level;
pub mod session;
pub mod user;

// Re-export all types
pub use errors::*;
pub use level::*;
pub use session::*;
pub use user::*;
