pub mod scoring;
pub mod session_code;
pub mod win;

// Re-export main components
pub use scoring::*;
pub use session_code::*;
pub use win::*;
