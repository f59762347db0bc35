pub mod config;
pub mod mood;
pub mod text;
pub mod types;
pub mod window;

// Keep the public surface small and intentional.
pub use config::*;
pub use mood::*;
pub use text::*;
pub use types::*;
pub use window::*;
