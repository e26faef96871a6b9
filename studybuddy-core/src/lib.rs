pub mod config;
pub mod prompts;
pub mod solve;
pub mod text;
pub mod types;

// Keep the public surface small and intentional.
pub use config::*;
pub use prompts::*;
pub use solve::*;
pub use text::*;
pub use types::*;
