pub mod controller;
pub mod memory;
pub mod session;
pub mod traits;
