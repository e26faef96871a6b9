pub mod config_store;
pub mod defaults;
pub mod fsutil;
pub mod history;
pub mod runtime_engine;
pub mod secrets;
pub mod solver;
pub mod solver_router;
