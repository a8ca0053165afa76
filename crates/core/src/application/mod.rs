// Application Layer - Use Cases and Business Logic

pub mod boot;
pub mod pid_book;
pub mod token_store;

// Re-exports
pub use boot::{ActionResult, BootOrchestrator, BootPorts, BootSettings, BootTiming, TradeAppSettings};
pub use pid_book::PidBook;
pub use token_store::TokenStore;
