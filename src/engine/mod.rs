//! Core engine: the fetch → grade → order tick loop.

pub mod executor;
pub mod scanner;

pub use executor::Executor;
pub use scanner::{OrderOutcome, Scanner, SymbolOutcome, TickReport};
