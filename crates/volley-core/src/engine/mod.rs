pub mod aggregator;
pub mod collector;
pub mod controller;
pub mod executor;
pub mod worker;

pub use aggregator::summarize;
pub use collector::{outcome_channel, OutcomeReceiver, ResultCollector};
pub use controller::{execute_run, run, run_with_executor};
pub use executor::{Executor, HttpExecutor, TIMEOUT_ERROR};
