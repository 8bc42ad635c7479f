pub mod orchestrator;
pub mod ports;

pub use orchestrator::{CheckoutError, CheckoutOrchestrator, CheckoutOutcome, CheckoutPhase};
pub use ports::{Navigator, NavigationError, Sleeper, TokioSleeper};
