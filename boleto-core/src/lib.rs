pub mod models;
pub mod session;
pub mod store;

pub use session::{SessionHandle, Session};
pub use store::CredentialStore;
