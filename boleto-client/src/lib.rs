pub mod auth;
pub mod bookings;
pub mod error;
pub mod events;
pub mod http;
pub mod payments;

pub use auth::{AuthApi, HttpAuthGateway};
pub use bookings::{BookingsApi, HttpBookingsGateway};
pub use error::ApiError;
pub use events::{EventsApi, HttpEventsGateway, ImageUpload};
pub use http::ApiClient;
pub use payments::{HttpPaymentsGateway, PaymentsApi};
