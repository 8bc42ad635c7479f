use async_trait::async_trait;
use boleto_core::models::{Booking, CreateBookingRequest};

use crate::error::ApiError;
use crate::http::ApiClient;

#[async_trait]
pub trait BookingsApi: Send + Sync {
    /// Asks the backend to create a booking. The matching payment record is
    /// materialized asynchronously; see the payments gateway.
    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, ApiError>;

    async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, ApiError>;
}

#[derive(Clone)]
pub struct HttpBookingsGateway {
    client: ApiClient,
}

impl HttpBookingsGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BookingsApi for HttpBookingsGateway {
    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, ApiError> {
        ApiClient::send_json(self.client.post("/bookings/registrar").json(request)).await
    }

    async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, ApiError> {
        ApiClient::send_json(self.client.get(&format!("/bookings/user/{}", user_id))).await
    }
}
