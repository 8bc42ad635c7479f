use async_trait::async_trait;
use boleto_core::models::{PaymentRecord, ProviderOrder};

use crate::error::ApiError;
use crate::http::ApiClient;

#[async_trait]
pub trait PaymentsApi: Send + Sync {
    /// Returns the payment records for a booking. Empty while the backend is
    /// still materializing the record.
    async fn payments_for_booking(&self, booking_id: i64) -> Result<Vec<PaymentRecord>, ApiError>;

    /// Opens a payment session with the external provider and returns its
    /// hypermedia links.
    async fn initiate(&self, payment_id: i64, method: &str) -> Result<ProviderOrder, ApiError>;

    /// Finalizes a payment after the provider redirected back with `token`.
    async fn capture(&self, token: &str, method: &str) -> Result<(), ApiError>;

    /// Tells the backend the user abandoned payment at the provider.
    async fn cancel(&self, token: &str) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct HttpPaymentsGateway {
    client: ApiClient,
}

impl HttpPaymentsGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentsApi for HttpPaymentsGateway {
    async fn payments_for_booking(&self, booking_id: i64) -> Result<Vec<PaymentRecord>, ApiError> {
        ApiClient::send_json(self.client.get(&format!("/payments/booking/{}", booking_id))).await
    }

    async fn initiate(&self, payment_id: i64, method: &str) -> Result<ProviderOrder, ApiError> {
        ApiClient::send_json(
            self.client
                .post(&format!("/payments/{}/initiate", payment_id))
                .query(&[("method", method)]),
        )
        .await
    }

    async fn capture(&self, token: &str, method: &str) -> Result<(), ApiError> {
        ApiClient::send_unit(
            self.client
                .post("/payments/capture")
                .query(&[("token", token), ("method", method)]),
        )
        .await
    }

    async fn cancel(&self, token: &str) -> Result<(), ApiError> {
        ApiClient::send_unit(self.client.post("/payments/cancel").query(&[("token", token)]))
            .await
    }
}
