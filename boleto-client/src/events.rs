use async_trait::async_trait;
use boleto_core::models::{CreateEventRequest, EventDetail, EventSummary, UpdateEventRequest};
use reqwest::multipart::{Form, Part};

use crate::error::ApiError;
use crate::http::ApiClient;

#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn active_events(&self) -> Result<Vec<EventSummary>, ApiError>;
    async fn event_by_id(&self, id: i64) -> Result<EventDetail, ApiError>;
}

/// Image payload for event creation: the raw bytes plus the filename the
/// multipart part is labelled with.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct HttpEventsGateway {
    client: ApiClient,
}

impl HttpEventsGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Creates an event. The backend expects multipart: an `event` part with
    /// the JSON payload and an optional `image` file part.
    pub async fn create_event(
        &self,
        request: &CreateEventRequest,
        image: Option<ImageUpload>,
    ) -> Result<EventDetail, ApiError> {
        let event_json =
            serde_json::to_string(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let mut form = Form::new().text("event", event_json);
        if let Some(image) = image {
            form = form.part("image", Part::bytes(image.bytes).file_name(image.filename));
        }
        ApiClient::send_json(self.client.post("/events").multipart(form)).await
    }

    pub async fn update_event(
        &self,
        id: i64,
        request: &UpdateEventRequest,
    ) -> Result<EventDetail, ApiError> {
        ApiClient::send_json(self.client.patch(&format!("/events/{}", id)).json(request)).await
    }

    pub async fn change_status(&self, id: i64, status: &str) -> Result<(), ApiError> {
        ApiClient::send_unit(
            self.client
                .patch(&format!("/events/{}/status", id))
                .query(&[("status", status)]),
        )
        .await
    }

    pub async fn reduce_slots(&self, id: i64, quantity: u32) -> Result<(), ApiError> {
        ApiClient::send_unit(
            self.client
                .post(&format!("/events/{}/reduce-slots", id))
                .query(&[("quantity", quantity)]),
        )
        .await
    }

    pub async fn delete_event(&self, id: i64) -> Result<(), ApiError> {
        ApiClient::send_unit(self.client.delete(&format!("/events/{}", id))).await
    }
}

#[async_trait]
impl EventsApi for HttpEventsGateway {
    async fn active_events(&self) -> Result<Vec<EventSummary>, ApiError> {
        ApiClient::send_json(self.client.get("/events/active")).await
    }

    async fn event_by_id(&self, id: i64) -> Result<EventDetail, ApiError> {
        ApiClient::send_json(self.client.get(&format!("/events/{}", id))).await
    }
}
