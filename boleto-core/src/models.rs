use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleType {
    Customer,
    Organizer,
    Admin,
    Staff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role_type: RoleType,
    #[serde(default)]
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Failed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Failed => "FAILED",
        }
    }
}

/// A customer's reservation of N tickets for one event. The lifecycle is
/// owned by the backend; this client only observes status changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub event_id: i64,
    pub quantity: u32,
    pub total_price: f64,
    pub booking_status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Backend entity linking a booking to a payment-provider transaction.
/// Created asynchronously after the booking, so callers must poll for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: i64,
    pub booking_id: i64,
    pub amount: f64,
    pub payment_status: String,
    pub transaction_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub price: f64,
    pub available_slots: u32,
    pub event_status: String,
    pub category_id: i64,
    pub category: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub price: f64,
    pub available_slots: u32,
    pub capacity: u32,
    pub event_status: String,
    pub category_id: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub organizer_id: i64,
    pub created_at: DateTime<Utc>,
    pub latitud: Option<String>,
    pub longitud: Option<String>,
}

impl EventDetail {
    pub fn is_active(&self) -> bool {
        self.event_status == "ACTIVE"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_type: RoleType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub event_id: i64,
    pub quantity: u32,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub price: f64,
    pub capacity: u32,
    pub category_id: i64,
    pub organizer_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Hypermedia link returned by the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderLink {
    pub href: String,
    pub rel: String,
    pub method: String,
}

/// Response to initiating a payment session with the external provider.
/// The browser must be sent to the link whose `rel` is `"approve"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOrder {
    pub id: String,
    pub status: String,
    pub links: Vec<ProviderLink>,
}

impl ProviderOrder {
    /// The URL the user must visit to authorize the payment, if the provider
    /// returned one.
    pub fn approve_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == "approve")
            .map(|l| l.href.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_status_wire_format_is_screaming_snake() {
        let status: BookingStatus = serde_json::from_str("\"CONFIRMED\"").unwrap();
        assert_eq!(status, BookingStatus::Confirmed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"CONFIRMED\"");
    }

    #[test]
    fn booking_deserializes_from_backend_shape() {
        let json = r#"{
            "id": 42,
            "eventId": 9,
            "quantity": 2,
            "totalPrice": 300.0,
            "bookingStatus": "PENDING",
            "createdAt": "2026-02-15T09:00:00Z"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.id, 42);
        assert_eq!(booking.event_id, 9);
        assert_eq!(booking.booking_status, BookingStatus::Pending);
    }

    #[test]
    fn approve_link_is_selected_by_rel() {
        let order = ProviderOrder {
            id: "ORD-1".into(),
            status: "CREATED".into(),
            links: vec![
                ProviderLink {
                    href: "https://provider.example/self".into(),
                    rel: "self".into(),
                    method: "GET".into(),
                },
                ProviderLink {
                    href: "https://provider.example/approve".into(),
                    rel: "approve".into(),
                    method: "GET".into(),
                },
            ],
        };
        assert_eq!(order.approve_link(), Some("https://provider.example/approve"));
    }

    #[test]
    fn approve_link_absent_when_provider_omits_it() {
        let order = ProviderOrder {
            id: "ORD-2".into(),
            status: "CREATED".into(),
            links: vec![],
        };
        assert!(order.approve_link().is_none());
    }
}
