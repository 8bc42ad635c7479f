use boleto_core::models::{Booking, BookingStatus, EventDetail};
use serde::Serialize;

/// The payload encoded into the scannable code on a confirmed ticket. Field
/// names are the wire contract with the entrance scanner.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScanPayload {
    pub reserva: i64,
    pub evento: i64,
    pub usuario: i64,
    pub estado: String,
}

impl ScanPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The three mutually exclusive visual states a booking renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketBadge {
    Scannable(ScanPayload),
    Cancelled,
    Processing,
}

/// A booking joined with its event, ready to render.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub booking: Booking,
    pub event: EventDetail,
    pub badge: TicketBadge,
}

pub fn badge_for(booking: &Booking, user_id: i64) -> TicketBadge {
    match booking.booking_status {
        BookingStatus::Confirmed | BookingStatus::Completed => {
            TicketBadge::Scannable(ScanPayload {
                reserva: booking.id,
                evento: booking.event_id,
                usuario: user_id,
                estado: booking.booking_status.as_str().to_string(),
            })
        }
        BookingStatus::Cancelled | BookingStatus::Failed => TicketBadge::Cancelled,
        BookingStatus::Pending => TicketBadge::Processing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: 42,
            event_id: 9,
            quantity: 1,
            total_price: 150.0,
            booking_status: status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn confirmed_and_completed_are_scannable() {
        for status in [BookingStatus::Confirmed, BookingStatus::Completed] {
            let badge = badge_for(&booking(status.clone()), 7);
            match badge {
                TicketBadge::Scannable(payload) => {
                    assert_eq!(payload.reserva, 42);
                    assert_eq!(payload.evento, 9);
                    assert_eq!(payload.usuario, 7);
                    assert_eq!(payload.estado, status.as_str());
                }
                other => panic!("Expected scannable badge, got {:?}", other),
            }
        }
    }

    #[test]
    fn cancelled_and_failed_show_the_cancelled_indicator() {
        for status in [BookingStatus::Cancelled, BookingStatus::Failed] {
            assert_eq!(badge_for(&booking(status), 7), TicketBadge::Cancelled);
        }
    }

    #[test]
    fn pending_shows_processing() {
        assert_eq!(
            badge_for(&booking(BookingStatus::Pending), 7),
            TicketBadge::Processing
        );
    }

    #[test]
    fn scan_payload_serializes_with_scanner_field_names() {
        let payload = ScanPayload {
            reserva: 42,
            evento: 9,
            usuario: 7,
            estado: "CONFIRMED".into(),
        };
        assert_eq!(
            payload.to_json().unwrap(),
            r#"{"reserva":42,"evento":9,"usuario":7,"estado":"CONFIRMED"}"#
        );
    }
}
