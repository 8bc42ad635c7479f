use std::collections::HashMap;
use std::sync::Arc;

use boleto_client::{ApiError, BookingsApi, EventsApi};

use crate::ticket::{badge_for, Ticket};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Assembles the current user's bookings joined with their event details.
/// Every refresh is a full replacement built from backend truth, so
/// overlapping refreshes are harmless: last write wins.
pub struct TicketFeed {
    bookings: Arc<dyn BookingsApi>,
    events: Arc<dyn EventsApi>,
}

impl TicketFeed {
    pub fn new(bookings: Arc<dyn BookingsApi>, events: Arc<dyn EventsApi>) -> Self {
        Self { bookings, events }
    }

    /// Fetches bookings newest-first, fetches each referenced event exactly
    /// once, and joins them. A booking whose event cannot be fetched is
    /// omitted rather than failing the whole list (the event may have been
    /// deleted since the booking was made).
    pub async fn refresh(&self, user_id: i64) -> Result<Vec<Ticket>, FeedError> {
        let mut bookings = self.bookings.bookings_for_user(user_id).await?;
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut event_ids: Vec<i64> = Vec::new();
        for booking in &bookings {
            if !event_ids.contains(&booking.event_id) {
                event_ids.push(booking.event_id);
            }
        }

        let mut events = HashMap::new();
        for id in event_ids {
            match self.events.event_by_id(id).await {
                Ok(event) => {
                    events.insert(id, event);
                }
                Err(e) => {
                    tracing::warn!(event_id = id, "Skipping bookings for unavailable event: {}", e);
                }
            }
        }

        let tickets = bookings
            .into_iter()
            .filter_map(|booking| {
                events.get(&booking.event_id).cloned().map(|event| Ticket {
                    badge: badge_for(&booking, user_id),
                    booking,
                    event,
                })
            })
            .collect();
        Ok(tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use boleto_core::models::{
        Booking, BookingStatus, CreateBookingRequest, EventDetail, EventSummary,
    };
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    fn booking(id: i64, event_id: i64, age_minutes: i64, status: BookingStatus) -> Booking {
        Booking {
            id,
            event_id,
            quantity: 1,
            total_price: 150.0,
            booking_status: status,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    fn event(id: i64) -> EventDetail {
        EventDetail {
            id,
            title: format!("Event {}", id),
            description: String::new(),
            event_date: Utc::now(),
            location: "Lima".into(),
            price: 150.0,
            available_slots: 10,
            capacity: 100,
            event_status: "ACTIVE".into(),
            category_id: 1,
            category: "Music".into(),
            image_url: None,
            organizer_id: 3,
            created_at: Utc::now(),
            latitud: None,
            longitud: None,
        }
    }

    struct MockBookings {
        bookings: Vec<Booking>,
    }

    #[async_trait]
    impl BookingsApi for MockBookings {
        async fn create_booking(
            &self,
            _request: &CreateBookingRequest,
        ) -> Result<Booking, ApiError> {
            unreachable!("feed never creates bookings")
        }

        async fn bookings_for_user(&self, _user_id: i64) -> Result<Vec<Booking>, ApiError> {
            Ok(self.bookings.clone())
        }
    }

    struct MockEvents {
        known: Vec<EventDetail>,
        fetched_ids: Mutex<Vec<i64>>,
    }

    impl MockEvents {
        fn new(known: Vec<EventDetail>) -> Self {
            Self {
                known,
                fetched_ids: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EventsApi for MockEvents {
        async fn active_events(&self) -> Result<Vec<EventSummary>, ApiError> {
            Ok(vec![])
        }

        async fn event_by_id(&self, id: i64) -> Result<EventDetail, ApiError> {
            self.fetched_ids.lock().unwrap().push(id);
            self.known
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or(ApiError::Status {
                    status: 404,
                    message: "event not found".into(),
                })
        }
    }

    #[tokio::test]
    async fn refresh_sorts_newest_first_and_joins_events() {
        let feed = TicketFeed::new(
            Arc::new(MockBookings {
                bookings: vec![
                    booking(1, 9, 60, BookingStatus::Confirmed),
                    booking(2, 5, 5, BookingStatus::Pending),
                ],
            }),
            Arc::new(MockEvents::new(vec![event(9), event(5)])),
        );

        let tickets = feed.refresh(7).await.unwrap();
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].booking.id, 2);
        assert_eq!(tickets[1].booking.id, 1);
        assert_eq!(tickets[0].event.id, 5);
    }

    #[tokio::test]
    async fn referenced_events_are_fetched_exactly_once() {
        let events = Arc::new(MockEvents::new(vec![event(9)]));
        let feed = TicketFeed::new(
            Arc::new(MockBookings {
                bookings: vec![
                    booking(1, 9, 30, BookingStatus::Confirmed),
                    booking(2, 9, 20, BookingStatus::Confirmed),
                    booking(3, 9, 10, BookingStatus::Pending),
                ],
            }),
            events.clone(),
        );

        let tickets = feed.refresh(7).await.unwrap();
        assert_eq!(tickets.len(), 3);
        assert_eq!(events.fetched_ids.lock().unwrap().as_slice(), &[9]);
    }

    #[tokio::test]
    async fn booking_with_missing_event_is_silently_omitted() {
        let feed = TicketFeed::new(
            Arc::new(MockBookings {
                bookings: vec![
                    booking(1, 9, 10, BookingStatus::Confirmed),
                    booking(2, 404, 5, BookingStatus::Confirmed),
                ],
            }),
            Arc::new(MockEvents::new(vec![event(9)])),
        );

        let tickets = feed.refresh(7).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].booking.id, 1);
    }

    #[tokio::test]
    async fn empty_booking_list_yields_empty_feed() {
        let feed = TicketFeed::new(
            Arc::new(MockBookings { bookings: vec![] }),
            Arc::new(MockEvents::new(vec![])),
        );
        assert!(feed.refresh(7).await.unwrap().is_empty());
    }
}
