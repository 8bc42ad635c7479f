use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use boleto_client::{ApiError, BookingsApi, PaymentsApi};
use boleto_core::models::{CreateBookingRequest, EventDetail};

use crate::ports::{NavigationError, Navigator, Sleeper, TokioSleeper};

pub const DEFAULT_POLL_ATTEMPTS: u32 = 5;
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(1500);

pub const PAYMENT_METHOD: &str = "PAYPAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    CreatingBooking,
    AwaitingPaymentRecord,
    InitiatingPayment,
    RedirectingToProvider,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Quantity must be between 1 and {available}, got {requested}")]
    InvalidQuantity { requested: u32, available: u32 },

    #[error("Event is not open for sale")]
    EventNotActive,

    #[error("A checkout attempt is already in progress")]
    AttemptInFlight,

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend creates the payment record asynchronously; exceeding the
    /// poll bound gets its own variant so the UI can distinguish "still
    /// processing" from a hard failure.
    #[error("Payment record was not created in time; check your bookings before retrying")]
    PaymentRecordTimeout,

    #[error("No secure payment link available")]
    NoApproveLink,

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub booking_id: i64,
    pub payment_id: i64,
    pub total_price: f64,
    pub approve_url: String,
}

/// Drives a single checkout attempt through its states:
/// Idle -> CreatingBooking -> AwaitingPaymentRecord -> InitiatingPayment ->
/// RedirectingToProvider, with any failure terminal for the attempt. A new
/// attempt starts from Idle; nothing is retried automatically.
pub struct CheckoutOrchestrator {
    bookings: Arc<dyn BookingsApi>,
    payments: Arc<dyn PaymentsApi>,
    navigator: Arc<dyn Navigator>,
    sleeper: Arc<dyn Sleeper>,
    poll_attempts: u32,
    poll_delay: Duration,
    busy: AtomicBool,
    phase: Mutex<CheckoutPhase>,
}

impl CheckoutOrchestrator {
    pub fn new(
        bookings: Arc<dyn BookingsApi>,
        payments: Arc<dyn PaymentsApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            bookings,
            payments,
            navigator,
            sleeper: Arc::new(TokioSleeper),
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_delay: DEFAULT_POLL_DELAY,
            busy: AtomicBool::new(false),
            phase: Mutex::new(CheckoutPhase::Idle),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_polling(mut self, attempts: u32, delay: Duration) -> Self {
        self.poll_attempts = attempts;
        self.poll_delay = delay;
        self
    }

    pub fn phase(&self) -> CheckoutPhase {
        *self.phase.lock().unwrap()
    }

    fn set_phase(&self, phase: CheckoutPhase) {
        *self.phase.lock().unwrap() = phase;
    }

    /// Runs one attempt end to end. Rejects re-entry while an attempt is in
    /// flight (no idempotency key exists on booking creation, so a double
    /// submit would create a duplicate booking server-side).
    pub async fn checkout(
        &self,
        event: &EventDetail,
        quantity: u32,
        user_id: i64,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(CheckoutError::AttemptInFlight);
        }
        let result = self.run(event, quantity, user_id).await;
        self.set_phase(CheckoutPhase::Idle);
        self.busy.store(false, Ordering::SeqCst);
        result
    }

    async fn run(
        &self,
        event: &EventDetail,
        quantity: u32,
        user_id: i64,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        // Validation happens before any network call.
        if !event.is_active() {
            return Err(CheckoutError::EventNotActive);
        }
        if quantity < 1 || quantity > event.available_slots {
            return Err(CheckoutError::InvalidQuantity {
                requested: quantity,
                available: event.available_slots,
            });
        }

        let total_price = f64::from(quantity) * event.price;
        tracing::info!(
            event_id = event.id,
            quantity,
            total_price,
            "Starting checkout"
        );

        self.set_phase(CheckoutPhase::CreatingBooking);
        let booking = self
            .bookings
            .create_booking(&CreateBookingRequest {
                event_id: event.id,
                quantity,
                user_id,
            })
            .await?;

        self.set_phase(CheckoutPhase::AwaitingPaymentRecord);
        let record = self.await_payment_record(booking.id).await?;

        self.set_phase(CheckoutPhase::InitiatingPayment);
        let order = self.payments.initiate(record.id, PAYMENT_METHOD).await?;

        let approve_url = order
            .approve_link()
            .ok_or(CheckoutError::NoApproveLink)?
            .to_string();

        self.set_phase(CheckoutPhase::RedirectingToProvider);
        self.navigator.navigate(&approve_url)?;
        tracing::info!(booking_id = booking.id, "Redirected to payment provider");

        Ok(CheckoutOutcome {
            booking_id: booking.id,
            payment_id: record.id,
            total_price,
            approve_url,
        })
    }

    /// Bounded poll for the payment record: the backend materializes it
    /// asynchronously and offers no push at this stage, so an explicit loop
    /// with an attempt counter is the only option.
    async fn await_payment_record(
        &self,
        booking_id: i64,
    ) -> Result<boleto_core::models::PaymentRecord, CheckoutError> {
        for attempt in 1..=self.poll_attempts {
            let mut records = self.payments.payments_for_booking(booking_id).await?;
            if !records.is_empty() {
                return Ok(records.remove(0));
            }
            tracing::debug!(booking_id, attempt, "Payment record not ready yet");
            if attempt < self.poll_attempts {
                self.sleeper.sleep(self.poll_delay).await;
            }
        }
        Err(CheckoutError::PaymentRecordTimeout)
    }
}
