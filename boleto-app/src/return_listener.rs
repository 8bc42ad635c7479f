//! Local HTTP listener for the payment provider's return redirects. After
//! the user approves or cancels at the provider, the browser lands on
//! `/pago-exitoso` or `/pago-cancelado` with a provider-issued token (not the
//! session's bearer token) and this listener makes the single follow-up call
//! that finalizes state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::sync::mpsc;

use boleto_checkout::orchestrator::PAYMENT_METHOD;
use boleto_client::PaymentsApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Captured,
    CaptureFailed(String),
    MissingToken,
    Cancelled,
}

#[derive(Clone)]
pub struct ListenerState {
    payments: Arc<dyn PaymentsApi>,
    captured: Arc<AtomicBool>,
    outcomes: mpsc::Sender<Resolution>,
}

impl ListenerState {
    pub fn new(payments: Arc<dyn PaymentsApi>, outcomes: mpsc::Sender<Resolution>) -> Self {
        Self {
            payments,
            captured: Arc::new(AtomicBool::new(false)),
            outcomes,
        }
    }
}

pub fn router(state: ListenerState) -> Router {
    Router::new()
        .route("/pago-exitoso", get(success))
        .route("/pago-cancelado", get(cancel))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    pub token: Option<String>,
}

async fn success(
    State(state): State<ListenerState>,
    Query(query): Query<ReturnQuery>,
) -> Html<String> {
    let Some(token) = query.token else {
        let _ = state.outcomes.send(Resolution::MissingToken).await;
        return page("Hubo un problema", "No llegó ningún token de pago.");
    };

    // Providers re-hit return URLs; the capture must fire at most once.
    if state.captured.swap(true, Ordering::SeqCst) {
        return page("Pago ya procesado", "Esta compra ya fue confirmada.");
    }

    match state.payments.capture(&token, PAYMENT_METHOD).await {
        Ok(()) => {
            let _ = state.outcomes.send(Resolution::Captured).await;
            page("¡Pago Exitoso!", "Tus entradas han sido generadas y confirmadas.")
        }
        Err(e) => {
            tracing::error!("Payment capture failed: {}", e);
            let _ = state
                .outcomes
                .send(Resolution::CaptureFailed(e.to_string()))
                .await;
            page(
                "Hubo un problema",
                "No pudimos confirmar tu pago o ya fue procesado.",
            )
        }
    }
}

async fn cancel(
    State(state): State<ListenerState>,
    Query(query): Query<ReturnQuery>,
) -> Html<String> {
    if let Some(token) = query.token {
        // The booking's fate is backend-owned either way, so a failed cancel
        // call is logged but never blocks the confirmation page.
        if let Err(e) = state.payments.cancel(&token).await {
            tracing::warn!("Payment cancel call failed: {}", e);
        }
    }
    let _ = state.outcomes.send(Resolution::Cancelled).await;
    page(
        "Pago Cancelado",
        "Has cancelado el proceso de pago. Tu reserva ha sido marcada como cancelada.",
    )
}

fn page(title: &str, detail: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{detail}</p><p>Puedes cerrar esta ventana.</p></body></html>"
    ))
}
