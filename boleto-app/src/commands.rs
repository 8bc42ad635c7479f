use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use boleto_checkout::{CheckoutOrchestrator, NavigationError, Navigator};
use boleto_client::{
    ApiClient, AuthApi, EventsApi, HttpAuthGateway, HttpBookingsGateway, HttpEventsGateway,
    HttpPaymentsGateway, ImageUpload,
};
use boleto_core::models::{CreateEventRequest, RegisterRequest, RoleType, UpdateEventRequest, User};
use boleto_core::store::FileCredentialStore;
use boleto_core::SessionHandle;
use boleto_feed::{LiveTickets, StompPush, Ticket, TicketBadge, TicketFeed};

use crate::app_config::Config;
use crate::cli::{EventsAction, RoleArg};
use crate::return_listener::{self, ListenerState, Resolution};

pub struct AppContext {
    pub config: Config,
    pub session: SessionHandle,
    pub auth: HttpAuthGateway,
    pub events: HttpEventsGateway,
    pub bookings: HttpBookingsGateway,
    pub payments: HttpPaymentsGateway,
}

impl AppContext {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(FileCredentialStore::new(&config.storage.credentials_path));
        let session = SessionHandle::new(store);
        // Session must be populated before anything that depends on it runs.
        session.restore()?;

        let client = ApiClient::new(config.backend.base_url.as_str(), session.clone());
        Ok(Self {
            auth: HttpAuthGateway::new(client.clone()),
            events: HttpEventsGateway::new(client.clone()),
            bookings: HttpBookingsGateway::new(client.clone()),
            payments: HttpPaymentsGateway::new(client),
            session,
            config,
        })
    }

    fn current_user(&self) -> anyhow::Result<User> {
        self.session
            .user()
            .context("Not logged in; run `boleto login` first")
    }
}

impl From<RoleArg> for RoleType {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Customer => RoleType::Customer,
            RoleArg::Organizer => RoleType::Organizer,
            RoleArg::Admin => RoleType::Admin,
            RoleArg::Staff => RoleType::Staff,
        }
    }
}

pub async fn login(ctx: &AppContext, email: &str, password: &str) -> anyhow::Result<()> {
    let response = ctx.auth.login(email, password).await?;
    let name = response.user.name.clone();
    ctx.session.login(response.user, response.token)?;
    println!("Sesión iniciada. ¡Hola, {}!", name);
    Ok(())
}

pub async fn register(
    ctx: &AppContext,
    name: &str,
    email: &str,
    password: &str,
    role: RoleArg,
) -> anyhow::Result<()> {
    let user = ctx
        .auth
        .register(&RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role_type: role.into(),
        })
        .await?;
    println!("Cuenta creada para {} (id {})", user.email, user.id);
    Ok(())
}

pub fn logout(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.session.logout()?;
    println!("Sesión cerrada.");
    Ok(())
}

pub async fn events(ctx: &AppContext, action: EventsAction) -> anyhow::Result<()> {
    match action {
        EventsAction::List => {
            let events = ctx.events.active_events().await?;
            if events.is_empty() {
                println!("No hay eventos activos.");
            }
            for event in events {
                println!(
                    "#{:<5} {}  {}  {}  S/ {:.2}  ({} cupos)",
                    event.id,
                    event.event_date.format("%Y-%m-%d %H:%M"),
                    event.title,
                    event.location,
                    event.price,
                    event.available_slots
                );
            }
        }
        EventsAction::Show { id } => {
            let event = ctx.events.event_by_id(id).await?;
            println!("{} (#{})", event.title, event.id);
            println!("  {}", event.description);
            println!("  Fecha:     {}", event.event_date.format("%Y-%m-%d %H:%M"));
            println!("  Lugar:     {}", event.location);
            if let (Some(lat), Some(lon)) = (&event.latitud, &event.longitud) {
                println!("  Coordenadas: {}, {}", lat, lon);
            }
            println!("  Precio:    S/ {:.2}", event.price);
            println!("  Cupos:     {}/{}", event.available_slots, event.capacity);
            println!("  Estado:    {}", event.event_status);
        }
        EventsAction::Create {
            title,
            description,
            date,
            location,
            price,
            capacity,
            category_id,
            image,
        } => {
            let organizer = ctx.current_user()?;
            let image = match image {
                Some(path) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("Could not read image {}", path.display()))?;
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "image".to_string());
                    Some(ImageUpload { filename, bytes })
                }
                None => None,
            };
            let event = ctx
                .events
                .create_event(
                    &CreateEventRequest {
                        title,
                        description,
                        event_date: parse_date(&date)?,
                        location,
                        price,
                        capacity,
                        category_id,
                        organizer_id: organizer.id,
                    },
                    image,
                )
                .await?;
            println!("Evento creado: {} (#{})", event.title, event.id);
        }
        EventsAction::Update {
            id,
            title,
            description,
            date,
            location,
            price,
            capacity,
            latitud,
            longitud,
        } => {
            let event_date = match date {
                Some(d) => Some(parse_date(&d)?),
                None => None,
            };
            let event = ctx
                .events
                .update_event(
                    id,
                    &UpdateEventRequest {
                        title,
                        description,
                        event_date,
                        location,
                        price,
                        capacity,
                        latitud,
                        longitud,
                        image_url: None,
                    },
                )
                .await?;
            println!("Evento actualizado: {} (#{})", event.title, event.id);
        }
        EventsAction::Status { id, status } => {
            ctx.events.change_status(id, &status).await?;
            println!("Evento #{} ahora está {}", id, status);
        }
        EventsAction::ReduceSlots { id, quantity } => {
            ctx.events.reduce_slots(id, quantity).await?;
            println!("Evento #{}: {} cupo(s) retirados de la venta.", id, quantity);
        }
        EventsAction::Delete { id } => {
            ctx.events.delete_event(id).await?;
            println!("Evento #{} eliminado.", id);
        }
    }
    Ok(())
}

fn parse_date(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid date `{}`, expected RFC 3339", raw))?
        .with_timezone(&Utc))
}

/// Aborts the wrapped task when dropped, so background servers never outlive
/// the command that spawned them.
struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Prints the approve URL; the user opens it in their browser and the
/// provider redirects back to the local listener.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        println!();
        println!("Abre este enlace para aprobar el pago:");
        println!("  {}", url);
        println!();
        Ok(())
    }
}

pub async fn checkout(ctx: &AppContext, event_id: i64, quantity: u32) -> anyhow::Result<()> {
    let user = ctx.current_user()?;
    let event = ctx.events.event_by_id(event_id).await?;
    println!(
        "{} — S/ {:.2} por entrada, {} cupos disponibles",
        event.title, event.price, event.available_slots
    );

    // The return listener must be up before the user can finish at the
    // provider, which redirects the browser back to it.
    let (outcome_tx, mut outcome_rx) = mpsc::channel(4);
    let payments: Arc<dyn boleto_client::PaymentsApi> = Arc::new(ctx.payments.clone());
    let state = ListenerState::new(payments.clone(), outcome_tx);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], ctx.config.listener.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind payment return listener on {}", addr))?;
    tracing::info!("Payment return listener on {}", addr);
    // Guarded so a failed checkout also tears the listener (and its port) down.
    let _server = AbortOnDrop(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, return_listener::router(state)).await {
            tracing::error!("Return listener failed: {}", e);
        }
    }));

    let orchestrator = CheckoutOrchestrator::new(
        Arc::new(ctx.bookings.clone()),
        payments,
        Arc::new(TerminalNavigator),
    )
    .with_polling(
        ctx.config.checkout.poll_attempts,
        std::time::Duration::from_millis(ctx.config.checkout.poll_delay_ms),
    );

    let outcome = orchestrator.checkout(&event, quantity, user.id).await?;
    println!(
        "Reserva #{} creada por S/ {:.2}. Esperando el resultado del pago...",
        outcome.booking_id, outcome.total_price
    );

    match outcome_rx.recv().await {
        Some(Resolution::Captured) => {
            println!("¡Pago Exitoso! Revisa tus tickets con `boleto tickets`.")
        }
        Some(Resolution::Cancelled) => println!("Pago cancelado. La reserva quedó anulada."),
        Some(Resolution::CaptureFailed(message)) => {
            println!("No pudimos confirmar tu pago: {}", message)
        }
        Some(Resolution::MissingToken) | None => println!("No llegó confirmación del pago."),
    }
    Ok(())
}

pub async fn tickets(ctx: &AppContext, watch: bool) -> anyhow::Result<()> {
    let user = ctx.current_user()?;
    let feed = Arc::new(TicketFeed::new(
        Arc::new(ctx.bookings.clone()),
        Arc::new(ctx.events.clone()),
    ));

    if !watch {
        print_tickets(&feed.refresh(user.id).await?);
        return Ok(());
    }

    let push = StompPush::new(ctx.config.realtime.ws_url.as_str()).with_reconnect_delay(
        std::time::Duration::from_secs(ctx.config.realtime.reconnect_seconds),
    );
    let live = LiveTickets::new(feed, Arc::new(push));

    let (snapshot_tx, mut snapshot_rx) = mpsc::channel::<Vec<Ticket>>(8);
    let printer = tokio::spawn(async move {
        while let Some(tickets) = snapshot_rx.recv().await {
            println!("--- {} ---", Utc::now().format("%H:%M:%S"));
            print_tickets(&tickets);
        }
    });

    tokio::select! {
        result = live.run(user.id, snapshot_tx) => result?,
        _ = tokio::signal::ctrl_c() => {
            println!("Hasta luego.");
        }
    }
    printer.abort();
    Ok(())
}

fn print_tickets(tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("Aún no tienes tickets.");
        return;
    }
    for ticket in tickets {
        let status = ticket.booking.booking_status.as_str();
        println!(
            "Ticket #{} — {} — {} entrada(s) — S/ {:.2} [{}]",
            ticket.booking.id,
            ticket.event.title,
            ticket.booking.quantity,
            ticket.booking.total_price,
            status
        );
        match &ticket.badge {
            TicketBadge::Scannable(payload) => {
                let code = payload.to_json().unwrap_or_default();
                println!("    Escanea para ingresar: {}", code);
            }
            TicketBadge::Cancelled => println!("    ENTRADA ANULADA"),
            TicketBadge::Processing => println!("    PAGO PENDIENTE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn guard_aborts_the_task_on_drop() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let guard = AbortOnDrop(tokio::spawn(async move {
            let _tx = tx;
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }));

        drop(guard);

        // The sender is dropped only when the task is torn down.
        assert!(rx.await.is_err());
    }
}
