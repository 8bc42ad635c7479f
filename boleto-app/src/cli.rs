use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "boleto", about = "Event ticketing marketplace client", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Customer,
    Organizer,
    Admin,
    Staff,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate and persist the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        name: String,
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value = "customer")]
        role: RoleArg,
    },
    /// Clear the persisted session
    Logout,
    /// Browse and manage events
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },
    /// Buy tickets: create a booking and pay via the external provider
    Checkout { event_id: i64, quantity: u32 },
    /// Show your tickets; --watch keeps them fresh from the push topic
    Tickets {
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum EventsAction {
    /// List active events
    List,
    /// Show one event
    Show { id: i64 },
    /// Publish a new event (organizer)
    Create {
        title: String,
        #[arg(long)]
        description: String,
        /// RFC 3339, e.g. 2026-02-15T09:00:00Z
        #[arg(long)]
        date: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        capacity: u32,
        #[arg(long)]
        category_id: i64,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Update event fields (organizer)
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long)]
        latitud: Option<String>,
        #[arg(long)]
        longitud: Option<String>,
    },
    /// Change event status, e.g. ACTIVE or INACTIVE (organizer)
    Status { id: i64, status: String },
    /// Take slots out of sale without bookings, e.g. a reserved block (organizer)
    ReduceSlots {
        id: i64,
        #[arg(long)]
        quantity: u32,
    },
    /// Delete an event (organizer)
    Delete { id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_slots_subcommand_parses() {
        let cli =
            Cli::try_parse_from(["boleto", "events", "reduce-slots", "9", "--quantity", "2"])
                .unwrap();
        match cli.command {
            Command::Events {
                action: EventsAction::ReduceSlots { id, quantity },
            } => {
                assert_eq!(id, 9);
                assert_eq!(quantity, 2);
            }
            other => panic!("Unexpected parse: {:?}", other),
        }
    }
}
