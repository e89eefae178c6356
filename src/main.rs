use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use viramah_booking::application::booking::BookingOrchestrator;
use viramah_booking::application::locks::LockMap;
use viramah_booking::application::payment::PaymentReconciler;
use viramah_booking::domain::ports::{BookingStoreRef, PaymentStoreRef, RoomStore, RoomStoreRef};
use viramah_booking::infrastructure::gateway::SimulatedGateway;
use viramah_booking::infrastructure::in_memory::{
    InMemoryBookingStore, InMemoryPaymentStore, InMemoryRoomStore,
};
use viramah_booking::infrastructure::signature::SignatureVerifier;
use viramah_booking::interfaces::csv::booking_writer::{BookingRow, BookingWriter};
use viramah_booking::interfaces::csv::command_reader::{Command, CommandOp, CommandReader};
use viramah_booking::interfaces::csv::inventory_reader::InventoryReader;

/// Replays a booking command log against an in-memory core with a simulated
/// payment gateway, then prints the final booking states as CSV.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Booking command CSV file
    input: PathBuf,

    /// Room inventory CSV file
    #[arg(long)]
    rooms: PathBuf,

    /// Shared secret for payment capture signatures
    #[arg(long, default_value = "viramah-demo-secret")]
    gateway_secret: String,
}

struct Replay {
    orchestrator: BookingOrchestrator,
    reconciler: PaymentReconciler,
    gateway: Arc<SimulatedGateway>,
    room_ids: HashMap<String, Uuid>,
    room_labels: HashMap<Uuid, String>,
    // Label -> (booking id, owner), in command order.
    holds: Vec<(String, Uuid, String)>,
}

fn invalid_command(message: impl Into<String>) -> viramah_booking::error::CoreError {
    viramah_booking::error::CoreError::Booking {
        code: "INVALID_INPUT",
        message: message.into(),
    }
}

impl Replay {
    async fn apply(&mut self, command: Command) -> viramah_booking::error::Result<()> {
        use viramah_booking::error::CoreError;
        match command.op {
            CommandOp::Book => {
                let owner = command
                    .owner
                    .ok_or_else(|| invalid_command("book command without owner"))?;
                let room_label = command
                    .room
                    .ok_or_else(|| invalid_command("book command without room"))?;
                let room_id = *self.room_ids.get(&room_label).ok_or_else(|| {
                    CoreError::RoomUnavailable(format!("unknown room label {room_label}"))
                })?;
                let (check_in, check_out) = match (command.check_in, command.check_out) {
                    (Some(check_in), Some(check_out)) => (check_in, check_out),
                    _ => return Err(invalid_command("book command without dates")),
                };
                let hold = self
                    .orchestrator
                    .create_booking(&owner, room_id, check_in, check_out, command.note.as_deref())
                    .await?;
                self.holds.push((command.booking, hold.id, owner));
                Ok(())
            }
            CommandOp::Cancel => {
                let (id, owner) = self.lookup(&command.booking)?;
                let reason = command.note.unwrap_or_else(|| "cancelled by owner".into());
                self.orchestrator.cancel_booking(id, &owner, &reason).await?;
                Ok(())
            }
            CommandOp::Pay => {
                let (id, owner) = self.lookup(&command.booking)?;
                let booking = self
                    .orchestrator
                    .get_booking(id, &owner)
                    .await?
                    .ok_or_else(|| CoreError::not_found(format!("booking {id}")))?;
                let order = self
                    .reconciler
                    .create_payment_order(id, booking.total_amount)
                    .await?;
                let (payment_id, signature) = self.gateway.capture(&order.order_id).await?;
                self.reconciler
                    .verify_payment(&order.order_id, &payment_id, &signature)
                    .await?;
                Ok(())
            }
        }
    }

    fn lookup(&self, label: &str) -> viramah_booking::error::Result<(Uuid, String)> {
        self.holds
            .iter()
            .find(|(known, _, _)| known == label)
            .map(|(_, id, owner)| (*id, owner.clone()))
            .ok_or_else(|| {
                viramah_booking::error::CoreError::not_found(format!("booking label {label}"))
            })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let room_store: RoomStoreRef = Arc::new(InMemoryRoomStore::new());
    let booking_store: BookingStoreRef = Arc::new(InMemoryBookingStore::new());
    let payment_store: PaymentStoreRef = Arc::new(InMemoryPaymentStore::new());

    let signer = SignatureVerifier::new(&cli.gateway_secret);
    let gateway = Arc::new(SimulatedGateway::new(signer.clone()));
    let booking_locks = LockMap::new();

    let mut replay = Replay {
        orchestrator: BookingOrchestrator::new(
            room_store.clone(),
            booking_store.clone(),
            booking_locks.clone(),
        ),
        reconciler: PaymentReconciler::new(
            booking_store,
            payment_store,
            gateway.clone(),
            signer,
            booking_locks,
        ),
        gateway,
        room_ids: HashMap::new(),
        room_labels: HashMap::new(),
        holds: Vec::new(),
    };

    // Seed inventory.
    let file = File::open(&cli.rooms).into_diagnostic()?;
    for record in InventoryReader::new(file).rooms() {
        match record {
            Ok(record) => {
                let (label, room) = record.into_room();
                replay.room_ids.insert(label.clone(), room.id);
                replay.room_labels.insert(room.id, label);
                room_store.store(room).await.into_diagnostic()?;
            }
            Err(e) => tracing::warn!(error = %e, "skipping malformed room record"),
        }
    }

    // Replay commands; a failed command is reported and skipped.
    let file = File::open(&cli.input).into_diagnostic()?;
    for result in CommandReader::new(file).commands() {
        match result {
            Ok(command) => {
                let label = command.booking.clone();
                if let Err(e) = replay.apply(command).await {
                    tracing::warn!(booking = %label, error = %e, "command failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "skipping malformed command"),
        }
    }

    // Report final booking states in command order.
    let mut rows = Vec::new();
    for (label, id, owner) in &replay.holds {
        if let Some(booking) = replay.orchestrator.get_booking(*id, owner).await.into_diagnostic()? {
            let room_label = replay
                .room_labels
                .get(&booking.room_id)
                .cloned()
                .unwrap_or_else(|| booking.room_id.to_string());
            rows.push(BookingRow::from_booking(label, &room_label, &booking));
        }
    }

    let stdout = io::stdout();
    let mut writer = BookingWriter::new(stdout.lock());
    writer.write_rows(rows).into_diagnostic()?;

    Ok(())
}
