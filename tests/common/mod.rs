use chrono::NaiveDate;
use std::sync::Arc;
use viramah_booking::application::booking::BookingOrchestrator;
use viramah_booking::application::locks::LockMap;
use viramah_booking::application::payment::PaymentReconciler;
use viramah_booking::domain::money::Money;
use viramah_booking::domain::ports::{BookingStoreRef, PaymentStoreRef, RoomStore, RoomStoreRef};
use viramah_booking::domain::room::{Room, RoomType};
use viramah_booking::infrastructure::gateway::SimulatedGateway;
use viramah_booking::infrastructure::in_memory::{
    InMemoryBookingStore, InMemoryPaymentStore, InMemoryRoomStore,
};
use viramah_booking::infrastructure::signature::SignatureVerifier;

pub const TEST_SECRET: &str = "test-secret";

pub struct TestCore {
    pub rooms: RoomStoreRef,
    pub bookings: BookingStoreRef,
    pub payments: PaymentStoreRef,
    pub orchestrator: BookingOrchestrator,
    pub reconciler: PaymentReconciler,
    pub gateway: Arc<SimulatedGateway>,
    pub verifier: SignatureVerifier,
    pub booking_locks: LockMap,
}

pub fn build_core() -> TestCore {
    let rooms: RoomStoreRef = Arc::new(InMemoryRoomStore::new());
    let bookings: BookingStoreRef = Arc::new(InMemoryBookingStore::new());
    let payments: PaymentStoreRef = Arc::new(InMemoryPaymentStore::new());

    let verifier = SignatureVerifier::new(TEST_SECRET);
    let gateway = Arc::new(SimulatedGateway::new(verifier.clone()));
    let booking_locks = LockMap::new();

    let orchestrator =
        BookingOrchestrator::new(rooms.clone(), bookings.clone(), booking_locks.clone());
    let reconciler = PaymentReconciler::new(
        bookings.clone(),
        payments.clone(),
        gateway.clone(),
        verifier.clone(),
        booking_locks.clone(),
    );

    TestCore {
        rooms,
        bookings,
        payments,
        orchestrator,
        reconciler,
        gateway,
        verifier,
        booking_locks,
    }
}

pub async fn seed_room(core: &TestCore, rate: i64, occupancy: u32) -> Room {
    let room = Room::new("pune", RoomType::Single, Money(rate), occupancy);
    core.rooms.store(room.clone()).await.unwrap();
    room
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
