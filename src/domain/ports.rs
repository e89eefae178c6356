use crate::domain::booking::Booking;
use crate::domain::money::Money;
use crate::domain::payment::Payment;
use crate::domain::room::{Room, RoomType};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Search filters for the room catalogue. Only rooms with status `available`
/// are ever returned; results are ordered by rate ascending.
#[derive(Debug, Clone, Default)]
pub struct RoomFilters {
    pub city: Option<String>,
    pub room_type: Option<RoomType>,
    pub min_rate: Option<Money>,
    pub max_rate: Option<Money>,
    pub limit: Option<usize>,
    pub offset: usize,
}

/// One page of search results plus the total match count before pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomPage {
    pub rooms: Vec<Room>,
    pub total: usize,
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn store(&self, room: Room) -> Result<()>;
    async fn get(&self, room_id: Uuid) -> Result<Option<Room>>;
    async fn search(&self, filters: &RoomFilters) -> Result<RoomPage>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn store(&self, booking: Booking) -> Result<()>;
    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>>;
    async fn for_room(&self, room_id: Uuid) -> Result<Vec<Booking>>;
    async fn for_owner(&self, owner_id: &str) -> Result<Vec<Booking>>;
    /// All bookings currently in `pending` status, for the hold reaper.
    async fn pending_holds(&self) -> Result<Vec<Booking>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, payment_id: Uuid) -> Result<Option<Payment>>;
    async fn by_gateway_order(&self, gateway_order_id: &str) -> Result<Option<Payment>>;
    async fn for_booking(&self, booking_id: Uuid) -> Result<Vec<Payment>>;
}

/// A gateway-side order awaiting payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: Money,
    pub currency: String,
}

/// The payment gateway, as seen by the reconciler. Calls are I/O-bound; the
/// reconciler wraps them in an explicit timeout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;
    async fn create_order(&self, amount: Money, currency: &str) -> Result<GatewayOrder>;
}

// Shared handles: the checker, orchestrator, and reconciler all borrow the
// same adapters.
pub type RoomStoreRef = Arc<dyn RoomStore>;
pub type BookingStoreRef = Arc<dyn BookingStore>;
pub type PaymentStoreRef = Arc<dyn PaymentStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
