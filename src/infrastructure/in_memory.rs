use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::payment::Payment;
use crate::domain::ports::{BookingStore, PaymentStore, RoomFilters, RoomPage, RoomStore};
use crate::domain::room::{Room, RoomStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory room catalogue.
///
/// Uses `Arc<RwLock<HashMap>>` for shared concurrent access. Suitable for
/// tests and the replay harness; production swaps in a transactional adapter.
#[derive(Default, Clone)]
pub struct InMemoryRoomStore {
    rooms: Arc<RwLock<HashMap<Uuid, Room>>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn store(&self, room: Room) -> Result<()> {
        let mut rooms = self.rooms.write().await;
        rooms.insert(room.id, room);
        Ok(())
    }

    async fn get(&self, room_id: Uuid) -> Result<Option<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms.get(&room_id).cloned())
    }

    async fn search(&self, filters: &RoomFilters) -> Result<RoomPage> {
        let rooms = self.rooms.read().await;
        let mut matches: Vec<Room> = rooms
            .values()
            .filter(|room| room.status == RoomStatus::Available)
            .filter(|room| {
                filters
                    .city
                    .as_deref()
                    .is_none_or(|city| room.city.eq_ignore_ascii_case(city))
            })
            .filter(|room| filters.room_type.is_none_or(|t| room.room_type == t))
            .filter(|room| filters.min_rate.is_none_or(|min| room.base_rate >= min))
            .filter(|room| filters.max_rate.is_none_or(|max| room.base_rate <= max))
            .cloned()
            .collect();
        matches.sort_by_key(|room| room.base_rate);

        let total = matches.len();
        let page: Vec<Room> = matches
            .into_iter()
            .skip(filters.offset)
            .take(filters.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(RoomPage { rooms: page, total })
    }
}

/// A thread-safe in-memory booking store.
#[derive(Default, Clone)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn store(&self, booking: Booking) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(&booking_id).cloned())
    }

    async fn for_room(&self, room_id: Uuid) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn for_owner(&self, owner_id: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn pending_holds(&self) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.status == BookingStatus::Pending)
            .cloned()
            .collect())
    }
}

/// A thread-safe in-memory payment store.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, payment_id: Uuid) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&payment_id).cloned())
    }

    async fn by_gateway_order(&self, gateway_order_id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .find(|payment| payment.gateway_order_id == gateway_order_id)
            .cloned())
    }

    async fn for_booking(&self, booking_id: Uuid) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        let mut rows: Vec<Payment> = payments
            .values()
            .filter(|payment| payment.booking_id == booking_id)
            .cloned()
            .collect();
        rows.sort_by_key(|payment| payment.created_at);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::room::RoomType;

    fn seeded_rooms() -> Vec<Room> {
        let cheap = Room::new("pune", RoomType::Single, Money(8_000), 1);
        let shared = Room::new("pune", RoomType::Shared, Money(5_000), 4);
        let mumbai = Room::new("mumbai", RoomType::Studio, Money(20_000), 1);
        let mut closed = Room::new("pune", RoomType::Single, Money(3_000), 1);
        closed.status = RoomStatus::Maintenance;
        vec![cheap, shared, mumbai, closed]
    }

    #[tokio::test]
    async fn test_room_store_and_get() {
        let store = InMemoryRoomStore::new();
        let room = Room::new("pune", RoomType::Single, Money(10_000), 1);
        let id = room.id;

        store.store(room.clone()).await.unwrap();
        assert_eq!(store.get(id).await.unwrap(), Some(room));
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_orders_by_rate_and_skips_closed() {
        let store = InMemoryRoomStore::new();
        for room in seeded_rooms() {
            store.store(room).await.unwrap();
        }

        let page = store.search(&RoomFilters::default()).await.unwrap();
        assert_eq!(page.total, 3);
        let rates: Vec<i64> = page.rooms.iter().map(|r| r.base_rate.0).collect();
        assert_eq!(rates, vec![5_000, 8_000, 20_000]);
    }

    #[tokio::test]
    async fn test_search_filters() {
        let store = InMemoryRoomStore::new();
        for room in seeded_rooms() {
            store.store(room).await.unwrap();
        }

        let pune = store
            .search(&RoomFilters {
                city: Some("PUNE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pune.total, 2);

        let priced = store
            .search(&RoomFilters {
                min_rate: Some(Money(6_000)),
                max_rate: Some(Money(10_000)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(priced.total, 1);
        assert_eq!(priced.rooms[0].base_rate, Money(8_000));
    }

    #[tokio::test]
    async fn test_search_pagination_keeps_total() {
        let store = InMemoryRoomStore::new();
        for room in seeded_rooms() {
            store.store(room).await.unwrap();
        }

        let page = store
            .search(&RoomFilters {
                limit: Some(1),
                offset: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.rooms.len(), 1);
        assert_eq!(page.rooms[0].base_rate, Money(8_000));
    }

    #[tokio::test]
    async fn test_payment_lookup_by_gateway_order() {
        let store = InMemoryPaymentStore::new();
        let payment = Payment::new(
            Uuid::new_v4(),
            Money(1_000),
            "INR",
            "simulated",
            "order_abc".to_string(),
            chrono::Utc::now(),
        );
        store.store(payment.clone()).await.unwrap();

        let found = store.by_gateway_order("order_abc").await.unwrap().unwrap();
        assert_eq!(found, payment);
        assert!(store.by_gateway_order("order_zzz").await.unwrap().is_none());
    }
}
