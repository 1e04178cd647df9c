//! Coordinator scenario tests
//!
//! Run against the in-memory backend. Failure injection covers each step
//! boundary of the create, update and delete sagas.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::coordinator::OccupancyCoordinator;
    use crate::domain::{
        rooms_for_active_guests, AddressChanges, DomainError, GuestChanges, GuestStatus,
        NewRoom, OperationContext, PaymentAmount, PgStats, Room, MAX_ROOMS,
    };
    use crate::error::AppError;
    use crate::handlers::{
        CreateGuestCommand, CreateGuestResult, DeleteGuestCommand, GuestUpdate, UpdateGuestCommand,
    };
    use crate::store::{
        AddressStore, GuestStore, MemoryStore, PaymentStore, PgStatsStore, RoomStore, StoreOp,
        StoreResult, Stores,
    };

    // =========================================================================
    // Helpers
    // =========================================================================

    fn setup() -> (Arc<MemoryStore>, OccupancyCoordinator) {
        let store = Arc::new(MemoryStore::new());
        let coordinator = OccupancyCoordinator::new(Stores::from_backend(store.clone()));
        (store, coordinator)
    }

    fn ctx() -> OperationContext {
        OperationContext::new()
    }

    fn guest_command(mobile_number: &str, room_no: i32) -> CreateGuestCommand {
        CreateGuestCommand::new("Guest".to_string(), 28, mobile_number.to_string(), room_no)
            .with_address("4", "Residency Road", "Karnataka", "560025")
            .with_payment(PaymentAmount::new(dec!(6000)).unwrap(), None)
    }

    async fn create(
        coordinator: &OccupancyCoordinator,
        mobile_number: &str,
        room_no: i32,
    ) -> CreateGuestResult {
        coordinator
            .create_guest(guest_command(mobile_number, room_no), &ctx())
            .await
            .unwrap()
    }

    async fn room(store: &MemoryStore, room_no: i32) -> Room {
        RoomStore::find_by_room_no(store, room_no)
            .await
            .unwrap()
            .expect("room should exist")
    }

    async fn beds(store: &MemoryStore, room_no: i32) -> (i32, i32) {
        let room = room(store, room_no).await;
        (room.vacant_beds, room.occupied_beds)
    }

    async fn stats(store: &MemoryStore) -> PgStats {
        PgStatsStore::find(store)
            .await
            .unwrap()
            .expect("pg stats should exist")
    }

    async fn guest_count(store: &MemoryStore) -> usize {
        GuestStore::find_all(store).await.unwrap().len()
    }

    fn status_update(guest_id: Uuid, status: GuestStatus) -> UpdateGuestCommand {
        UpdateGuestCommand::status(guest_id, status)
    }

    /// Room store whose first lookup misses, as if another create inserted
    /// the room right after it was read.
    struct LateRoomStore {
        inner: Arc<MemoryStore>,
        missed: AtomicBool,
    }

    #[async_trait]
    impl RoomStore for LateRoomStore {
        async fn find_by_room_no(&self, room_no: i32) -> StoreResult<Option<Room>> {
            if !self.missed.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            RoomStore::find_by_room_no(self.inner.as_ref(), room_no).await
        }

        async fn find_all(&self) -> StoreResult<Vec<Room>> {
            RoomStore::find_all(self.inner.as_ref()).await
        }

        async fn create(&self, room: NewRoom) -> StoreResult<Room> {
            RoomStore::create(self.inner.as_ref(), room).await
        }

        async fn increment_beds(
            &self,
            room_no: i32,
            vacant_delta: i32,
            occupied_delta: i32,
        ) -> StoreResult<Option<Room>> {
            self.inner
                .increment_beds(room_no, vacant_delta, occupied_delta)
                .await
        }
    }

    fn late_room_setup(store: &Arc<MemoryStore>) -> OccupancyCoordinator {
        let mut stores = Stores::from_backend(store.clone());
        stores.rooms = Arc::new(LateRoomStore {
            inner: store.clone(),
            missed: AtomicBool::new(false),
        });
        OccupancyCoordinator::new(stores)
    }

    // =========================================================================
    // createGuest
    // =========================================================================

    #[tokio::test]
    async fn test_create_guest_in_new_room() {
        let (store, coordinator) = setup();

        let result = create(&coordinator, "9000000001", 101).await;

        assert!(result.created_room);
        assert_eq!((result.room.vacant_beds, result.room.occupied_beds), (2, 1));
        assert_eq!(beds(&store, 101).await, (2, 1));
        assert_eq!(result.guest.guest.status, GuestStatus::Active);
        assert_eq!(
            result.guest.address.as_ref().map(|a| a.street.as_str()),
            Some("Residency Road")
        );
        assert_eq!(result.payment.guest_id, result.guest.guest.id);
        assert_eq!(result.payment.amount, dec!(6000));

        let stats = stats(&store).await;
        assert_eq!(stats.total_guests, 1);
        assert_eq!(stats.active_guests, 1);
        assert_eq!(stats.inactive_guests, 0);
        assert_eq!(stats.total_rooms_occupied, 1);
    }

    #[tokio::test]
    async fn test_create_guest_in_existing_room_takes_one_bed() {
        let (store, coordinator) = setup();
        store.insert_room(12, 3, 0).await.unwrap();

        let result = create(&coordinator, "9000000002", 12).await;

        assert!(!result.created_room);
        assert_eq!((result.room.vacant_beds, result.room.occupied_beds), (2, 1));
        assert_eq!(beds(&store, 12).await, (2, 1));
    }

    #[tokio::test]
    async fn test_create_inactive_guest_counts_as_inactive() {
        let (store, coordinator) = setup();
        coordinator
            .create_guest(
                guest_command("9000000003", 3).with_status(GuestStatus::Inactive),
                &ctx(),
            )
            .await
            .unwrap();

        let stats = stats(&store).await;
        assert_eq!(stats.active_guests, 0);
        assert_eq!(stats.inactive_guests, 1);
        assert_eq!(stats.total_rooms_occupied, 1);
    }

    #[tokio::test]
    async fn test_create_guest_full_room_changes_nothing() {
        let (store, coordinator) = setup();
        create(&coordinator, "9000000010", 1).await;
        store.insert_room(7, 0, 3).await.unwrap();
        let before = stats(&store).await;

        let err = coordinator
            .create_guest(guest_command("9000000011", 7), &ctx())
            .await
            .unwrap_err();

        assert_eq!(err.domain(), Some(&DomainError::NoVacantBeds { room_no: 7 }));
        assert_eq!(beds(&store, 7).await, (0, 3));
        assert_eq!(guest_count(&store).await, 1);
        assert_eq!(stats(&store).await, before);
    }

    #[tokio::test]
    async fn test_create_guest_rejects_twenty_fifth_room() {
        let (store, coordinator) = setup();

        // 69 active guests fill rooms 1..=23 and project 24 occupied rooms
        for i in 0..69 {
            let room_no = i / 3 + 1;
            create(&coordinator, &format!("80000{:05}", i), room_no).await;
        }
        assert_eq!(stats(&store).await.total_rooms_occupied, MAX_ROOMS);

        let err = coordinator
            .create_guest(guest_command("9000000099", 24), &ctx())
            .await
            .unwrap_err();

        assert_eq!(
            err.domain(),
            Some(&DomainError::RoomLimitReached { max_rooms: MAX_ROOMS })
        );
        assert!(RoomStore::find_by_room_no(store.as_ref(), 24)
            .await
            .unwrap()
            .is_none());
        assert_eq!(guest_count(&store).await, 69);
    }

    #[tokio::test]
    async fn test_create_joins_room_created_after_lookup() {
        let store = Arc::new(MemoryStore::new());
        store.insert_room(5, 2, 1).await.unwrap();
        let coordinator = late_room_setup(&store);

        let result = coordinator
            .create_guest(guest_command("9000000050", 5), &ctx())
            .await
            .unwrap();

        assert!(!result.created_room);
        assert_eq!((result.room.vacant_beds, result.room.occupied_beds), (1, 2));
        assert_eq!(beds(&store, 5).await, (1, 2));
        assert_eq!(stats(&store).await.total_guests, 1);
    }

    #[tokio::test]
    async fn test_create_room_created_after_lookup_is_full() {
        let store = Arc::new(MemoryStore::new());
        store.insert_room(5, 0, 3).await.unwrap();
        let coordinator = late_room_setup(&store);

        let err = coordinator
            .create_guest(guest_command("9000000051", 5), &ctx())
            .await
            .unwrap_err();

        assert_eq!(err.domain(), Some(&DomainError::NoVacantBeds { room_no: 5 }));
        assert_eq!(beds(&store, 5).await, (0, 3));
        assert_eq!(guest_count(&store).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_into_new_room_both_succeed() {
        for _ in 0..50 {
            let (store, coordinator) = setup();

            let first = tokio::spawn({
                let coordinator = coordinator.clone();
                async move {
                    coordinator
                        .create_guest(guest_command("9000000060", 5), &ctx())
                        .await
                }
            });
            let second = tokio::spawn({
                let coordinator = coordinator.clone();
                async move {
                    coordinator
                        .create_guest(guest_command("9000000061", 5), &ctx())
                        .await
                }
            });
            let (first, second) = tokio::join!(first, second);
            let first = first.unwrap().unwrap();
            let second = second.unwrap().unwrap();

            // Exactly one of them created the room
            assert_ne!(first.created_room, second.created_room);
            assert_eq!(beds(&store, 5).await, (1, 2));
            let s = stats(&store).await;
            assert_eq!((s.total_guests, s.active_guests), (2, 2));
            assert_eq!(s.total_rooms_occupied, 1);
        }
    }

    #[tokio::test]
    async fn test_create_guest_duplicate_mobile_number() {
        let (store, coordinator) = setup();
        create(&coordinator, "9000000020", 1).await;

        let err = coordinator
            .create_guest(guest_command("9000000020", 2), &ctx())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(DomainError::DuplicateMobileNumber(_))
        ));
        assert!(RoomStore::find_by_room_no(store.as_ref(), 2)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_guest_validation_writes_nothing() {
        let (store, coordinator) = setup();
        let mut command = guest_command("9000000021", 1);
        command.address = None;

        let err = coordinator.create_guest(command, &ctx()).await.unwrap_err();

        assert!(matches!(err, AppError::Domain(DomainError::Validation(_))));
        assert!(RoomStore::find_all(store.as_ref()).await.unwrap().is_empty());
        assert!(PgStatsStore::find(store.as_ref()).await.unwrap().is_none());
    }

    // =========================================================================
    // Reference scenario
    // =========================================================================

    #[tokio::test]
    async fn test_room_101_scenario() {
        let (store, coordinator) = setup();

        let a = create(&coordinator, "9100000001", 101).await.guest.guest;
        assert_eq!(beds(&store, 101).await, (2, 1));
        let s = stats(&store).await;
        assert_eq!((s.active_guests, s.total_rooms_occupied), (1, 1));

        let b = create(&coordinator, "9100000002", 101).await.guest.guest;
        assert_eq!(beds(&store, 101).await, (1, 2));

        coordinator
            .update_guest(status_update(a.id, GuestStatus::Inactive), &ctx())
            .await
            .unwrap();
        assert_eq!(beds(&store, 101).await, (2, 1));
        let s = stats(&store).await;
        assert_eq!(s.active_guests, 1);
        assert_eq!(s.inactive_guests, 1);
        assert_eq!(s.total_rooms_occupied, 1);

        coordinator
            .delete_guest(DeleteGuestCommand::new(b.id), &ctx())
            .await
            .unwrap();
        assert_eq!(beds(&store, 101).await, (3, 0));
        let s = stats(&store).await;
        assert_eq!(s.total_guests, 1);
        assert_eq!(s.active_guests, 0);
        assert_eq!(s.inactive_guests, 1);
        assert_eq!(s.total_rooms_occupied, 1);
    }

    #[tokio::test]
    async fn test_rooms_occupied_tracks_active_guests() {
        let (store, coordinator) = setup();
        let mut ids = Vec::new();

        for i in 0..7 {
            let guest = create(&coordinator, &format!("93000000{:02}", i), i / 3 + 1).await;
            ids.push(guest.guest.guest.id);
            assert!(stats(&store).await.rooms_consistent());
        }
        assert_eq!(stats(&store).await.total_rooms_occupied, rooms_for_active_guests(7));

        coordinator
            .update_guest(status_update(ids[0], GuestStatus::Inactive), &ctx())
            .await
            .unwrap();
        assert!(stats(&store).await.rooms_consistent());

        coordinator
            .delete_guest(DeleteGuestCommand::new(ids[1]), &ctx())
            .await
            .unwrap();
        let s = stats(&store).await;
        assert_eq!(s.active_guests, 5);
        assert_eq!(s.total_rooms_occupied, 2);
    }

    // =========================================================================
    // updateGuest
    // =========================================================================

    #[tokio::test]
    async fn test_status_toggle_round_trip() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9200000001", 5).await.guest.guest;
        create(&coordinator, "9200000002", 5).await;
        let beds_before = beds(&store, 5).await;
        let stats_before = stats(&store).await;

        coordinator
            .update_guest(status_update(guest.id, GuestStatus::Inactive), &ctx())
            .await
            .unwrap();
        assert_eq!(beds(&store, 5).await, (2, 1));

        let updated = coordinator
            .update_guest(status_update(guest.id, GuestStatus::Active), &ctx())
            .await
            .unwrap();
        assert_eq!(updated.guest.status, GuestStatus::Active);

        let stats_after = stats(&store).await;
        assert_eq!(beds(&store, 5).await, beds_before);
        assert_eq!(stats_after.total_guests, stats_before.total_guests);
        assert_eq!(stats_after.active_guests, stats_before.active_guests);
        assert_eq!(stats_after.inactive_guests, stats_before.inactive_guests);
        assert_eq!(
            stats_after.total_rooms_occupied,
            stats_before.total_rooms_occupied
        );
    }

    #[tokio::test]
    async fn test_room_transfer_moves_one_bed() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9200000010", 1).await.guest.guest;
        store.insert_room(2, 3, 0).await.unwrap();

        let updated = coordinator
            .update_guest(UpdateGuestCommand::room(guest.id, 2), &ctx())
            .await
            .unwrap();

        assert_eq!(updated.guest.room_no, 2);
        assert_eq!(beds(&store, 1).await, (3, 0));
        assert_eq!(beds(&store, 2).await, (2, 1));
        assert_eq!(stats(&store).await.active_guests, 1);
    }

    #[tokio::test]
    async fn test_transfer_to_full_room_leaves_old_room() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9200000020", 1).await.guest.guest;
        store.insert_room(2, 0, 3).await.unwrap();

        let err = coordinator
            .update_guest(UpdateGuestCommand::room(guest.id, 2), &ctx())
            .await
            .unwrap_err();

        assert_eq!(err.domain(), Some(&DomainError::NoVacantBeds { room_no: 2 }));
        assert_eq!(beds(&store, 1).await, (2, 1));
        assert_eq!(beds(&store, 2).await, (0, 3));
        let stored = GuestStore::find_by_id(store.as_ref(), guest.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.room_no, 1);
    }

    #[tokio::test]
    async fn test_transfer_to_missing_room() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9200000030", 1).await.guest.guest;

        let err = coordinator
            .update_guest(UpdateGuestCommand::room(guest.id, 99), &ctx())
            .await
            .unwrap_err();

        assert_eq!(err.domain(), Some(&DomainError::RoomNotFound(99)));
        assert_eq!(beds(&store, 1).await, (2, 1));
    }

    #[tokio::test]
    async fn test_inactive_guest_room_change_moves_no_beds() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9200000040", 1).await.guest.guest;
        coordinator
            .update_guest(status_update(guest.id, GuestStatus::Inactive), &ctx())
            .await
            .unwrap();
        store.insert_room(2, 3, 0).await.unwrap();

        let updated = coordinator
            .update_guest(UpdateGuestCommand::room(guest.id, 2), &ctx())
            .await
            .unwrap();

        assert_eq!(updated.guest.room_no, 2);
        assert_eq!(beds(&store, 1).await, (3, 0));
        assert_eq!(beds(&store, 2).await, (3, 0));
    }

    #[tokio::test]
    async fn test_update_applies_supplied_falsy_values() {
        let (_store, coordinator) = setup();
        let guest = create(&coordinator, "9200000050", 1).await.guest.guest;

        let update = GuestUpdate {
            fields: GuestChanges {
                name: Some(String::new()),
                age: Some(0),
                ..Default::default()
            },
            address: None,
        };
        let updated = coordinator
            .update_guest(UpdateGuestCommand::new(guest.id, update), &ctx())
            .await
            .unwrap();

        assert_eq!(updated.guest.age, 0);
        assert_eq!(updated.guest.name, "");
        assert_eq!(updated.guest.mobile_number, "9200000050");
        assert_eq!(updated.guest.room_no, 1);
    }

    #[tokio::test]
    async fn test_update_address_only() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9200000060", 1).await.guest.guest;

        let update = GuestUpdate {
            fields: GuestChanges::default(),
            address: Some(AddressChanges {
                pincode: Some("600001".to_string()),
                ..Default::default()
            }),
        };
        let updated = coordinator
            .update_guest(UpdateGuestCommand::new(guest.id, update), &ctx())
            .await
            .unwrap();

        let address = updated.address.unwrap();
        assert_eq!(address.pincode, "600001");
        assert_eq!(address.street, "Residency Road");
        assert_eq!(beds(&store, 1).await, (2, 1));
    }

    #[tokio::test]
    async fn test_update_mobile_number_conflict() {
        let (_store, coordinator) = setup();
        create(&coordinator, "9200000070", 1).await;
        let guest = create(&coordinator, "9200000071", 1).await.guest.guest;

        let update = GuestUpdate {
            fields: GuestChanges {
                mobile_number: Some("9200000070".to_string()),
                ..Default::default()
            },
            address: None,
        };
        let err = coordinator
            .update_guest(UpdateGuestCommand::new(guest.id, update), &ctx())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(DomainError::DuplicateMobileNumber(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_guest() {
        let (_store, coordinator) = setup();
        let err = coordinator
            .update_guest(status_update(Uuid::new_v4(), GuestStatus::Inactive), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::GuestNotFound(_))));
    }

    // =========================================================================
    // deleteGuest and queries
    // =========================================================================

    #[tokio::test]
    async fn test_delete_guest_keeps_payments() {
        let (store, coordinator) = setup();
        let created = create(&coordinator, "9400000001", 8).await;
        create(&coordinator, "9400000002", 8).await;
        let guest_id = created.guest.guest.id;

        let result = coordinator
            .delete_guest(DeleteGuestCommand::new(guest_id), &ctx())
            .await
            .unwrap();

        assert_eq!(result.deleted_guest.id, guest_id);
        assert_eq!(
            result.deleted_address.map(|a| a.id),
            Some(created.guest.guest.address_id)
        );
        assert_eq!(beds(&store, 8).await, (2, 1));
        assert_eq!(stats(&store).await.total_guests, 1);

        let payments = coordinator.list_payments(Some(guest_id)).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].id, created.payment.id);

        let err = coordinator.get_guest(guest_id).await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::GuestNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_guest() {
        let (_store, coordinator) = setup();
        let err = coordinator
            .delete_guest(DeleteGuestCommand::new(Uuid::new_v4()), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::GuestNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_guest_populates_address_and_payments() {
        let (_store, coordinator) = setup();
        let created = create(&coordinator, "9400000010", 1).await;

        let details = coordinator.get_guest(created.guest.guest.id).await.unwrap();

        assert_eq!(details.guest.address, created.guest.address);
        assert_eq!(details.payments, vec![created.payment]);
        assert_eq!(coordinator.list_guests().await.unwrap().len(), 1);
        assert_eq!(coordinator.list_rooms().await.unwrap().len(), 1);
    }

    // =========================================================================
    // Failure at each saga step
    // =========================================================================

    #[tokio::test]
    async fn test_create_fails_at_address_keeps_new_room() {
        let (store, coordinator) = setup();
        store.fail_next(StoreOp::CreateAddress).await;

        let err = coordinator
            .create_guest(guest_command("9500000001", 1), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(beds(&store, 1).await, (2, 1));
        assert_eq!(guest_count(&store).await, 0);
        assert!(PgStatsStore::find(store.as_ref()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_fails_at_room_create_writes_nothing() {
        let (store, coordinator) = setup();
        store.fail_next(StoreOp::CreateRoom).await;

        let err = coordinator
            .create_guest(guest_command("9500000010", 1), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert!(RoomStore::find_all(store.as_ref()).await.unwrap().is_empty());
        assert_eq!(guest_count(&store).await, 0);
        assert!(PaymentStore::find_all(store.as_ref()).await.unwrap().is_empty());
        assert!(PgStatsStore::find(store.as_ref()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_fails_at_guest_keeps_room() {
        let (store, coordinator) = setup();
        store.fail_next(StoreOp::CreateGuest).await;

        let err = coordinator
            .create_guest(guest_command("9500000002", 1), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(beds(&store, 1).await, (2, 1));
        assert_eq!(guest_count(&store).await, 0);
        assert!(PaymentStore::find_all(store.as_ref()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_fails_at_payment_keeps_guest_and_address() {
        let (store, coordinator) = setup();
        store.fail_next(StoreOp::CreatePayment).await;

        let err = coordinator
            .create_guest(guest_command("9500000003", 1), &ctx())
            .await
            .unwrap_err();
        assert!(err.is_store_failure());

        let guests = GuestStore::find_all(store.as_ref()).await.unwrap();
        assert_eq!(guests.len(), 1);
        let address = AddressStore::find_by_id(store.as_ref(), guests[0].address_id)
            .await
            .unwrap();
        assert!(address.is_some());
        assert!(PaymentStore::find_all(store.as_ref()).await.unwrap().is_empty());
        assert!(PgStatsStore::find(store.as_ref()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_fails_at_bed_leaves_room_counts() {
        let (store, coordinator) = setup();
        store.insert_room(4, 3, 0).await.unwrap();
        store.fail_next(StoreOp::IncrementBeds).await;

        let err = coordinator
            .create_guest(guest_command("9500000004", 4), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(beds(&store, 4).await, (3, 0));
        assert_eq!(guest_count(&store).await, 1);
        assert_eq!(PaymentStore::find_all(store.as_ref()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_fails_at_counters_leaves_them_behind() {
        let (store, coordinator) = setup();
        create(&coordinator, "9500000005", 1).await;
        store.fail_next(StoreOp::IncrementCounters).await;

        let err = coordinator
            .create_guest(guest_command("9500000006", 1), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(guest_count(&store).await, 2);
        assert_eq!(beds(&store, 1).await, (1, 2));
        assert_eq!(stats(&store).await.total_guests, 1);
    }

    #[tokio::test]
    async fn test_create_fails_at_recompute_leaves_stale_rooms() {
        let (store, coordinator) = setup();
        for i in 0..2 {
            create(&coordinator, &format!("95000001{:02}", i), 1).await;
        }
        store.fail_next(StoreOp::SetTotalRoomsOccupied).await;

        let err = coordinator
            .create_guest(guest_command("9500000199", 2), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        let s = stats(&store).await;
        assert_eq!(s.active_guests, 3);
        assert_eq!(s.total_rooms_occupied, 1);
        assert!(!s.rooms_consistent());
    }

    #[tokio::test]
    async fn test_create_first_guest_fails_at_pg_stats_create() {
        let (store, coordinator) = setup();
        store.fail_next(StoreOp::CreatePgStats).await;

        let err = coordinator
            .create_guest(guest_command("9500000007", 1), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(guest_count(&store).await, 1);
        assert!(PgStatsStore::find(store.as_ref()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_free_bed_failure_is_tolerated() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9600000001", 1).await.guest.guest;
        store.fail_next(StoreOp::IncrementBeds).await;

        let updated = coordinator
            .update_guest(status_update(guest.id, GuestStatus::Inactive), &ctx())
            .await
            .unwrap();

        assert_eq!(updated.guest.status, GuestStatus::Inactive);
        assert_eq!(beds(&store, 1).await, (2, 1));
        assert_eq!(stats(&store).await.inactive_guests, 1);
    }

    #[tokio::test]
    async fn test_update_fails_at_counters_after_bed_freed() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9600000002", 1).await.guest.guest;
        store.fail_next(StoreOp::IncrementCounters).await;

        let err = coordinator
            .update_guest(status_update(guest.id, GuestStatus::Inactive), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(beds(&store, 1).await, (3, 0));
        let stored = GuestStore::find_by_id(store.as_ref(), guest.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, GuestStatus::Active);
        assert_eq!(stats(&store).await.active_guests, 1);
    }

    #[tokio::test]
    async fn test_update_fails_at_guest_write_after_counters() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9600000003", 1).await.guest.guest;
        store.fail_next(StoreOp::UpdateGuest).await;

        let err = coordinator
            .update_guest(status_update(guest.id, GuestStatus::Inactive), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        let s = stats(&store).await;
        assert_eq!((s.active_guests, s.inactive_guests), (0, 1));
        let stored = GuestStore::find_by_id(store.as_ref(), guest.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, GuestStatus::Active);
    }

    #[tokio::test]
    async fn test_update_fails_at_address_moves_nothing() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9600000004", 1).await.guest.guest;
        store.insert_room(2, 3, 0).await.unwrap();
        store.fail_next(StoreOp::UpdateAddress).await;

        let mut command = UpdateGuestCommand::room(guest.id, 2);
        command.update.address = Some(AddressChanges {
            street: Some("Brigade Road".to_string()),
            ..Default::default()
        });
        let err = coordinator.update_guest(command, &ctx()).await.unwrap_err();

        assert!(err.is_store_failure());
        let address = AddressStore::find_by_id(store.as_ref(), guest.address_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(address.street, "Residency Road");
        assert_eq!(beds(&store, 1).await, (2, 1));
        assert_eq!(beds(&store, 2).await, (3, 0));
        let stored = GuestStore::find_by_id(store.as_ref(), guest.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.room_no, 1);
    }

    #[tokio::test]
    async fn test_transfer_fails_at_occupy_leaves_both_rooms() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9600000005", 1).await.guest.guest;
        store.insert_room(2, 3, 0).await.unwrap();
        store.fail_next(StoreOp::IncrementBeds).await;

        let err = coordinator
            .update_guest(UpdateGuestCommand::room(guest.id, 2), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(beds(&store, 1).await, (2, 1));
        assert_eq!(beds(&store, 2).await, (3, 0));
        let stored = GuestStore::find_by_id(store.as_ref(), guest.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.room_no, 1);
        assert_eq!(stats(&store).await.active_guests, 1);
    }

    #[tokio::test]
    async fn test_update_fails_at_recompute_leaves_stale_rooms() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9600000006", 1).await.guest.guest;
        store.fail_next(StoreOp::SetTotalRoomsOccupied).await;

        let err = coordinator
            .update_guest(status_update(guest.id, GuestStatus::Inactive), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(beds(&store, 1).await, (3, 0));
        let s = stats(&store).await;
        assert_eq!((s.active_guests, s.inactive_guests), (0, 1));
        assert_eq!(s.total_rooms_occupied, 1);
        assert!(!s.rooms_consistent());
        let stored = GuestStore::find_by_id(store.as_ref(), guest.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, GuestStatus::Active);
    }

    #[tokio::test]
    async fn test_delete_address_failure_is_tolerated() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9700000001", 1).await.guest.guest;
        store.fail_next(StoreOp::DeleteAddress).await;

        let result = coordinator
            .delete_guest(DeleteGuestCommand::new(guest.id), &ctx())
            .await
            .unwrap();

        assert!(result.deleted_address.is_none());
        assert!(AddressStore::find_by_id(store.as_ref(), guest.address_id)
            .await
            .unwrap()
            .is_some());
        assert_eq!(beds(&store, 1).await, (3, 0));
        assert_eq!(stats(&store).await.total_guests, 0);
    }

    #[tokio::test]
    async fn test_delete_free_bed_failure_is_tolerated() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9700000002", 1).await.guest.guest;
        store.fail_next(StoreOp::IncrementBeds).await;

        coordinator
            .delete_guest(DeleteGuestCommand::new(guest.id), &ctx())
            .await
            .unwrap();

        assert_eq!(beds(&store, 1).await, (2, 1));
        assert_eq!(stats(&store).await.total_guests, 0);
    }

    #[tokio::test]
    async fn test_delete_fails_at_guest_delete_changes_nothing() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9700000003", 1).await.guest.guest;
        store.fail_next(StoreOp::DeleteGuest).await;

        let err = coordinator
            .delete_guest(DeleteGuestCommand::new(guest.id), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(guest_count(&store).await, 1);
        assert_eq!(beds(&store, 1).await, (2, 1));
        assert_eq!(stats(&store).await.total_guests, 1);
    }

    #[tokio::test]
    async fn test_delete_fails_at_counters_after_guest_removed() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9700000004", 1).await.guest.guest;
        store.fail_next(StoreOp::IncrementCounters).await;

        let err = coordinator
            .delete_guest(DeleteGuestCommand::new(guest.id), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(guest_count(&store).await, 0);
        assert_eq!(beds(&store, 1).await, (3, 0));
        assert_eq!(stats(&store).await.total_guests, 1);
    }

    #[tokio::test]
    async fn test_delete_fails_at_recompute_leaves_stale_rooms() {
        let (store, coordinator) = setup();
        let guest = create(&coordinator, "9700000005", 1).await.guest.guest;
        store.fail_next(StoreOp::SetTotalRoomsOccupied).await;

        let err = coordinator
            .delete_guest(DeleteGuestCommand::new(guest.id), &ctx())
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(guest_count(&store).await, 0);
        assert_eq!(beds(&store, 1).await, (3, 0));
        let s = stats(&store).await;
        assert_eq!((s.total_guests, s.active_guests), (0, 0));
        assert_eq!(s.total_rooms_occupied, 1);
    }
}
