//! # Custody Handoff Flow
//!
//! A waybill moving shipper → carrier → receiver across three peers that
//! share one ledger, with every committed step published on the bus.
//!
//! ```text
//! Org1 peer                Org2 peer                 Org3 peer
//! createAsset(A1)
//! dispatchByOriginator ──→ endorseByIntermediary ──→ endorseByFinal
//!   CREATED → PENDING_INTERMEDIARY → PENDING_FINAL → COMPLETED
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{Consortium, CARRIER_ORG, PAYLOAD, RECEIVER_ORG, SHIPPER_ORG};
    use cc_01_trust_validation::test_utils::KeyKind;
    use cc_03_custody_transfer::{
        CustodyTransferApi, EventPublishingAdapter, TransferError, WaybillStatus,
        CARRIER_RECEIVER, SHIPPER_CARRIER,
    };
    use shared_bus::{EventFilter, InMemoryEventBus, LedgerEvent};
    use shared_types::{FailureKind, Role};
    use std::sync::Arc;

    fn create(net: &Consortium, asset_id: &str) {
        net.peer(SHIPPER_ORG)
            .create_asset(
                &net.shipper_ctx(),
                asset_id,
                Consortium::party(&net.shipper),
                Consortium::party(&net.carrier),
                Consortium::party(&net.receiver),
            )
            .unwrap();
    }

    /// S1 creates A1 for R1 via C1; C1 endorses S1's exact payload.
    #[test]
    fn test_carrier_endorses_exact_shipper_payload() {
        let net = Consortium::new(KeyKind::Ed25519);
        create(&net, "A1");
        net.peer(SHIPPER_ORG)
            .dispatch_by_originator(
                &net.shipper_ctx(),
                "A1",
                &Consortium::signed(&net.shipper, PAYLOAD),
            )
            .unwrap();

        let carrier_signed = Consortium::signed(&net.carrier, PAYLOAD);
        let outcome = net
            .peer(CARRIER_ORG)
            .endorse_by_intermediary(&net.carrier_ctx(), "A1", &carrier_signed)
            .unwrap();

        let result = outcome.value;
        assert!(result.applied);
        assert_eq!(result.to, WaybillStatus::PendingFinal);
        assert_eq!(result.waybill.custodian, Consortium::party(&net.carrier));

        let view = net
            .peer(CARRIER_ORG)
            .read_asset(&net.carrier_ctx(), "A1")
            .unwrap();
        let private = view.shipper_carrier.unwrap();
        assert_eq!(private.payload, PAYLOAD);
        assert_eq!(
            private.carrier_signature.unwrap().signature,
            carrier_signed.signature
        );
        assert!(view.carrier_receiver.is_some());
    }

    #[tokio::test]
    async fn test_full_handoff_publishes_each_step() {
        let net = Consortium::new(KeyKind::Ed25519);
        let bus = Arc::new(InMemoryEventBus::new());
        let events = EventPublishingAdapter::new(Arc::clone(&bus));
        let mut subscription = bus.watch("A1");

        let shipper = net.peer(SHIPPER_ORG);
        let carrier = net.peer(CARRIER_ORG);
        let receiver = net.peer(RECEIVER_ORG);

        events
            .forward(shipper.create_asset(
                &net.shipper_ctx(),
                "A1",
                Consortium::party(&net.shipper),
                Consortium::party(&net.carrier),
                Consortium::party(&net.receiver),
            ))
            .await
            .unwrap();
        events
            .forward(shipper.transition(
                &net.shipper_ctx(),
                "A1",
                &Consortium::signed(&net.shipper, PAYLOAD),
            ))
            .await
            .unwrap();
        events
            .forward(carrier.transition(
                &net.carrier_ctx(),
                "A1",
                &Consortium::signed(&net.carrier, PAYLOAD),
            ))
            .await
            .unwrap();
        let done = events
            .forward(receiver.transition(
                &net.receiver_ctx(),
                "A1",
                &Consortium::signed(&net.receiver, PAYLOAD),
            ))
            .await
            .unwrap();

        assert_eq!(done.to, WaybillStatus::Completed);
        assert_eq!(done.waybill.custodian, Consortium::party(&net.receiver));
        assert_eq!(done.waybill.applied.len(), 3);
        let settled = done.completed.unwrap();
        assert!(settled.shipper_signature.is_some());
        assert!(settled.carrier_signature.is_some());
        assert!(settled.receiver_signature.is_some());

        assert_eq!(net.registry.len(SHIPPER_CARRIER), 0);
        assert_eq!(net.registry.len(CARRIER_RECEIVER), 0);

        let mut names = Vec::new();
        for _ in 0..4 {
            names.push(subscription.recv().await.unwrap().name());
        }
        assert_eq!(
            names,
            vec![
                "AssetCreated",
                "AssetTransitioned",
                "AssetTransitioned",
                "AssetCompleted"
            ]
        );
    }

    #[tokio::test]
    async fn test_replay_publishes_nothing() {
        let net = Consortium::new(KeyKind::Ed25519);
        let bus = Arc::new(InMemoryEventBus::new());
        let events = EventPublishingAdapter::new(Arc::clone(&bus));
        create(&net, "A1");
        let signed = Consortium::signed(&net.shipper, PAYLOAD);
        let shipper = net.peer(SHIPPER_ORG);
        shipper
            .dispatch_by_originator(&net.shipper_ctx(), "A1", &signed)
            .unwrap();

        let mut subscription = bus.subscribe(EventFilter::all());
        let replay = events
            .forward(shipper.dispatch_by_originator(&net.shipper_ctx(), "A1", &signed))
            .await
            .unwrap();

        assert!(!replay.applied);
        assert_eq!(replay.from, WaybillStatus::PendingIntermediary);
        assert_eq!(subscription.try_recv(), Ok(None));
    }

    #[test]
    fn test_secp256k1_consortium() {
        let net = Consortium::new(KeyKind::Secp256k1);
        create(&net, "A7");
        for (org, ctx, member) in [
            (SHIPPER_ORG, net.shipper_ctx(), &net.shipper),
            (CARRIER_ORG, net.carrier_ctx(), &net.carrier),
            (RECEIVER_ORG, net.receiver_ctx(), &net.receiver),
        ] {
            net.peer(org)
                .transition(&ctx, "A7", &Consortium::signed(member, PAYLOAD))
                .unwrap();
        }
        let waybill = net
            .peer(SHIPPER_ORG)
            .read_asset(&net.shipper_ctx(), "A7")
            .unwrap()
            .waybill;
        assert_eq!(waybill.status, WaybillStatus::Completed);
    }

    #[test]
    fn test_rejected_steps_leave_ledger_untouched() {
        let net = Consortium::new(KeyKind::Ed25519);
        create(&net, "A1");
        net.peer(SHIPPER_ORG)
            .dispatch_by_originator(
                &net.shipper_ctx(),
                "A1",
                &Consortium::signed(&net.shipper, PAYLOAD),
            )
            .unwrap();
        let before = net.registry.snapshot();
        let carrier = net.peer(CARRIER_ORG);

        // A different payload.
        let err = carrier
            .transition(
                &net.carrier_ctx(),
                "A1",
                &Consortium::signed(&net.carrier, b"11 pallets"),
            )
            .unwrap_err();
        assert_eq!(err, TransferError::PayloadMismatch("A1".into()));

        // The right payload signed by the receiver's key.
        let mut forged = Consortium::signed(&net.receiver, PAYLOAD);
        forged.certificate_serial = net.carrier.certificate.serial().clone();
        let err = carrier
            .transition(&net.carrier_ctx(), "A1", &forged)
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::InvalidSignature);

        // Receiver jumping the queue.
        let err = net
            .peer(RECEIVER_ORG)
            .transition(
                &net.receiver_ctx(),
                "A1",
                &Consortium::signed(&net.receiver, PAYLOAD),
            )
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::AccessDenied);

        // Carrier submitting at the shipper's peer.
        let err = net
            .peer(SHIPPER_ORG)
            .transition(
                &net.ctx(Role::Carrier, CARRIER_ORG),
                "A1",
                &Consortium::signed(&net.carrier, PAYLOAD),
            )
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::AccessDenied);

        assert_eq!(net.registry.snapshot(), before);
    }

    #[test]
    fn test_reserved_ids_feed_create() {
        let net = Consortium::new(KeyKind::Ed25519);
        let shipper = net.peer(SHIPPER_ORG);

        let first = shipper.reserve_asset_id(&net.shipper_ctx()).unwrap().value;
        assert_eq!(first, "4012345-0000001-1");
        create(&net, &first);

        let second = shipper.reserve_asset_id(&net.shipper_ctx()).unwrap().value;
        assert_eq!(second, "4012345-0000001-2");

        let range = shipper
            .assets_by_range(&net.shipper_ctx(), "4012345-0000001-", "")
            .unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].id, first);
    }

    #[test]
    fn test_events_carry_public_record() {
        let net = Consortium::new(KeyKind::Ed25519);
        let outcome = net
            .peer(SHIPPER_ORG)
            .create_asset(
                &net.shipper_ctx(),
                "A1",
                Consortium::party(&net.shipper),
                Consortium::party(&net.carrier),
                Consortium::party(&net.receiver),
            )
            .unwrap();

        let LedgerEvent::AssetCreated { payload, .. } = &outcome.events[0] else {
            panic!("expected AssetCreated, got {:?}", outcome.events);
        };
        let record: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(record["id"], "A1");
        assert_eq!(record["status"], "CREATED");
        assert!(record.get("payload").is_none());
    }
}
