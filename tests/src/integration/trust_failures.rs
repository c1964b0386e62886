//! # Trust Failures Across the Stack
//!
//! Chain failures raised in trust validation must surface unchanged through
//! signature verification and the contract, and must never leave a write
//! behind.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        Consortium, Member, TrustSetup, CARRIER_ORG, PAYLOAD, RECEIVER_ORG, SHIPPER_ORG,
    };
    use cc_01_trust_validation::test_utils::{KeyKind, LeafSpec, TestPki};
    use cc_01_trust_validation::{TrustValidationApi, TrustValidationService};
    use cc_03_custody_transfer::{CustodyTransferApi, CustodyTransferService, WaybillStatus};
    use serde_json::json;
    use shared_types::{FailureKind, OrganizationId};
    use std::sync::Arc;

    fn created(net: &Consortium) {
        net.peer(SHIPPER_ORG)
            .create_asset(
                &net.shipper_ctx(),
                "A1",
                Consortium::party(&net.shipper),
                Consortium::party(&net.carrier),
                Consortium::party(&net.receiver),
            )
            .unwrap();
    }

    fn dispatched(net: &Consortium) {
        created(net);
        net.peer(SHIPPER_ORG)
            .dispatch_by_originator(
                &net.shipper_ctx(),
                "A1",
                &Consortium::signed(&net.shipper, PAYLOAD),
            )
            .unwrap();
    }

    #[test]
    fn test_revoked_carrier_blocks_endorsement() {
        let net = Consortium::with_trust(
            KeyKind::Ed25519,
            TrustSetup {
                revoked: vec![Member::Carrier],
                ..TrustSetup::default()
            },
        );
        dispatched(&net);
        let before = net.registry.snapshot();

        let err = net
            .peer(CARRIER_ORG)
            .endorse_by_intermediary(
                &net.carrier_ctx(),
                "A1",
                &Consortium::signed(&net.carrier, PAYLOAD),
            )
            .unwrap_err();

        assert_eq!(err.failure_kind(), FailureKind::ChainRevoked);
        assert_eq!(net.registry.snapshot(), before);
        let status = net
            .peer(CARRIER_ORG)
            .read_asset(&net.carrier_ctx(), "A1")
            .unwrap()
            .waybill
            .status;
        assert_eq!(status, WaybillStatus::PendingIntermediary);
    }

    #[test]
    fn test_expired_receiver_cannot_complete() {
        let net = Consortium::with_trust(
            KeyKind::Secp256k1,
            TrustSetup {
                expired: Some(Member::Receiver),
                ..TrustSetup::default()
            },
        );
        dispatched(&net);
        net.peer(CARRIER_ORG)
            .endorse_by_intermediary(
                &net.carrier_ctx(),
                "A1",
                &Consortium::signed(&net.carrier, PAYLOAD),
            )
            .unwrap();

        let err = net
            .peer(RECEIVER_ORG)
            .endorse_by_final(
                &net.receiver_ctx(),
                "A1",
                &Consortium::signed(&net.receiver, PAYLOAD),
            )
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::ChainExpired);
    }

    #[test]
    fn test_missing_crl_is_fatal() {
        let net = Consortium::with_trust(
            KeyKind::Ed25519,
            TrustSetup {
                without_crls: true,
                ..TrustSetup::default()
            },
        );
        created(&net);

        let err = net
            .peer(SHIPPER_ORG)
            .dispatch_by_originator(
                &net.shipper_ctx(),
                "A1",
                &Consortium::signed(&net.shipper, PAYLOAD),
            )
            .unwrap_err();
        assert!(err.failure_kind().is_chain_failure());
        assert_eq!(err.failure_kind(), FailureKind::ChainUntrusted);
    }

    #[test]
    fn test_certificate_from_foreign_ca() {
        let net = Consortium::new(KeyKind::Ed25519);
        dispatched(&net);

        // Same subject as the real carrier, issued by a CA nobody trusts.
        let mut rogue_pki = TestPki::new(KeyKind::Ed25519);
        let rogue = rogue_pki.issue_leaf(LeafSpec::new("carrier-1", CARRIER_ORG));
        let context = net.pki.context(&[&net.shipper, &rogue]);
        let peer = CustodyTransferService::new(
            Arc::clone(&net.registry),
            Arc::new(TrustValidationService::new(Arc::new(context))),
            OrganizationId::new(CARRIER_ORG),
        );

        let err = peer
            .endorse_by_intermediary(
                &net.carrier_ctx(),
                "A1",
                &Consortium::signed(&rogue, PAYLOAD),
            )
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::ChainUntrusted);
    }

    #[test]
    fn test_revoked_note_signer() {
        let net = Consortium::with_trust(
            KeyKind::Ed25519,
            TrustSetup {
                revoked: vec![Member::Receiver],
                ..TrustSetup::default()
            },
        );
        net.peer(SHIPPER_ORG)
            .create_note(
                &net.shipper_ctx(),
                "N1",
                Consortium::party(&net.shipper),
                Consortium::party(&net.receiver),
                json!([{"gtin": "04012345000017", "qty": 12}]),
            )
            .unwrap();
        let message = r#"<RECADV id="m1"><line qty="12">received</line></RECADV>"#;
        let signature = Consortium::xml_signer(&net.receiver)
            .sign_detached(message, "m1")
            .unwrap();

        let err = net
            .peer(RECEIVER_ORG)
            .attach_message(&net.receiver_ctx(), "N1", message, Some(&signature))
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::ChainRevoked);

        let note = net
            .peer(RECEIVER_ORG)
            .read_note(&net.receiver_ctx(), "N1")
            .unwrap()
            .note;
        assert!(note.messages.is_empty());
    }

    #[test]
    fn test_batch_keeps_order_and_kinds() {
        let net = Consortium::with_trust(
            KeyKind::Ed25519,
            TrustSetup {
                revoked: vec![Member::Carrier],
                ..TrustSetup::default()
            },
        );
        let serials = [
            net.shipper.certificate.serial().clone(),
            net.carrier.certificate.serial().clone(),
            net.receiver.certificate.serial().clone(),
        ];

        let results = net.trust.validate_batch(&serials, net.now());
        let kinds: Vec<_> = results
            .iter()
            .map(|r| r.as_ref().err().map(|e| e.failure_kind()))
            .collect();
        assert_eq!(kinds, vec![None, Some(FailureKind::ChainRevoked), None]);
    }
}
