//! # Delivery Note Flow
//!
//! A despatch advice signed by the shipper, a receiving advice signed by the
//! receiver, and a late counter-signature on the despatch advice, exported
//! as one composite document.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Consortium, CARRIER_ORG, RECEIVER_ORG, SHIPPER_ORG};
    use cc_01_trust_validation::test_utils::KeyKind;
    use cc_01_trust_validation::TrustValidationApi;
    use cc_02_signature_verification::{
        strip_declaration, SignatureVerificationApi, SignatureVerificationService,
    };
    use cc_03_custody_transfer::{
        CustodyTransferApi, EventPublishingAdapter, NoteStatus, NOTE_PROPERTIES,
    };
    use serde_json::json;
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
    use shared_types::{FailureKind, Role};
    use std::sync::Arc;

    const DESADV: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DESADV id="desadv-1"><lineItem gtin="04012345000017" qty="12"/></DESADV>"#;
    const RECADV: &str =
        r#"<RECADV id="recadv-1"><lineItem gtin="04012345000017" qtyAccepted="12"/></RECADV>"#;

    fn note(net: &Consortium) {
        net.peer(SHIPPER_ORG)
            .create_note(
                &net.shipper_ctx(),
                "N1",
                Consortium::party(&net.shipper),
                Consortium::party(&net.receiver),
                json!([{"gtin": "04012345000017", "qty": 12}]),
            )
            .unwrap();
    }

    #[tokio::test]
    async fn test_two_party_note_exports_in_attachment_order() {
        let net = Consortium::new(KeyKind::Ed25519);
        let bus = Arc::new(InMemoryEventBus::new());
        let events = EventPublishingAdapter::new(Arc::clone(&bus));
        let mut notes = bus.subscribe(EventFilter::topics(vec![EventTopic::Notes]));
        let shipper = net.peer(SHIPPER_ORG);
        let receiver = net.peer(RECEIVER_ORG);

        events
            .forward(shipper.create_note(
                &net.shipper_ctx(),
                "N1",
                Consortium::party(&net.shipper),
                Consortium::party(&net.receiver),
                json!([{"gtin": "04012345000017", "qty": 12}]),
            ))
            .await
            .unwrap();

        let desadv = strip_declaration(DESADV);
        let shipper_sig = Consortium::xml_signer(&net.shipper)
            .sign_detached(desadv, "desadv-1")
            .unwrap();
        let after_desadv = events
            .forward(shipper.attach_message(&net.shipper_ctx(), "N1", DESADV, Some(&shipper_sig)))
            .await
            .unwrap();
        assert_eq!(after_desadv.status, NoteStatus::Signed);

        let after_recadv = events
            .forward(receiver.attach_message(&net.receiver_ctx(), "N1", RECADV, None))
            .await
            .unwrap();
        assert_eq!(after_recadv.status, NoteStatus::AwaitingSignatures);

        let receiver_on_recadv = Consortium::xml_signer(&net.receiver)
            .sign_detached(RECADV, "recadv-1")
            .unwrap();
        let receiver_on_desadv = Consortium::xml_signer(&net.receiver)
            .sign_detached(desadv, "desadv-1")
            .unwrap();
        events
            .forward(receiver.attach_signature(&net.receiver_ctx(), "N1", &receiver_on_recadv))
            .await
            .unwrap();
        let signed = events
            .forward(receiver.attach_signature(&net.receiver_ctx(), "N1", &receiver_on_desadv))
            .await
            .unwrap();
        assert_eq!(signed.status, NoteStatus::Signed);
        assert_eq!(signed.signature_count(), 3);

        let exported = receiver.export_asset(&net.receiver_ctx(), "N1").unwrap();
        let expected = format!(
            "<DELNOTE>\n{desadv}\n{RECADV}\n{shipper_sig}\n{receiver_on_recadv}\n{receiver_on_desadv}\n</DELNOTE>"
        );
        assert_eq!(exported, expected);

        let mut names = Vec::new();
        for _ in 0..5 {
            names.push(notes.recv().await.unwrap().name());
        }
        assert_eq!(
            names,
            vec![
                "NoteCreated",
                "MessageAttached",
                "MessageAttached",
                "SignatureAttached",
                "SignatureAttached"
            ]
        );
    }

    #[test]
    fn test_stored_signature_verifies_in_composite() {
        let net = Consortium::new(KeyKind::Secp256k1);
        note(&net);
        let signature = Consortium::xml_signer(&net.receiver)
            .sign_detached(RECADV, "recadv-1")
            .unwrap();
        let note = net
            .peer(RECEIVER_ORG)
            .attach_message(&net.receiver_ctx(), "N1", RECADV, Some(&signature))
            .unwrap()
            .value;

        let message = note.message("recadv-1").unwrap();
        let stored = &message.signatures[0];
        assert_eq!(stored.reference, "#recadv-1");
        assert_eq!(stored.signer, Consortium::party(&net.receiver).id);

        // The same check a third party can run on the stored pieces.
        let verifier = SignatureVerificationService::new(Arc::clone(&net.trust));
        let composite = format!("<DELNOTE>{}{}</DELNOTE>", message.document, stored.document);
        let verified = verifier.verify_embedded(&composite, net.now()).unwrap();
        assert_eq!(verified.signer.serial, stored.signer_serial);
        assert!(net
            .trust
            .validate_serial(&stored.signer_serial, net.now())
            .is_ok());
    }

    #[test]
    fn test_carrier_is_not_a_note_party() {
        let net = Consortium::new(KeyKind::Ed25519);
        note(&net);

        let err = net
            .peer(CARRIER_ORG)
            .add_advice(&net.ctx(Role::Carrier, CARRIER_ORG), "N1", "late by 2h")
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::AccessDenied);

        // A carrier signature over a note message is rejected even when a
        // party submits it.
        net.peer(SHIPPER_ORG)
            .attach_message(&net.shipper_ctx(), "N1", RECADV, None)
            .unwrap();
        let carrier_sig = Consortium::xml_signer(&net.carrier)
            .sign_detached(RECADV, "recadv-1")
            .unwrap();
        let err = net
            .peer(SHIPPER_ORG)
            .attach_signature(&net.shipper_ctx(), "N1", &carrier_sig)
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::AccessDenied);
    }

    #[test]
    fn test_private_properties_stay_with_their_organization() {
        let net = Consortium::new(KeyKind::Ed25519);
        let ctx = net
            .shipper_ctx()
            .with_transient(NOTE_PROPERTIES, br#"{"invoiceRef":"INV-77"}"#.to_vec());
        net.peer(SHIPPER_ORG)
            .create_note(
                &ctx,
                "N1",
                Consortium::party(&net.shipper),
                Consortium::party(&net.receiver),
                json!([]),
            )
            .unwrap();

        let own = net
            .peer(SHIPPER_ORG)
            .read_note(&net.shipper_ctx(), "N1")
            .unwrap();
        assert_eq!(own.private_properties, Some(json!({"invoiceRef": "INV-77"})));

        let other = net
            .peer(RECEIVER_ORG)
            .read_note(&net.receiver_ctx(), "N1")
            .unwrap();
        assert_eq!(other.private_properties, None);
        assert_eq!(other.note, own.note);
    }

    #[test]
    fn test_delete_note_then_recreate() {
        let net = Consortium::new(KeyKind::Ed25519);
        note(&net);
        let shipper = net.peer(SHIPPER_ORG);

        let outcome = shipper.delete_note(&net.shipper_ctx(), "N1").unwrap();
        assert_eq!(outcome.events[0].name(), "NoteDeleted");
        let err = shipper.read_note(&net.shipper_ctx(), "N1").unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::NotFound);

        note(&net);
        assert!(shipper.read_note(&net.shipper_ctx(), "N1").is_ok());
    }
}
