//! # Runtime Host Flow
//!
//! The contract runtime started the way the binary starts it: trust
//! material read from a directory, configuration from `CC_*` variables,
//! invocations as JSON lines.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Consortium, PAYLOAD, SHIPPER_ORG};
    use cc_01_trust_validation::test_utils::KeyKind;
    use cc_03_custody_transfer::FixedTimeSource;
    use contract_runtime::{
        load_trust_context, ConfigError, ContractContainer, ContractHost, Response, RuntimeConfig,
    };
    use serde_json::{json, Value};
    use shared_bus::{EventFilter, EventTopic};
    use shared_types::FailureKind;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_trust_dir(net: &Consortium, dir: &Path) {
        for sub in ["anchors", "intermediates", "crls", "certs"] {
            fs::create_dir_all(dir.join(sub)).unwrap();
        }
        fs::write(dir.join("anchors/root.der"), &net.pki.root.der).unwrap();
        fs::write(
            dir.join("intermediates/issuing.der"),
            &net.pki.intermediate.der,
        )
        .unwrap();
        fs::write(dir.join("crls/root.der"), net.pki.root_crl(&[])).unwrap();
        fs::write(dir.join("crls/issuing.der"), net.pki.intermediate_crl(&[])).unwrap();
        for (name, member) in [
            ("shipper", &net.shipper),
            ("carrier", &net.carrier),
            ("receiver", &net.receiver),
        ] {
            fs::write(dir.join(format!("certs/{name}.der")), &member.der).unwrap();
        }
    }

    fn start(net: &Consortium, dir: &Path) -> ContractHost {
        let dir = dir.display().to_string();
        let config = RuntimeConfig::default()
            .with_overrides(|name| match name {
                "CC_PEER_ORG" => Some(SHIPPER_ORG.to_string()),
                "CC_TRUST_DIR" => Some(dir.clone()),
                _ => None,
            })
            .unwrap();
        config.validate().unwrap();
        let trust = load_trust_context(&config.trust.dir).unwrap();
        ContractHost::new(Arc::new(ContractContainer::new(config, trust)))
            .with_clock(FixedTimeSource(net.now()))
    }

    fn party(issued: &cc_01_trust_validation::test_utils::Issued) -> Value {
        serde_json::to_value(Consortium::party(issued)).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_dispatch_over_json_lines() {
        let net = Consortium::new(KeyKind::Ed25519);
        let temp_dir = TempDir::new().unwrap();
        write_trust_dir(&net, temp_dir.path());
        let host = start(&net, temp_dir.path());

        let caller = json!({"role": "SHIPPER", "organization": SHIPPER_ORG});
        let lines = [
            json!({
                "operation": "createAsset",
                "arguments": {
                    "assetId": "A1",
                    "shipper": party(&net.shipper),
                    "carrier": party(&net.carrier),
                    "receiver": party(&net.receiver),
                },
                "caller": caller,
            }),
            json!({
                "operation": "dispatchByOriginator",
                "arguments": {
                    "assetId": "A1",
                    "signedPayload": Consortium::signed(&net.shipper, PAYLOAD),
                },
                "caller": caller,
            }),
            json!({
                "operation": "readAsset",
                "arguments": {"assetId": "A1"},
                "caller": caller,
            }),
            json!({
                "operation": "createAsset",
                "arguments": {"assetId": "A1"},
                "caller": caller,
            }),
        ];
        let input: String = lines.iter().map(|l| format!("{l}\n")).collect();

        let mut output = Vec::new();
        assert_eq!(host.serve(input.as_bytes(), &mut output).await.unwrap(), 4);
        let responses: Vec<Response> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert!(matches!(&responses[0], Response::Ok(v) if v["status"] == "CREATED"));
        assert!(matches!(&responses[1], Response::Ok(v) if v["to"] == "PENDING_INTERMEDIARY"));
        match &responses[2] {
            Response::Ok(view) => {
                assert_eq!(view["waybill"]["status"], "PENDING_INTERMEDIARY");
                assert_eq!(
                    view["shipperCarrier"]["payload"],
                    Value::String(hex::encode(PAYLOAD))
                );
            }
            Response::Error(err) => panic!("unexpected error: {err}"),
        }
        assert!(matches!(
            &responses[3],
            Response::Error(err) if err.kind == FailureKind::InputIncomplete
        ));
    }

    #[tokio::test]
    async fn test_events_reach_bus_subscribers() {
        let net = Consortium::new(KeyKind::Ed25519);
        let temp_dir = TempDir::new().unwrap();
        write_trust_dir(&net, temp_dir.path());
        let trust = load_trust_context(temp_dir.path()).unwrap();
        let mut config = RuntimeConfig::default();
        config.peer.organization = shared_types::OrganizationId::new(SHIPPER_ORG);
        let container = Arc::new(ContractContainer::new(config, trust));
        let host = ContractHost::new(Arc::clone(&container)).with_clock(FixedTimeSource(net.now()));
        let mut subscription = container.bus().subscribe(EventFilter::all());

        let line = json!({
            "operation": "createNote",
            "arguments": {
                "noteId": "N1",
                "shipper": party(&net.shipper),
                "receiver": party(&net.receiver),
                "items": [{"gtin": "04012345000017", "qty": 12}],
            },
            "caller": {"role": "SHIPPER", "organization": SHIPPER_ORG},
        });
        let response = host.handle_line(&line.to_string()).await;
        assert!(response.starts_with(r#"{"ok":"#));

        let event = subscription.recv().await.unwrap();
        assert_eq!(event.name(), "NoteCreated");
        assert_eq!(event.record_id(), "N1");
    }

    #[tokio::test]
    async fn test_register_transfer_over_json_lines() {
        let net = Consortium::new(KeyKind::Ed25519);
        let temp_dir = TempDir::new().unwrap();
        write_trust_dir(&net, temp_dir.path());
        let trust = load_trust_context(temp_dir.path()).unwrap();
        let mut config = RuntimeConfig::default();
        config.peer.organization = shared_types::OrganizationId::new(SHIPPER_ORG);
        let container = Arc::new(ContractContainer::new(config, trust));
        let host = ContractHost::new(Arc::clone(&container)).with_clock(FixedTimeSource(net.now()));
        let mut register = container.bus().subscribe(EventFilter::topics(vec![EventTopic::Register]));

        let caller = json!({"role": "RECEIVER", "organization": SHIPPER_ORG});
        let line = json!({
            "operation": "registerAsset",
            "arguments": {
                "assetId": "asset1",
                "color": "blue",
                "size": 5,
                "owner": "Tomoko",
                "appraisedValue": 300,
                "signedPayload": Consortium::signed(&net.receiver, b"Tomoko"),
            },
            "caller": caller,
        });
        host.handle_line(&line.to_string()).await;
        let line = json!({
            "operation": "transferAsset",
            "arguments": {
                "assetId": "asset1",
                "newOwner": "Brad",
                "signedPayload": Consortium::signed(&net.carrier, b"Brad"),
            },
            "caller": caller,
        });
        let response: Response =
            serde_json::from_str(&host.handle_line(&line.to_string()).await).unwrap();
        assert!(matches!(&response, Response::Ok(v) if v == "Tomoko"));

        assert_eq!(register.recv().await.unwrap().name(), "AssetRegistered");
        let transferred = register.recv().await.unwrap();
        assert_eq!(transferred.name(), "OwnershipTransferred");
        assert_eq!(transferred.record_id(), "asset1");
        assert_eq!(container.bus().published_on(EventTopic::Register), 2);
        assert_eq!(container.bus().published_on(EventTopic::Custody), 0);
    }

    #[test]
    fn test_startup_without_anchors_fails() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("certs")).unwrap();

        let err = load_trust_context(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NoTrustAnchors(_)));
    }
}
