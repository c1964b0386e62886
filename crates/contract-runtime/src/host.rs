//! # Invocation Host
//!
//! Serves the contract over JSON lines: one [`Invocation`] per input line,
//! one [`Response`] per output line, in order.
//!
//! ```text
//! → {"operation":"readAsset","arguments":{"assetId":"A1"},"caller":{"role":"CARRIER","organization":"Org2MSP"}}
//! ← {"ok":{...}}
//! ← {"error":{"kind":"ASSET_NOT_FOUND","detail":"Not found: Asset A1"}}
//! ```
//!
//! Events of a successful operation reach the bus before its response is
//! written.

use crate::container::ContractContainer;
use cc_03_custody_transfer::{dispatch, Invocation, SystemTimeSource, TimeSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::ContractError;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Result of one invocation as written to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Ok(Value),
    Error(ContractError),
}

pub struct ContractHost {
    container: Arc<ContractContainer>,
    clock: Box<dyn TimeSource>,
}

impl ContractHost {
    pub fn new(container: Arc<ContractContainer>) -> Self {
        Self {
            container,
            clock: Box::new(SystemTimeSource),
        }
    }

    /// Use `clock` for invocations that carry no timestamp.
    #[must_use]
    pub fn with_clock(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Run one invocation and publish its events.
    pub async fn handle(&self, invocation: &Invocation) -> Response {
        let ctx = match invocation.context(self.clock.as_ref()) {
            Ok(ctx) => ctx,
            Err(err) => return Response::Error(err.into()),
        };
        let contract = self.container.contract();
        let result = dispatch(
            contract.as_ref(),
            &ctx,
            &invocation.operation,
            &invocation.arguments,
        );

        match self.container.events().forward(result).await {
            Ok(value) => {
                debug!(operation = %invocation.operation, "Invocation succeeded");
                Response::Ok(value)
            }
            Err(err) => {
                warn!(
                    operation = %invocation.operation,
                    caller = %ctx.caller.organization,
                    kind = %err.failure_kind(),
                    %err,
                    "Invocation rejected"
                );
                Response::Error(err.into())
            }
        }
    }

    /// Handle one input line, returning the response line.
    pub async fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<Invocation>(line) {
            Ok(invocation) => self.handle(&invocation).await,
            Err(err) => {
                warn!(%err, "Malformed invocation");
                Response::Error(ContractError::incomplete(format!(
                    "Malformed invocation: {err}"
                )))
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|err| {
            format!(r#"{{"error":{{"kind":"DATA_ERROR","detail":"{err}"}}}}"#)
        })
    }

    /// Serve `reader` until end of input. Blank lines are skipped. Returns
    /// the number of invocations handled.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut handled = 0;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line).await;
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            handled += 1;
        }
        info!(handled, "Input closed");
        Ok(handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::RuntimeConfig;
    use cc_01_trust_validation::test_utils::{Issued, KeyKind, LeafSpec, TestPki};
    use cc_01_trust_validation::PartyIdentity;
    use cc_03_custody_transfer::{FixedTimeSource, SignedPayload};
    use serde_json::json;
    use shared_bus::{EventFilter, LedgerEvent};
    use shared_types::{FailureKind, OrganizationId};

    struct Fixture {
        pki: TestPki,
        shipper: Issued,
        carrier: Issued,
        receiver: Issued,
    }

    impl Fixture {
        fn new() -> Self {
            let mut pki = TestPki::new(KeyKind::Ed25519);
            let shipper = pki.issue_leaf(LeafSpec::new("shipper-1", "Org1MSP"));
            let carrier = pki.issue_leaf(LeafSpec::new("carrier-1", "Org2MSP"));
            let receiver = pki.issue_leaf(LeafSpec::new("receiver-1", "Org3MSP"));
            Self {
                pki,
                shipper,
                carrier,
                receiver,
            }
        }

        fn host(&self, peer: &str) -> ContractHost {
            let mut config = RuntimeConfig::default();
            config.peer.organization = OrganizationId::new(peer);
            let context = self
                .pki
                .context(&[&self.shipper, &self.carrier, &self.receiver]);
            ContractHost::new(Arc::new(ContractContainer::new(config, context)))
                .with_clock(FixedTimeSource(self.pki.now()))
        }

        fn party(issued: &Issued) -> Value {
            let identity = PartyIdentity::from_certificate(&issued.certificate).unwrap();
            json!({
                "id": identity.canonical_id().unwrap(),
                "organization": identity.organization.unwrap(),
            })
        }

        fn create_line(&self, asset_id: &str) -> String {
            json!({
                "operation": "createAsset",
                "arguments": {
                    "assetId": asset_id,
                    "shipper": Self::party(&self.shipper),
                    "carrier": Self::party(&self.carrier),
                    "receiver": Self::party(&self.receiver),
                },
                "caller": {"role": "SHIPPER", "organization": "Org1MSP"},
            })
            .to_string()
        }
    }

    fn parse(line: &str) -> Response {
        serde_json::from_str(line).unwrap()
    }

    #[tokio::test]
    async fn test_create_publishes_and_answers() {
        let fixture = Fixture::new();
        let host = fixture.host("Org1MSP");
        let mut subscription = host.container.bus().subscribe(EventFilter::all());

        let response = parse(&host.handle_line(&fixture.create_line("A1")).await);
        match response {
            Response::Ok(value) => {
                assert_eq!(value["id"], "A1");
                assert_eq!(value["status"], "CREATED");
            }
            Response::Error(err) => panic!("unexpected error: {err}"),
        }

        let event = subscription.recv().await.unwrap();
        assert!(matches!(event, LedgerEvent::AssetCreated { ref asset_id, .. } if asset_id == "A1"));
    }

    #[tokio::test]
    async fn test_signed_dispatch_through_host() {
        let fixture = Fixture::new();
        let host = fixture.host("Org1MSP");
        host.handle_line(&fixture.create_line("A1")).await;

        let payload = b"12 pallets";
        let signed = SignedPayload {
            payload: payload.to_vec(),
            signature: fixture.shipper.key.sign_der(payload),
            certificate_serial: fixture.shipper.certificate.serial().clone(),
            algorithm: fixture.shipper.key.algorithm(),
        };
        let line = json!({
            "operation": "dispatchByOriginator",
            "arguments": {"assetId": "A1", "signedPayload": signed},
            "caller": {"role": "SHIPPER", "organization": "Org1MSP"},
        })
        .to_string();

        match parse(&host.handle_line(&line).await) {
            Response::Ok(value) => {
                assert_eq!(value["to"], "PENDING_INTERMEDIARY");
                assert_eq!(value["applied"], true);
            }
            Response::Error(err) => panic!("unexpected error: {err}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_publishes_nothing() {
        let fixture = Fixture::new();
        let host = fixture.host("Org1MSP");
        host.handle_line(&fixture.create_line("A1")).await;
        let mut subscription = host.container.bus().subscribe(EventFilter::all());

        let line = json!({
            "operation": "deleteAsset",
            "arguments": {"assetId": "A1"},
            "caller": {"role": "CARRIER", "organization": "Org1MSP"},
        })
        .to_string();
        match parse(&host.handle_line(&line).await) {
            Response::Error(err) => assert_eq!(err.kind, FailureKind::AccessDenied),
            Response::Ok(value) => panic!("unexpected success: {value}"),
        }
        assert_eq!(subscription.try_recv(), Ok(None));
    }

    #[tokio::test]
    async fn test_malformed_and_unknown() {
        let fixture = Fixture::new();
        let host = fixture.host("Org1MSP");

        let malformed = host.handle_line("{not json").await;
        assert!(malformed.starts_with(r#"{"error":{"kind":"INCOMPLETE_INPUT""#));

        let unknown = json!({
            "operation": "mintTokens",
            "caller": {"role": "SHIPPER", "organization": "Org1MSP"},
        })
        .to_string();
        match parse(&host.handle_line(&unknown).await) {
            Response::Error(err) => assert_eq!(err.kind, FailureKind::InputIncomplete),
            Response::Ok(value) => panic!("unexpected success: {value}"),
        }
    }

    #[tokio::test]
    async fn test_serve_answers_each_line_in_order() {
        let fixture = Fixture::new();
        let host = fixture.host("Org1MSP");
        let read = json!({
            "operation": "readAsset",
            "arguments": {"assetId": "A1"},
            "caller": {"role": "CARRIER", "organization": "Org2MSP"},
        })
        .to_string();
        let input = format!("{read}\n\n{}\n{read}\n", fixture.create_line("A1"));

        let mut output = Vec::new();
        let handled = host.serve(input.as_bytes(), &mut output).await.unwrap();
        assert_eq!(handled, 3);

        let text = String::from_utf8(output).unwrap();
        let responses: Vec<Response> = text.lines().map(parse).collect();
        assert!(matches!(
            &responses[0],
            Response::Error(err) if err.kind == FailureKind::NotFound
        ));
        assert!(matches!(&responses[1], Response::Ok(_)));
        match &responses[2] {
            Response::Ok(view) => {
                assert_eq!(view["waybill"]["status"], "CREATED");
                assert!(view.get("shipperCarrier").map_or(true, Value::is_null));
            }
            Response::Error(err) => panic!("unexpected error: {err}"),
        }
    }
}
