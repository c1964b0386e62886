//! # Consortium Fixture
//!
//! Three organizations on one ledger: `Org1MSP` hosts the shipper,
//! `Org2MSP` the carrier and `Org3MSP` the receiver. Every peer shares the
//! registry and the trust material, as peers of one channel would.

use cc_01_trust_validation::test_utils::{Issued, KeyKind, LeafSpec, TestPki, DAY, FIXTURE_NOW};
use cc_01_trust_validation::{PartyIdentity, TrustContext, TrustValidationService};
use cc_02_signature_verification::XmlSigner;
use cc_03_custody_transfer::{
    CustodyTransferService, InMemoryAssetRegistry, InvocationContext, SignedPayload,
};
use shared_types::{CallerIdentity, OrganizationId, Party, Role, Timestamp};
use std::sync::Arc;

/// The contract as one peer runs it.
pub type Peer = CustodyTransferService<InMemoryAssetRegistry, TrustValidationService>;

/// Serialized waybill payload every signatory signs.
pub const PAYLOAD: &[u8] = br#"{"waybill":"A1","goods":"12 pallets","weightKg":4800}"#;

pub const SHIPPER_ORG: &str = "Org1MSP";
pub const CARRIER_ORG: &str = "Org2MSP";
pub const RECEIVER_ORG: &str = "Org3MSP";

/// Which member a fixture option applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Shipper,
    Carrier,
    Receiver,
}

/// How trust material deviates from the healthy default.
#[derive(Debug, Clone, Default)]
pub struct TrustSetup {
    /// Members whose certificates are on the issuing CA's CRL.
    pub revoked: Vec<Member>,
    /// Member whose certificate expired before [`FIXTURE_NOW`].
    pub expired: Option<Member>,
    /// Leave every CRL out of the trust context.
    pub without_crls: bool,
}

pub struct Consortium {
    pub pki: TestPki,
    pub shipper: Issued,
    pub carrier: Issued,
    pub receiver: Issued,
    pub registry: Arc<InMemoryAssetRegistry>,
    pub trust: Arc<TrustValidationService>,
}

impl Consortium {
    pub fn new(kind: KeyKind) -> Self {
        Self::with_trust(kind, TrustSetup::default())
    }

    pub fn with_trust(kind: KeyKind, setup: TrustSetup) -> Self {
        let mut pki = TestPki::new(kind);
        let leaf = |pki: &mut TestPki, member: Member, spec: LeafSpec| {
            let spec = if setup.expired == Some(member) {
                spec.validity(FIXTURE_NOW - 400 * DAY, FIXTURE_NOW - DAY)
            } else {
                spec
            };
            pki.issue_leaf(spec)
        };
        let shipper = leaf(
            &mut pki,
            Member::Shipper,
            LeafSpec::new("shipper-1", SHIPPER_ORG)
                .attribute("CCC", "4012345")
                .attribute("GLN", "0000001"),
        );
        let carrier = leaf(&mut pki, Member::Carrier, LeafSpec::new("carrier-1", CARRIER_ORG));
        let receiver = leaf(
            &mut pki,
            Member::Receiver,
            LeafSpec::new("receiver-1", RECEIVER_ORG),
        );

        let context = trust_context(&pki, [&shipper, &carrier, &receiver], &setup);
        Self {
            registry: Arc::new(InMemoryAssetRegistry::new()),
            trust: Arc::new(TrustValidationService::new(Arc::new(context))),
            pki,
            shipper,
            carrier,
            receiver,
        }
    }

    #[must_use]
    pub fn member(&self, member: Member) -> &Issued {
        match member {
            Member::Shipper => &self.shipper,
            Member::Carrier => &self.carrier,
            Member::Receiver => &self.receiver,
        }
    }

    /// The contract at the peer hosted by `organization`.
    #[must_use]
    pub fn peer(&self, organization: &str) -> Peer {
        CustodyTransferService::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.trust),
            OrganizationId::new(organization),
        )
    }

    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.pki.now()
    }

    #[must_use]
    pub fn ctx(&self, role: Role, organization: &str) -> InvocationContext {
        InvocationContext::new(CallerIdentity::new(role, organization), self.now())
    }

    #[must_use]
    pub fn shipper_ctx(&self) -> InvocationContext {
        self.ctx(Role::Shipper, SHIPPER_ORG)
            .with_caller_certificate(self.shipper.certificate.serial().to_string())
    }

    #[must_use]
    pub fn carrier_ctx(&self) -> InvocationContext {
        self.ctx(Role::Carrier, CARRIER_ORG)
    }

    #[must_use]
    pub fn receiver_ctx(&self) -> InvocationContext {
        self.ctx(Role::Receiver, RECEIVER_ORG)
    }

    /// The party a member's certificate identifies.
    #[must_use]
    pub fn party(issued: &Issued) -> Party {
        let identity = PartyIdentity::from_certificate(&issued.certificate)
            .expect("fixture certificate identity");
        Party::new(
            identity.canonical_id().expect("fixture party id"),
            identity.organization.clone().expect("fixture organization"),
        )
    }

    /// `payload` with a detached signature by `issued`.
    #[must_use]
    pub fn signed(issued: &Issued, payload: &[u8]) -> SignedPayload {
        SignedPayload {
            payload: payload.to_vec(),
            signature: issued.key.sign_der(payload),
            certificate_serial: issued.certificate.serial().clone(),
            algorithm: issued.key.algorithm(),
        }
    }

    /// Signs XML as `issued`, carrying its certificate.
    #[must_use]
    pub fn xml_signer(issued: &Issued) -> XmlSigner {
        XmlSigner::new(issued.key.clone()).with_certificate(&issued.certificate)
    }
}

/// Trust material for `[shipper, carrier, receiver]` as `setup` asks.
fn trust_context(pki: &TestPki, leaves: [&Issued; 3], setup: &TrustSetup) -> TrustContext {
    if setup.without_crls {
        let mut builder = TrustContext::builder()
            .anchor(pki.root.certificate.clone())
            .intermediate(pki.intermediate.certificate.clone());
        for leaf in leaves {
            builder = builder.certificate(leaf.certificate.clone());
        }
        return builder.build().expect("fixture trust context");
    }
    let revoked: Vec<_> = setup
        .revoked
        .iter()
        .map(|member| {
            let index = match member {
                Member::Shipper => 0,
                Member::Carrier => 1,
                Member::Receiver => 2,
            };
            leaves[index].certificate.serial().clone()
        })
        .collect();
    pki.context_revoking(&leaves, &revoked)
}
