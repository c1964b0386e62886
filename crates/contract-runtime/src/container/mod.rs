//! # Contract Container
//!
//! Owns everything one peer's contract needs: the registry, the trust
//! context, the event bus and the contract service wired over them.

pub mod config;
pub mod trust;

pub use config::{ConfigError, RuntimeConfig};
pub use trust::load_trust_context;

use cc_01_trust_validation::{TrustContext, TrustValidationService};
use cc_03_custody_transfer::{CustodyTransferService, EventPublishingAdapter, InMemoryAssetRegistry};
use parking_lot::RwLock;
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use tracing::info;

/// The contract as wired by the runtime.
pub type PeerContract = CustodyTransferService<InMemoryAssetRegistry, TrustValidationService>;

pub struct ContractContainer {
    pub config: RuntimeConfig,
    registry: Arc<InMemoryAssetRegistry>,
    contract: RwLock<Arc<PeerContract>>,
    bus: Arc<InMemoryEventBus>,
    events: EventPublishingAdapter<InMemoryEventBus>,
}

impl ContractContainer {
    pub fn new(config: RuntimeConfig, trust: TrustContext) -> Self {
        let registry = Arc::new(InMemoryAssetRegistry::new());
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.events.capacity));
        let contract = Arc::new(wire(&config, Arc::clone(&registry), trust));

        info!(peer = %config.peer.organization, "Contract container ready");
        Self {
            events: EventPublishingAdapter::new(Arc::clone(&bus)),
            config,
            registry,
            contract: RwLock::new(contract),
            bus,
        }
    }

    /// The contract for the next invocation. In-flight invocations keep the
    /// instance they started with.
    #[must_use]
    pub fn contract(&self) -> Arc<PeerContract> {
        Arc::clone(&self.contract.read())
    }

    /// Replace the trust material. Records are kept.
    pub fn reload_trust(&self, trust: TrustContext) {
        let contract = Arc::new(wire(&self.config, Arc::clone(&self.registry), trust));
        *self.contract.write() = contract;
        info!("Trust material replaced");
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<InMemoryAssetRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    #[must_use]
    pub fn events(&self) -> &EventPublishingAdapter<InMemoryEventBus> {
        &self.events
    }
}

fn wire(
    config: &RuntimeConfig,
    registry: Arc<InMemoryAssetRegistry>,
    trust: TrustContext,
) -> PeerContract {
    let trust = Arc::new(TrustValidationService::new(Arc::new(trust)));
    CustodyTransferService::new(registry, trust, config.peer.organization.clone())
}
