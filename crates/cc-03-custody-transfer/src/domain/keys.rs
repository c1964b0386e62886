//! # Storage Layout
//!
//! | Partition | Key | Value |
//! |-----------|-----|-------|
//! | world state (`""`) | `waybill~<id>` | [`Waybill`](super::waybill::Waybill) |
//! | world state | `note~<id>` | [`DeliveryNote`](super::note::DeliveryNote) |
//! | world state | `reservation~<party>` | last reserved sequence |
//! | world state | `holding~<id>` | [`RegisteredAsset`](super::register::RegisteredAsset) |
//! | `shipperCarrier` | `<id>` | [`PrivateWaybill`](super::waybill::PrivateWaybill) |
//! | `carrierReceiver` | `<id>` | [`PrivateWaybill`](super::waybill::PrivateWaybill) |
//! | `_implicit_org_<MSP>` | `<note id>` | private note properties |

use shared_types::OrganizationId;

/// Public state visible to every organization.
pub const WORLD_STATE: &str = "";

/// Shared by the shipper's and the carrier's organizations.
pub const SHIPPER_CARRIER: &str = "shipperCarrier";

/// Shared by the carrier's and the receiver's organizations.
pub const CARRIER_RECEIVER: &str = "carrierReceiver";

const IMPLICIT_PREFIX: &str = "_implicit_org_";

/// Transient input carrying private note properties.
pub const NOTE_PROPERTIES: &str = "note_properties";

pub const WAYBILL_PREFIX: &str = "waybill~";
pub const NOTE_PREFIX: &str = "note~";
pub const RESERVATION_PREFIX: &str = "reservation~";
pub const HOLDING_PREFIX: &str = "holding~";

/// The partition private to one organization.
#[must_use]
pub fn implicit_partition(organization: &OrganizationId) -> String {
    format!("{IMPLICIT_PREFIX}{organization}")
}

#[must_use]
pub fn waybill_key(id: &str) -> String {
    format!("{WAYBILL_PREFIX}{id}")
}

#[must_use]
pub fn note_key(id: &str) -> String {
    format!("{NOTE_PREFIX}{id}")
}

#[must_use]
pub fn reservation_key(party: &str) -> String {
    format!("{RESERVATION_PREFIX}{party}")
}

/// World-state key bounds for waybill ids in `[start, end)`. Empty bounds
/// are open.
#[must_use]
pub fn holding_key(id: &str) -> String {
    format!("{HOLDING_PREFIX}{id}")
}

/// Key bounds covering every registered asset.
#[must_use]
pub fn holding_range() -> (String, String) {
    (
        HOLDING_PREFIX.to_string(),
        format!("{}\u{7f}", HOLDING_PREFIX.trim_end_matches('~')),
    )
}

#[must_use]
pub fn waybill_range(start: &str, end: &str) -> (String, String) {
    let upper = if end.is_empty() {
        // '~' + 1: just past every key under the prefix.
        format!("{}\u{7f}", WAYBILL_PREFIX.trim_end_matches('~'))
    } else {
        waybill_key(end)
    };
    (waybill_key(start), upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_partition_name() {
        assert_eq!(
            implicit_partition(&OrganizationId::new("Org1MSP")),
            "_implicit_org_Org1MSP"
        );
    }

    #[test]
    fn test_open_range_covers_prefix_only() {
        let (start, end) = waybill_range("", "");
        assert!(start.as_str() <= waybill_key("A1").as_str());
        assert!(waybill_key("zzz~\u{7e}").as_str() < end.as_str());
        assert!(note_key("A1").as_str() < start.as_str());
        assert!(reservation_key("x").as_str() < start.as_str());
    }

    #[test]
    fn test_holding_range_excludes_other_records() {
        let (start, end) = holding_range();
        let inside = |key: &str| start.as_str() <= key && key < end.as_str();
        assert!(inside(&holding_key("asset1")));
        assert!(inside(&holding_key("~~")));
        assert!(!inside(&waybill_key("asset1")));
        assert!(!inside(&note_key("asset1")));
    }
}
