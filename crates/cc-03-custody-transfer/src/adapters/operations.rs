//! # Operation Table
//!
//! Maps operation names to handlers with a declared intent and input list.
//!
//! - **Submit**: may write; its events are published after commit
//! - **Evaluate**: read only; never writes, never emits

use crate::domain::errors::TransferError;
use crate::domain::invocation::InvocationContext;
use crate::domain::outcome::Outcome;
use crate::domain::register::AssetAttributes;
use crate::domain::waybill::SignedPayload;
use crate::ports::inbound::CustodyTransferApi;
use crate::ports::outbound::TimeSource;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared_types::{CallerIdentity, Party, Timestamp};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Whether an operation may change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Submit,
    Evaluate,
}

/// Declared shape of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    pub name: &'static str,
    pub intent: Intent,
    /// Argument names; a trailing `?` marks an optional one.
    pub inputs: &'static [&'static str],
    /// Event emitted on success, if any.
    pub event: Option<&'static str>,
}

impl OperationSpec {
    const fn submit(
        name: &'static str,
        inputs: &'static [&'static str],
        event: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            intent: Intent::Submit,
            inputs,
            event,
        }
    }

    const fn evaluate(name: &'static str, inputs: &'static [&'static str]) -> Self {
        Self {
            name,
            intent: Intent::Evaluate,
            inputs,
            event: None,
        }
    }

    /// Inputs without which the operation cannot run.
    pub fn required_inputs(&self) -> impl Iterator<Item = &'static str> {
        self.inputs.iter().copied().filter(|i| !i.ends_with('?'))
    }
}

/// Every operation of the contract.
pub const OPERATIONS: [OperationSpec; 24] = [
    OperationSpec::submit("reserveAssetId", &[], None),
    OperationSpec::submit(
        "createAsset",
        &["assetId", "shipper", "carrier", "receiver"],
        Some("AssetCreated"),
    ),
    OperationSpec::submit("transition", &["assetId", "signedPayload"], Some("AssetTransitioned")),
    OperationSpec::submit(
        "dispatchByOriginator",
        &["assetId", "signedPayload"],
        Some("AssetTransitioned"),
    ),
    OperationSpec::submit(
        "endorseByIntermediary",
        &["assetId", "signedPayload"],
        Some("AssetTransitioned"),
    ),
    OperationSpec::submit("endorseByFinal", &["assetId", "signedPayload"], Some("AssetCompleted")),
    OperationSpec::submit("deleteAsset", &["assetId"], Some("AssetDeleted")),
    OperationSpec::evaluate("readAsset", &["assetId"]),
    OperationSpec::evaluate("getAssetsByRange", &["startKey", "endKey"]),
    OperationSpec::submit(
        "createNote",
        &["noteId", "shipper", "receiver", "items"],
        Some("NoteCreated"),
    ),
    OperationSpec::submit(
        "attachMessage",
        &["noteId", "message", "signature?"],
        Some("MessageAttached"),
    ),
    OperationSpec::submit("attachSignature", &["noteId", "signature"], Some("SignatureAttached")),
    OperationSpec::submit("addAdvice", &["noteId", "advice"], Some("AdviceAdded")),
    OperationSpec::submit("updateItems", &["noteId", "items"], Some("ItemsUpdated")),
    OperationSpec::evaluate("readNote", &["noteId"]),
    OperationSpec::evaluate("exportAsset", &["noteId"]),
    OperationSpec::submit("deleteNote", &["noteId"], Some("NoteDeleted")),
    OperationSpec::submit(
        "registerAsset",
        &["assetId", "color", "size", "owner", "appraisedValue", "signedPayload"],
        Some("AssetRegistered"),
    ),
    OperationSpec::submit(
        "updateRegisteredAsset",
        &["assetId", "color", "size", "owner", "appraisedValue", "signedPayload"],
        Some("AssetUpdated"),
    ),
    OperationSpec::submit(
        "transferAsset",
        &["assetId", "newOwner", "signedPayload"],
        Some("OwnershipTransferred"),
    ),
    OperationSpec::submit("deleteRegisteredAsset", &["assetId"], Some("AssetDeregistered")),
    OperationSpec::evaluate("assetExists", &["assetId"]),
    OperationSpec::evaluate("readRegisteredAsset", &["assetId"]),
    OperationSpec::evaluate("getAllAssets", &[]),
];

static REGISTRY: LazyLock<HashMap<&'static str, &'static OperationSpec>> =
    LazyLock::new(|| OPERATIONS.iter().map(|op| (op.name, op)).collect());

/// Look up an operation by name.
pub fn operation(name: &str) -> Option<&'static OperationSpec> {
    REGISTRY.get(name).copied()
}

/// One request to the contract, as read by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub operation: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Hex-encoded transient inputs.
    #[serde(default)]
    pub transient: BTreeMap<String, String>,
    pub caller: CallerIdentity,
    /// Invocation time; the host clock when absent.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl Invocation {
    /// Build the invocation context, decoding transient inputs.
    pub fn context(&self, clock: &dyn TimeSource) -> Result<InvocationContext, TransferError> {
        let mut ctx = InvocationContext::new(
            self.caller.clone(),
            self.timestamp.unwrap_or_else(|| clock.now()),
        );
        for (key, value) in &self.transient {
            let bytes = hex::decode(value).map_err(|e| TransferError::InvalidInput {
                name: "transient",
                reason: format!("{key}: {e}"),
            })?;
            ctx.transient.insert(key.clone(), bytes);
        }
        Ok(ctx)
    }
}

/// Run `name` against `api`. Results are returned as JSON.
pub fn dispatch<A>(
    api: &A,
    ctx: &InvocationContext,
    name: &str,
    args: &Map<String, Value>,
) -> Result<Outcome<Value>, TransferError>
where
    A: CustodyTransferApi + ?Sized,
{
    let spec = operation(name).ok_or_else(|| TransferError::UnknownOperation(name.to_string()))?;
    for input in spec.required_inputs() {
        if args.get(input).map_or(true, Value::is_null) {
            return Err(TransferError::EmptyInput(input));
        }
    }

    match spec.name {
        "reserveAssetId" => api.reserve_asset_id(ctx).and_then(to_json),
        "createAsset" => api
            .create_asset(
                ctx,
                string(args, "assetId")?,
                decode(args, "shipper")?,
                decode(args, "carrier")?,
                decode(args, "receiver")?,
            )
            .and_then(to_json),
        "transition" => api
            .transition(ctx, string(args, "assetId")?, &signed(args)?)
            .and_then(to_json),
        "dispatchByOriginator" => api
            .dispatch_by_originator(ctx, string(args, "assetId")?, &signed(args)?)
            .and_then(to_json),
        "endorseByIntermediary" => api
            .endorse_by_intermediary(ctx, string(args, "assetId")?, &signed(args)?)
            .and_then(to_json),
        "endorseByFinal" => api
            .endorse_by_final(ctx, string(args, "assetId")?, &signed(args)?)
            .and_then(to_json),
        "deleteAsset" => api
            .delete_asset(ctx, string(args, "assetId")?)
            .and_then(to_json),
        "readAsset" => api
            .read_asset(ctx, string(args, "assetId")?)
            .and_then(|v| to_json(Outcome::quiet(v))),
        "getAssetsByRange" => api
            .assets_by_range(ctx, string(args, "startKey")?, string(args, "endKey")?)
            .and_then(|v| to_json(Outcome::quiet(v))),
        "createNote" => api
            .create_note(
                ctx,
                string(args, "noteId")?,
                decode::<Party>(args, "shipper")?,
                decode::<Party>(args, "receiver")?,
                args.get("items").cloned().unwrap_or(Value::Null),
            )
            .and_then(to_json),
        "attachMessage" => api
            .attach_message(
                ctx,
                string(args, "noteId")?,
                string(args, "message")?,
                optional_string(args, "signature")?,
            )
            .and_then(to_json),
        "attachSignature" => api
            .attach_signature(ctx, string(args, "noteId")?, string(args, "signature")?)
            .and_then(to_json),
        "addAdvice" => api
            .add_advice(ctx, string(args, "noteId")?, string(args, "advice")?)
            .and_then(to_json),
        "updateItems" => api
            .update_items(
                ctx,
                string(args, "noteId")?,
                args.get("items").cloned().unwrap_or(Value::Null),
            )
            .and_then(to_json),
        "readNote" => api
            .read_note(ctx, string(args, "noteId")?)
            .and_then(|v| to_json(Outcome::quiet(v))),
        "exportAsset" => api
            .export_asset(ctx, string(args, "noteId")?)
            .map(|v| Outcome::quiet(Value::String(v))),
        "deleteNote" => api
            .delete_note(ctx, string(args, "noteId")?)
            .and_then(to_json),
        "registerAsset" => api
            .register_asset(ctx, string(args, "assetId")?, attributes(args)?, &signed(args)?)
            .and_then(to_json),
        "updateRegisteredAsset" => api
            .update_registered_asset(ctx, string(args, "assetId")?, attributes(args)?, &signed(args)?)
            .and_then(to_json),
        "transferAsset" => api
            .transfer_asset(
                ctx,
                string(args, "assetId")?,
                string(args, "newOwner")?,
                &signed(args)?,
            )
            .and_then(to_json),
        "deleteRegisteredAsset" => api
            .delete_registered_asset(ctx, string(args, "assetId")?)
            .and_then(to_json),
        "assetExists" => api
            .asset_exists(ctx, string(args, "assetId")?)
            .map(|v| Outcome::quiet(Value::Bool(v))),
        "readRegisteredAsset" => api
            .read_registered_asset(ctx, string(args, "assetId")?)
            .and_then(|v| to_json(Outcome::quiet(v))),
        "getAllAssets" => api
            .all_assets(ctx)
            .and_then(|v| to_json(Outcome::quiet(v))),
        other => Err(TransferError::UnknownOperation(other.to_string())),
    }
}

fn to_json<T: Serialize>(outcome: Outcome<T>) -> Result<Outcome<Value>, TransferError> {
    let Outcome { value, events } = outcome;
    let value = serde_json::to_value(value).map_err(|e| TransferError::corrupt("result", e))?;
    Ok(Outcome { value, events })
}

fn string<'a>(args: &'a Map<String, Value>, name: &'static str) -> Result<&'a str, TransferError> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(TransferError::InvalidInput {
            name,
            reason: "expected a string".into(),
        }),
        None => Err(TransferError::EmptyInput(name)),
    }
}

fn optional_string<'a>(
    args: &'a Map<String, Value>,
    name: &'static str,
) -> Result<Option<&'a str>, TransferError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => string(args, name).map(Some),
    }
}

fn decode<T: DeserializeOwned>(args: &Map<String, Value>, name: &'static str) -> Result<T, TransferError> {
    let value = args.get(name).ok_or(TransferError::EmptyInput(name))?;
    T::deserialize(value).map_err(|e| TransferError::InvalidInput {
        name,
        reason: e.to_string(),
    })
}

fn signed(args: &Map<String, Value>) -> Result<SignedPayload, TransferError> {
    decode(args, "signedPayload")
}

fn attributes(args: &Map<String, Value>) -> Result<AssetAttributes, TransferError> {
    Ok(AssetAttributes {
        color: string(args, "color")?.to_string(),
        size: decode(args, "size")?,
        owner: string(args, "owner")?.to_string(),
        appraised_value: decode(args, "appraisedValue")?,
    })
}
