//! The legacy (2008) `GeoJSON` `crs` member.
//!
//! RFC 7946 dropped it, but desktop GIS still writes it for projected data:
//!
//! ```json
//! "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::32616" } }
//! ```
//!
//! The older `{"type": "EPSG", "properties": {"code": 32616}}` form is also
//! accepted on read.

use geojson::JsonObject;
use geology_map_models::Crs;
use serde_json::{Value, json};

/// Key of the member inside a `GeoJSON` object.
pub const CRS_MEMBER: &str = "crs";

/// Extracts the declared CRS from an object's foreign members.
///
/// Returns `Ok(None)` if no `crs` member is present (or it is `null`).
///
/// # Errors
///
/// Returns a description of the member if it is present but does not
/// resolve to a supported CRS.
pub fn declared_crs(members: Option<&JsonObject>) -> Result<Option<Crs>, String> {
    let Some(member) = members.and_then(|m| m.get(CRS_MEMBER)) else {
        return Ok(None);
    };
    if member.is_null() {
        return Ok(None);
    }

    let properties = member.get("properties");

    if let Some(name) = properties.and_then(|p| p.get("name")).and_then(Value::as_str) {
        return name.parse().map(Some).map_err(|e| format!("{e}"));
    }

    if let Some(code) = properties.and_then(|p| p.get("code")).and_then(Value::as_u64) {
        let code = u32::try_from(code).map_err(|_| format!("EPSG code {code} out of range"))?;
        return Crs::from_epsg(code).map(Some).map_err(|e| format!("{e}"));
    }

    Err(format!("unrecognised crs member {member}"))
}

/// Builds the named-CRS member for `crs`.
#[must_use]
pub fn crs_member(crs: Crs) -> Value {
    json!({
        "type": "name",
        "properties": { "name": crs.urn() },
    })
}
