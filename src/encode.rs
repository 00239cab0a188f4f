//! Type-directed encoding of attribute values into typed AVP payloads.
//!
//! The encoder operates on the primitive base type a declared type reduces
//! to. Values arrive as strings; each base type owns its coercion rule.
//! Two leaf types get their value rewritten before the base switch:
//! `VendorId` and `AppId` values may be symbolic and are substituted with
//! their numeric dictionary code first.

use crate::avp::AvpValue;
use crate::dictionary::{AvpDef, Dictionary};
use crate::error::BuildError;
use crate::resolve::{self, AppDomain, Resolution, VendorDomain};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::net::IpAddr;
use std::str::FromStr;

/// Primitive base types with a defined encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    OctetString,
    Address,
    Utf8String,
    Integer32,
    Integer64,
    Unsigned32,
    Unsigned64,
    Float32,
    Float64,
    Time,
}

impl PrimitiveType {
    /// Map a base type token to its encoding; unknown tokens have none.
    pub fn from_token(token: &str) -> Result<Self, BuildError> {
        let t = token;
        if t.eq_ignore_ascii_case("OctetString") {
            Ok(PrimitiveType::OctetString)
        } else if t.eq_ignore_ascii_case("IPAddress") || t.eq_ignore_ascii_case("Address") {
            Ok(PrimitiveType::Address)
        } else if t.eq_ignore_ascii_case("UTF8String") {
            Ok(PrimitiveType::Utf8String)
        } else if t.eq_ignore_ascii_case("Integer32") {
            Ok(PrimitiveType::Integer32)
        } else if t.eq_ignore_ascii_case("Integer64") {
            Ok(PrimitiveType::Integer64)
        } else if t.eq_ignore_ascii_case("Unsigned32") {
            Ok(PrimitiveType::Unsigned32)
        } else if t.eq_ignore_ascii_case("Unsigned64") {
            Ok(PrimitiveType::Unsigned64)
        } else if t.eq_ignore_ascii_case("Float32") {
            Ok(PrimitiveType::Float32)
        } else if t.eq_ignore_ascii_case("Float64") {
            Ok(PrimitiveType::Float64)
        } else if t.eq_ignore_ascii_case("Time") {
            Ok(PrimitiveType::Time)
        } else {
            Err(BuildError::UnsupportedType(token.to_string()))
        }
    }
}

/// Encode a value for the given base type token.
///
/// `leaf_type` is the declared (not reduced) type name, consulted for the
/// VendorId/AppId value rewriting. `avp_def` supplies the enum table for
/// integer types.
pub fn encode_value(
    dict: &Dictionary,
    app_id: u32,
    leaf_type: Option<&str>,
    base_token: &str,
    raw: &str,
    avp_def: Option<&AvpDef>,
) -> Result<AvpValue, BuildError> {
    let rewritten = rewrite_value(dict, app_id, leaf_type, raw)?;
    let value = rewritten.as_str();

    match PrimitiveType::from_token(base_token)? {
        PrimitiveType::OctetString => Ok(AvpValue::OctetString(
            parse_binary_literal(value).unwrap_or_else(|| value.as_bytes().to_vec()),
        )),
        PrimitiveType::Address => Ok(AvpValue::OctetString(parse_address(value)?)),
        PrimitiveType::Utf8String => Ok(AvpValue::OctetString(value.as_bytes().to_vec())),
        PrimitiveType::Integer32 => {
            let v = enum_resolved(value, avp_def)?;
            Ok(AvpValue::Integer32(parse_number(&v, "Integer32")?))
        }
        PrimitiveType::Integer64 => {
            let v = enum_resolved(value, avp_def)?;
            Ok(AvpValue::Integer64(parse_number(&v, "Integer64")?))
        }
        PrimitiveType::Unsigned32 => {
            let v = enum_resolved(value, avp_def)?;
            Ok(AvpValue::Unsigned32(parse_number(&v, "Unsigned32")?))
        }
        PrimitiveType::Unsigned64 => {
            let v = enum_resolved(value, avp_def)?;
            Ok(AvpValue::Unsigned64(parse_number(&v, "Unsigned64")?))
        }
        PrimitiveType::Float32 => Ok(AvpValue::Float32(parse_number(value, "Float32")?)),
        PrimitiveType::Float64 => Ok(AvpValue::Float64(parse_number(value, "Float64")?)),
        PrimitiveType::Time => Ok(AvpValue::Time(parse_time(value)?)),
    }
}

/// Substitute symbolic VendorId/AppId values with their numeric code.
/// AppId resolution is soft: unresolvable values pass through unchanged.
fn rewrite_value(
    dict: &Dictionary,
    app_id: u32,
    leaf_type: Option<&str>,
    raw: &str,
) -> Result<String, BuildError> {
    let Some(leaf) = leaf_type else {
        return Ok(raw.to_string());
    };
    if leaf.eq_ignore_ascii_case("VendorId") {
        let resolved = resolve::resolve(&VendorDomain { dict, app_id }, raw, false)?;
        return Ok(match resolved {
            Some(Resolution::Known(def)) => def.code.to_string(),
            Some(Resolution::Raw(code)) => code.to_string(),
            None => raw.to_string(),
        });
    }
    if leaf.eq_ignore_ascii_case("AppId") {
        let resolved = resolve::resolve(&AppDomain { dict }, raw, true)?;
        return Ok(match resolved {
            Some(Resolution::Known(def)) => def.id.to_string(),
            Some(Resolution::Raw(code)) => code.to_string(),
            None => raw.to_string(),
        });
    }
    Ok(raw.to_string())
}

fn enum_resolved(value: &str, avp_def: Option<&AvpDef>) -> Result<String, BuildError> {
    match avp_def {
        Some(def) if !def.enums.is_empty() => resolve::resolve_enum(value, def),
        _ => Ok(value.to_string()),
    }
}

fn parse_number<T: FromStr>(value: &str, expected: &'static str) -> Result<T, BuildError> {
    value.parse().map_err(|_| BuildError::ValueFormat {
        expected,
        value: value.to_string(),
    })
}

/// `0x`-prefixed hex literal, whitespace between digits tolerated.
fn parse_binary_literal(value: &str) -> Option<Vec<u8>> {
    let digits = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"))?;
    let compact: String = digits.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(compact).ok()
}

/// Textual IPv4/IPv6 literals become their network-order bytes; anything
/// else must be a bare hex byte string.
fn parse_address(value: &str) -> Result<Vec<u8>, BuildError> {
    if value.contains('.') || value.contains(':') {
        let addr: IpAddr = value.parse().map_err(|_| BuildError::ValueFormat {
            expected: "address",
            value: value.to_string(),
        })?;
        return Ok(match addr {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        });
    }
    hex::decode(value).map_err(|_| BuildError::ValueFormat {
        expected: "address",
        value: value.to_string(),
    })
}

/// RFC 3339 or `%Y/%m/%d %H:%M:%S` / `%Y-%m-%d %H:%M:%S` (taken as UTC).
fn parse_time(value: &str) -> Result<DateTime<Utc>, BuildError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    for format in ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(BuildError::ValueFormat {
        expected: "date",
        value: value.to_string(),
    })
}
