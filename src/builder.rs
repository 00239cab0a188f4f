//! Build a typed message from an attribute tree.
//!
//! The builder resolves every symbolic token through the dictionary, encodes
//! leaf values by their reduced primitive type, and assembles grouped AVPs
//! recursively. It never mutates its inputs; a build is a pure function of
//! the tree and the dictionary snapshot.

use crate::avp::{Avp, AvpValue};
use crate::dictionary::{AvpPolicy, Dictionary};
use crate::encode::encode_value;
use crate::error::BuildError;
use crate::id::IdProvider;
use crate::message::{Message, MessageHeader, DIAMETER_VERSION};
use crate::resolve::{self, AppDomain, AvpDomain, CommandDomain, Resolution, VendorDomain};
use crate::tree::Node;

/// Defensive bound on grouped-AVP nesting.
pub const MAX_AVP_DEPTH: usize = 32;

/// Builds [`Message`] values against a shared dictionary and identifier
/// allocator. Cheap to construct; holds no per-build state.
pub struct MessageBuilder<'a> {
    dict: &'a Dictionary,
    ids: &'a IdProvider,
}

impl<'a> MessageBuilder<'a> {
    pub fn new(dict: &'a Dictionary, ids: &'a IdProvider) -> Self {
        MessageBuilder { dict, ids }
    }

    /// Build a message from a document root. `default_request` supplies the
    /// request flag when the header carries no `request` attribute.
    pub fn build_message(
        &self,
        root: &Node,
        default_request: Option<bool>,
    ) -> Result<Message, BuildError> {
        let header_node = root.first_child("header").ok_or(BuildError::MissingSection)?;
        let header = self.build_header(header_node, default_request)?;
        let app_id = header.application_id;

        let mut message = Message::new(header);
        for child in root.children_tagged("avp") {
            if let Some(avp) = self.build_avp(child, app_id, 0)? {
                message.add(avp);
            }
        }
        Ok(message)
    }

    fn build_header(
        &self,
        element: &Node,
        default_request: Option<bool>,
    ) -> Result<MessageHeader, BuildError> {
        let app_attr = element
            .attribute("applicationId")
            .ok_or(BuildError::MissingAttribute {
                element: "header",
                attribute: "applicationId",
            })?;
        let application_id = match resolve::resolve(&AppDomain { dict: self.dict }, app_attr, false)? {
            Some(Resolution::Known(app)) => app.id,
            Some(Resolution::Raw(code)) => code,
            None => {
                return Err(BuildError::UnknownReference {
                    domain: "application id",
                    token: app_attr.to_string(),
                })
            }
        };

        let command_attr = element
            .attribute("command")
            .ok_or(BuildError::MissingAttribute {
                element: "header",
                attribute: "command",
            })?;
        let command_domain = CommandDomain {
            dict: self.dict,
            app_id: application_id,
        };
        let command_code = match resolve::resolve(&command_domain, command_attr, false)? {
            Some(Resolution::Known(cmd)) => cmd.code,
            Some(Resolution::Raw(code)) => code,
            None => {
                return Err(BuildError::UnknownReference {
                    domain: "command code",
                    token: command_attr.to_string(),
                })
            }
        };

        let request = match element.attribute("request") {
            Some(s) => parse_bool(s),
            None => default_request.unwrap_or(false),
        };
        let proxiable = element.attribute("proxiable").map(parse_bool).unwrap_or(false);
        let error = element.attribute("error").map(parse_bool).unwrap_or(false);
        let retransmit = element.attribute("retransmit").map(parse_bool).unwrap_or(false);

        // reserved attributes: refused rather than silently ignored
        if element.attribute("flags").is_some() {
            return Err(BuildError::UnsupportedFeature("flags"));
        }
        if element.attribute("version").is_some() {
            return Err(BuildError::UnsupportedFeature("version"));
        }

        let end_to_end = match element.attribute("endToEnd") {
            Some(s) => parse_id(s)?,
            None => self.ids.next_id(),
        };
        let hop_by_hop = match element.attribute("hopByHop") {
            Some(s) => parse_id(s)?,
            None => self.ids.next_id(),
        };

        Ok(MessageHeader {
            version: DIAMETER_VERSION,
            application_id,
            command_code,
            request,
            proxiable,
            error,
            retransmit,
            hop_by_hop,
            end_to_end,
        })
    }

    /// Build one AVP node, recursing into grouped children. `Ok(None)` means
    /// the node opted out via `state="false"` and is omitted entirely.
    pub fn build_avp(
        &self,
        element: &Node,
        app_id: u32,
        depth: usize,
    ) -> Result<Option<Avp>, BuildError> {
        if depth > MAX_AVP_DEPTH {
            return Err(BuildError::NestingTooDeep(MAX_AVP_DEPTH));
        }

        // conditional inclusion: checked before any resolution
        if let Some(state) = element.attribute("state") {
            if !parse_bool(state) {
                return Ok(None);
            }
        }

        // vendor id, used to scope the AVP code lookup (0 when absent)
        let vendor_ref = match element.attribute("vendorId") {
            Some(token) => resolve::resolve(
                &VendorDomain { dict: self.dict, app_id },
                token,
                false,
            )?,
            None => None,
        };
        let lookup_vendor = match vendor_ref {
            Some(Resolution::Known(def)) => def.code,
            Some(Resolution::Raw(code)) => code,
            None => 0,
        };

        let code_attr = element.attribute("code").ok_or(BuildError::MissingAttribute {
            element: "avp",
            attribute: "code",
        })?;
        let avp_domain = AvpDomain {
            dict: self.dict,
            app_id,
            vendor_id: lookup_vendor,
        };
        let (code, avp_def) = match resolve::resolve(&avp_domain, code_attr, false)? {
            Some(Resolution::Known(def)) => (def.code, Some(def)),
            Some(Resolution::Raw(code)) => (code, None),
            None => {
                return Err(BuildError::UnknownReference {
                    domain: "avp",
                    token: code_attr.to_string(),
                })
            }
        };

        // declared type, falling back to the dictionary definition's type
        let type_attr = element.attribute("type");
        let mut type_def = match type_attr {
            Some(name) => resolve::resolve_type(self.dict, app_id, name)?,
            None => None,
        };
        if type_def.is_none() {
            if let Some(declared) = avp_def.and_then(|d| d.type_name.as_deref()) {
                type_def = self.dict.type_by_name(app_id, declared);
            }
        }
        let leaf_type = type_def.map(|t| t.name.as_str()).or(type_attr);
        let base_token = type_def
            .map(|t| resolve::base_of(self.dict, app_id, t))
            .or(type_attr)
            .unwrap_or("OctetString");

        let children: Vec<&Node> = element.children_tagged("avp").collect();
        let value = if !children.is_empty() {
            // grouped: the value attribute is not consulted
            let mut group = Vec::new();
            for child in children {
                if let Some(avp) = self.build_avp(child, app_id, depth + 1)? {
                    group.push(avp);
                }
            }
            AvpValue::Grouped(group)
        } else {
            let raw = element.attribute("value").ok_or(BuildError::MissingAttribute {
                element: "avp",
                attribute: "value",
            })?;
            encode_value(self.dict, app_id, leaf_type, base_token, raw, avp_def)?
        };

        // vendor id on the wire: explicit attribute wins, else inherited
        // from the dictionary definition
        let vendor_id = match (vendor_ref, avp_def) {
            (Some(Resolution::Known(def)), _) => def.code,
            (Some(Resolution::Raw(code)), _) => code,
            (None, Some(def)) => def.vendor_id.unwrap_or(0),
            (None, None) => 0,
        };

        let mandatory = match element.attribute("mandatory") {
            Some(s) => parse_bool(s),
            None => !matches!(avp_def.map(|d| d.mandatory), Some(AvpPolicy::MustNot)),
        };
        let protected = match element.attribute("private") {
            Some(s) => parse_bool(s),
            None => !matches!(avp_def.map(|d| d.protected), Some(AvpPolicy::MustNot)),
        };

        Ok(Some(Avp {
            code,
            vendor_id,
            mandatory,
            protected,
            value,
        }))
    }
}

/// Lenient boolean: only a case-insensitive "true" is true.
fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn parse_id(value: &str) -> Result<u32, BuildError> {
    value.parse().map_err(|_| BuildError::ValueFormat {
        expected: "identifier",
        value: value.to_string(),
    })
}
