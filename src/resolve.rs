//! Symbolic reference resolution against the dictionary.
//!
//! All five reference domains (application, command, vendor, AVP, enum)
//! accept the same dual notation: a plain integer code, a symbolic name, or
//! a qualified `label:code` token. The shared algorithm lives in [`resolve`],
//! parameterized over a [`Domain`]; only the miss behavior differs per
//! domain. A qualified label that disagrees with the dictionary's canonical
//! name is a warning, never an error; the dictionary entry wins.

use crate::dictionary::{Application, AvpDef, CommandDef, Dictionary, TypeDef, VendorDef};
use crate::error::BuildError;
use tracing::warn;

/// Bound on type parent-chain walks; dictionary chains are short.
const MAX_TYPE_DEPTH: usize = 32;

/// Outcome of resolving a reference token.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<T> {
    /// The token resolved to a dictionary definition.
    Known(T),
    /// The token was numeric and absent from the dictionary; the raw code
    /// is legal as-is.
    Raw(u32),
}

/// One dictionary lookup domain.
pub trait Domain<'d> {
    type Def: Copy;

    /// Domain label used in warnings and errors.
    const KIND: &'static str;
    /// Whether a qualified `label:code` token whose code is unknown fails
    /// (true) or falls back to the raw code (false).
    const STRICT_QUALIFIED: bool;

    fn by_code(&self, code: u32) -> Option<Self::Def>;
    fn by_name(&self, name: &str) -> Option<Self::Def>;
    fn canonical_name(def: Self::Def) -> &'d str;
    fn code_of(def: Self::Def) -> u32;
}

pub struct AppDomain<'d> {
    pub dict: &'d Dictionary,
}

impl<'d> Domain<'d> for AppDomain<'d> {
    type Def = &'d Application;
    const KIND: &'static str = "application id";
    const STRICT_QUALIFIED: bool = false;

    fn by_code(&self, code: u32) -> Option<Self::Def> {
        self.dict.application_by_id(code)
    }
    fn by_name(&self, name: &str) -> Option<Self::Def> {
        self.dict.application_by_name(name)
    }
    fn canonical_name(def: Self::Def) -> &'d str {
        &def.name
    }
    fn code_of(def: Self::Def) -> u32 {
        def.id
    }
}

pub struct CommandDomain<'d> {
    pub dict: &'d Dictionary,
    pub app_id: u32,
}

impl<'d> Domain<'d> for CommandDomain<'d> {
    type Def = &'d CommandDef;
    const KIND: &'static str = "command code";
    const STRICT_QUALIFIED: bool = true;

    fn by_code(&self, code: u32) -> Option<Self::Def> {
        self.dict.command_by_code(self.app_id, code)
    }
    fn by_name(&self, name: &str) -> Option<Self::Def> {
        self.dict.command_by_name(self.app_id, name)
    }
    fn canonical_name(def: Self::Def) -> &'d str {
        &def.name
    }
    fn code_of(def: Self::Def) -> u32 {
        def.code
    }
}

pub struct VendorDomain<'d> {
    pub dict: &'d Dictionary,
    pub app_id: u32,
}

impl<'d> Domain<'d> for VendorDomain<'d> {
    type Def = &'d VendorDef;
    const KIND: &'static str = "vendor id";
    const STRICT_QUALIFIED: bool = true;

    fn by_code(&self, code: u32) -> Option<Self::Def> {
        self.dict.vendor_by_code(self.app_id, code)
    }
    fn by_name(&self, name: &str) -> Option<Self::Def> {
        self.dict.vendor_by_name(self.app_id, name)
    }
    fn canonical_name(def: Self::Def) -> &'d str {
        &def.name
    }
    fn code_of(def: Self::Def) -> u32 {
        def.code
    }
}

pub struct AvpDomain<'d> {
    pub dict: &'d Dictionary,
    pub app_id: u32,
    pub vendor_id: u32,
}

impl<'d> Domain<'d> for AvpDomain<'d> {
    type Def = &'d AvpDef;
    const KIND: &'static str = "avp";
    const STRICT_QUALIFIED: bool = true;

    fn by_code(&self, code: u32) -> Option<Self::Def> {
        self.dict.avp_by_code(self.app_id, self.vendor_id, code)
    }
    fn by_name(&self, name: &str) -> Option<Self::Def> {
        self.dict.avp_by_name(self.app_id, self.vendor_id, name)
    }
    fn canonical_name(def: Self::Def) -> &'d str {
        &def.name
    }
    fn code_of(def: Self::Def) -> u32 {
        def.code
    }
}

/// Resolve a reference token in one domain.
///
/// `soft` relaxes the name-form miss into `Ok(None)`; it is only ever set
/// for application-id value rewriting, where an unresolvable value passes
/// through unchanged.
pub fn resolve<'d, D: Domain<'d>>(
    domain: &D,
    token: &str,
    soft: bool,
) -> Result<Option<Resolution<D::Def>>, BuildError> {
    if let Some(pos) = token.rfind(':') {
        let label = &token[..pos];
        let code: u32 = token[pos + 1..]
            .parse()
            .map_err(|_| BuildError::MalformedReference {
                token: token.to_string(),
            })?;
        return match domain.by_code(code) {
            Some(def) => {
                if label != D::canonical_name(def) {
                    warn!(
                        "for the {}, the label \"{}\" does not match the code {} in the dictionary; \
                         expected the label \"{}\"",
                        D::KIND,
                        label,
                        D::code_of(def),
                        D::canonical_name(def)
                    );
                }
                Ok(Some(Resolution::Known(def)))
            }
            None if D::STRICT_QUALIFIED => Err(BuildError::UnknownReference {
                domain: D::KIND,
                token: token.to_string(),
            }),
            None => Ok(Some(Resolution::Raw(code))),
        };
    }

    if let Ok(code) = token.parse::<u32>() {
        return Ok(Some(match domain.by_code(code) {
            Some(def) => Resolution::Known(def),
            None => Resolution::Raw(code),
        }));
    }

    match domain.by_name(token) {
        Some(def) => Ok(Some(Resolution::Known(def))),
        None if soft => Ok(None),
        None => Err(BuildError::UnknownReference {
            domain: D::KIND,
            token: token.to_string(),
        }),
    }
}

/// Resolve an enumerated value against an AVP definition's enum table.
///
/// Returns the canonical decimal form of the value. Plain integers pass
/// through unchanged (no table validation); labels must be declared.
pub fn resolve_enum(value: &str, def: &AvpDef) -> Result<String, BuildError> {
    if let Some(pos) = value.rfind(':') {
        let label = &value[..pos];
        let code: i64 = value[pos + 1..]
            .parse()
            .map_err(|_| BuildError::MalformedReference {
                token: value.to_string(),
            })?;
        if def.enum_name(code) != Some(label) {
            warn!(
                "for the AVP \"{}\" enum value, the label \"{}\" does not match the code {} in the dictionary",
                def.name, label, code
            );
        }
        return Ok(code.to_string());
    }

    if value.parse::<i64>().is_ok() || value.parse::<u64>().is_ok() {
        return Ok(value.to_string());
    }

    match def.enum_code(value) {
        Some(code) => Ok(code.to_string()),
        None => Err(BuildError::UnknownEnumValue {
            avp: def.name.clone(),
            value: value.to_string(),
        }),
    }
}

/// Resolve a declared type name.
///
/// `None` for the literal "Grouped", which is valid but has no dictionary
/// entry; any other unresolvable name is an error.
pub fn resolve_type<'d>(
    dict: &'d Dictionary,
    app_id: u32,
    name: &str,
) -> Result<Option<&'d TypeDef>, BuildError> {
    match dict.type_by_name(app_id, name) {
        Some(def) => Ok(Some(def)),
        None if name.eq_ignore_ascii_case("Grouped") => Ok(None),
        None => Err(BuildError::UnknownType(name.to_string())),
    }
}

/// Walk a type's parent chain to its primitive base type name.
pub fn base_of<'d>(dict: &'d Dictionary, app_id: u32, def: &'d TypeDef) -> &'d str {
    let mut current = def;
    for _ in 0..MAX_TYPE_DEPTH {
        match current
            .parent
            .as_deref()
            .and_then(|p| dict.type_by_name(app_id, p))
        {
            Some(parent) => current = parent,
            None => break,
        }
    }
    &current.name
}
