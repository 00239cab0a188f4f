//! Error taxonomy for message building.
//!
//! Every error is terminal for the build call that raised it; the only
//! recoverable condition (a qualified label disagreeing with the dictionary)
//! is logged as a warning instead.

/// Reasons a message build can fail.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("the <header> section is mandatory in a message document")]
    MissingSection,

    #[error("there is no \"{attribute}\" attribute in the <{element}> element")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("malformed reference \"{token}\": the part after ':' is not an integer")]
    MalformedReference { token: String },

    #[error("the {domain} \"{token}\" is not found in the dictionary")]
    UnknownReference {
        domain: &'static str,
        token: String,
    },

    #[error("the type \"{0}\" is not found in the dictionary")]
    UnknownType(String),

    #[error("no encoding for type \"{0}\"")]
    UnsupportedType(String),

    #[error("the enum value \"{value}\" is not declared for AVP \"{avp}\"")]
    UnknownEnumValue { avp: String, value: String },

    #[error("the \"{0}\" attribute is not supported in the <header> element")]
    UnsupportedFeature(&'static str),

    #[error("invalid {expected} value \"{value}\"")]
    ValueFormat {
        expected: &'static str,
        value: String,
    },

    #[error("avp nesting exceeds {0} levels")]
    NestingTooDeep(usize),
}
