//! Parameter declarations and the per-flag entity the parser resolves.

use crate::value::{cast, CastError, TypedValue, ValueKind, ValueType};
use std::cell::OnceCell;

/// Stable handle to a registered parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamHandle(pub(crate) usize);

impl ParamHandle {
    /// Registration index of the parameter.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declaration of a parameter, as handed to [`crate::Parser::register`].
///
/// Flags may be given with or without their dashes: `"file"` and `"--file"`
/// both declare `--file`, `"f"` and `"-f"` both declare `-f`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub(crate) flag: String,
    pub(crate) short: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) mandatory: bool,
    pub(crate) default: Option<Vec<String>>,
    pub(crate) value_type: ValueType,
}

impl ParamDecl {
    /// A single-valued optional parameter.
    pub fn new(flag: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            flag: flag.into(),
            short: None,
            description: None,
            mandatory: false,
            default: None,
            value_type: ValueType::scalar(kind),
        }
    }

    /// An optional parameter that accumulates every following non-flag token.
    pub fn array(flag: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            value_type: ValueType::array(kind),
            ..Self::new(flag, kind)
        }
    }

    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Default used when the flag is not supplied. Rendered to its string
    /// form now and converted like user input on first read.
    pub fn default_value(mut self, value: impl ToString) -> Self {
        self.default = Some(vec![value.to_string()]);
        self
    }

    /// Default for array parameters, one token per element.
    pub fn default_values<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.default = Some(values.into_iter().map(|v| v.to_string()).collect());
        self
    }
}

/// Normalize a flag to its canonical form by adding `prefix` when the input
/// carries no dash at all.
pub(crate) fn normalize_flag(flag: &str, prefix: &str) -> String {
    if flag.starts_with('-') {
        flag.to_string()
    } else {
        format!("{}{}", prefix, flag)
    }
}

/// A registered parameter: its declaration and, after parsing, its value.
#[derive(Debug, Clone)]
pub struct Param {
    full_flag: String,
    short_flag: Option<String>,
    description: Option<String>,
    mandatory: bool,
    default: Option<Vec<String>>,
    value_type: ValueType,
    raw: Vec<String>,
    typed: OnceCell<TypedValue>,
}

impl Param {
    pub(crate) fn new(
        full_flag: String,
        short_flag: Option<String>,
        decl: ParamDecl,
    ) -> Self {
        Self {
            full_flag,
            short_flag,
            description: decl.description,
            mandatory: decl.mandatory,
            default: decl.default,
            value_type: decl.value_type,
            raw: Vec::new(),
            typed: OnceCell::new(),
        }
    }

    pub fn full_flag(&self) -> &str {
        &self.full_flag
    }

    pub fn short_flag(&self) -> Option<&str> {
        self.short_flag.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Default tokens, in their rendered string form.
    pub fn default(&self) -> Option<&[String]> {
        self.default.as_deref()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Tokens supplied on the command line (empty when the flag was absent).
    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    pub fn is_resolved(&self) -> bool {
        !self.raw.is_empty()
    }

    /// Tokens a read would convert: the supplied ones, else the default.
    pub fn effective_raw(&self) -> Option<&[String]> {
        if self.is_resolved() {
            Some(&self.raw)
        } else {
            self.default()
        }
    }

    pub(crate) fn assign(&mut self, tokens: Vec<String>) {
        self.raw = tokens;
        self.typed = OnceCell::new();
    }

    /// Converted value, computed once and cached. `None` when neither a
    /// supplied value nor a default exists.
    pub fn typed(&self) -> Result<Option<&TypedValue>, CastError> {
        if let Some(value) = self.typed.get() {
            return Ok(Some(value));
        }
        let Some(raw) = self.effective_raw() else {
            return Ok(None);
        };
        let value = cast(raw, self.value_type)?;
        Ok(Some(self.typed.get_or_init(|| value)))
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.full_flag == other.full_flag
    }
}

impl Eq for Param {}
