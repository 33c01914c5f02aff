//! Registration and lookup of parameters by full and short flag.

use crate::param::{normalize_flag, Param, ParamDecl, ParamHandle};
use crate::suggest::HELP_FLAGS;
use crate::value::cast;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised while declaring parameters. These are programmer errors,
/// detected before any user input is looked at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("flag '{0}' is already registered or reserved")]
    DuplicateFlag(String),

    #[error("parameter '{0}' cannot be mandatory and have a default value")]
    InvalidMandatoryDefault(String),

    #[error("parameter flag must not be empty")]
    EmptyFlag,

    #[error("default value for '{flag}' is not a valid {expected}: {reason}")]
    InvalidDefault {
        flag: String,
        expected: String,
        reason: String,
    },
}

/// Owns every registered parameter.
///
/// Parameters live in an arena addressed by [`ParamHandle`]; both the full
/// and the short flag index into it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    params: Vec<Param>,
    index: HashMap<String, ParamHandle>,
    mandatory: Vec<ParamHandle>,
    longest_flag: usize,
    longest_short: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter, returning its handle.
    pub fn register(&mut self, decl: ParamDecl) -> Result<ParamHandle, RegistryError> {
        let full = normalize_flag(&decl.flag, "--");
        let short = decl.short.as_deref().map(|s| normalize_flag(s, "-"));

        for flag in std::iter::once(&full).chain(short.as_ref()) {
            if flag.trim_start_matches('-').is_empty() {
                return Err(RegistryError::EmptyFlag);
            }
            if HELP_FLAGS.contains(&flag.as_str()) || self.index.contains_key(flag) {
                return Err(RegistryError::DuplicateFlag(flag.clone()));
            }
        }
        if short.as_ref() == Some(&full) {
            return Err(RegistryError::DuplicateFlag(full));
        }

        if let Some(default) = &decl.default {
            if decl.mandatory {
                return Err(RegistryError::InvalidMandatoryDefault(full));
            }
            Self::validate_default(&full, &decl, default)?;
        }

        let handle = ParamHandle(self.params.len());
        self.longest_flag = self.longest_flag.max(full.chars().count());
        if let Some(ref s) = short {
            self.longest_short = self.longest_short.max(s.chars().count());
            self.index.insert(s.clone(), handle);
        }
        self.index.insert(full.clone(), handle);
        if decl.mandatory {
            self.mandatory.push(handle);
        }

        debug!(
            flag = %full,
            short = short.as_deref().unwrap_or(""),
            value_type = %decl.value_type,
            mandatory = decl.mandatory,
            "registered parameter"
        );
        self.params.push(Param::new(full, short, decl));
        Ok(handle)
    }

    fn validate_default(
        full: &str,
        decl: &ParamDecl,
        default: &[String],
    ) -> Result<(), RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidDefault {
            flag: full.to_string(),
            expected: decl.value_type.to_string(),
            reason,
        };

        if default.is_empty() {
            return Err(invalid("no default tokens given".to_string()));
        }
        if !decl.value_type.array && default.len() > 1 {
            return Err(invalid(format!(
                "{} tokens given to a single-valued parameter",
                default.len()
            )));
        }
        cast(default, decl.value_type).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Exact lookup by full or short flag.
    pub fn lookup(&self, token: &str) -> Option<ParamHandle> {
        self.index.get(token).copied()
    }

    pub fn get(&self, handle: ParamHandle) -> &Param {
        &self.params[handle.0]
    }

    pub(crate) fn get_mut(&mut self, handle: ParamHandle) -> &mut Param {
        &mut self.params[handle.0]
    }

    /// All parameters, in registration order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn handles(&self) -> impl Iterator<Item = ParamHandle> {
        (0..self.params.len()).map(ParamHandle)
    }

    /// Mandatory parameters, in registration order.
    pub fn mandatory(&self) -> &[ParamHandle] {
        &self.mandatory
    }

    /// Every registered flag, full before short, in registration order.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .flat_map(|p| std::iter::once(p.full_flag()).chain(p.short_flag()))
    }

    pub fn longest_flag(&self) -> usize {
        self.longest_flag
    }

    pub fn longest_short(&self) -> usize {
        self.longest_short
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn test_register_normalizes_flags() {
        let mut registry = Registry::new();
        let handle = registry
            .register(ParamDecl::new("file", ValueKind::String).short("f"))
            .unwrap();
        assert_eq!(registry.get(handle).full_flag(), "--file");
        assert_eq!(registry.get(handle).short_flag(), Some("-f"));
        assert_eq!(registry.lookup("--file"), Some(handle));
        assert_eq!(registry.lookup("-f"), Some(handle));
        assert_eq!(registry.lookup("file"), None);
    }

    #[test]
    fn test_register_keeps_prefixed_flags() {
        let mut registry = Registry::new();
        let handle = registry
            .register(ParamDecl::new("--save", ValueKind::String).short("-s"))
            .unwrap();
        assert_eq!(registry.get(handle).full_flag(), "--save");
        assert_eq!(registry.get(handle).short_flag(), Some("-s"));
    }

    #[test]
    fn test_error_on_duplicate_full_flag() {
        let mut registry = Registry::new();
        registry
            .register(ParamDecl::new("file", ValueKind::String).short("f"))
            .unwrap();
        let result = registry.register(
            ParamDecl::new("--file", ValueKind::Integer)
                .short("x")
                .description("different"),
        );
        assert!(matches!(result, Err(RegistryError::DuplicateFlag(f)) if f == "--file"));
    }

    #[test]
    fn test_error_on_duplicate_short_flag() {
        let mut registry = Registry::new();
        registry
            .register(ParamDecl::new("file", ValueKind::String).short("f"))
            .unwrap();
        let result = registry.register(ParamDecl::new("format", ValueKind::String).short("f"));
        assert!(matches!(result, Err(RegistryError::DuplicateFlag(f)) if f == "-f"));
        // The failed registration leaves no trace.
        assert_eq!(registry.lookup("--format"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_error_on_reserved_help_flags() {
        let mut registry = Registry::new();
        let result = registry.register(ParamDecl::new("help", ValueKind::String));
        assert!(matches!(result, Err(RegistryError::DuplicateFlag(f)) if f == "--help"));
        let result = registry.register(ParamDecl::new("host", ValueKind::String).short("h"));
        assert!(matches!(result, Err(RegistryError::DuplicateFlag(f)) if f == "-h"));
    }

    #[test]
    fn test_error_on_mandatory_with_default() {
        let mut registry = Registry::new();
        let result = registry.register(
            ParamDecl::new("level", ValueKind::Integer)
                .mandatory()
                .default_value(3),
        );
        assert!(matches!(result, Err(RegistryError::InvalidMandatoryDefault(_))));
    }

    #[test]
    fn test_error_on_default_of_wrong_type() {
        let mut registry = Registry::new();
        let result =
            registry.register(ParamDecl::new("level", ValueKind::Integer).default_value("high"));
        assert!(matches!(result, Err(RegistryError::InvalidDefault { .. })));

        let result = registry.register(
            ParamDecl::new("name", ValueKind::String).default_values(["a", "b"]),
        );
        assert!(matches!(result, Err(RegistryError::InvalidDefault { .. })));
    }

    #[test]
    fn test_error_on_empty_flag() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.register(ParamDecl::new("--", ValueKind::String)),
            Err(RegistryError::EmptyFlag)
        );
    }

    #[test]
    fn test_alignment_counters_track_longest_flags() {
        let mut registry = Registry::new();
        registry
            .register(ParamDecl::new("in", ValueKind::String).short("i"))
            .unwrap();
        registry
            .register(ParamDecl::new("output-directory", ValueKind::Path).short("od"))
            .unwrap();
        assert_eq!(registry.longest_flag(), "--output-directory".len());
        assert_eq!(registry.longest_short(), "-od".len());
    }

    #[test]
    fn test_mandatory_in_registration_order() {
        let mut registry = Registry::new();
        let load = registry
            .register(ParamDecl::new("load", ValueKind::String).mandatory())
            .unwrap();
        registry
            .register(ParamDecl::new("verbose", ValueKind::Boolean))
            .unwrap();
        let save = registry
            .register(ParamDecl::new("save", ValueKind::String).mandatory())
            .unwrap();
        assert_eq!(registry.mandatory(), &[load, save]);
    }
}
