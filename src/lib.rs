//! flagscan - flag registration and typed argument resolution.
//!
//! Parameters are registered on a [`Parser`] (directly, or from a JSON
//! [`Config`]), the raw token array is resolved once with
//! [`Parser::parse`], and typed values are read back afterwards. Unknown
//! flags come with "did you mean" suggestions, and `--help`/`-h` yields a
//! boxed help text instead of values.

pub mod config;
pub mod error;
pub mod help;
pub mod param;
pub mod parser;
pub mod registry;
pub mod suggest;
pub mod value;

pub use config::{Config, ConfigError, ParamConfig};
pub use error::{Error, ErrorCategory, Result};
pub use help::{render_help, render_param_help, wrap, HelpConfig};
pub use param::{Param, ParamDecl, ParamHandle};
pub use parser::{ParamKey, ParseError, ParseOutcome, ParseState, Parser, UsageError};
pub use registry::{Registry, RegistryError};
pub use suggest::{levenshtein, similarity, suggest};
pub use value::{CastError, FromValue, TypedValue, Value, ValueKind, ValueType};
