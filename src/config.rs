//! JSON declaration of a parser: program metadata and its parameters.

use crate::error::Error;
use crate::help::{HelpConfig, DEFAULT_WIDTH, MIN_WIDTH};
use crate::param::ParamDecl;
use crate::parser::Parser;
use crate::value::ValueKind;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while reading a declaration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("duplicate parameter name: {0}")]
    DuplicateName(String),

    #[error("help width {0} is below the minimum of {}", MIN_WIDTH)]
    WidthTooSmall(usize),

    #[error("default of '{0}' must be a string, number, boolean or a list of them")]
    UnsupportedDefault(String),

    #[error(transparent)]
    Build(#[from] Error),
}

/// Declaration of a single parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamConfig {
    /// Full flag, with or without the leading `--`
    pub name: String,
    /// Short flag, with or without the leading `-`
    pub short: Option<String>,
    /// Help text; `\n` forces a line break
    pub description: Option<String>,
    /// Whether parsing fails when the flag is absent
    #[serde(default)]
    pub mandatory: bool,
    /// Default value; a JSON list gives several tokens to an array parameter
    pub default: Option<serde_json::Value>,
    /// Value kind: string (default), integer, double, boolean, character, path
    #[serde(rename = "type", default)]
    pub kind: ValueKind,
    /// Accumulate every following non-flag token
    #[serde(default)]
    pub array: bool,
}

/// Top-level declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Program name for the usage line
    pub name: Option<String>,
    /// Program description shown in help
    pub description: Option<String>,
    /// Help width in columns (default: 100)
    pub width: Option<usize>,
    /// Parameters, in registration order
    #[serde(default)]
    pub params: Vec<ParamConfig>,
}

impl Config {
    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Validate the declaration beyond what registration checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use std::collections::HashSet;

        if let Some(width) = self.width {
            if width < MIN_WIDTH {
                return Err(ConfigError::WidthTooSmall(width));
            }
        }

        let mut names = HashSet::new();
        for param in &self.params {
            if !names.insert(param.name.trim_start_matches('-')) {
                return Err(ConfigError::DuplicateName(param.name.clone()));
            }
        }

        Ok(())
    }

    /// Help layout described by this declaration.
    pub fn help_config(&self) -> HelpConfig {
        HelpConfig {
            width: self.width.unwrap_or(DEFAULT_WIDTH),
            program: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Build a parser for `args` with every declared parameter registered.
    pub fn build_parser<I, S>(&self, args: I) -> Result<Parser, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parser = Parser::new(args).with_help_config(self.help_config());
        for param in &self.params {
            parser.register(param.to_decl()?)?;
        }
        Ok(parser)
    }
}

impl ParamConfig {
    /// Convert to a [`ParamDecl`], rendering the JSON default to tokens.
    pub fn to_decl(&self) -> Result<ParamDecl, ConfigError> {
        let mut decl = if self.array {
            ParamDecl::array(self.name.clone(), self.kind)
        } else {
            ParamDecl::new(self.name.clone(), self.kind)
        };
        if let Some(ref short) = self.short {
            decl = decl.short(short.clone());
        }
        if let Some(ref description) = self.description {
            decl = decl.description(description.clone());
        }
        if self.mandatory {
            decl = decl.mandatory();
        }
        if let Some(tokens) = self.default_tokens()? {
            decl = decl.default_values(tokens);
        }
        Ok(decl)
    }

    fn default_tokens(&self) -> Result<Option<Vec<String>>, ConfigError> {
        use serde_json::Value;

        let scalar = |value: &Value| match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(ConfigError::UnsupportedDefault(self.name.clone())),
        };

        match self.default {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(ref items)) => {
                items.iter().map(scalar).collect::<Result<_, _>>().map(Some)
            }
            Some(ref value) => scalar(value).map(|token| Some(vec![token])),
        }
    }
}
