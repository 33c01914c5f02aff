//! Resolution of a raw token array against the registered parameters.

use crate::error::{Error, Result};
use crate::help::{render_help, render_param_help, HelpConfig};
use crate::param::{normalize_flag, Param, ParamDecl, ParamHandle};
use crate::registry::Registry;
use crate::suggest::{suggest, HELP_FLAGS};
use crate::value::{FromValue, TypedValue, Value, ValueKind, ValueType};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors caused by the user's command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no arguments provided; mandatory flags: {}", .0.join(", "))]
    NoArgumentsProvided(Vec<String>),

    #[error("{}", unknown_flag_message(.flag, .suggestion, .first_position))]
    UnknownFlag {
        flag: String,
        suggestion: Option<String>,
        first_position: bool,
    },

    #[error("missing argument for flag '{0}'")]
    MissingArg(String),

    #[error("too many arguments for flag '{flag}': unexpected {}", .extra.join(" "))]
    TooManyArguments { flag: String, extra: Vec<String> },

    #[error("{}", already_provided_message(.flag, .short))]
    FlagAlreadyProvided { flag: String, short: Option<String> },

    #[error("mandatory flags not provided: {}", .0.join(", "))]
    MandatoryArgNotProvided(Vec<String>),

    #[error("invalid value '{value}' for flag '{flag}': expected {type_name}")]
    InvalidArgType {
        flag: String,
        type_name: String,
        value: String,
    },

    #[error("'{token}' must be the only argument or follow a flag (found at position {position})")]
    HelpAtWrongPosition { token: String, position: usize },

    #[error("path '{path}' given to flag '{flag}' does not exist")]
    PathNotFound { flag: String, path: String },
}

fn unknown_flag_message(flag: &str, suggestion: &Option<String>, first_position: &bool) -> String {
    let mut message = format!("unknown flag '{}'", flag);
    if let Some(suggestion) = suggestion {
        message.push_str(&format!("; did you mean '{}'?", suggestion));
    }
    if *first_position {
        message.push_str("; flag or command expected in first position");
    }
    message
}

fn already_provided_message(flag: &str, short: &Option<String>) -> String {
    match short {
        Some(short) => format!("flag '{}' ('{}') was provided more than once", flag, short),
        None => format!("flag '{}' was provided more than once", flag),
    }
}

/// Errors caused by the host program calling the API out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("arguments have already been parsed")]
    AlreadyParsed,

    #[error("arguments have not been parsed yet")]
    NotYetParsed,

    #[error("no parameter is registered for '{0}'")]
    UnknownParameter(String),

    #[error("parameter '{flag}' is declared as {declared}, not {requested}")]
    TypeMismatch {
        flag: String,
        declared: ValueType,
        requested: String,
    },
}

/// Where a [`Parser`] is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    NotStarted,
    InProgress,
    Completed,
    HelpRequested,
    Failed,
}

/// Result of a successful [`Parser::parse`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every token was resolved; values can be read.
    Parsed,
    /// The user asked for help. Holds the rendered text.
    Help(String),
}

/// Something that identifies a parameter: a flag string or a handle.
pub trait ParamKey {
    fn find(&self, registry: &Registry) -> Option<ParamHandle>;

    fn describe(&self) -> String;
}

impl ParamKey for ParamHandle {
    fn find(&self, registry: &Registry) -> Option<ParamHandle> {
        (self.index() < registry.len()).then_some(*self)
    }

    fn describe(&self) -> String {
        format!("#{}", self.index())
    }
}

impl ParamKey for &str {
    /// Exact flag first, then the name with `--` or `-` prepended.
    fn find(&self, registry: &Registry) -> Option<ParamHandle> {
        registry
            .lookup(self)
            .or_else(|| registry.lookup(&normalize_flag(self, "--")))
            .or_else(|| registry.lookup(&normalize_flag(self, "-")))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl ParamKey for &String {
    fn find(&self, registry: &Registry) -> Option<ParamHandle> {
        ParamKey::find(&self.as_str(), registry)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

type PathCheck = Box<dyn Fn(&Path) -> bool>;

/// Parses one command line against a set of registered parameters.
///
/// A parser runs once: register parameters, call [`Parser::parse`], then
/// read values. It is not meant to be shared between threads; values are
/// converted lazily and cached without locking.
pub struct Parser {
    args: Vec<String>,
    registry: Registry,
    help: HelpConfig,
    path_check: PathCheck,
    state: ParseState,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("args", &self.args)
            .field("registry", &self.registry)
            .field("help", &self.help)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Parser {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            registry: Registry::new(),
            help: HelpConfig::default(),
            path_check: Box::new(|_| true),
            state: ParseState::NotStarted,
        }
    }

    pub fn with_help_config(mut self, help: HelpConfig) -> Self {
        self.help = help;
        self
    }

    /// Predicate used to check that `path` parameters exist. By default every
    /// path is accepted.
    pub fn with_path_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Path) -> bool + 'static,
    {
        self.path_check = Box::new(check);
        self
    }

    /// Register a parameter. Must happen before [`Parser::parse`].
    pub fn register(&mut self, decl: ParamDecl) -> Result<ParamHandle> {
        if self.state != ParseState::NotStarted {
            return Err(UsageError::AlreadyParsed.into());
        }
        Ok(self.registry.register(decl)?)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Help text for every parameter.
    pub fn help_text(&self) -> String {
        render_help(&self.registry, &self.help)
    }

    /// Help text for a single parameter.
    pub fn param_help_text<K: ParamKey>(&self, key: K) -> Result<String> {
        let handle = self.handle(key)?;
        Ok(render_param_help(&self.registry, handle, &self.help))
    }

    /// Resolve the token array. Can only be called once.
    pub fn parse(&mut self) -> Result<ParseOutcome> {
        if self.state != ParseState::NotStarted {
            return Err(UsageError::AlreadyParsed.into());
        }
        self.state = ParseState::InProgress;
        debug!(
            args = self.args.len(),
            params = self.registry.len(),
            "parsing arguments"
        );

        let args = std::mem::take(&mut self.args);
        let result = self.resolve(&args);
        self.args = args;

        self.state = match &result {
            Ok(ParseOutcome::Parsed) => ParseState::Completed,
            Ok(ParseOutcome::Help(_)) => ParseState::HelpRequested,
            Err(_) => ParseState::Failed,
        };
        debug!(state = ?self.state, "parsing finished");
        result.map_err(Error::from)
    }

    fn resolve(&mut self, args: &[String]) -> std::result::Result<ParseOutcome, ParseError> {
        if args.is_empty() {
            let mandatory = self.flags_of(self.registry.mandatory());
            if !mandatory.is_empty() {
                return Err(ParseError::NoArgumentsProvided(mandatory));
            }
            return Ok(ParseOutcome::Parsed);
        }

        if let Some(text) = self.intercept_help(args)? {
            return Ok(ParseOutcome::Help(text));
        }

        let mut resolved = HashSet::new();
        let mut i = 0;
        while i < args.len() {
            let token = &args[i];
            let handle = self
                .registry
                .lookup(token)
                .ok_or_else(|| self.unknown_flag(token, i))?;

            let param = self.registry.get(handle);
            if !resolved.insert(handle) {
                return Err(ParseError::FlagAlreadyProvided {
                    flag: param.full_flag().to_string(),
                    short: param.short_flag().map(str::to_string),
                });
            }

            let run = args[i + 1..]
                .iter()
                .take_while(|t| !self.stops_run(t))
                .count();
            if run == 0 {
                return Err(ParseError::MissingArg(param.full_flag().to_string()));
            }
            if !param.value_type().array && run > 1 {
                return Err(ParseError::TooManyArguments {
                    flag: param.full_flag().to_string(),
                    extra: args[i + 2..i + 1 + run].to_vec(),
                });
            }

            let tokens = args[i + 1..i + 1 + run].to_vec();
            debug!(flag = %param.full_flag(), tokens = ?tokens, "resolved flag");
            self.registry.get_mut(handle).assign(tokens);
            i += 1 + run;
        }

        let missing: Vec<ParamHandle> = self
            .registry
            .mandatory()
            .iter()
            .filter(|h| !resolved.contains(*h))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MandatoryArgNotProvided(self.flags_of(&missing)));
        }

        let mut handles: Vec<ParamHandle> = resolved.into_iter().collect();
        handles.sort();
        for handle in handles {
            self.check_value(self.registry.get(handle))?;
        }

        Ok(ParseOutcome::Parsed)
    }

    /// A run of arguments ends at any known flag or help flag.
    fn stops_run(&self, token: &str) -> bool {
        HELP_FLAGS.contains(&token) || self.registry.lookup(token).is_some()
    }

    fn intercept_help(&self, args: &[String]) -> std::result::Result<Option<String>, ParseError> {
        let Some(position) = args.iter().position(|t| HELP_FLAGS.contains(&t.as_str())) else {
            return Ok(None);
        };

        if args.len() == 1 {
            debug!("full help requested");
            return Ok(Some(self.help_text()));
        }
        if position == args.len() - 1 {
            if let Some(handle) = self.registry.lookup(&args[position - 1]) {
                debug!(flag = %args[position - 1], "parameter help requested");
                return Ok(Some(render_param_help(&self.registry, handle, &self.help)));
            }
        }
        Err(ParseError::HelpAtWrongPosition {
            token: args[position].clone(),
            position,
        })
    }

    fn unknown_flag(&self, token: &str, position: usize) -> ParseError {
        let suggestion = suggest(token, self.registry.flags());
        debug!(flag = token, suggestion = ?suggestion, "unknown flag");
        ParseError::UnknownFlag {
            flag: token.to_string(),
            suggestion,
            first_position: position == 0 && !token.starts_with('-'),
        }
    }

    /// Convert the supplied tokens now so bad input fails the parse, and run
    /// the existence check on paths.
    fn check_value(&self, param: &Param) -> std::result::Result<(), ParseError> {
        let typed = param.typed().map_err(|e| ParseError::InvalidArgType {
            flag: param.full_flag().to_string(),
            type_name: e.kind.to_string(),
            value: e.raw,
        })?;

        if param.value_type().kind == ValueKind::Path {
            for value in typed.map(TypedValue::values).unwrap_or_default() {
                if let Value::Path(path) = value {
                    if !(self.path_check)(path) {
                        return Err(ParseError::PathNotFound {
                            flag: param.full_flag().to_string(),
                            path: path.display().to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn flags_of(&self, handles: &[ParamHandle]) -> Vec<String> {
        handles
            .iter()
            .map(|h| self.registry.get(*h).full_flag().to_string())
            .collect()
    }

    fn completed(&self) -> Result<()> {
        if self.state == ParseState::Completed {
            Ok(())
        } else {
            Err(UsageError::NotYetParsed.into())
        }
    }

    /// Handle of the parameter `key` refers to.
    pub fn handle<K: ParamKey>(&self, key: K) -> Result<ParamHandle> {
        key.find(&self.registry)
            .ok_or_else(|| UsageError::UnknownParameter(key.describe()).into())
    }

    /// The registered parameter `key` refers to. Available before parsing.
    pub fn param<K: ParamKey>(&self, key: K) -> Result<&Param> {
        Ok(self.registry.get(self.handle(key)?))
    }

    /// Tokens that a read of `key` converts: the supplied ones, or the
    /// default. `None` when neither exists.
    pub fn raw<K: ParamKey>(&self, key: K) -> Result<Option<&[String]>> {
        self.completed()?;
        Ok(self.param(key)?.effective_raw())
    }

    /// Whether `key` was given on the command line.
    pub fn is_present<K: ParamKey>(&self, key: K) -> Result<bool> {
        self.completed()?;
        Ok(self.param(key)?.is_resolved())
    }

    /// The converted value of `key`, supplied or default.
    pub fn value<K: ParamKey>(&self, key: K) -> Result<Option<&TypedValue>> {
        self.completed()?;
        let param = self.param(key)?;
        param.typed().map_err(|e| {
            ParseError::InvalidArgType {
                flag: param.full_flag().to_string(),
                type_name: e.kind.to_string(),
                value: e.raw,
            }
            .into()
        })
    }

    fn check_kind<T: FromValue>(&self, param: &Param, array: bool) -> Result<()> {
        let declared = param.value_type();
        if declared.kind != T::KIND || (declared.array && !array) {
            let requested = if array {
                ValueType::array(T::KIND)
            } else {
                ValueType::scalar(T::KIND)
            };
            return Err(UsageError::TypeMismatch {
                flag: param.full_flag().to_string(),
                declared,
                requested: requested.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Typed value of a single-valued parameter.
    pub fn get<T: FromValue, K: ParamKey>(&self, key: K) -> Result<Option<T>> {
        self.completed()?;
        let handle = self.handle(key)?;
        self.check_kind::<T>(self.registry.get(handle), false)?;
        Ok(self
            .value(handle)?
            .and_then(|v| v.values().first())
            .and_then(T::from_value))
    }

    /// Typed values in input order. Works for array and single-valued
    /// parameters; an absent parameter without default yields an empty list.
    pub fn get_all<T: FromValue, K: ParamKey>(&self, key: K) -> Result<Vec<T>> {
        self.completed()?;
        let handle = self.handle(key)?;
        self.check_kind::<T>(self.registry.get(handle), true)?;
        Ok(self
            .value(handle)?
            .map(|v| v.values().iter().filter_map(T::from_value).collect())
            .unwrap_or_default())
    }

    pub fn get_string<K: ParamKey>(&self, key: K) -> Result<Option<String>> {
        self.get(key)
    }

    pub fn get_integer<K: ParamKey>(&self, key: K) -> Result<Option<i64>> {
        self.get(key)
    }

    pub fn get_double<K: ParamKey>(&self, key: K) -> Result<Option<f64>> {
        self.get(key)
    }

    pub fn get_boolean<K: ParamKey>(&self, key: K) -> Result<Option<bool>> {
        self.get(key)
    }

    pub fn get_char<K: ParamKey>(&self, key: K) -> Result<Option<char>> {
        self.get(key)
    }

    pub fn get_path<K: ParamKey>(&self, key: K) -> Result<Option<PathBuf>> {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    fn file_save_parser(input: &[&str]) -> Parser {
        let mut parser = Parser::new(args(input));
        parser
            .register(ParamDecl::new("file", ValueKind::String).short("f").mandatory())
            .unwrap();
        parser
            .register(ParamDecl::new("save", ValueKind::String).short("s").mandatory())
            .unwrap();
        parser
    }

    fn parse_error(parser: &mut Parser) -> ParseError {
        match parser.parse() {
            Err(Error::Parse(e)) => e,
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_short_flags() {
        let mut parser = file_save_parser(&["-f", "file.txt", "-s", "save.txt"]);
        assert_eq!(parser.parse().unwrap(), ParseOutcome::Parsed);
        assert_eq!(parser.state(), ParseState::Completed);
        assert_eq!(parser.get_string("file").unwrap(), Some("file.txt".to_string()));
        assert_eq!(parser.get_string("-s").unwrap(), Some("save.txt".to_string()));
    }

    #[test]
    fn test_parse_full_flags_any_order() {
        let mut parser = file_save_parser(&["--save", "b", "--file", "a"]);
        parser.parse().unwrap();
        assert_eq!(parser.get_string("--file").unwrap(), Some("a".to_string()));
        assert_eq!(parser.get_string("--save").unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_error_unknown_flag_without_suggestion() {
        let mut parser = file_save_parser(&["-w", "file.txt", "-s", "save.txt"]);
        let err = parse_error(&mut parser);
        assert_eq!(
            err,
            ParseError::UnknownFlag {
                flag: "-w".to_string(),
                suggestion: None,
                first_position: false,
            }
        );
        assert_eq!(parser.state(), ParseState::Failed);
    }

    #[test]
    fn test_error_unknown_flag_with_suggestion() {
        let mut parser = file_save_parser(&["--sve", "x"]);
        let err = parse_error(&mut parser);
        assert!(matches!(
            &err,
            ParseError::UnknownFlag { suggestion: Some(s), .. } if s == "--save"
        ));
        assert!(err.to_string().contains("--save"));
    }

    #[test]
    fn test_error_unknown_first_token_without_dash() {
        let mut parser = file_save_parser(&["file", "x"]);
        let err = parse_error(&mut parser);
        assert!(matches!(
            err,
            ParseError::UnknownFlag { first_position: true, .. }
        ));
        assert!(err
            .to_string()
            .contains("flag or command expected in first position"));
    }

    #[test]
    fn test_error_no_arguments_with_mandatory() {
        let mut parser = file_save_parser(&[]);
        assert_eq!(
            parse_error(&mut parser),
            ParseError::NoArgumentsProvided(args(&["--file", "--save"]))
        );
    }

    #[test]
    fn test_no_arguments_without_mandatory_succeeds() {
        let mut parser = Parser::new(Vec::<String>::new());
        parser
            .register(ParamDecl::new("name", ValueKind::String))
            .unwrap();
        assert_eq!(parser.parse().unwrap(), ParseOutcome::Parsed);
        assert_eq!(parser.get_string("name").unwrap(), None);
    }

    #[test]
    fn test_error_mandatory_missing_in_registration_order() {
        let mut parser = Parser::new(args(&["--load", "x"]));
        for name in ["load", "file", "save"] {
            parser
                .register(ParamDecl::new(name, ValueKind::String).mandatory())
                .unwrap();
        }
        assert_eq!(
            parse_error(&mut parser),
            ParseError::MandatoryArgNotProvided(args(&["--file", "--save"]))
        );
    }

    #[test]
    fn test_error_missing_arg_for_trailing_flag() {
        let mut parser = file_save_parser(&["-f", "a", "-s"]);
        assert_eq!(
            parse_error(&mut parser),
            ParseError::MissingArg("--save".to_string())
        );
    }

    #[test]
    fn test_error_missing_arg_for_consecutive_flags() {
        let mut parser = file_save_parser(&["-f", "-s", "b"]);
        assert_eq!(
            parse_error(&mut parser),
            ParseError::MissingArg("--file".to_string())
        );
    }

    #[test]
    fn test_error_missing_arg_for_trailing_array_flag() {
        let mut parser = Parser::new(args(&["--nums"]));
        parser
            .register(ParamDecl::array("nums", ValueKind::Integer))
            .unwrap();
        assert_eq!(
            parse_error(&mut parser),
            ParseError::MissingArg("--nums".to_string())
        );
    }

    #[test]
    fn test_error_too_many_arguments_for_scalar() {
        let mut parser = file_save_parser(&["-f", "a", "b", "c", "-s", "d"]);
        assert_eq!(
            parse_error(&mut parser),
            ParseError::TooManyArguments {
                flag: "--file".to_string(),
                extra: args(&["b", "c"]),
            }
        );
    }

    #[test]
    fn test_error_flag_already_provided() {
        let mut parser = file_save_parser(&["-f", "a", "-s", "b", "--file", "c"]);
        assert_eq!(
            parse_error(&mut parser),
            ParseError::FlagAlreadyProvided {
                flag: "--file".to_string(),
                short: Some("-f".to_string()),
            }
        );
    }

    #[test]
    fn test_array_collects_until_next_flag() {
        let mut parser = Parser::new(args(&["--nums", "1", "2", "3", "--name", "x"]));
        parser
            .register(ParamDecl::array("nums", ValueKind::Integer).short("n"))
            .unwrap();
        parser
            .register(ParamDecl::new("name", ValueKind::String))
            .unwrap();
        parser.parse().unwrap();
        assert_eq!(parser.get_all::<i64, _>("nums").unwrap(), vec![1, 2, 3]);
        assert_eq!(parser.raw("-n").unwrap(), Some(&args(&["1", "2", "3"])[..]));
        assert_eq!(parser.get_string("name").unwrap(), Some("x".to_string()));
    }

    #[test]
    fn test_negative_number_is_a_value() {
        let mut parser = Parser::new(args(&["--offset", "-5"]));
        parser
            .register(ParamDecl::new("offset", ValueKind::Integer))
            .unwrap();
        parser.parse().unwrap();
        assert_eq!(parser.get_integer("offset").unwrap(), Some(-5));
    }

    #[test]
    fn test_error_invalid_double() {
        let mut parser = Parser::new(args(&["--ratio", "5.5.5"]));
        parser
            .register(ParamDecl::new("ratio", ValueKind::Double))
            .unwrap();
        let err = parse_error(&mut parser);
        assert_eq!(
            err,
            ParseError::InvalidArgType {
                flag: "--ratio".to_string(),
                type_name: "double".to_string(),
                value: "5.5.5".to_string(),
            }
        );
    }

    #[test]
    fn test_error_invalid_array_element_reports_element() {
        let mut parser = Parser::new(args(&["--nums", "1", "x", "y"]));
        parser
            .register(ParamDecl::array("nums", ValueKind::Integer))
            .unwrap();
        assert!(matches!(
            parse_error(&mut parser),
            ParseError::InvalidArgType { value, .. } if value == "x"
        ));
    }

    #[test]
    fn test_default_used_when_absent() {
        let mut parser = Parser::new(args(&["--name", "x"]));
        parser
            .register(ParamDecl::new("name", ValueKind::String))
            .unwrap();
        parser
            .register(ParamDecl::new("level", ValueKind::Integer).default_value(3))
            .unwrap();
        parser.parse().unwrap();
        assert_eq!(parser.get_integer("level").unwrap(), Some(3));
        assert!(!parser.is_present("level").unwrap());
    }

    #[test]
    fn test_help_alone() {
        let mut parser = file_save_parser(&["--help"]);
        match parser.parse().unwrap() {
            ParseOutcome::Help(text) => {
                assert!(text.contains("--file"));
                assert!(text.contains("--save"));
            }
            other => panic!("Expected Help, got {:?}", other),
        }
        assert_eq!(parser.state(), ParseState::HelpRequested);
        assert!(matches!(
            parser.get_string("file"),
            Err(Error::Usage(UsageError::NotYetParsed))
        ));
    }

    #[test]
    fn test_help_after_flag() {
        let mut parser = file_save_parser(&["-f", "a", "-s", "-h"]);
        match parser.parse().unwrap() {
            ParseOutcome::Help(text) => {
                assert!(text.contains("--save"));
                assert!(!text.contains("--file"));
            }
            other => panic!("Expected Help, got {:?}", other),
        }
    }

    #[test]
    fn test_error_help_at_wrong_position() {
        let mut parser = file_save_parser(&["--help", "-f", "a"]);
        assert_eq!(
            parse_error(&mut parser),
            ParseError::HelpAtWrongPosition {
                token: "--help".to_string(),
                position: 0,
            }
        );

        let mut parser = file_save_parser(&["-f", "a", "-h"]);
        assert!(matches!(
            parse_error(&mut parser),
            ParseError::HelpAtWrongPosition { position: 2, .. }
        ));
    }

    #[test]
    fn test_error_parse_twice() {
        let mut parser = file_save_parser(&["-f", "a", "-s", "b"]);
        parser.parse().unwrap();
        assert_eq!(
            parser.parse(),
            Err(Error::Usage(UsageError::AlreadyParsed))
        );
    }

    #[test]
    fn test_error_register_after_parse() {
        let mut parser = file_save_parser(&["-f", "a", "-s", "b"]);
        parser.parse().unwrap();
        let result = parser.register(ParamDecl::new("late", ValueKind::String));
        assert_eq!(result, Err(Error::Usage(UsageError::AlreadyParsed)));
    }

    #[test]
    fn test_error_read_before_parse() {
        let parser = file_save_parser(&["-f", "a", "-s", "b"]);
        assert_eq!(
            parser.get_string("file"),
            Err(Error::Usage(UsageError::NotYetParsed))
        );
    }

    #[test]
    fn test_error_read_unknown_parameter() {
        let mut parser = file_save_parser(&["-f", "a", "-s", "b"]);
        parser.parse().unwrap();
        assert_eq!(
            parser.get_string("missing"),
            Err(Error::Usage(UsageError::UnknownParameter("missing".to_string())))
        );
    }

    #[test]
    fn test_error_read_with_wrong_type() {
        let mut parser = file_save_parser(&["-f", "a", "-s", "b"]);
        parser.parse().unwrap();
        assert!(matches!(
            parser.get_integer("file"),
            Err(Error::Usage(UsageError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_read_by_handle() {
        let mut parser = Parser::new(args(&["-c", "z"]));
        let handle = parser
            .register(ParamDecl::new("char", ValueKind::Character).short("c"))
            .unwrap();
        parser.parse().unwrap();
        assert_eq!(parser.get_char(handle).unwrap(), Some('z'));
        assert_eq!(
            parser.value(handle).unwrap(),
            Some(&TypedValue::Scalar(Value::Character('z')))
        );
    }

    #[test]
    fn test_error_path_rejected_by_check() {
        let mut parser =
            Parser::new(args(&["--input", "/nope"])).with_path_check(|p| p != Path::new("/nope"));
        parser
            .register(ParamDecl::new("input", ValueKind::Path))
            .unwrap();
        assert_eq!(
            parse_error(&mut parser),
            ParseError::PathNotFound {
                flag: "--input".to_string(),
                path: "/nope".to_string(),
            }
        );
    }
}
