//! Command-line parsing
//!
//! Arguments are walked with a manual cursor rather than a declarative
//! parser: the request grammar mixes flags with bare `key=value` and
//! `key==value` tokens whose meaning depends on their shape.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::HttpMethod;

/// A fully parsed invocation
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Request(ParsedRequest),
    Recall(RecallOptions),
    Auth(AuthCommand),
    List,
    Delete(String),
    Version,
    Help,
}

/// `gust <method> <url> ...`
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// `{name}` values given as `name=value`
    pub path_params: HashMap<String, String>,
    /// `None` when no `-d` was given, so stdin may supply the body
    pub body: Option<String>,
    pub save: Option<String>,
    pub env: Option<String>,
    pub format: Option<String>,
    pub auth: Option<String>,
    pub dry: bool,
    pub info: bool,
    pub no_interactive: bool,
}

impl ParsedRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        ParsedRequest {
            method,
            url: url.into(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
            path_params: HashMap::new(),
            body: None,
            save: None,
            env: None,
            format: None,
            auth: None,
            dry: false,
            info: false,
            no_interactive: false,
        }
    }
}

/// `gust recall <name> ...`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecallOptions {
    pub name: String,
    pub headers: HashMap<String, String>,
    /// `key=value` overrides, applied as path variables
    pub params: HashMap<String, String>,
    pub env: Option<String>,
}

/// `gust auth ...`
#[derive(Clone, Debug, PartialEq)]
pub enum AuthCommand {
    List,
    Add {
        kind: String,
        name: String,
        /// Flag keys with leading dashes stripped
        flags: HashMap<String, String>,
    },
    Remove(String),
}

/// Flags that take a value, inline (`--save=x`) or as the next argument
const VALUE_FLAGS: [&str; 4] = ["--save", "--env", "--format", "--auth"];

/// Parse the arguments that follow the program name.
pub fn parse(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return Err(Error::Parse("no command provided".to_string()));
    };

    let command = match first.to_lowercase().as_str() {
        "recall" => Command::Recall(parse_recall(args)?),
        "list" => Command::List,
        "delete" => match args.get(1) {
            Some(name) => Command::Delete(name.clone()),
            None => return Err(Error::Parse("delete requires a call name".to_string())),
        },
        "auth" => Command::Auth(parse_auth(args)?),
        "--version" | "-v" => Command::Version,
        "--help" | "-h" => Command::Help,
        _ => Command::Request(parse_request(args)?),
    };
    tracing::debug!(?command, "Parsed command line");
    Ok(command)
}

fn parse_request(args: &[String]) -> Result<ParsedRequest> {
    if args.len() < 2 {
        return Err(Error::Parse("method and URL required".to_string()));
    }
    let method: HttpMethod = args[0].parse()?;
    let mut req = ParsedRequest::new(method, args[1].clone());

    let mut i = 2;
    while i < args.len() {
        let arg = args[i].as_str();

        if let Some((flag, inline)) = split_value_flag(arg) {
            let value = match inline {
                Some(value) => value.to_string(),
                None => take_next(args, &mut i, flag)?,
            };
            match flag {
                "--save" => req.save = Some(value),
                "--env" => req.env = Some(value),
                "--format" => req.format = Some(value),
                _ => req.auth = Some(value),
            }
        } else if arg == "--dry" {
            req.dry = true;
        } else if arg == "--info" {
            req.info = true;
        } else if arg == "--no-interactive" {
            req.no_interactive = true;
        } else if let Some(inline) = arg.strip_prefix("-H") {
            let raw = if inline.is_empty() {
                take_next(args, &mut i, "-H")?
            } else {
                inline.to_string()
            };
            let (key, value) = parse_header(&raw)?;
            req.headers.insert(key, value);
        } else if let Some(inline) = arg.strip_prefix("-d") {
            let body = if inline.is_empty() {
                take_next(args, &mut i, "-d")?
            } else {
                inline.to_string()
            };
            req.body = Some(body);
        } else if let Some((key, value)) = arg.split_once("==") {
            req.query_params.insert(key.to_string(), value.to_string());
        } else if let Some((key, value)) = split_assignment(arg) {
            req.path_params.insert(key.to_string(), value.to_string());
        } else {
            return Err(Error::Parse(format!("unexpected argument: {arg}")));
        }
        i += 1;
    }

    Ok(req)
}

fn parse_recall(args: &[String]) -> Result<RecallOptions> {
    let Some(name) = args.get(1) else {
        return Err(Error::Parse("recall requires a call name".to_string()));
    };
    let mut opts = RecallOptions {
        name: name.clone(),
        ..Default::default()
    };

    let mut i = 2;
    while i < args.len() {
        let arg = args[i].as_str();

        if let Some(inline) = arg.strip_prefix("-H") {
            let raw = if inline.is_empty() {
                take_next(args, &mut i, "-H")?
            } else {
                inline.to_string()
            };
            let (key, value) = parse_header(&raw)?;
            opts.headers.insert(key, value);
        } else if arg == "--env" {
            opts.env = Some(take_next(args, &mut i, "--env")?);
        } else if let Some(env) = arg.strip_prefix("--env=") {
            opts.env = Some(env.to_string());
        } else if let Some((key, value)) = split_assignment(arg) {
            opts.params.insert(key.to_string(), value.to_string());
        } else {
            return Err(Error::Parse(format!("unexpected argument: {arg}")));
        }
        i += 1;
    }

    Ok(opts)
}

fn parse_auth(args: &[String]) -> Result<AuthCommand> {
    let Some(sub) = args.get(1) else {
        return Ok(AuthCommand::List);
    };

    match sub.to_lowercase().as_str() {
        "list" => Ok(AuthCommand::List),
        "add" => {
            let (Some(kind), Some(name)) = (args.get(2), args.get(3)) else {
                return Err(Error::Parse("auth add requires type and name".to_string()));
            };
            Ok(AuthCommand::Add {
                kind: kind.clone(),
                name: name.clone(),
                flags: parse_auth_flags(&args[4..])?,
            })
        }
        "remove" | "delete" => match args.get(2) {
            Some(name) => Ok(AuthCommand::Remove(name.clone())),
            None => Err(Error::Parse("auth remove requires a preset name".to_string())),
        },
        other => Err(Error::Parse(format!("unknown auth subcommand: {other}"))),
    }
}

/// Accepts `k=v`, `--k=v`, `-k=v`, `--k v` and `-k v`.
fn parse_auth_flags(args: &[String]) -> Result<HashMap<String, String>> {
    let mut flags = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        let key = arg.trim_start_matches('-');

        if let Some((key, value)) = key.split_once('=') {
            flags.insert(key.to_string(), value.to_string());
        } else if key.len() < arg.len() && !key.is_empty() {
            let value = take_next(args, &mut i, arg)?;
            flags.insert(key.to_string(), value);
        } else {
            return Err(Error::Parse(format!("unexpected argument: {arg}")));
        }
        i += 1;
    }
    Ok(flags)
}

/// Matches `--flag` or `--flag=value` for the known value flags.
fn split_value_flag(arg: &str) -> Option<(&'static str, Option<&str>)> {
    VALUE_FLAGS.iter().find_map(|&flag| {
        let rest = arg.strip_prefix(flag)?;
        if rest.is_empty() {
            Some((flag, None))
        } else {
            rest.strip_prefix('=').map(|value| (flag, Some(value)))
        }
    })
}

/// Advance the cursor and return the argument it lands on.
fn take_next(args: &[String], i: &mut usize, flag: &str) -> Result<String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| Error::Parse(format!("{flag} requires a value")))
}

/// `Key:Value`, falling back to `Key=Value`; both sides trimmed.
fn parse_header(raw: &str) -> Result<(String, String)> {
    raw.split_once(':')
        .or_else(|| raw.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| {
            Error::Parse(format!(
                "invalid header format: {raw} (use key:value or key=value)"
            ))
        })
}

/// Bare `key=value` tokens; anything starting with `-` is a flag.
fn split_assignment(arg: &str) -> Option<(&str, &str)> {
    if arg.starts_with('-') {
        return None;
    }
    arg.split_once('=')
}
