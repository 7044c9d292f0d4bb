//! Command handlers for everything that is not an HTTP request

use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;

use super::App;
use crate::auth::AuthPreset;
use crate::cli::AuthCommand;
use crate::constants::{APP_NAME, APP_VERSION};
use crate::error::Error;

const HELP: &str = "\
gust - HTTPie-style HTTP client for the command line

Usage:
  gust <METHOD> <URL> [OPTIONS] [HEADERS] [PARAMS]

Commands:
  gust <METHOD> <URL>              Execute an HTTP request
  gust recall <name> [key=value]   Execute a saved call
  gust list                        List all saved calls
  gust delete <name>               Delete a saved call
  gust auth list                   List authentication presets
  gust auth add <type> <name> ...  Add a preset (basic, bearer, custom)
  gust auth remove <name>          Remove a preset

Options:
  -H KEY:VALUE                     Add a header
  -d DATA                          Request body (read from stdin when piped)
  --save NAME                      Save the request
  --dry                            Save without executing (requires --save)
  --info                           Show headers, timing and size
  --no-interactive                 Don't prompt for missing variables
  --env ENVIRONMENT                Use a workspace environment
  --format FORMAT                  Output format (json|raw)
  --auth PRESET                    Apply an authentication preset
  key==value                       Query parameter
  key=value                        Path variable for {key}

Examples:
  gust get https://api.example.com/users
  gust post https://api.example.com/users -d '{\"name\":\"John\"}' -H Authorization:\"Bearer xyz\"
  gust get https://api.example.com/users/{userId} userId=42
  gust recall my-request userId=42
  gust auth add bearer github --token=ghp_xxx
";

impl App {
    pub(crate) fn list_calls<W: Write>(&self, out: &mut W) -> Result<()> {
        let calls = self.storage.list()?;
        if calls.is_empty() {
            writeln!(out, "No saved calls found")?;
            return Ok(());
        }

        writeln!(out, "Saved calls:")?;
        for call in calls {
            write!(out, "  {} ({} {})", call.name, call.method, call.url)?;
            if !call.description.is_empty() {
                write!(out, " - {}", call.description)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub(crate) fn delete_call<W: Write>(&self, name: &str, out: &mut W) -> Result<()> {
        self.storage.delete(name)?;
        writeln!(out, "Deleted: {name}")?;
        Ok(())
    }

    pub(crate) fn print_version<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{APP_NAME} version {APP_VERSION}")?;
        Ok(())
    }

    pub(crate) fn print_help<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{HELP}")?;
        Ok(())
    }

    pub(crate) fn handle_auth<W: Write>(&mut self, cmd: AuthCommand, out: &mut W) -> Result<()> {
        match cmd {
            AuthCommand::List => {
                if self.auth.is_empty() {
                    writeln!(out, "No authentication presets configured.")?;
                    return Ok(());
                }
                writeln!(out, "Authentication Presets:")?;
                for preset in self.auth.list() {
                    writeln!(out, "  {} ({})", preset.name, preset.scheme.type_name())?;
                }
                for record in self.auth.unsupported() {
                    writeln!(out, "  {} ({}, unsupported)", record.name, record.kind)?;
                }
            }
            AuthCommand::Add { kind, name, flags } => {
                let preset = preset_from_flags(&kind, &name, &flags)?;
                self.auth.add(preset)?;
                writeln!(out, "Added auth preset: {name}")?;
            }
            AuthCommand::Remove(name) => {
                self.auth.remove(&name)?;
                writeln!(out, "Removed auth preset: {name}")?;
            }
        }
        Ok(())
    }
}

/// First flag present under any of `keys`
fn flag<'a>(flags: &'a HashMap<String, String>, keys: &[&str]) -> &'a str {
    keys.iter()
        .find_map(|key| flags.get(*key))
        .map(String::as_str)
        .unwrap_or_default()
}

fn preset_from_flags(
    kind: &str,
    name: &str,
    flags: &HashMap<String, String>,
) -> crate::error::Result<AuthPreset> {
    let required = |value: &str, message: &str| {
        if value.is_empty() {
            Err(Error::Validation(message.to_string()))
        } else {
            Ok(())
        }
    };

    match kind.to_lowercase().as_str() {
        "basic" => {
            let username = flag(flags, &["username", "u"]);
            required(username, "basic auth requires --username or -u")?;
            AuthPreset::basic(name, username, flag(flags, &["password", "p"]))
        }
        "bearer" => {
            let token = flag(flags, &["token", "t"]);
            required(token, "bearer auth requires --token or -t")?;
            AuthPreset::bearer(name, token)
        }
        "custom" => {
            let header = flag(flags, &["header", "h"]);
            let value = flag(flags, &["value", "v"]);
            required(header, "custom auth requires --header or -h")?;
            required(value, "custom auth requires --value or -v")?;
            AuthPreset::custom(name, header, value, flag(flags, &["prefix"]), Vec::new())
        }
        _ => Err(Error::Validation(format!("unknown auth type: {kind}"))),
    }
}
