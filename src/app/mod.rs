//! App layer - wires parsing, configuration, stores and the executor together
//!
//! One [`App`] serves one invocation: it parses the arguments into a
//! [`Command`], runs it, and writes user-facing output to the given writer.

pub mod commands;
pub mod request;

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::auth::AuthManager;
use crate::cli::{self, Command};
use crate::config::{GlobalConfig, Workspace};
use crate::storage::SavedCallStore;

pub struct App {
    workspace: Workspace,
    global: GlobalConfig,
    storage: SavedCallStore,
    auth: AuthManager,
    /// Source for stdin bodies and prompt answers
    input: Box<dyn BufRead>,
    input_is_tty: bool,
    color: bool,
}

impl App {
    /// Build an app for an already detected workspace.
    ///
    /// Input defaults to empty and non-interactive with colour off; see
    /// [`App::with_input`] and [`App::with_color`].
    pub fn new(workspace: Workspace, global: GlobalConfig) -> crate::error::Result<Self> {
        let storage = SavedCallStore::new(&workspace.root);
        let mut auth = AuthManager::new(&workspace.root);
        auth.load()?;

        Ok(App {
            workspace,
            global,
            storage,
            auth,
            input: Box::new(io::empty()),
            input_is_tty: false,
            color: false,
        })
    }

    /// Detect the workspace from the current directory and load user config.
    pub fn detect() -> crate::error::Result<Self> {
        let workspace = Workspace::detect()?;
        let global = GlobalConfig::load()?;
        Self::new(workspace, global)
    }

    pub fn with_input(mut self, input: Box<dyn BufRead>, is_tty: bool) -> Self {
        self.input = input;
        self.input_is_tty = is_tty;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Parse `args` (without the program name) and run the command.
    pub async fn run<W: Write>(&mut self, args: &[String], out: &mut W) -> Result<()> {
        match cli::parse(args)? {
            Command::Request(req) => self.execute_request(req, out).await,
            Command::Recall(opts) => self.execute_recall(opts, out).await,
            Command::Auth(cmd) => self.handle_auth(cmd, out),
            Command::List => self.list_calls(out),
            Command::Delete(name) => self.delete_call(&name, out),
            Command::Version => self.print_version(out),
            Command::Help => self.print_help(out),
        }
    }
}
