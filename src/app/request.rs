//! Request and recall flows

use std::collections::HashMap;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};

use super::App;
use crate::cli::{ParsedRequest, RecallOptions};
use crate::error::Error;
use crate::models::{Request, SavedCall};
use crate::network::Executor;
use crate::output::{Formatter, OutputFormat};
use crate::prompt;
use crate::template::{expand_env_vars, Template};

impl App {
    pub(crate) async fn execute_request<W: Write>(
        &mut self,
        mut req: ParsedRequest,
        out: &mut W,
    ) -> Result<()> {
        let format = match req.format.as_deref() {
            Some(format) => format.parse::<OutputFormat>()?,
            None => OutputFormat::Auto,
        };
        if req.dry && req.save.is_none() {
            return Err(Error::Validation("--dry requires --save to specify a name".to_string()).into());
        }

        if req.body.is_none() && !self.input_is_tty {
            let mut body = Vec::new();
            self.input
                .read_to_end(&mut body)
                .context("failed to read request body from stdin")?;
            if !body.is_empty() {
                req.body = Some(String::from_utf8_lossy(&body).into_owned());
            }
        }

        let request = self.prepare_request(&req)?;

        if req.dry {
            if let Some(name) = &req.save {
                self.save_call(&req, name, out)?;
            }
            return Ok(());
        }

        let executor = Executor::with_user_agent(request.timeout, &self.global.user_agent())?;
        let resp = executor.execute(&request).await.context("request failed")?;

        if let Some(name) = &req.save {
            self.save_call(&req, name, out)?;
        }

        let formatter = Formatter::new(self.color, format, self.global.pretty_print());
        write!(out, "{}", formatter.format_response(&resp, req.info))?;
        Ok(())
    }

    pub(crate) async fn execute_recall<W: Write>(
        &mut self,
        opts: RecallOptions,
        out: &mut W,
    ) -> Result<()> {
        let call = self.storage.load(&opts.name)?;
        tracing::info!(name = %call.name, "Recalling saved call");

        let mut req = ParsedRequest::new(call.method, call.url);
        req.headers = call.headers;
        req.headers.extend(opts.headers);
        req.query_params = call.query_params;
        req.path_params = opts.params;
        req.body = (!call.body.is_empty()).then_some(call.body);
        req.env = opts.env;

        self.execute_request(req, out).await
    }

    /// Turn parsed arguments into a fully resolved request.
    ///
    /// Prompts on stderr for path variables that were not given, when the
    /// input is a terminal and prompting was not disabled.
    pub(crate) fn prepare_request(&mut self, req: &ParsedRequest) -> Result<Request> {
        let env = self.selected_env(req.env.as_deref())?;

        // CLI headers win over workspace defaults
        let mut headers = self
            .workspace
            .default_headers()
            .cloned()
            .unwrap_or_default();
        headers.extend(req.headers.clone());
        let headers: HashMap<String, String> = headers
            .into_iter()
            .map(|(key, value)| (key, expand_env_vars(&value, &env)))
            .collect();
        let body = req
            .body
            .as_deref()
            .map(|body| expand_env_vars(body, &env))
            .unwrap_or_default();

        let url = match self.workspace.base_url() {
            Some(base) if req.url.starts_with('/') => {
                format!("{}{}", base.trim_end_matches('/'), req.url)
            }
            _ => req.url.clone(),
        };

        let mut template = Template::new(url);
        if let Some(name) = template
            .extract_env_vars()
            .into_iter()
            .find(|name| !env.contains_key(name))
        {
            return Err(Error::MissingEnvVar(name).into());
        }

        let mut path_vars = req.path_params.clone();
        let missing: Vec<String> = template
            .extract_path_vars()
            .into_iter()
            .filter(|name| !path_vars.contains_key(name))
            .collect();
        if !missing.is_empty() && self.input_is_tty && !req.no_interactive {
            let answers = prompt::prompt_for_variables(&missing, &mut self.input, &mut io::stderr())?;
            path_vars.extend(answers);
        }
        template.set_path_vars(path_vars);
        template.set_env_vars(env);
        let url = template.resolve()?;

        let mut request = Request::new(req.method, url);
        request.headers = headers;
        request.query_params = req.query_params.clone();
        request.body = body;
        request.timeout = self.global.timeout();
        if let Some(name) = &req.auth {
            let preset = self.auth.get(name).context("authentication failed")?;
            request.auth = Some(preset.clone());
        }

        Ok(request)
    }

    /// `--env` if given, else the configured default environment.
    fn selected_env(&self, explicit: Option<&str>) -> Result<HashMap<String, String>> {
        if let Some(name) = explicit {
            return Ok(self.workspace.env_vars(Some(name))?);
        }
        let vars = match self.global.default_environment() {
            Some(name) if self.workspace.has_environment(name) => {
                self.workspace.env_vars(Some(name))?
            }
            Some(name) => {
                tracing::warn!(environment = name, "Default environment is not defined in the workspace");
                self.workspace.env_vars(None)?
            }
            None => self.workspace.env_vars(None)?,
        };
        Ok(vars)
    }

    /// Persist the request as typed, placeholders intact.
    fn save_call<W: Write>(&self, req: &ParsedRequest, name: &str, out: &mut W) -> Result<()> {
        let call = SavedCall::new(
            name,
            req.method,
            req.url.clone(),
            req.headers.clone(),
            req.query_params.clone(),
            req.body.clone().unwrap_or_default(),
        );
        self.storage.save(&call)?;
        writeln!(out, "Saved call: {name}")?;
        Ok(())
    }
}
