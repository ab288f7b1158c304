use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use reqwest::Method;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use publer::client::{
    ListMediaParams, MediaUpload, PublerClient, Query, QueryValue, RequestOptions,
    DEFAULT_BASE_URL,
};
use publer::config::Config;

#[derive(Parser, Debug)]
#[command(name = "publer", version)]
#[command(about = "A CLI client for the Publer API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Publer API key (overrides the key stored with `auth login`)
    #[arg(long, global = true, env = "PUBLER_API_KEY", hide_env_values = true)]
    pub token: Option<String>,

    /// Workspace id sent as Publer-Workspace-Id (overrides config)
    #[arg(long, global = true, env = "PUBLER_WORKSPACE_ID")]
    pub workspace: Option<String>,

    /// API base URL (overrides config)
    #[arg(long, global = true, env = "PUBLER_BASE_URL")]
    pub base_url: Option<String>,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the authenticated user
    Me,

    /// List workspaces available to the API key
    Workspaces,

    /// List social accounts in the workspace
    Accounts,

    /// Schedule posts from a JSON request body
    Schedule {
        #[command(flatten)]
        body: BodyArgs,
    },

    /// Show the status of an asynchronous job
    JobStatus {
        /// Job id returned by `schedule`
        job_id: String,
    },

    /// List posts
    Posts {
        /// Query parameter as key=value (repeatable, `key[]=v` builds a list)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Upload a file to the media library
    UploadMedia {
        /// File to upload
        file: PathBuf,

        /// Keep the upload in the media library
        #[arg(long)]
        in_library: Option<bool>,

        /// Upload straight to storage instead of processing first
        #[arg(long)]
        direct_upload: Option<bool>,
    },

    /// List media library items
    Media {
        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Media type filter (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,

        /// Media id filter (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Search term
        #[arg(long)]
        search: Option<String>,
    },

    /// Send an arbitrary request to the API
    Request {
        /// HTTP method, e.g. GET or DELETE
        method: String,

        /// Path relative to the base URL, e.g. /posts
        path: String,

        /// Query parameter as key=value (repeatable, `key[]=v` builds a list)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        #[command(flatten)]
        body: OptionalBodyArgs,
    },

    /// Authentication commands
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct BodyArgs {
    /// Read the JSON body from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// JSON body given inline
    #[arg(long)]
    pub json: Option<String>,
}

#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
pub struct OptionalBodyArgs {
    /// Read the JSON body from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// JSON body given inline
    #[arg(long)]
    pub json: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store an API key in the system keyring
    Login {
        /// API key
        #[arg(short, long)]
        api_key: String,
    },
    /// Remove the stored API key
    Logout,
    /// Show authentication status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.url, workspace.id)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        let payload = match &self.command {
            Commands::Me => {
                let client = self.client(&config)?;
                client.me().await.context("Failed to fetch profile")?
            }
            Commands::Workspaces => {
                let client = self.client(&config)?;
                client
                    .list_workspaces()
                    .await
                    .context("Failed to list workspaces")?
            }
            Commands::Accounts => {
                let client = self.client(&config)?;
                client
                    .list_accounts()
                    .await
                    .context("Failed to list accounts")?
            }
            Commands::Schedule { body } => {
                let body = read_body(body.file.as_deref(), body.json.as_deref())?
                    .context("A JSON body is required")?;
                let client = self.client(&config)?;
                client
                    .schedule_post(body)
                    .await
                    .context("Failed to schedule post")?
            }
            Commands::JobStatus { job_id } => {
                let client = self.client(&config)?;
                client
                    .job_status(job_id)
                    .await
                    .context("Failed to fetch job status")?
            }
            Commands::Posts { params } => {
                let client = self.client(&config)?;
                let query = (!params.is_empty()).then(|| params_to_query(params));
                client
                    .list_posts(query)
                    .await
                    .context("Failed to list posts")?
            }
            Commands::UploadMedia {
                file,
                in_library,
                direct_upload,
            } => {
                let client = self.client(&config)?;
                let upload = MediaUpload::from_path(file)
                    .await?
                    .in_library(*in_library)
                    .direct_upload(*direct_upload);
                client
                    .upload_media(upload)
                    .await
                    .context("Failed to upload media")?
            }
            Commands::Media {
                page,
                types,
                ids,
                search,
            } => {
                let client = self.client(&config)?;
                let params = ListMediaParams {
                    page: *page,
                    types: types.clone(),
                    ids: ids.clone(),
                    search: search.clone(),
                };
                client
                    .list_media(&params)
                    .await
                    .context("Failed to list media")?
            }
            Commands::Request {
                method,
                path,
                params,
                body,
            } => {
                let method = Method::from_bytes(method.as_bytes())
                    .with_context(|| format!("Invalid HTTP method '{}'", method))?;
                let mut options = RequestOptions::new();
                if !params.is_empty() {
                    options = options.query(params_to_query(params));
                }
                if let Some(body) = read_body(body.file.as_deref(), body.json.as_deref())? {
                    options = options.json(body);
                }
                let client = self.client(&config)?;
                client
                    .request(method, path, options)
                    .await
                    .with_context(|| format!("Request to {} failed", path))?
            }
            Commands::Auth(cmd) => {
                run_auth(cmd, &config)?;
                return Ok(());
            }
            Commands::Config(cmd) => {
                run_config(cmd, &config)?;
                return Ok(());
            }
        };

        print_payload(&payload, self.compact)
    }

    fn client(&self, config: &Config) -> Result<PublerClient> {
        let token = match non_empty(&self.token) {
            Some(token) => token,
            None => non_empty(&config.get_api_key()?).context(MISSING_API_KEY)?,
        };

        let client = PublerClient::with_base_url(token, &self.resolved_base_url(config))
            .context("Failed to create HTTP client")?;
        Ok(client.with_workspace(self.resolved_workspace(config)))
    }

    fn resolved_base_url(&self, config: &Config) -> String {
        non_empty(&self.base_url)
            .or_else(|| non_empty(&config.api_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    fn resolved_workspace(&self, config: &Config) -> Option<String> {
        non_empty(&self.workspace).or_else(|| non_empty(&config.workspace_id))
    }
}

const MISSING_API_KEY: &str = "Missing API key: pass --token, set PUBLER_API_KEY, \
     or run 'publer auth login --api-key <key>'";

/// Empty strings (e.g. `PUBLER_WORKSPACE_ID=` in a `.env` file) count as unset.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|value| !value.is_empty())
}

fn run_auth(cmd: &AuthCommands, config: &Config) -> Result<()> {
    match cmd {
        AuthCommands::Login { api_key } => {
            config.set_api_key(api_key)?;
            println!("{} API key saved successfully", "✓".green());
        }
        AuthCommands::Logout => {
            config.remove_api_key()?;
            println!("{} API key removed", "✓".green());
        }
        AuthCommands::Status => match config.get_api_key()? {
            Some(key) => {
                println!("{} Authenticated", "✓".green());
                println!("  API key: {}", mask_key(&key));
            }
            None => {
                println!("{} Not authenticated", "✗".red());
                println!("  Run 'publer auth login --api-key <key>' to authenticate");
            }
        },
    }
    Ok(())
}

fn run_config(cmd: &ConfigCommands, config: &Config) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => {
            config.set(key, value)?;
            println!("{} Configuration updated: {} = {}", "✓".green(), key, value);
        }
        ConfigCommands::Get { key } => match config.get(key)? {
            Some(val) => println!("{}", val),
            None => println!("Configuration key '{}' not found", key),
        },
    }
    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// `key[]=v` pairs collect into one list entry at the position of the first
/// occurrence; anything else is a scalar.
fn params_to_query(params: &[(String, String)]) -> Query {
    let mut entries: Vec<(String, QueryValue)> = Vec::new();
    for (key, value) in params {
        match key.strip_suffix("[]") {
            Some(name) => {
                let existing = entries.iter_mut().find_map(|(k, v)| match v {
                    QueryValue::List(items) if k.as_str() == name => Some(items),
                    _ => None,
                });
                match existing {
                    Some(items) => items.push(value.clone()),
                    None => {
                        entries.push((name.to_string(), QueryValue::List(vec![value.clone()])))
                    }
                }
            }
            None => entries.push((key.clone(), QueryValue::Text(value.clone()))),
        }
    }

    let mut query = Query::new();
    for (key, value) in entries {
        query.push(key, Some(value));
    }
    query
}

fn read_body(file: Option<&Path>, json: Option<&str>) -> Result<Option<Value>> {
    let (text, source) = match (file, json) {
        (Some(path), _) => (
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            path.display().to_string(),
        ),
        (None, Some(json)) => (json.to_string(), "--json".to_string()),
        (None, None) => return Ok(None),
    };
    let body = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", source))?;
    Ok(Some(body))
}

fn print_payload(payload: &Value, compact: bool) -> Result<()> {
    match payload {
        Value::String(text) => println!("{}", text),
        Value::Null => {}
        _ if compact => println!("{}", payload),
        _ => println!(
            "{}",
            serde_json::to_string_pretty(payload).context("Failed to format response")?
        ),
    }
    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
