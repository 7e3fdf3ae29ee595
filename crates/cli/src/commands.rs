//! CLI commands

use anyhow::{Context as _, Result, anyhow, bail};
use clap::Subcommand;
use lavacar_core::{ClientConfig, PageItem, Pagination};
use lavacar_http::types::LoginRequest;
use lavacar_http::{
    ApiClient, ApiClientBuilder, ApiRequest, FileCredentialStore, Method, Resource,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Account e-mail
        #[arg(long, env = "LAVACAR_EMAIL")]
        email: String,

        /// Account password
        #[arg(long, env = "LAVACAR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Send an arbitrary request and print the JSON response
    Request {
        /// HTTP method, e.g. GET or POST
        method: String,

        /// Path relative to the API URL, e.g. /users/42
        path: String,

        /// JSON body
        #[arg(long)]
        data: Option<String>,

        /// Query parameter as key=value, repeatable
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// List one page of a collection
    List {
        /// Collection, e.g. clients, vehicles or plans
        resource: Resource,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Print the pager window for a position
    Pages {
        current: u32,
        total: u32,
    },
}

impl Commands {
    pub async fn execute(
        self,
        config_path: Option<PathBuf>,
        credentials_path: Option<PathBuf>,
    ) -> Result<()> {
        if let Commands::Pages { current, total } = self {
            println!("{}", render_pager(&Pagination::new(current, total)));
            return Ok(());
        }

        let client = build_client(config_path, credentials_path)?;

        match self {
            Commands::Login { email, password } => login(&client, email, password).await,
            Commands::Logout => {
                client.logout();
                println!("Sessão encerrada");
                Ok(())
            }
            Commands::Whoami => whoami(&client),
            Commands::Request {
                method,
                path,
                data,
                params,
            } => {
                let request = build_request(&method, &path, data.as_deref(), &params)?;
                let body: Option<Value> = send_cancellable(&client, request).await?;
                print_json(&body.unwrap_or(Value::Null))
            }
            Commands::List { resource, page } => list(&client, resource, page).await,
            Commands::Pages { .. } => Ok(()),
        }
    }
}

fn build_client(
    config_path: Option<PathBuf>,
    credentials_path: Option<PathBuf>,
) -> Result<ApiClient> {
    let config_path = config::config_path(config_path);
    let config = ClientConfig::load(config_path.as_deref()).context("failed to load configuration")?;

    let credentials_path = config::credentials_path(credentials_path);
    let store = FileCredentialStore::open(&credentials_path).with_context(|| {
        format!("failed to read credentials from {}", credentials_path.display())
    })?;

    info!(api_url = %config.api_url, "Using API");

    ApiClientBuilder::from_config(&config)
        .credentials(Arc::new(store))
        .session_listener(Arc::new(|| {
            warn!("Session expired, run `lavacar login` again");
        }))
        .build()
        .map_err(Into::into)
}

async fn login(client: &ApiClient, email: String, password: String) -> Result<()> {
    let response = client.login(&LoginRequest { email, password }).await?;
    match response.user {
        Some(user) => println!("Bem-vindo, {}", user.name),
        None => println!("Login realizado"),
    }
    Ok(())
}

fn whoami(client: &ApiClient) -> Result<()> {
    if !client.is_authenticated() {
        bail!("not signed in, run `lavacar login` first");
    }
    match client.current_user() {
        Some(user) => {
            let role = user.role.as_deref().unwrap_or("-");
            println!("{} <{}> ({role})", user.name, user.email);
        }
        None => println!("Sessão ativa, perfil indisponível"),
    }
    Ok(())
}

async fn list(client: &ApiClient, resource: Resource, page: u32) -> Result<()> {
    let page = client.resource(resource).list::<Value>(page).await?;
    print_json(&Value::Array(page.items.clone()))?;
    println!();
    println!("{}", render_pager(&page.pagination()));
    Ok(())
}

/// Issue `request`, aborting it on Ctrl-C
async fn send_cancellable(client: &ApiClient, request: ApiRequest) -> Result<Option<Value>> {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            guard.cancel();
        }
    });

    let result = client.request(request.cancel_on(cancel)).await;
    watcher.abort();
    Ok(result?)
}

fn build_request(method: &str, path: &str, data: Option<&str>, params: &[String]) -> Result<ApiRequest> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("invalid HTTP method '{method}'"))?;
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    let mut request = ApiRequest::new(method, path);
    for param in params {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| anyhow!("query parameter '{param}' is not KEY=VALUE"))?;
        request = request.param(key, value);
    }
    if let Some(data) = data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.data(body);
    }
    Ok(request)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line pager, e.g. `‹ 1 … 9 [10] 11 … 20 ›`. Arrows are dropped when
/// the control is disabled.
pub fn render_pager(pagination: &Pagination) -> String {
    let mut parts = Vec::new();
    if pagination.has_previous() {
        parts.push("‹".to_string());
    }
    for item in pagination.items() {
        parts.push(match item {
            PageItem::Page(n) if n == pagination.current_page() => format!("[{n}]"),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        });
    }
    if pagination.has_next() {
        parts.push("›".to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_middle_window() {
        assert_eq!(
            render_pager(&Pagination::new(10, 20)),
            "‹ 1 … 9 [10] 11 … 20 ›"
        );
    }

    #[test]
    fn renders_edges_without_disabled_arrows() {
        assert_eq!(render_pager(&Pagination::new(1, 20)), "[1] 2 3 4 … 20 ›");
        assert_eq!(render_pager(&Pagination::new(20, 20)), "‹ 1 … 17 18 19 [20]");
        assert_eq!(render_pager(&Pagination::new(1, 1)), "[1]");
    }

    #[test]
    fn request_from_arguments() {
        let params = vec!["page=2".to_string(), "search=ana".to_string()];
        let request = build_request("get", "users", None, &params).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "/users");
        assert_eq!(request.params["search"], Value::from("ana"));

        let request = build_request("POST", "/plans", Some(r#"{"name":"Ouro"}"#), &[]).unwrap();
        assert_eq!(request.data, Some(serde_json::json!({"name": "Ouro"})));
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert!(build_request("GET", "/users", None, &["page".to_string()]).is_err());
        assert!(build_request("POST", "/users", Some("{nope"), &[]).is_err());
        assert!(build_request("BAD METHOD", "/users", None, &[]).is_err());
    }
}
