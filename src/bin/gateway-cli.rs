use std::path::PathBuf;

use axum::http::Method;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE, LOCATION, SET_COOKIE};
use serde_json::{json, Value};

use edge_gateway::config::load_config;
use edge_gateway::routing::RouteTable;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Inspection CLI for the edge gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a path against a config file's route table (offline)
    Classify {
        #[arg(short, long, default_value = "gateway.toml")]
        config: PathBuf,

        /// Request method; omit to use method-agnostic rules only
        #[arg(short, long)]
        method: Option<String>,

        path: String,
    },
    /// Send a request through a running gateway and report its decision
    Check {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        /// Session credential to present
        #[arg(short, long)]
        token: Option<String>,

        /// Present the credential as a bearer token instead of a cookie
        #[arg(long)]
        bearer: bool,

        #[arg(long, default_value = "auth_token")]
        cookie_name: String,

        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { config, method, path } => {
            let config = load_config(&config)?;
            let table = RouteTable::from_config(&config.routes)?;
            let tier = match method {
                Some(method) => {
                    let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
                    table.classify_request(&method, &path)
                }
                None => table.classify(&path),
            };
            print_json(&json!({ "path": path, "tier": tier }))?;
        }
        Commands::Check {
            url,
            token,
            bearer,
            cookie_name,
            path,
        } => {
            let client = reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?;

            let mut headers = HeaderMap::new();
            if let Some(token) = token {
                if bearer {
                    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
                } else {
                    headers.insert(COOKIE, HeaderValue::from_str(&format!("{}={}", cookie_name, token))?);
                }
            }

            let res = client
                .get(format!("{}{}", url.trim_end_matches('/'), path))
                .headers(headers)
                .send()
                .await?;
            print_json(&describe(&res))?;
        }
    }

    Ok(())
}

fn describe(res: &reqwest::Response) -> Value {
    let header = |name: &str| {
        res.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    json!({
        "status": res.status().as_u16(),
        "location": header(LOCATION.as_str()),
        "upgrade": header("x-auth-upgrade"),
        "bootstrap": header("x-auth-bootstrap"),
        "set_cookie": header(SET_COOKIE.as_str()),
        "request_id": header("x-request-id"),
    })
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
