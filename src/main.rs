// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! PixPro command-line shell.
//!
//! Drives the same page flows as the web client against a PixPro API, and
//! can run the mock API locally.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pixpro::{
    config::{Config, ServerConfig},
    navigation::HistoryNavigator,
    notify::LogNotifier,
    pages::{DashboardPage, GalleryView, LoginPage, RegisterPage},
    session::FileStorage,
    AppContext,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pixpro", version, about = "PixPro command-line client")]
struct Cli {
    /// Emit structured JSON logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Clear the local session and notify the backend
    Logout,

    /// Validate the stored session against the backend
    Whoami,

    /// List one page of the public gallery
    Gallery {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Run the mock PixPro API
    MockApi {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Command::MockApi { port } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            tracing::info!(port = config.port, "Starting PixPro mock API");
            pixpro::mock::serve(config).await
        }
        command => run_client(command).await,
    }
}

async fn run_client(command: Command) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let storage = Arc::new(FileStorage::new(config.session_file.clone()));
    let ctx = AppContext::new(
        config,
        storage,
        Arc::new(LogNotifier),
        Arc::new(HistoryNavigator::default()),
    )
    .context("Failed to initialize API client")?;

    match command {
        Command::Login { email, password } => {
            let mut page = LoginPage::new();
            page.form.handle_change("email", &email);
            page.form.handle_change("password", &password);

            if page.submit(&ctx).await.is_none() {
                fail_form(page.form.errors(), page.error.as_deref())?;
            }
            if let Some(greeting) = DashboardPage::greeting(&ctx) {
                println!("{}", greeting);
            }
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let mut page = RegisterPage::new();
            page.form.handle_change("name", &name);
            page.form.handle_change("email", &email);
            page.form.handle_change("password", &password);

            if page.submit(&ctx).await.is_none() {
                for (rule, met) in page.password_checklist() {
                    println!("  [{}] {}", if met { "x" } else { " " }, rule.label());
                }
                fail_form(page.form.errors(), page.error.as_deref())?;
            }
            println!("Account created for {}. You can now log in.", email);
        }
        Command::Logout => {
            DashboardPage::logout(&ctx).await;
            println!("Logged out");
        }
        Command::Whoami => {
            if !ctx.session.is_authenticated() {
                bail!("Not logged in");
            }
            let user = ctx.session.validate().await?;
            println!("{} <{}>", user.greeting_name(), user.email);
        }
        Command::Gallery { page } => {
            let mut view = GalleryView::new();
            let loaded = if page > 1 {
                // The page count is only known after the first load.
                view.load(&ctx).await && view.go_to(&ctx, page).await
            } else {
                view.load(&ctx).await
            };

            if let Some(error) = view.error() {
                bail!("{}", error);
            }
            if !loaded {
                bail!("Page {} is out of range (1-{})", page, view.total_pages());
            }

            println!(
                "Page {} of {} ({} images)",
                view.current_page(),
                view.total_pages(),
                view.total()
            );
            for image in view.images() {
                println!("  {}  {}  {}", image.id, image.file_name, image.size_mb());
            }
        }
        Command::MockApi { .. } => bail!("mock-api does not run against a client session"),
    }

    Ok(())
}

fn fail_form(errors: &BTreeMap<String, String>, error: Option<&str>) -> anyhow::Result<()> {
    for (field, message) in errors {
        eprintln!("{}: {}", field, message);
    }
    match error {
        Some(error) => bail!("{}", error),
        None => bail!("Please fix the errors above"),
    }
}

/// Initialize logging: human-readable by default, JSON on request.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pixpro=debug,info"));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
