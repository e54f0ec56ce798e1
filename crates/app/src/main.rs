use anyhow::Context;
use barbearia_app::hooks::{AppointmentHooks, CaixaHooks};
use barbearia_app::{AppContext, ViewScope};
use barbearia_client::ClientConfig;
use barbearia_core::appointment::AppointmentStatus;
use barbearia_core::auth::Credentials;
use barbearia_events::Level;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Barbershop management from the terminal.
#[derive(Parser)]
#[command(name = "barbearia", version)]
struct Cli {
    /// Overrides `API_BASE_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Overrides `SESSION_FILE`.
    #[arg(long, global = true)]
    session_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long, env = "BARBEARIA_EMAIL")]
        email: String,
        #[arg(long, env = "BARBEARIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and clear the stored session.
    Logout,
    /// List the units of the signed-in tenant.
    Units,
    /// Select the active unit.
    UseUnit { unit_id: Uuid },
    /// Appointments of a day (default: today).
    Agenda {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Status changes available for an appointment.
    Actions { appointment_id: Uuid },
    /// Change the status of an appointment.
    Status {
        appointment_id: Uuid,
        status: AppointmentStatus,
        #[arg(long)]
        reason: Option<String>,
        /// Send the change even if it is not allowed from the current status.
        #[arg(long)]
        force: bool,
    },
    /// Show the cash-register session of the active unit.
    Caixa,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barbearia=info,barbearia_app=info,barbearia_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }
    tracing::debug!(api_base_url = %config.api_base_url, "Loaded client configuration");

    let ctx = AppContext::load(config).await?;
    let mut notifications = ctx.notifications.subscribe();

    let view = ViewScope::new();
    view.cancel_on(async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    });
    let outcome = match view.run(run(&ctx, cli.command)).await {
        Some(outcome) => outcome,
        None => {
            eprintln!("Interrupted");
            Ok(())
        }
    };

    loop {
        match notifications.try_recv() {
            Ok(n) => {
                let marker = match n.level {
                    Level::Success => "ok",
                    Level::Info => "info",
                    Level::Warning => "warn",
                    Level::Error => "error",
                };
                eprintln!("[{marker}] {}: {}", n.title, n.message);
            }
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    outcome
}

async fn run(ctx: &AppContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            ctx.login(&Credentials { email, password }).await?;
            let session = ctx.session.snapshot().await;
            if let Some(auth) = session.auth {
                println!("Signed in as {} ({})", auth.user.name, auth.tenant_name);
            }
        }
        Command::Logout => {
            ctx.logout().await?;
            println!("Signed out");
        }
        Command::Units => {
            let active = ctx.session.snapshot().await.unit.map(|u| u.unit_id);
            for unit in ctx.units().await? {
                let marker = if Some(unit.id) == active { "*" } else { " " };
                println!("{marker} {}  {}", unit.id, unit.name);
            }
        }
        Command::UseUnit { unit_id } => {
            let unit = ctx.select_unit_by_id(unit_id).await?;
            println!("Active unit: {}", unit.name);
        }
        Command::Agenda { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let hooks = AppointmentHooks::new(ctx.clone());
            let page = hooks.day(date).await?;
            if page.data.is_empty() {
                println!("No appointments on {date}");
            }
            for a in page.data {
                println!(
                    "{}  {}-{}  {:<18} {:<16} {}",
                    a.id,
                    a.start_time.format("%H:%M"),
                    a.end_time.format("%H:%M"),
                    a.status.label(),
                    a.professional_name,
                    a.customer_name,
                );
            }
        }
        Command::Actions { appointment_id } => {
            let hooks = AppointmentHooks::new(ctx.clone());
            let appointment = hooks.get(appointment_id).await?;
            let actions = AppointmentHooks::actions(&appointment);
            println!("{} ({})", appointment.status.label(), appointment.status);
            if actions.is_empty() {
                println!("  no actions available");
            }
            for action in actions {
                println!("  {:<18} -> {}", action.label, action.target);
            }
        }
        Command::Status {
            appointment_id,
            status,
            reason,
            force,
        } => {
            let hooks = AppointmentHooks::new(ctx.clone());
            let updated = if force {
                hooks.force_status_change(appointment_id, status, reason).await?
            } else {
                let appointment = hooks.get(appointment_id).await?;
                hooks.change_status(&appointment, status, reason).await?
            };
            println!("{} is now {}", updated.id, updated.status.label());
        }
        Command::Caixa => {
            let hooks = CaixaHooks::new(ctx.clone());
            match hooks.current().await.context("loading cash session")? {
                Some(session) => {
                    println!("Open since {}", session.opened_at.format("%d/%m/%Y %H:%M"));
                    println!("Opening balance: {}", format_cents(session.opening_balance_cents));
                    println!("Expected balance: {}", format_cents(session.expected_balance()));
                    println!("Movements: {}", session.movements.len());
                }
                None => println!("Cash register is closed"),
            }
        }
    }
    Ok(())
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{sign}R$ {},{:02}", cents / 100, cents % 100)
}
