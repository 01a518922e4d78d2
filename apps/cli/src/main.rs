use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    evaluate, AuthController, AuthOutcome, HttpApiGateway, MemoryTokenPersistence,
    OperationOutcome, Route, RouteDecision, SessionStore, TokenPersistence, WorkoutApi,
    WorkoutListController,
};
use shared::{
    domain::{WorkoutEntry, WorkoutId, WorkoutStatus},
    protocol::Credentials,
};
use storage::Storage;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url, validate_api_base_url};

#[derive(Parser, Debug)]
#[command(name = "workout-cli", about = "Manage your personal workout list")]
struct Cli {
    /// Overrides the configured API base url.
    #[arg(long)]
    api_url: Option<String>,
    /// Overrides where the session token is persisted.
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        email: String,
        password: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    List,
    Add {
        name: String,
        duration: String,
        #[arg(long, default_value = "Planned")]
        status: WorkoutStatus,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        duration: Option<String>,
    },
    Complete {
        id: String,
    },
    Delete {
        id: String,
        /// Confirms the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Shows where navigating to `path` would land.
    Route {
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }
    validate_api_base_url(&settings.api_base_url)?;

    let session = SessionStore::new(open_token_persistence(&settings.database_url).await);
    session.restore().await;

    let api: Arc<dyn WorkoutApi> = Arc::new(HttpApiGateway::with_timeout(
        &settings.api_base_url,
        session.clone(),
        Duration::from_secs(settings.request_timeout_secs),
    )?);
    let auth = AuthController::new(api.clone(), session.clone());

    match cli.command {
        Command::Register { email, password } => {
            report_auth(auth.register(&Credentials::new(email, password)).await);
        }
        Command::Login { email, password } => {
            report_auth(auth.login(&Credentials::new(email, password)).await);
        }
        Command::Logout => report_auth(auth.logout().await),
        Command::Route { path } => match evaluate(&session, &path).await {
            RouteDecision::Allow(route) => println!("allow {route}"),
            RouteDecision::RedirectTo(route) => println!("redirect to {route}"),
        },
        command => run_list_command(api, session, command).await,
    }

    Ok(())
}

/// Falls back to process-local persistence when the database cannot be
/// opened; the session then simply starts unauthenticated.
async fn open_token_persistence(database_url: &str) -> Arc<dyn TokenPersistence> {
    let database_url = prepare_database_url(database_url);
    match Storage::new(&database_url).await {
        Ok(storage) => Arc::new(storage),
        Err(err) => {
            tracing::warn!("session persistence unavailable: {err:#}");
            Arc::new(MemoryTokenPersistence::default())
        }
    }
}

async fn run_list_command(api: Arc<dyn WorkoutApi>, session: Arc<SessionStore>, command: Command) {
    if let RouteDecision::RedirectTo(route) = evaluate(&session, Route::Workouts.path()).await {
        println!("Not logged in; redirecting to {route}. Run `workout-cli login` first.");
        return;
    }

    let controller = WorkoutListController::new(api, session);
    controller.sync_with_session().await;

    let outcome = match command {
        Command::List => None,
        Command::Add {
            name,
            duration,
            status,
        } => {
            controller
                .edit_draft(|draft| {
                    draft.name = name;
                    draft.duration = duration;
                    draft.status = status;
                })
                .await;
            Some(controller.add().await)
        }
        Command::Update { id, name, duration } => {
            let mut draft = controller.request_update(WorkoutId::new(id));
            draft.name = name;
            draft.duration = duration;
            Some(controller.commit_update(draft).await)
        }
        Command::Complete { id } => Some(controller.complete(&WorkoutId::new(id)).await),
        Command::Delete { id, yes } => {
            let mut confirmation = controller.request_delete(WorkoutId::new(id));
            if yes {
                confirmation = confirmation.confirm();
            }
            Some(controller.commit_delete(confirmation).await)
        }
        Command::Register { .. }
        | Command::Login { .. }
        | Command::Logout
        | Command::Route { .. } => None,
    };

    if outcome == Some(OperationOutcome::Aborted) {
        println!("Nothing sent: the request was incomplete, unconfirmed or not applicable.");
    }
    if let Some(message) = controller.status_message().await {
        println!("{message}");
    }
    print_workouts(&controller.workouts().await);
}

fn report_auth(outcome: AuthOutcome) {
    if outcome.status == OperationOutcome::Aborted {
        println!("Email and password are required.");
    }
    if let Some(message) = outcome.message {
        println!("{message}");
    }
    if let Some(route) = outcome.navigate_to {
        println!("-> {route}");
    }
}

fn print_workouts(workouts: &[WorkoutEntry]) {
    if workouts.is_empty() {
        println!("No workouts yet. Add one with `workout-cli add <name> <minutes>`.");
        return;
    }
    for workout in workouts {
        println!(
            "{:<26} {:<10} {:>4} min  {}",
            workout.id.as_str(),
            workout.status.as_str(),
            workout.duration,
            workout.name
        );
    }
}
