//! Lineup CLI
//!
//! Build, check and save round lineups against a JSON store file.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lineup_core::{
    AthleteId, EngineConfig, Formation, JsonFileStore, LineupStore, Role, SquadSession,
    ToggleOutcome,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lineup")]
#[command(about = "Build and save fantasy lineups within budget and formation", long_about = None)]
struct Cli {
    /// Engine config JSON (overrides LINEUP_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the formation catalog
    Formations,

    /// Replay picks through the constraint checks without saving
    Check {
        #[command(flatten)]
        squad: SquadArgs,
    },

    /// Build the squad and save it for the open round
    Save {
        #[command(flatten)]
        squad: SquadArgs,

        /// Captain id (defaults to the first pick)
        #[arg(long)]
        captain: Option<AthleteId>,
    },

    /// Print a saved lineup
    Show {
        /// Store JSON file
        #[arg(long)]
        store: PathBuf,

        #[arg(long)]
        team: String,

        #[arg(long)]
        round: u32,
    },
}

#[derive(clap::Args)]
struct SquadArgs {
    /// Store JSON file
    #[arg(long)]
    store: PathBuf,

    /// Owner of the team
    #[arg(long)]
    user: String,

    /// Formation code, e.g. 4-3-3
    #[arg(long)]
    formation: Option<Formation>,

    /// Athlete ids in pick order (repeatable or comma separated)
    #[arg(long = "pick", value_delimiter = ',', required = true)]
    picks: Vec<AthleteId>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(&path.to_string_lossy())?,
        None => EngineConfig::from_env()?,
    };

    match cli.command {
        Commands::Formations => print_formations(),
        Commands::Check { squad } => {
            let (session, _) = build_squad(&config, &squad).await?;
            print_snapshot(&session);
        }
        Commands::Save { squad, captain } => {
            let (mut session, store) = build_squad(&config, &squad).await?;
            if let Some(captain) = captain {
                session.set_captain(captain)?;
            }
            print_snapshot(&session);

            let receipt = session.save(&store).await.map_err(|e| match e {
                lineup_core::SessionError::Commit(commit) => {
                    anyhow::anyhow!(commit.user_message())
                }
                other => other.into(),
            })?;
            println!("✅ Lineup saved");
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Commands::Show { store, team, round } => {
            let store = open_store(&store)?;
            let Some(lineup) = store.get_lineup(&team, round).await? else {
                bail!("no lineup saved for team {} in round {}", team, round);
            };
            let members = store.list_members(&lineup.id).await?;
            println!("{}", serde_json::to_string_pretty(&lineup)?);
            let ids: Vec<_> = members.iter().map(|m| m.athlete_id.to_string()).collect();
            println!("members: {}", ids.join(", "));
        }
    }

    Ok(())
}

fn open_store(path: &Path) -> Result<JsonFileStore> {
    JsonFileStore::open(path).with_context(|| format!("opening store {}", path.display()))
}

async fn build_squad(
    config: &EngineConfig,
    args: &SquadArgs,
) -> Result<(SquadSession, JsonFileStore)> {
    let store = open_store(&args.store)?;
    let mut session = SquadSession::new(config.clone());
    session.load(&store, &args.user).await?;

    if let Some(formation) = args.formation {
        session.set_formation(formation);
    }

    println!(
        "🔨 Building squad for {} ({} candidates, budget {})",
        session.team().map(|t| t.name.as_str()).unwrap_or("-"),
        session.pool().len(),
        session.state().budget()
    );

    for &id in &args.picks {
        match session.toggle(id) {
            ToggleOutcome::Added(_) => {
                let name = session
                    .pool()
                    .get(id)
                    .map(|c| {
                        format!(
                            "{} [{}] {}",
                            c.athlete.display_name(),
                            c.role.code(),
                            c.athlete.price_label()
                        )
                    })
                    .unwrap_or_default();
                println!("   + {:>6}  {}", id, name);
            }
            ToggleOutcome::Removed { captain_cleared, .. } => {
                let note = if captain_cleared { " (captain cleared)" } else { "" };
                println!("   - {:>6}{}", id, note);
            }
            ToggleOutcome::Rejected { reason, .. } => {
                println!("   ✗ {:>6}  {}", id, reason);
            }
        }
    }

    Ok((session, store))
}

fn print_formations() {
    println!("Formation  GK  DEF  MID  FWD");
    for formation in Formation::ALL {
        let limits = formation.limits();
        let marker = if formation == Formation::DEFAULT { " (default)" } else { "" };
        println!(
            "{:<9}  {:>2}  {:>3}  {:>3}  {:>3}{}",
            formation.code(),
            limits.slots_for(Role::Goalkeeper),
            limits.defenders,
            limits.midfielders,
            limits.forwards,
            marker
        );
    }
}

fn print_snapshot(session: &SquadSession) {
    let snap = session.snapshot();
    println!();
    println!("   Formation: {}", snap.formation);
    for role in Role::SELECTABLE {
        println!(
            "   {:<4} {}/{}",
            role.code(),
            snap.counts.get(role),
            snap.formation.limits().slots_for(role)
        );
    }
    println!("   Spent:     {}", snap.spent);
    println!("   Remaining: {}", snap.remaining);
    println!(
        "   Captain:   {}",
        session.state().effective_captain().map(|id| id.to_string()).unwrap_or_else(|| "-".into())
    );
    println!("   Complete:  {}", if snap.is_complete() { "yes" } else { "no" });
}
