mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::Level;
use userhub_lib::{
    profile::DEFAULT_USER_ID, ClientConfig, HttpClient, ProfileController, ProfileField,
    SettingKey,
};

#[derive(Parser)]
#[command(name = "userhub")]
#[command(about = "View and edit a user profile", long_about = None)]
struct Cli {
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    #[arg(long, value_name = "SECONDS")]
    timeout_secs: Option<u64>,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Load and show a user profile")]
    Show {
        #[arg(short, long, value_name = "ID")]
        user: Option<u64>,
    },
    #[command(about = "Edit a user profile and save it")]
    Edit {
        #[arg(short, long, value_name = "ID")]
        user: Option<u64>,

        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(ProfileField, String)>,

        #[arg(long = "toggle", value_name = "SETTING", value_parser = parse_setting)]
        toggles: Vec<SettingKey>,

        #[arg(long, help = "Apply the edits, show them, then cancel instead of saving")]
        dry_run: bool,
    },
    #[command(about = "Edit a user profile with prompts")]
    Interactive {
        #[arg(short, long, value_name = "ID")]
        user: Option<u64>,
    },
}

fn parse_assignment(raw: &str) -> Result<(ProfileField, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{}`", raw))?;
    let field = field.parse::<ProfileField>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

fn parse_setting(raw: &str) -> Result<SettingKey, String> {
    raw.parse::<SettingKey>().map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let collector = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(collector)
        .context("There was a problem setting up tracing")?;

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }

    let rt = Runtime::new()?;

    match cli.command {
        Commands::Show { user } => {
            let controller = userhub_lib::connect(config, user.unwrap_or(DEFAULT_USER_ID))?;
            load_or_interrupt(&rt, &controller)?;
            println!("{}", render::render(&controller.snapshot()));
        }
        Commands::Edit {
            user,
            assignments,
            toggles,
            dry_run,
        } => {
            let controller = userhub_lib::connect(config, user.unwrap_or(DEFAULT_USER_ID))?;
            load_or_interrupt(&rt, &controller)?;
            if let Some(reason) = controller.snapshot().error() {
                anyhow::bail!("Failed to load user data: {}", reason);
            }

            controller.begin_edit()?;
            for (field, value) in assignments {
                controller.update_field(field, value)?;
            }
            for key in toggles {
                controller.toggle_setting(key)?;
            }

            if dry_run {
                println!("{}", render::render(&controller.snapshot()));
                controller.cancel_edit()?;
                println!("Dry run, nothing was saved.");
            } else {
                // The error is already on the snapshot as a notice.
                let saved = rt.block_on(controller.commit_edit());
                println!("{}", render::render(&controller.snapshot()));
                saved?;
            }
        }
        Commands::Interactive { user } => {
            let controller = userhub_lib::connect(config, user.unwrap_or(DEFAULT_USER_ID))?;
            load_or_interrupt(&rt, &controller)?;
            run_prompts(&rt, &controller)?;
        }
    }

    Ok(())
}

/// Loads, or tears the controller down if Ctrl+C arrives first.
fn load_or_interrupt(
    rt: &Runtime,
    controller: &ProfileController<HttpClient>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        tokio::select! {
            _ = controller.load() => {}
            _ = tokio::signal::ctrl_c() => controller.teardown(),
        }
    });
    if controller.is_torn_down() {
        anyhow::bail!("Interrupted while loading user data");
    }
    Ok(())
}

const ACTIONS: [&str; 7] = [
    "Edit profile",
    "Change field",
    "Toggle setting",
    "Save",
    "Cancel",
    "Reload",
    "Quit",
];

fn run_prompts(rt: &Runtime, controller: &ProfileController<HttpClient>) -> anyhow::Result<()> {
    loop {
        println!("{}", render::render(&controller.snapshot()));
        controller.dismiss_notice();

        let choice = Select::new()
            .with_prompt("What next?")
            .items(&ACTIONS)
            .default(0)
            .interact()?;

        let outcome = match ACTIONS[choice] {
            "Edit profile" => controller.begin_edit(),
            "Change field" => {
                let fields: Vec<&str> = ProfileField::ALL.iter().map(|f| f.label()).collect();
                let picked = Select::new()
                    .with_prompt("Field")
                    .items(&fields)
                    .default(0)
                    .interact()?;
                let field = ProfileField::ALL[picked];
                let current = controller
                    .snapshot()
                    .displayed()
                    .map(|(profile, _)| profile.field(field).to_string())
                    .unwrap_or_default();
                let value: String = Input::new()
                    .with_prompt(field.label())
                    .with_initial_text(current)
                    .interact_text()?;
                controller.update_field(field, value)
            }
            "Toggle setting" => {
                let keys: Vec<&str> = SettingKey::ALL.iter().map(|k| k.label()).collect();
                let picked = Select::new()
                    .with_prompt("Setting")
                    .items(&keys)
                    .default(0)
                    .interact()?;
                controller.toggle_setting(SettingKey::ALL[picked])
            }
            "Save" => rt.block_on(controller.commit_edit()),
            "Cancel" => controller.cancel_edit(),
            "Reload" => {
                load_or_interrupt(rt, controller)?;
                Ok(())
            }
            _ => break,
        };

        if let Err(e) = outcome {
            tracing::warn!(error = %e, "Action failed");
        }
    }

    controller.teardown();
    Ok(())
}
