//! Command dispatch

use std::io::{self, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{RefreshStatus, StructureService};
use crate::application::ApplicationError;
use crate::cli::args::{AddArgs, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::render_forest;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{DomainError, NodeDraft, NodeSource};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let command = match &cli.command {
        Some(command) => command,
        None => {
            return Err(CliError::Usage(
                "no command given, see --help".to_string(),
            ))
        }
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli)?;
    if let Commands::Config { command } = command {
        return config_command(command, &settings, cli);
    }

    let container = ServiceContainer::new(settings);
    let mut service = container.structure_service();
    match service.refresh() {
        Ok(RefreshStatus::Stale { reason }) => {
            output::warning(&format!("could not read structure: {reason}"));
        }
        Ok(status) => {
            debug!(?status, store = %container.settings.store_path.display(), "initial refresh");
        }
        // a cyclic store can still be repaired by deleting a cycle member
        Err(ApplicationError::Domain(e @ DomainError::CycleDetected(_)))
            if matches!(command, Commands::Delete { .. }) =>
        {
            output::warning(&e);
        }
        Err(e) => return Err(e.into()),
    }

    match command {
        Commands::Tree => cmd_tree(&service),
        Commands::Layout { compact } => cmd_layout(&service, *compact),
        Commands::Add(args) => cmd_add(&mut service, args),
        Commands::Delete { id } => cmd_delete(&mut service, id),
        Commands::Members => cmd_members(&service),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e))?,
    };
    let mut settings = Settings::load(Some(&project_dir))?;
    if let Some(store) = &cli.store {
        settings.store_path = store.clone();
    }
    Ok(settings)
}

#[instrument(skip(service))]
fn cmd_tree(service: &StructureService) -> CliResult<()> {
    let layout = service.layout();
    if layout.is_empty() {
        output::info("(empty structure)");
        return Ok(());
    }
    print!("{}", render_forest(&layout));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_layout(service: &StructureService, compact: bool) -> CliResult<()> {
    let layout = service.layout();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if compact {
        serde_json::to_writer(&mut out, &layout)
    } else {
        serde_json::to_writer_pretty(&mut out, &layout)
    };
    written.map_err(|e| InfraError::io("write layout", e.into()))?;
    writeln!(out).map_err(|e| InfraError::io("write layout", e))?;
    Ok(())
}

#[instrument(skip(service))]
fn cmd_add(service: &mut StructureService, args: &AddArgs) -> CliResult<()> {
    let source = match (&args.member, &args.title) {
        (Some(member), _) => NodeSource::Member(member.clone()),
        (None, Some(title)) => NodeSource::Custom {
            title: title.clone(),
            position: args.position.clone(),
        },
        (None, None) => {
            return Err(CliError::InvalidArgs(
                "either --member or --title is required".to_string(),
            ))
        }
    };

    let mut draft = NodeDraft::new(args.parent.as_deref(), source);
    draft.line_type = args.line.into();
    draft.layout_type = args.layout.into();
    draft.sort_order = args.sort_order;

    let record = service.add_node(draft)?;
    output::action("Added", &record.id);
    Ok(())
}

#[instrument(skip(service))]
fn cmd_delete(service: &mut StructureService, id: &str) -> CliResult<()> {
    service.delete_node(&id.to_string())?;
    output::action("Deleted", id);
    Ok(())
}

fn cmd_members(service: &StructureService) -> CliResult<()> {
    if service.members().is_empty() {
        output::info("(no active members)");
        return Ok(());
    }
    for member in service.members() {
        output::info(&format!("{}\t{}\t{}", member.id, member.name, member.position));
    }
    Ok(())
}

fn config_command(command: &ConfigCommands, settings: &Settings, cli: &Cli) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", describe(path))),
                None => output::detail("global: (no config directory)"),
            }
            let project_dir = cli
                .project_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            output::detail(&format!(
                "local:  {}",
                describe(local_config_path(&project_dir))
            ));
            output::detail(&format!("store:  {}", settings.store_path.display()));
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
        }
    }
    Ok(())
}

fn describe(path: PathBuf) -> String {
    if path.exists() {
        format!("{}", path.display())
    } else {
        format!("{} (missing)", path.display())
    }
}
