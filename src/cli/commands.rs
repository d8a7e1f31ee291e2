//! Command dispatch: one function per subcommand.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{
    load_document, read_stylesheet, DispatchLog, HandlerTarget, ScriptedHandler,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{Document, NodeId, NodePath, Propagation, TreeBuilder};
use crate::render::{format_hierarchy, to_diagnostic_string, to_tree, TerminalRenderer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    if !settings.render.color {
        colored::control::set_override(false);
    }

    match command {
        Commands::Tree { document } => _tree(&settings, document),
        Commands::Cascade {
            document,
            stylesheet,
            from,
        } => _cascade(&settings, document, stylesheet, from),
        Commands::Find {
            document,
            stylesheet,
            tag,
            from,
        } => _find(&settings, document, stylesheet, tag, from),
        Commands::Hierarchy {
            document,
            stylesheet,
            from,
        } => _hierarchy(&settings, document, stylesheet, from),
        Commands::Render {
            document,
            stylesheet,
        } => _render(&settings, document, stylesheet.as_deref()),
        Commands::Dispatch {
            document,
            at,
            event,
            handlers,
            retire,
        } => _dispatch(&settings, document, at, event, handlers, retire),
        Commands::Config { command } => _config(&settings, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn load(settings: &Settings, document: &Path) -> CliResult<Document> {
    let builder = TreeBuilder::with_options(settings.build_options());
    Ok(load_document(document, &builder)?)
}

/// Load, cascade from `from`, and return the document with the start node.
fn load_styled(
    settings: &Settings,
    document: &Path,
    stylesheet: &Path,
    from: &NodePath,
) -> CliResult<(Document, NodeId)> {
    let mut doc = load(settings, document)?;
    let sheet = read_stylesheet(stylesheet)?;
    let start = doc.resolve(from)?;
    let styled = doc.apply_stylesheet(start, &sheet)?;
    debug!(styled, "cascade applied");
    Ok((doc, start))
}

#[instrument(skip(settings))]
fn _tree(settings: &Settings, document: &Path) -> CliResult<()> {
    let doc = load(settings, document)?;
    let root = doc.require_root()?;
    output::info(&to_tree(&doc, root)?);
    Ok(())
}

#[instrument(skip(settings))]
fn _cascade(settings: &Settings, document: &Path, stylesheet: &Path, from: &NodePath) -> CliResult<()> {
    let (doc, start) = load_styled(settings, document, stylesheet, from)?;
    output::info(&to_diagnostic_string(&doc, start)?);
    Ok(())
}

#[instrument(skip(settings))]
fn _find(
    settings: &Settings,
    document: &Path,
    stylesheet: &Path,
    tag: &str,
    from: &NodePath,
) -> CliResult<()> {
    let (doc, start) = load_styled(settings, document, stylesheet, from)?;
    let found = doc.find_styled(start, tag)?;
    if found.is_empty() {
        output::warning(&format!("no styled '{}' nodes", tag));
        return Ok(());
    }
    for (id, styles) in found {
        output::info(&format!("{} {} {{{}}}", doc.path_of(id)?, tag, styles));
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _hierarchy(settings: &Settings, document: &Path, stylesheet: &Path, from: &NodePath) -> CliResult<()> {
    let (doc, start) = load_styled(settings, document, stylesheet, from)?;
    output::info(&format_hierarchy(&doc.style_hierarchy(start)?));
    Ok(())
}

#[instrument(skip(settings))]
fn _render(settings: &Settings, document: &Path, stylesheet: Option<&Path>) -> CliResult<()> {
    let mut doc = load(settings, document)?;
    let root = doc.require_root()?;
    if let Some(path) = stylesheet {
        doc.apply_stylesheet(root, &read_stylesheet(path)?)?;
    }
    let renderer = TerminalRenderer::from_settings(&settings.render);
    output::info(&renderer.display(&doc, root)?);
    Ok(())
}

#[instrument(skip(settings, handlers, retire))]
fn _dispatch(
    settings: &Settings,
    document: &Path,
    at: &NodePath,
    event: &str,
    handlers: &[ScriptedHandler],
    retire: &[HandlerTarget],
) -> CliResult<()> {
    if event.trim().is_empty() {
        return Err(CliError::InvalidArgs("event name must not be empty".to_string()));
    }
    let mut doc = load(settings, document)?;
    let log = DispatchLog::new();
    for h in handlers {
        h.register(&mut doc, &log)?;
    }
    for target in retire {
        let node = target.resolve(&doc)?;
        if !doc.off(node, &target.event)? {
            output::warning(&format!("no active handler at {}", target));
        }
    }

    let node = doc.resolve(at)?;
    let report = doc.handle(node, event)?;

    output::header(&format!(
        "{} at {} ({})",
        event,
        at,
        doc.tag(node).unwrap_or_default()
    ));
    for firing in log.firings() {
        match firing.propagation {
            Propagation::Continue => output::fired(&firing),
            Propagation::Stop => output::stopped(&firing),
        }
    }
    let walked = report
        .visited
        .iter()
        .map(|&id| doc.path_of(id).map(|p| p.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    output::detail(&format!("walked: {}", walked.iter().join(" -> ")));
    match report.stopped_at {
        Some(id) => output::detail(&format!("stopped at {}", doc.path_of(id)?)),
        None => output::detail("reached the root"),
    }
    Ok(())
}

fn _config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory on this platform"),
        },
    }
    Ok(())
}
