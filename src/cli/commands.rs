//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{Document, Scalar};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{expand_path, global_config_path, RenderStyle, Settings};
use crate::domain::{Attribute, Key, Renderer, SimplifyOptions, Simplified, SlotRef, Structured};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "effective settings");
    let renderer = Renderer::new(settings.render.indent);

    match &cli.command {
        Some(Commands::Show { file, tree }) => cmd_show(&settings, renderer, file, *tree),
        Some(Commands::Iter { file }) => cmd_iter(&settings, renderer, file),
        Some(Commands::Get { file, key }) => cmd_get(&settings, renderer, file, key),
        Some(Commands::Attr { file, name }) => cmd_attr(&settings, renderer, file, name),
        Some(Commands::Simplify {
            file,
            no_recurse,
            keep_root,
        }) => cmd_simplify(&settings, renderer, file, *no_recurse, *keep_root),
        Some(Commands::Dict { file, shallow }) => cmd_dict(&settings, file, *shallow),
        Some(Commands::Config { command }) => cmd_config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "structured", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `structured --help`".to_string(),
        )),
    }
}

/// Load `file` and register the configured mapped attributes.
fn load_document(settings: &Settings, file: &Path) -> CliResult<Document> {
    let path = expand_path(file);
    let document = Document::load(&path)?.with_mapped_attrs(settings.mapped_attrs.iter().cloned());
    Ok(document)
}

/// One line per value, containers rendered as blocks.
pub fn render_item(renderer: Renderer, item: SlotRef<'_, Scalar>) -> String {
    match item {
        SlotRef::Value(value) => value.to_string(),
        SlotRef::Group(values) => format!("({})", values.iter().join(", ")),
        SlotRef::Nested(nested) => renderer.render(nested),
    }
}

/// Rendered iteration items, in iteration order.
pub fn iter_lines(renderer: Renderer, structured: &Structured<Scalar>) -> Vec<String> {
    structured
        .iter()
        .map(|item| render_item(renderer, item))
        .collect()
}

/// Bracket read of a command-line key (`None` selects the root).
pub fn get_output(renderer: Renderer, structured: &Structured<Scalar>, key: &str) -> CliResult<String> {
    let key: Key = key
        .parse()
        .map_err(|_| CliError::InvalidArgs(format!("invalid key: {key}")))?;
    let item = structured.index(key)?;
    Ok(render_item(renderer, item))
}

/// Settings defaults overridden by the `simplify` flags.
pub fn simplify_options(settings: &Settings, no_recurse: bool, keep_root: bool) -> SimplifyOptions {
    let mut options = settings.simplify.options();
    if no_recurse {
        options = options.recurse(false);
    }
    if keep_root {
        options = options.unwrap(false);
    }
    options
}

pub fn simplify_output(
    renderer: Renderer,
    structured: &mut Structured<Scalar>,
    options: SimplifyOptions,
) -> CliResult<String> {
    let rendered = match structured.simplify(options)? {
        Simplified::Unwrapped(slot) => renderer.render_slot(&slot),
        Simplified::Structured(simplified) => renderer.render(&simplified),
        Simplified::InPlace(simplified) => renderer.render(simplified),
    };
    Ok(rendered)
}

#[instrument(level = "debug", skip(settings, renderer))]
fn cmd_show(settings: &Settings, renderer: Renderer, file: &Path, tree: bool) -> CliResult<()> {
    let document = load_document(settings, file)?;
    if tree || settings.render.style == RenderStyle::Tree {
        let label = file.display().to_string();
        output::info(&document.structured().to_tree(label));
    } else {
        output::info(&renderer.render(document.structured()));
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings, renderer))]
fn cmd_iter(settings: &Settings, renderer: Renderer, file: &Path) -> CliResult<()> {
    let document = load_document(settings, file)?;
    for (position, line) in iter_lines(renderer, document.structured()).iter().enumerate() {
        output::item(position, line);
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings, renderer))]
fn cmd_get(settings: &Settings, renderer: Renderer, file: &Path, key: &str) -> CliResult<()> {
    let document = load_document(settings, file)?;
    output::info(&get_output(renderer, document.structured(), key)?);
    Ok(())
}

#[instrument(level = "debug", skip(settings, renderer))]
fn cmd_attr(settings: &Settings, renderer: Renderer, file: &Path, name: &str) -> CliResult<()> {
    let document = load_document(settings, file)?;
    match document.structured().attr(name)? {
        Attribute::Slot(slot) => output::info(&renderer.render_slot(slot)),
        Attribute::Mapped(projected) => output::info(&renderer.render(&projected)),
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings, renderer))]
fn cmd_simplify(
    settings: &Settings,
    renderer: Renderer,
    file: &Path,
    no_recurse: bool,
    keep_root: bool,
) -> CliResult<()> {
    let mut document = load_document(settings, file)?;
    let options = simplify_options(settings, no_recurse, keep_root);
    output::info(&simplify_output(renderer, document.structured_mut(), options)?);
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_dict(settings: &Settings, file: &Path, shallow: bool) -> CliResult<()> {
    let document = load_document(settings, file)?;
    output::info(&document.to_json(!shallow)?);
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("Effective settings");
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "" } else { " (not found)" };
                output::action("global", &format!("{}{}", path.display(), state));
            }
            None => output::warning("no config directory available on this platform"),
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
