//! Command line surface. Without a subcommand the interactive view starts.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use crate::actions::{self, CopyOutcome, find_prompt};
use crate::clipboard::ClipboardSink;
use crate::compose::SeparatorKind;
use crate::config::Config;
use crate::library::{Library, ranked};
use crate::prompt::{Prompt, PromptRole};
use crate::storage::Store;

/// Prompt role options for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Body,
    Prefix,
    Suffix,
}

impl From<RoleArg> for PromptRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Body => PromptRole::Body,
            RoleArg::Prefix => PromptRole::Prefix,
            RoleArg::Suffix => PromptRole::Suffix,
        }
    }
}

/// Separator options for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeparatorArg {
    /// One newline
    Newline,
    /// One space
    Space,
    /// Two newlines
    BlankLine,
    /// The text given with --custom
    Custom,
}

impl From<SeparatorArg> for SeparatorKind {
    fn from(separator: SeparatorArg) -> Self {
        match separator {
            SeparatorArg::Newline => SeparatorKind::Newline,
            SeparatorArg::Space => SeparatorKind::Space,
            SeparatorArg::BlankLine => SeparatorKind::BlankLine,
            SeparatorArg::Custom => SeparatorKind::Custom,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "promptdeck")]
#[command(about = "Keep a library of reusable prompts and compose them into one")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute (starts the interactive view if omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Library file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List prompts, best ranked first
    List {
        /// Only prompts with this role
        #[arg(short, long, value_enum)]
        role: Option<RoleArg>,

        /// Case-insensitive match on name, content or category
        #[arg(short, long)]
        search: Option<String>,

        /// Only prompts in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Print the prompts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a prompt
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short = 't', long, default_value = "")]
        content: String,

        #[arg(short, long, value_enum, default_value = "body")]
        role: RoleArg,

        /// Defaults to "general"
        #[arg(short, long, default_value = "")]
        category: String,
    },

    /// Compose prefixes, a body and suffixes, then copy the result
    Compose {
        /// Prefix prompt id or name (repeatable, kept in order)
        #[arg(short, long = "prefix", value_name = "ID_OR_NAME")]
        prefixes: Vec<String>,

        /// Free-text body
        #[arg(short, long, default_value = "")]
        body: String,

        /// Suffix prompt id or name (repeatable, kept in order)
        #[arg(short, long = "suffix", value_name = "ID_OR_NAME")]
        suffixes: Vec<String>,

        /// Separator between parts (defaults to the configured one)
        #[arg(long, value_enum)]
        separator: Option<SeparatorArg>,

        /// Text for --separator custom
        #[arg(long)]
        custom: Option<String>,

        /// Print the composition instead of copying it
        #[arg(long)]
        stdout: bool,
    },

    /// Write the library as JSON to a file, or to stdout without a path
    Export { path: Option<PathBuf> },

    /// Load prompts from an exported file
    Import {
        path: PathBuf,

        /// Keep existing prompts and add those with new ids
        #[arg(long)]
        merge: bool,
    },
}

/// Clipboard stand-in that prints instead.
pub struct WriterSink<'a> {
    out: &'a mut dyn Write,
}

impl<'a> WriterSink<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }
}

impl ClipboardSink for WriterSink<'_> {
    fn copy(&mut self, text: &str) -> bool {
        writeln!(self.out, "{}", text).is_ok()
    }
}

fn resolve(library: &Library, role: PromptRole, needles: &[String]) -> Result<Vec<Prompt>> {
    let candidates = library.by_role(role);
    needles
        .iter()
        .map(|needle| match find_prompt(&candidates, needle) {
            Some(prompt) => Ok(prompt.clone()),
            None => bail!("No {} prompt matches \"{}\"", role, needle),
        })
        .collect()
}

fn format_row(prompt: &Prompt) -> String {
    let star = if prompt.is_favorite { "★" } else { " " };
    format!(
        "{}  {:<6}  {} {}  [{}]  ×{}",
        prompt.id, prompt.role.as_str(), star, prompt.name, prompt.category, prompt.usage_count
    )
}

/// Runs one subcommand against `library`, printing results to `out`.
pub fn run_command(
    command: Commands,
    library: &mut Library,
    config: &Config,
    clipboard: &mut dyn ClipboardSink,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::List {
            role,
            search,
            category,
            json,
        } => {
            let mut prompts = library.search(search.as_deref().unwrap_or(""));
            if let Some(role) = role {
                let role = PromptRole::from(role);
                prompts.retain(|p| p.role == role);
            }
            if let Some(category) = category {
                prompts.retain(|p| p.category == category);
            }
            let prompts = ranked(&prompts);

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&prompts)?)?;
            } else if prompts.is_empty() {
                writeln!(out, "No prompts.")?;
            } else {
                for prompt in &prompts {
                    writeln!(out, "{}", format_row(prompt))?;
                }
            }
        }

        Commands::Add {
            name,
            content,
            role,
            category,
        } => {
            let prompt = library.create(&name, &content, role.into(), &category)?;
            writeln!(out, "{}", prompt.id)?;
        }

        Commands::Compose {
            prefixes,
            body,
            suffixes,
            separator,
            custom,
            stdout,
        } => {
            let prefixes = resolve(library, PromptRole::Prefix, &prefixes)?;
            let suffixes = resolve(library, PromptRole::Suffix, &suffixes)?;
            let kind = separator
                .map(SeparatorKind::from)
                .unwrap_or(config.compose.separator);
            let separator =
                kind.with_custom(custom.as_deref().unwrap_or(&config.compose.custom_separator));

            let outcome = if stdout {
                let mut sink = WriterSink::new(&mut *out);
                actions::compose_and_copy(library, &prefixes, &body, &suffixes, &separator, &mut sink)
            } else {
                actions::compose_and_copy(library, &prefixes, &body, &suffixes, &separator, clipboard)
            };
            match outcome {
                CopyOutcome::Copied(_) if stdout => {}
                CopyOutcome::Copied(_) => writeln!(out, "{}", outcome.message())?,
                CopyOutcome::Empty => bail!(outcome.message()),
                CopyOutcome::ClipboardFailed => bail!(
                    "{} Use --stdout to print the composition instead.",
                    outcome.message()
                ),
            }
        }

        Commands::Export { path: None } => {
            writeln!(out, "{}", Store::export_text(library.state())?)?;
        }

        Commands::Export { path: Some(path) } => {
            let count = actions::export_to_file(library, &path)?;
            writeln!(out, "Exported {} prompts to {}", count, path.display())?;
        }

        Commands::Import { path, merge } => {
            let count = actions::import_from_file(library, &path, merge)?;
            if merge {
                writeln!(out, "Merged {} new prompts", count)?;
            } else {
                writeln!(out, "Imported {} prompts", count)?;
            }
        }
    }
    Ok(())
}
