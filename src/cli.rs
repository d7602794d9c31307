// File: ./src/cli.rs
//! Command-line parsing and help text for the `paradesk` binary.
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// JSON-lines bridge on stdin/stdout.
    Serve,
    /// Parse a Markdown file (or stdin with `-`) and print the tasks as JSON.
    Parse(String),
    /// Print pinned tasks across all stored task lists.
    Pinned,
    /// Print stored task lists with their progress.
    Lists,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub root: Option<PathBuf>,
    pub verbose: bool,
}

/// Parses `args` (without the program name).
pub fn parse_args<I, S>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut root = None;
    let mut verbose = false;
    let mut positional = Vec::new();

    let mut iter = args.into_iter().map(Into::into);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-r" | "--root" => {
                let path = iter
                    .next()
                    .ok_or_else(|| format!("{} requires a path", arg))?;
                root = Some(PathBuf::from(path));
            }
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" | "help" => {
                return Ok(CliArgs {
                    command: Command::Help,
                    root,
                    verbose,
                });
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.first().map(String::as_str) {
        None | Some("serve") => Command::Serve,
        Some("parse") => Command::Parse(
            positional
                .get(1)
                .cloned()
                .ok_or_else(|| "parse requires a file (or '-' for stdin)".to_string())?,
        ),
        Some("pinned") => Command::Pinned,
        Some("lists") => Command::Lists,
        Some(other) => return Err(format!("Unknown command '{}'", other)),
    };

    Ok(CliArgs {
        command,
        root,
        verbose,
    })
}

pub fn print_help(binary_name: &str) {
    println!(
        "Paradesk v{} - PARA knowledge-management backend",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [serve] [--root <path>]", binary_name);
    println!("    {} parse <file.md | ->", binary_name);
    println!("    {} pinned", binary_name);
    println!("    {} lists", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -v, --verbose         Log debug output to stderr.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("TASK LIST SYNTAX:");
    println!("    - [ ] Todo                    Open task");
    println!("    - [x] Done                    Completed task");
    println!("    - [ ] Call bank [pinned]      Show in the pinned view");
    println!("    - [ ] Report [截止:2025-08-15] Due date");
    println!("      - [ ] Sub task              Indent to nest");
}
