use anyhow::{Context, Result};
use paradesk::bridge::{self, Bridge};
use paradesk::cli::{self, Command};
use paradesk::config::Config;
use paradesk::context::{AppContext, StandardContext};
use paradesk::model::{TaskProgress, parse_markdown_to_tasks};
use std::io::Read;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("Try 'paradesk --help'.");
            std::process::exit(2);
        }
    };

    let ctx = StandardContext::new(args.root.clone());
    let config = Config::load_or_default(&ctx)?;
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    if let Err(e) = paradesk::logging::init(&ctx, level) {
        eprintln!("Logging disabled: {}", e);
    }

    match args.command {
        Command::Help => cli::print_help("paradesk"),
        Command::Parse(source) => {
            let markdown = if source == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&source)
                    .with_context(|| format!("Failed to read {}", source))?
            };
            let tasks = parse_markdown_to_tasks(&markdown);
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        Command::Pinned => {
            let bridge = Bridge::open(&ctx, config)?;
            let pinned = bridge.storage().pinned_tasks()?;
            let today = chrono::Local::now().date_naive();
            for p in &pinned {
                let mark = if p.task.is_completed { "x" } else { " " };
                let due = match (p.task.due_date.as_deref(), p.task.is_overdue(today)) {
                    (Some(d), true) => format!(" (OVERDUE {})", d),
                    (Some(d), false) => format!(" (due {})", d),
                    (None, _) => String::new(),
                };
                println!("[{}] {}{}  <{}>", mark, p.task.content, due, p.source_list);
            }
            let progress = TaskProgress::of_pinned(&pinned);
            println!("{}/{} pinned tasks done", progress.completed, progress.total);
        }
        Command::Lists => {
            let bridge = Bridge::open(&ctx, config)?;
            for list in bridge.storage().task_lists()? {
                let progress = TaskProgress::of(&parse_markdown_to_tasks(&list.content));
                println!(
                    "{:>4}  {}  ({}/{})",
                    list.id, list.name, progress.completed, progress.total
                );
            }
        }
        Command::Serve => {
            log::info!(
                "Serving bridge on stdio (data dir {:?})",
                ctx.get_data_dir()?
            );
            let bridge = Arc::new(Bridge::open(&ctx, config)?);
            bridge::serve_stdio(bridge).await?;
        }
    }

    Ok(())
}
