use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use mktree_core::example::EXAMPLE;
use mktree_core::{
    parse_structure, scaffold_from_description, Args, ChatCompletionTranslator, Command, Config,
    Materializer, PathNode, Snapshot, TreeRenderer,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();
    setup_logging(args.debug);

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    if let Command::Init { force } = &args.command {
        let path = Config::create_config(&args.config, *force)?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let config = Config::new(&args.config, args);
    match &args.command {
        Command::Build { input, dry_run, .. } => {
            let text = read_input(input.as_deref())?;
            if text.trim().is_empty() {
                bail!("no tree structure given");
            }
            let nodes = parse_structure(&text);
            if *dry_run {
                print_plan(&nodes, &config.general.root);
                return Ok(());
            }
            materialize(&config, &nodes)
        }
        Command::Parse { input } => {
            let text = read_input(input.as_deref())?;
            let nodes = parse_structure(&text);
            print!("{}", TreeRenderer::new().render(&nodes));
            println!();
            for node in &nodes {
                println!("{}", node);
            }
            Ok(())
        }
        Command::Generate {
            description,
            api_key,
            build,
            ..
        } => {
            let credential = api_key.clone().or_else(|| config.api_key_from_env());
            let translator = ChatCompletionTranslator::new(&config.adapter.endpoint)
                .with_timeout(Duration::from_secs(config.adapter.timeout_secs));
            let (tree_text, nodes) = scaffold_from_description(
                &translator,
                description,
                &config.adapter.model,
                credential.as_deref(),
            )
            .context("structure generation failed")?;
            println!("{}", tree_text);
            if *build {
                materialize(&config, &nodes)?;
            }
            Ok(())
        }
        Command::Snapshot {
            path,
            exclude,
            max_depth,
        } => {
            let start_path = Path::new(path);
            if !start_path.is_dir() {
                bail!("{} is not a directory", start_path.display());
            }
            let snapshot = Snapshot::new()
                .with_excludes(exclude.as_slice())
                .with_max_depth(*max_depth);
            print!("{}", snapshot.capture_text(start_path));
            Ok(())
        }
        Command::Example => {
            print!("{}", EXAMPLE);
            Ok(())
        }
        Command::Init { .. } => Ok(()),
    }
}

fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("cannot read tree from stdin")?;
            Ok(text)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("cannot read {}", path)),
    }
}

fn materialize(config: &Config, nodes: &[PathNode]) -> Result<()> {
    let root = &config.general.root;
    if root.trim().is_empty() {
        bail!("no target root given");
    }
    let report = Materializer::new(root)
        .with_content(config.general.content)
        .materialize(nodes)
        .context("generation failed")?;
    println!("{}", report.summary());
    Ok(())
}

fn print_plan(nodes: &[PathNode], root: &str) {
    for (action, target) in Materializer::new(root).plan(nodes) {
        println!("{:<8} {}", action.as_str(), target.display());
    }
}
