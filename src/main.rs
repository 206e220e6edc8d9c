//! Task Genius CLI.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::sync::Arc;
use taskgenius::config::{GeneratorConfig, data_dir, default_db_path};
use taskgenius::generate::UnconfiguredGenerator;
use taskgenius::{
    ClientConfig, GeminiGenerator, Generator, HttpTaskService, LocalTaskService, NoticeLevel, ServerConfig, SyncPolicy,
    Task, TaskClient, TaskService, TaskStore,
};
use tokio::sync::Mutex;

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = data_dir().join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("taskgenius.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn format_task(index: usize, task: &Task) -> String {
    let mark = if task.completed { "✓".green() } else { "○".dimmed() };
    let content = if task.completed {
        task.content.dimmed()
    } else {
        task.content.normal()
    };
    format!("{:>2}. {} {} {}", index, mark, task.id.cyan(), content)
}

fn local_generator() -> Result<Box<dyn Generator>> {
    let config = GeneratorConfig::from_env()?;
    Ok(match config.api_key {
        Some(key) => Box::new(GeminiGenerator::new(key, config.model, config.max_output_tokens)),
        None => Box::new(UnconfiguredGenerator),
    })
}

/// Print notices raised by the client, most recent last.
fn print_notices<S: TaskService>(client: &mut TaskClient<S>) {
    for notice in client.drain_notices() {
        match notice.level {
            NoticeLevel::Info => println!("{} {}", "ℹ".blue(), notice.message),
            NoticeLevel::Error => eprintln!("{} {}", "✗".red(), notice.message),
            NoticeLevel::Blocking => eprintln!("{} {}", "⊘".red().bold(), notice.message),
        }
    }
}

async fn run_client<S: TaskService>(
    mut client: TaskClient<S>,
    generator: &dyn Generator,
    command: Command,
) -> Result<()> {
    let loaded = client.load().await;
    print_notices(&mut client);
    loaded.context("Failed to load tasks")?;

    let result = match command {
        Command::Serve { .. } => unreachable!("serve is handled before a client is built"),

        Command::List => {
            if client.tasks().is_empty() {
                println!("{}", "No tasks found. Try generating some!".dimmed());
            } else {
                for (index, task) in client.tasks().iter().enumerate() {
                    println!("{}", format_task(index, task));
                }
            }
            Ok(())
        }

        Command::Add { content } => client.create(&content).await.map(|task| {
            println!("{} Created: {} {}", "✓".green(), task.id.cyan(), task.content);
        }),

        Command::Toggle { id } => {
            if client.snapshot().get(&id).is_none() {
                eprintln!("{} Task not found: {}", "✗".red(), id);
                std::process::exit(1);
            }
            client.toggle_completion(&id).await.map(|list| {
                if let Some(task) = list.get(&id) {
                    let state = if task.completed { "completed" } else { "pending" };
                    println!("{} {} is now {}", "✓".green(), task.id.cyan(), state);
                }
            })
        }

        Command::Rm { id } => client.delete(&id).await.map(|_| ()),

        Command::Mv { id, position } => client.reorder(&id, position).await.map(|outcome| {
            println!("{} {:?}", "→".blue(), outcome);
            for (index, task) in client.tasks().iter().enumerate() {
                println!("{}", format_task(index, task));
            }
        }),

        Command::Generate { topic, save } => match client.generate(generator, &topic).await {
            Ok(suggestions) => {
                println!("{} Generated tasks:", "→".blue());
                for suggestion in &suggestions {
                    println!("  • {}", suggestion);
                }
                if save {
                    let created = client.add_generated(&suggestions).await;
                    println!("{} Saved {} of {} task(s)", "✓".green(), created.len(), suggestions.len());
                }
                Ok(())
            }
            Err(e) => Err(e),
        },

        Command::Progress => {
            let progress = client.progress();
            println!(
                "{}/{} completed ({:.0}%), {} pending",
                progress.completed,
                progress.total,
                progress.percent(),
                progress.pending()
            );
            Ok(())
        }
    };

    print_notices(&mut client);
    result.map_err(|e| eyre::eyre!(e))
}

fn run(cli: Cli) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;

    if let Command::Serve { host, port } = &cli.command {
        let mut config = ServerConfig::from_env().context("Invalid server configuration")?;
        if let Some(host) = host {
            config.host = host.clone();
        }
        if let Some(port) = port {
            config.port = *port;
        }
        if let Some(db) = &cli.db {
            config.db_path = db.clone();
        }

        println!("{} Serving tasks on http://{}", "→".blue(), config.bind_addr());
        return rt.block_on(taskgenius::server::serve(config)).context("Server error");
    }

    let mut client_config = ClientConfig::default().with_owner(cli.owner.clone());
    if let Some(url) = &cli.server {
        client_config = client_config.with_base_url(url.clone());
    }
    if cli.no_reload {
        client_config = client_config.with_sync(SyncPolicy::ApplyReturned);
    }

    match client_config.base_url.clone() {
        Some(url) => {
            let service = HttpTaskService::new(url, client_config.owner_id.clone());
            let generator = service.clone();
            let client = TaskClient::new(service, client_config);
            rt.block_on(run_client(client, &generator, cli.command))
        }
        None => {
            let db_path = cli.db.clone().unwrap_or_else(default_db_path);
            let store = TaskStore::open(&db_path).context("Failed to open task store")?;
            let service = LocalTaskService::new(Arc::new(Mutex::new(store)), client_config.owner_id.clone());
            let generator = local_generator()?;
            let client = TaskClient::new(service, client_config);
            rt.block_on(run_client(client, generator.as_ref(), cli.command))
        }
    }
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
