use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod template;
pub mod vendordep;

#[derive(Debug, Parser)]
#[command(
    name = "botforge",
    version,
    about = "Robot project template and vendor dependency helper",
    propagate_version = true
)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "t", name = "template", about = "Manage project templates")]
    Template {
        #[command(subcommand)]
        cmd: TemplateCommands,
    },
    #[command(alias = "v", name = "vendordep", about = "Manage vendor dependencies")]
    Vendordep {
        #[command(subcommand)]
        cmd: VendordepCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum TemplateCommands {
    #[command(alias = "f", name = "fetch", about = "Download the template archive")]
    Fetch(template::FetchArgs),
    #[command(name = "versions", about = "List published template archive versions")]
    Versions(template::VersionsArgs),
    #[command(alias = "langs", name = "languages", about = "List languages in the cached archive")]
    Languages,
    #[command(alias = "p", name = "projects", about = "List project types for a language")]
    Projects(template::ProjectsArgs),
    #[command(alias = "n", name = "new", about = "Generate a project from a cached template")]
    New(template::NewArgs),
}

#[derive(Debug, Subcommand)]
pub enum VendordepCommands {
    #[command(alias = "ls", name = "list", about = "List vendordeps on the marketplace")]
    List(vendordep::ListArgs),
    #[command(name = "local", about = "List vendordeps of the current project")]
    Local,
    #[command(alias = "a", name = "add", about = "Add a marketplace vendordep to the project")]
    Add(vendordep::AddArgs),
    #[command(alias = "rm", name = "remove", about = "Remove a vendordep from the project")]
    Remove(vendordep::RemoveArgs),
}

pub async fn run(app: App) -> Result<()> {
    match app.cmd {
        Commands::Template { cmd } => match cmd {
            TemplateCommands::Fetch(args) => template::fetch(args).await,
            TemplateCommands::Versions(args) => template::versions(args).await,
            TemplateCommands::Languages => template::languages().await,
            TemplateCommands::Projects(args) => template::projects(args).await,
            TemplateCommands::New(args) => template::new(args).await,
        },
        Commands::Vendordep { cmd } => match cmd {
            VendordepCommands::List(args) => vendordep::list(args).await,
            VendordepCommands::Local => vendordep::local(),
            VendordepCommands::Add(args) => vendordep::add(args).await,
            VendordepCommands::Remove(args) => vendordep::remove(args),
        },
    }
}
