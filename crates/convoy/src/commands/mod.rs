pub mod destroy;
pub mod provision;
pub mod validate;

use colored::Colorize;
use convoy_cloud::{ActionType, ApplyResult, CloudError, Platform, registry_for};
use convoy_cloud_vultr::VultrPlatform;
use convoy_core::{Infrastructure, Node, load_infrastructure, platform_name, read_document};
use std::path::{Path, PathBuf};

/// Platform used when the document has no `platform` key.
const DEFAULT_PLATFORM: &str = "vultr";

/// A loaded infrastructure file and the platform it targets.
pub struct Document {
    pub path: PathBuf,
    pub platform: Box<dyn Platform>,
    pub infra: Infrastructure,
}

pub fn select_platform(root: &Node) -> convoy_cloud::Result<Box<dyn Platform>> {
    let name = platform_name(root)?.unwrap_or_else(|| DEFAULT_PLATFORM.to_string());
    match name.as_str() {
        "vultr" => Ok(Box::new(VultrPlatform::from_env()?)),
        other => Err(CloudError::PlatformNotFound(other.to_string())),
    }
}

/// Reads the file, picks its platform and loads every entity.
pub fn open(path: &Path) -> anyhow::Result<Document> {
    let root = read_document(path)?;
    let platform = select_platform(&root)?;
    let infra = load_infrastructure(&root, &registry_for(platform.as_ref()))?;

    println!(
        "{} {} ({})",
        "Loaded".blue(),
        path.display().to_string().cyan(),
        platform.display_name()
    );

    Ok(Document {
        path: path.to_path_buf(),
        platform,
        infra,
    })
}

pub fn print_result(result: &ApplyResult) {
    if result.dry_run {
        println!("{}", "Dry run: nothing was changed".yellow().bold());
    }
    for action in &result.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green().bold(),
            ActionType::Update => "~".yellow().bold(),
            ActionType::Delete => "-".red().bold(),
            ActionType::NoOp => "=".dimmed(),
        };
        println!(
            "  {} {} {}: {}",
            marker,
            action.resource_type,
            action.resource_id.cyan(),
            action.description
        );
    }
    println!();
    println!("{} ({} ms)", result.summary(), result.duration_ms);
}
