use super::{Document, print_result};
use colored::Colorize;

pub async fn handle(document: &Document, dry_run: bool) -> anyhow::Result<()> {
    println!(
        "{} {} entities",
        "Provisioning".blue(),
        document.infra.len()
    );

    let result = document.platform.provision(&document.infra, dry_run).await?;
    print_result(&result);

    if !result.dry_run && result.has_changes() {
        println!("{}", "✓ Provisioned".green().bold());
    } else if !result.has_changes() {
        println!("{}", "✓ Everything is up to date".green().bold());
    }
    Ok(())
}
