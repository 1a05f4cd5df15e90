use super::Document;
use colored::Colorize;

pub async fn handle(document: &Document) -> anyhow::Result<()> {
    println!("{}", "Validating...".blue());

    let infra = &document.infra;
    document.platform.validate(infra).await?;

    println!("{}", "✓ Configuration is valid".green().bold());
    println!();
    println!("Summary:");
    println!("  Scripts: {}", infra.scripts().count());
    for script in infra.scripts() {
        println!("    - {} ({})", script.name().cyan(), script.script_type());
    }
    println!("  Firewalls: {}", infra.firewalls().count());
    for firewall in infra.firewalls() {
        println!(
            "    - {} ({} rules)",
            firewall.name().cyan(),
            firewall.rules().len()
        );
    }
    println!("  Servers: {}", infra.servers().count());
    for server in infra.servers() {
        println!(
            "    - {} ({} vCPU / {} MB)",
            server.display_name().cyan(),
            server.plan().cpu(),
            server.plan().memory()
        );
    }
    Ok(())
}
