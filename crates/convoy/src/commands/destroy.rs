use super::{Document, print_result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

fn confirm(document: &Document) -> io::Result<bool> {
    print!(
        "Destroy {} entities declared in {}? [y/N] ",
        document.infra.len(),
        document.path.display()
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn handle(document: &Document, dry_run: bool, yes: bool) -> anyhow::Result<()> {
    if !dry_run && !yes && !confirm(document)? {
        println!("{}", "Aborted".yellow());
        return Ok(());
    }

    let result = document.platform.destroy(&document.infra, dry_run).await?;
    print_result(&result);

    if !result.dry_run {
        println!("{}", "✓ Destroyed".green().bold());
    }
    Ok(())
}
