use anyhow::Result;
use clap::Parser;
use prettytable::{row, Table};

use dossier::logging;
use dossier::payments::PaymentsDb;
use dossier::pipeline::{DossierEngine, DossierResult};
use dossier::publications::LiteratureClient;
use dossier::registry::RegistryClient;

/// Build a public-records dossier for a licensed medical provider.
#[derive(Parser)]
#[command(name = "dossier", version)]
struct Cli {
    /// Provider name, e.g. "Dr. Evan Joyce, MD"
    name: String,

    /// Two-letter practice state hint
    #[arg(long)]
    state: Option<String>,

    /// Practice city hint
    #[arg(long)]
    city: Option<String>,

    /// Path to the payments SQLite database
    #[arg(long, default_value = "payments.db")]
    database: String,

    /// Maximum number of publications to fetch
    #[arg(long, default_value_t = 30)]
    max_publications: usize,

    /// Emit the full dossier as JSON instead of a report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();
    let cli = Cli::parse();

    let payments = PaymentsDb::new(&cli.database).await?;
    let registry = RegistryClient::new()?;
    let literature = LiteratureClient::new()?;

    let engine = DossierEngine::new(registry, payments, literature)
        .with_max_publications(cli.max_publications);

    let dossier = engine
        .build_dossier(&cli.name, cli.state.as_deref(), cli.city.as_deref())
        .await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&dossier)?);
    } else {
        render(&dossier);
    }

    Ok(())
}

fn render(dossier: &DossierResult) {
    println!("Dossier: {}", dossier.name.full);
    println!("Generated: {}", dossier.generated_at.to_rfc3339());
    println!();

    match &dossier.identity.resolved {
        Some(resolved) => {
            let provider = &resolved.provider;
            println!(
                "Identity: {} ({}), via {}",
                provider.name,
                provider.external_id.as_deref().unwrap_or("no identifier"),
                resolved.source
            );
            if let Some(specialty) = &provider.specialty {
                println!("Specialty: {}", specialty);
            }
            if provider.city.is_some() || provider.state.is_some() {
                println!(
                    "Location: {} {}",
                    provider.city.as_deref().unwrap_or(""),
                    provider.state.as_deref().unwrap_or("")
                );
            }
            if !resolved.alternates.is_empty() {
                println!("Alternate candidates: {}", resolved.alternates.len());
            }
        }
        None => {
            println!(
                "Identity: not resolved ({})",
                dossier
                    .identity
                    .diagnostic
                    .as_deref()
                    .unwrap_or("no diagnostic")
            );
        }
    }

    println!();
    if dossier.payments.found {
        let mut table = Table::new();
        table.add_row(row!["Counterparty", "Total", "Payments"]);
        for relationship in &dossier.payments.relationships {
            table.add_row(row![
                relationship.counterparty,
                format!("${:.2}", relationship.total_amount),
                relationship.payment_count
            ]);
        }
        table.printstd();
        println!(
            "Competitor total: ${:.2} | Designated total: ${:.2}",
            dossier.payments.competitor_total, dossier.payments.designated_total
        );
    } else {
        println!(
            "Payments: none found{}",
            dossier
                .payments
                .diagnostic
                .as_deref()
                .map(|d| format!(" ({})", d))
                .unwrap_or_default()
        );
    }

    println!();
    println!(
        "Publications: {} verified, {} unverified ({} total index hits)",
        dossier.publications.verified.len(),
        dossier.publications.unverified.len(),
        dossier.publications.total_count
    );
    for publication in &dossier.publications.verified {
        println!(
            "  [{}] {} ({}, {}) score={}",
            publication.confidence,
            publication.title,
            publication.journal,
            publication
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "n.d.".to_string()),
            publication.match_score
        );
    }
    if let Some(note) = &dossier.publications.note {
        println!("  {}", note);
    }

    if !dossier.education.professional_organizations.is_empty() {
        println!();
        println!("Likely professional organizations:");
        for organization in &dossier.education.professional_organizations {
            println!("  - {}", organization);
        }
    }
}
