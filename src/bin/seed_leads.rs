//! Fills the database with fake leads for local development.
//!
//! Usage: `seed_leads [COUNT]` (defaults to 50). Requires `DATABASE_URL`.

use rand::Rng;
use tracing_subscriber::EnvFilter;

use company_leads_api::config::Config;
use company_leads_api::db::Database;
use company_leads_api::domain::lead::{CreateLeadData, Lead, LeadContact};
use company_leads_api::integrations::db_storage::PgLeadRepository;
use company_leads_api::integrations::repository::{LeadRepository, WriteOutcome};
use company_leads_api::money;

const CATEGORIES: &[&str] = &[
    "Painter",
    "Interior Painter",
    "Carpenter",
    "Plumber",
    "Electrician",
    "Engineer",
    "Architect",
    "Roofer",
    "Flooring installer",
    "Safety Manager",
    "Welder",
    "Drywall installer",
];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Chloe", "Daniel", "Emma", "Felipe", "Grace", "Hugo", "Isla", "Jack",
];

const LAST_NAMES: &[&str] = &[
    "Silva", "Nguyen", "Smith", "Rossi", "Walker", "Kowalski", "Tanaka", "Brown",
];

const STREETS: &[&str] = &[
    "George Street",
    "Smith Street",
    "Chapel Street",
    "King Street",
    "Ocean Road",
    "Station Avenue",
];

const DESCRIPTIONS: &[&str] = &[
    "Two bedrooms need repainting before the end of the month",
    "Leaking pipe under the kitchen sink",
    "Replace old switchboard and add three power points",
    "Quote for timber decking around the pool",
    "Fix storm damage on the back roof",
];

fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// A random lead, left `New`, accepted or declined through the state machine.
fn fake_lead(rng: &mut impl Rng) -> anyhow::Result<Lead> {
    let first_name = pick(rng, FIRST_NAMES);

    let data = CreateLeadData {
        category: pick(rng, CATEGORIES).to_string(),
        description: if rng.gen_bool(0.7) {
            Some(pick(rng, DESCRIPTIONS).to_string())
        } else {
            None
        },
        price: money::from_cents(rng.gen_range(1..=100_000)),
        contact_first_name: first_name.to_string(),
        suburb: format!("{} {}", rng.gen_range(1..300), pick(rng, STREETS)),
    };
    data.validate()?;

    let mut lead = Lead::new(data);

    match rng.gen_range(0..3) {
        0 => {}
        1 => {
            let last_name = pick(rng, LAST_NAMES);
            lead.accept(LeadContact {
                full_name: format!("{} {}", first_name, last_name),
                email: format!(
                    "{}.{}@example.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase()
                ),
                phone_number: format!("04{:08}", rng.gen_range(0..100_000_000)),
            })?;
        }
        _ => lead.decline()?,
    }

    Ok(lead)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let count: usize = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()
        .map_err(|_| anyhow::anyhow!("COUNT must be a positive number"))?
        .unwrap_or(50);

    let config = Config::from_env()?;
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required to seed leads"))?;

    let db = Database::new(database_url, config.db_max_connections).await?;
    let repository = PgLeadRepository::new(db.pool);

    let mut rng = rand::thread_rng();
    let mut inserted = 0;

    for _ in 0..count {
        let lead = fake_lead(&mut rng)?;
        match repository.create_lead(&lead).await? {
            WriteOutcome::Applied => inserted += 1,
            outcome => tracing::warn!("Lead {} not inserted: {:?}", lead.id(), outcome),
        }
    }

    tracing::info!("Seeded {} of {} leads", inserted, count);

    Ok(())
}
