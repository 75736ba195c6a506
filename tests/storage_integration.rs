use std::env;

use company_leads_api::db::Database;
use company_leads_api::db_storage::PgLeadRepository;
use company_leads_api::lead::{CreateLeadData, Lead, LeadContact, LeadStatus};
use company_leads_api::money;
use company_leads_api::repository::{LeadQuery, LeadRepository, Pagination, WriteOutcome};

/// Round trip of a lead through PostgreSQL, including the optimistic version check.
/// Marked ignored so it only runs against a database on purpose; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn lead_lifecycle_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url, 5).await?;
    let repository = PgLeadRepository::new(db.pool.clone());

    repository.health_check().await?;

    // Unique category so repeated runs can find their own row
    let category = format!("Smoke {}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    let mut lead = Lead::new(CreateLeadData {
        category: category.clone(),
        description: Some("Storage smoke test".to_string()),
        price: money::from_cents(60_000),
        contact_first_name: "Yuri".to_string(),
        suburb: "Richmond".to_string(),
    });

    assert_eq!(repository.create_lead(&lead).await?, WriteOutcome::Applied);
    assert_eq!(repository.create_lead(&lead).await?, WriteOutcome::Conflict);

    let stored = repository
        .get_lead(lead.id())
        .await?
        .ok_or_else(|| anyhow::anyhow!("created lead not found"))?;
    assert_eq!(stored.status(), LeadStatus::New);
    assert_eq!(stored.price(), &money::from_cents(60_000));

    lead.accept(LeadContact {
        full_name: "Yuri L".to_string(),
        email: "y@x.com".to_string(),
        phone_number: "0412345678".to_string(),
    })?;
    assert_eq!(repository.update_lead(&lead).await?, WriteOutcome::Applied);
    // Same snapshot again: the stored version has moved on
    assert_eq!(repository.update_lead(&lead).await?, WriteOutcome::Conflict);

    let accepted = repository
        .get_lead(lead.id())
        .await?
        .ok_or_else(|| anyhow::anyhow!("accepted lead not found"))?;
    assert_eq!(accepted.status(), LeadStatus::Accepted);
    assert_eq!(accepted.price(), &money::from_cents(54_000));
    assert_eq!(accepted.contact().map(|c| c.email.as_str()), Some("y@x.com"));
    assert_eq!(accepted.version(), lead.version() + 1);

    let query = LeadQuery::new(Some(LeadStatus::Accepted), Some(&category.to_lowercase()));
    let found = repository.query_leads(&query, Pagination::default()).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), lead.id());

    assert_eq!(repository.delete_lead(lead.id()).await?, WriteOutcome::Applied);
    assert_eq!(repository.delete_lead(lead.id()).await?, WriteOutcome::NotFound);
    assert!(repository.get_lead(lead.id()).await?.is_none());

    Ok(())
}
