//! Roster Board Demo
//!
//! Seeds an in-memory roster store, opens two concurrent viewers over it,
//! and drives an edit scenario through the synchronization engine: a
//! buffered profile edit on one viewer racing direct rank writes from the
//! other, converging to identical snapshots.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use roster_board::{
    BoardConfig, BoardView, MemoryStore, PlayerRecord, Rank, RecordId, RosterStore, VERSION,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Roster Board v{}", VERSION);

    demo_board().await
}

/// Demo function exercising the sync engine end to end.
async fn demo_board() -> anyhow::Result<()> {
    info!("=== Seeding Roster ===");

    let store = MemoryStore::new();
    let seeds = [
        ("p1", "Ada", "ada#001", Rank::Iron, Some("1")),
        ("p2", "Bo", "bo#777", Rank::Silver, Some("3")),
        ("p3", "Caro", "caro#misc", Rank::Gold, Some("2")),
        ("p4", "Dee", "dee#0004", Rank::Radiant, None),
        ("p5", "Edri", "edri#koi", Rank::Unranked, None),
    ];
    for (id, name, riot_id, rank, division) in seeds {
        let mut record = PlayerRecord::new(RecordId::new(id));
        record.name = Some(name.to_string());
        record.riot_id = Some(riot_id.to_string());
        record.rank = rank;
        record.division = division.map(str::to_string);
        store.insert(record).await;
    }

    let config = BoardConfig {
        store_url: "memory://demo".into(),
        store_key: "demo-key".into(),
        ..BoardConfig::default()
    };

    let shared: Arc<dyn RosterStore> = Arc::new(store.clone());
    let mut viewer_a = BoardView::open(config.clone(), shared.clone()).await?;
    let viewer_b = BoardView::open(config, shared).await?;

    info!("=== Roster (Viewer A) ===");
    for record in viewer_a.roster().await {
        info!(
            id = %record.id,
            name = record.name.as_deref().unwrap_or("-"),
            rank = %record.rank,
            division = record.division.as_deref().unwrap_or("-"),
            tier = record.tier_id(),
            icon = %viewer_a.icon_url_for(&record),
            "roster row"
        );
    }

    info!("=== Concurrent Edits ===");
    let ada = RecordId::new("p1");

    // Viewer A types a new name while viewer B promotes the same player.
    viewer_a.start_edit(&ada).await?;
    viewer_a.set_name("Ada K.");
    viewer_b.set_rank(&ada, Rank::Gold).await?;
    viewer_b.set_division(&ada, "2").await?;
    info!("viewer B promoted Ada to Gold 2 while viewer A was typing");

    let committed = viewer_a.finish_edit().await?;
    if let Some(record) = committed {
        info!(
            name = record.name.as_deref().unwrap_or("-"),
            rank = %record.rank,
            division = record.division.as_deref().unwrap_or("-"),
            "viewer A committed its edit"
        );
    }

    info!("=== Verifying Convergence ===");
    let mut converged = false;
    for _ in 0..200 {
        let settled = viewer_a.record(&ada).await.is_some_and(|r| {
            r.name.as_deref() == Some("Ada K.")
                && r.rank == Rank::Gold
                && r.division.as_deref() == Some("2")
        });
        if settled && viewer_a.snapshot_hash().await == viewer_b.snapshot_hash().await {
            converged = true;
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }

    let hash_a = viewer_a.snapshot_hash().await;
    let hash_b = viewer_b.snapshot_hash().await;
    info!("Viewer A snapshot: {}", hex::encode(hash_a));
    info!("Viewer B snapshot: {}", hex::encode(hash_b));

    if converged {
        info!("CONVERGENCE VERIFIED: both viewers see the merged edits");
    } else {
        warn!("CONVERGENCE FAILURE: snapshots differ");
    }

    info!("=== Final Roster ===");
    for record in viewer_a.roster().await {
        info!(
            name = record.name.as_deref().unwrap_or("-"),
            rank = %record.rank,
            division = record.division.as_deref().unwrap_or("-"),
            tier = record.tier_id(),
            updated = %record
                .last_updated
                .map(|t| t.format("%m/%d %H:%M").to_string())
                .unwrap_or_else(|| "--/-- --:--".into()),
            "roster row"
        );
    }

    viewer_a.close().await;
    viewer_b.close().await;

    Ok(())
}
