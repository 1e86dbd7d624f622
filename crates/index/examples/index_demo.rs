use std::error::Error;

use index::{InMemoryVectorIndex, IndexPoint, PayloadFilter, PointPayload, VectorIndex};
use profile::OwnerKind;
use serde_json::json;

fn point(kind: OwnerKind, id: &str, summary: &str, vector: Vec<f32>) -> IndexPoint {
    IndexPoint::new(
        id,
        vector,
        PointPayload {
            owner_kind: kind,
            owner_id: id.into(),
            summary: summary.into(),
            model_id: "demo".into(),
            truncated: false,
            data: json!({ "source": "index_demo" }),
        },
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let store = InMemoryVectorIndex::new();
    store.create_collection("profiles", 4)?;
    let index = store.client("profiles");

    // Two jobs and a candidate. The candidate shares an id with a job on purpose.
    let points = vec![
        point(OwnerKind::Job, "42", "Rust backend role", vec![0.9, 0.1, 0.0, 0.2]),
        point(OwnerKind::Job, "43", "Frontend role", vec![0.0, 0.8, 0.6, 0.0]),
        point(OwnerKind::Candidate, "42", "Rust developer", vec![1.0, 0.0, 0.1, 0.2]),
    ];
    index.upsert_batch(points).await?;
    println!(
        "Stored {} points ({} jobs).",
        index.count(&PayloadFilter::any()).await?,
        index.count(&PayloadFilter::kind(OwnerKind::Job)).await?
    );

    let candidate = index
        .get(OwnerKind::Candidate, "42")
        .await?
        .ok_or("candidate 42 missing")?;
    let hits = index
        .query(&candidate.vector, 2, &PayloadFilter::kind(OwnerKind::Job))
        .await?;
    for hit in hits {
        println!("{:<4} {:.3}  {}", hit.id, hit.similarity, hit.payload.summary);
    }
    Ok(())
}
