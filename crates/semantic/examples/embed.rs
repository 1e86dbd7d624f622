use std::{env, error::Error};

use profile::OwnerKind;
use semantic::{Embedder, EmbeddingConfig, HttpEmbedder, StubEmbedder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let owner_id = args.next().unwrap_or_else(|| "example-candidate".into());
    let text = args
        .next()
        .unwrap_or_else(|| "Berlin-based developer with skills in rust, tokio".into());

    let cfg = EmbeddingConfig::default().with_env_overrides();
    let embedder: Box<dyn Embedder> = match cfg.api_url {
        Some(ref url) => {
            println!("Embedding through {url}");
            Box::new(HttpEmbedder::new(cfg.clone())?)
        }
        None => {
            println!("No embedding API configured, using the offline stub embedder");
            Box::new(StubEmbedder::from_config(cfg)?)
        }
    };

    let embedding = embedder.embed(&owner_id, OwnerKind::Candidate, &text).await?;
    println!("owner: {} ({})", embedding.owner_id, embedding.owner_kind);
    println!("model: {}", embedding.model_id);
    println!("dim: {}", embedding.vector.len());
    println!("truncated: {}", embedding.truncated);
    println!(
        "first values: {:?}",
        &embedding.vector[..embedding.vector.len().min(8)]
    );
    Ok(())
}
