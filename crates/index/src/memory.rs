use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use profile::OwnerKind;
use tracing::debug;

use crate::similarity::{cosine_similarity, ensure_finite, rank};
use crate::types::{point_key, IndexPoint, PayloadFilter, ScoredPoint};
use crate::{IndexError, VectorIndex};

/// Id reported in errors about a query vector.
const QUERY_ID: &str = "<query>";

#[derive(Debug)]
struct Collection {
    dimension: usize,
    points: BTreeMap<String, IndexPoint>,
}

impl Collection {
    fn check_point(&self, point: &IndexPoint) -> Result<(), IndexError> {
        if point.vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                id: point.id.clone(),
                expected: self.dimension,
                actual: point.vector.len(),
            });
        }
        ensure_finite(&point.id, &point.vector)
    }
}

/// Process-local vector index holding any number of named collections.
///
/// Collections must be created with [`create_collection`](Self::create_collection)
/// before a [`client`](Self::client) bound to them can read or write. Clones
/// share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectorIndex {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a collection. Re-creating one with the same dimension is a no-op.
    pub fn create_collection(&self, name: &str, dimension: usize) -> Result<(), IndexError> {
        if dimension == 0 {
            return Err(IndexError::Configuration(format!(
                "collection `{name}` needs a positive dimension"
            )));
        }
        let mut guard = self
            .collections
            .write()
            .map_err(|_| IndexError::backend("poisoned lock"))?;
        match guard.get(name) {
            Some(existing) if existing.dimension != dimension => Err(IndexError::Configuration(
                format!(
                    "collection `{name}` already exists with dimension {}",
                    existing.dimension
                ),
            )),
            Some(_) => Ok(()),
            None => {
                guard.insert(
                    name.to_string(),
                    Collection {
                        dimension,
                        points: BTreeMap::new(),
                    },
                );
                Ok(())
            }
        }
    }

    /// A client bound to `name`. The collection does not have to exist yet;
    /// every operation checks.
    pub fn client(&self, name: &str) -> InMemoryCollection {
        InMemoryCollection {
            store: self.clone(),
            name: name.to_string(),
        }
    }
}

/// [`VectorIndex`] over one collection of an [`InMemoryVectorIndex`].
#[derive(Debug, Clone)]
pub struct InMemoryCollection {
    store: InMemoryVectorIndex,
    name: String,
}

impl InMemoryCollection {
    fn read<T>(&self, f: impl FnOnce(&Collection) -> T) -> Result<T, IndexError> {
        let guard = self
            .store
            .collections
            .read()
            .map_err(|_| IndexError::backend("poisoned lock"))?;
        let collection = guard
            .get(&self.name)
            .ok_or_else(|| IndexError::missing_collection(&self.name))?;
        Ok(f(collection))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Collection) -> Result<T, IndexError>,
    ) -> Result<T, IndexError> {
        let mut guard = self
            .store
            .collections
            .write()
            .map_err(|_| IndexError::backend("poisoned lock"))?;
        let collection = guard
            .get_mut(&self.name)
            .ok_or_else(|| IndexError::missing_collection(&self.name))?;
        f(collection)
    }
}

#[async_trait]
impl VectorIndex for InMemoryCollection {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, point: IndexPoint) -> Result<(), IndexError> {
        self.write(|collection| {
            collection.check_point(&point)?;
            debug!(collection = %self.name, id = %point.id, kind = %point.owner_kind(), "point_upserted");
            collection.points.insert(point.key(), point);
            Ok(())
        })
    }

    async fn upsert_batch(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        // All-or-nothing: nothing is written if any point is rejected.
        self.write(|collection| {
            for point in &points {
                collection.check_point(point)?;
            }
            let count = points.len();
            for point in points {
                collection.points.insert(point.key(), point);
            }
            debug!(collection = %self.name, count, "points_upserted");
            Ok(())
        })
    }

    async fn get(&self, kind: OwnerKind, id: &str) -> Result<Option<IndexPoint>, IndexError> {
        let key = point_key(kind, id);
        self.read(|collection| collection.points.get(&key).cloned())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<ScoredPoint>, IndexError> {
        let dimension = self.read(|collection| collection.dimension)?;
        if vector.len() != dimension {
            return Err(IndexError::DimensionMismatch {
                id: QUERY_ID.into(),
                expected: dimension,
                actual: vector.len(),
            });
        }
        ensure_finite(QUERY_ID, vector)?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut results = self.read(|collection| {
            collection
                .points
                .values()
                .filter(|p| filter.matches(&p.payload))
                .map(|p| ScoredPoint {
                    id: p.id.clone(),
                    similarity: cosine_similarity(vector, &p.vector),
                    payload: p.payload.clone(),
                })
                .collect::<Vec<_>>()
        })?;
        rank(&mut results, top_k);
        Ok(results)
    }

    async fn count(&self, filter: &PayloadFilter) -> Result<usize, IndexError> {
        self.read(|collection| {
            collection
                .points
                .values()
                .filter(|p| filter.matches(&p.payload))
                .count()
        })
    }
}
