use crate::error::IndexError;
use crate::types::ScoredPoint;

/// Chunk size for the auto-vectorized inner loop.
const CHUNK: usize = 32;

/// Reject vectors holding NaN or an infinity.
pub fn ensure_finite(id: &str, vector: &[f32]) -> Result<(), IndexError> {
    match vector.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(position) => Err(IndexError::NonFiniteVector {
            id: id.to_string(),
            position,
            value: vector[position],
        }),
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 when either is zero or
/// the lengths differ.
///
/// Accumulates in `f64` so large finite components cannot overflow the norms.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0f64;
    let mut norm_a = 0f64;
    let mut norm_b = 0f64;
    for (ca, cb) in a.chunks(CHUNK).zip(b.chunks(CHUNK)) {
        for (&x, &y) in ca.iter().zip(cb) {
            let (x, y) = (f64::from(x), f64::from(y));
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}

/// Descending similarity, ties broken by ascending id.
///
/// Uses the IEEE total order, so the ranking is stable even if a NaN slips in.
pub fn rank(results: &mut Vec<ScoredPoint>, top_k: usize) {
    results.sort_unstable_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.payload.owner_kind.cmp(&b.payload.owner_kind))
    });
    results.truncate(top_k);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointPayload;
    use profile::OwnerKind;

    fn hit(id: &str, similarity: f32) -> ScoredPoint {
        ScoredPoint {
            id: id.into(),
            similarity,
            payload: PointPayload {
                owner_kind: OwnerKind::Job,
                owner_id: id.into(),
                summary: String::new(),
                model_id: "m".into(),
                truncated: false,
                data: serde_json::Value::Null,
            },
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_is_scale_invariant_across_chunks() {
        let a: Vec<f32> = (0..100).map(|i| (i as f32).sin()).collect();
        let b: Vec<f32> = a.iter().map(|x| x * 3.5).collect();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rank_breaks_ties_by_id() {
        let mut results = vec![hit("b", 0.5), hit("c", 0.9), hit("a", 0.5), hit("d", 0.1)];
        rank(&mut results, 3);
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn cosine_survives_components_that_overflow_f32_squares() {
        let a = vec![3.0e20_f32, 0.0, 4.0e20];
        let b = vec![3.0_f32, 0.0, 4.0];
        let similarity = cosine_similarity(&a, &b);
        assert!(similarity.is_finite());
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rank_orders_nan_deterministically() {
        let mut first = vec![hit("b", f32::NAN), hit("a", 0.4), hit("c", 0.9)];
        let mut second = vec![hit("c", 0.9), hit("b", f32::NAN), hit("a", 0.4)];
        rank(&mut first, 3);
        rank(&mut second, 3);
        let ids = |r: &[ScoredPoint]| r.iter().map(|h| h.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        let pos = |id: &str| first.iter().position(|h| h.id == id).unwrap();
        assert!(pos("c") < pos("a"));
    }

    #[test]
    fn non_finite_components_are_located() {
        assert!(ensure_finite("p", &[0.5, -1.0]).is_ok());
        let err = ensure_finite("p", &[0.5, f32::INFINITY, f32::NAN]).unwrap_err();
        assert!(matches!(err, IndexError::NonFiniteVector { position: 1, .. }));
        assert!(!err.is_retryable());
        assert!(!err.is_fatal());
    }
}
