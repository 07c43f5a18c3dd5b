/// Compute the cosine similarity between two vectors.
///
/// Returns a value in `[-1, 1]` where 1 means identical direction and
/// -1 means opposite direction.
///
/// Uses f64 intermediate precision. Returns -1.0 for zero vectors or
/// dimension mismatches so that such comparisons can never clear a
/// match threshold.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return -1.0;
    }

    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;

    for i in 0..a.len() {
        let ai = a[i] as f64;
        let bi = b[i] as f64;
        dot += ai * bi;
        norm_a += ai * ai;
        norm_b += bi * bi;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return -1.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    // Clamp to [-1, 1] to handle floating point errors.
    similarity.clamp(-1.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let s = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((s - 1.0).abs() < 1e-6, "identical: got {s}");
    }

    #[test]
    fn test_orthogonal() {
        let s = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(s.abs() < 1e-6, "orthogonal: got {s}");
    }

    #[test]
    fn test_opposite() {
        let s = cosine_similarity(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0]);
        assert!((s + 1.0).abs() < 1e-6, "opposite: got {s}");
    }

    #[test]
    fn test_scale_invariant() {
        let s = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((s - 1.0).abs() < 1e-6, "scaled copies: got {s}");
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), -1.0);
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0]), -1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 0.0, 0.0]), -1.0);
    }
}
