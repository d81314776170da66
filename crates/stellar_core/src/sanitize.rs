//! Replacement of non-finite values.
//!
//! Every helper is idempotent: running it over already-finite data changes
//! nothing and reports zero replacements.

/// Replace NaN/Inf components with 0. Returns how many components changed.
pub fn sanitize_vectors(values: &mut [[f32; 3]]) -> usize {
    let mut replaced = 0;
    for v in values.iter_mut() {
        for c in v.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
                replaced += 1;
            }
        }
    }
    replaced
}

pub fn sanitize_scalars(values: &mut [f32]) -> usize {
    let mut replaced = 0;
    for c in values.iter_mut() {
        if !c.is_finite() {
            *c = 0.0;
            replaced += 1;
        }
    }
    replaced
}

/// Copy of a single vector with non-finite components zeroed
pub fn sanitized(v: [f32; 3]) -> [f32; 3] {
    v.map(|c| if c.is_finite() { c } else { 0.0 })
}

pub fn all_finite(values: &[[f32; 3]]) -> bool {
    values.iter().all(|v| v.iter().all(|c| c.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_non_finite() {
        let mut values = vec![[1.0, f32::NAN, 2.0], [f32::INFINITY, 0.5, f32::NEG_INFINITY]];
        assert!(!all_finite(&values));
        assert_eq!(sanitize_vectors(&mut values), 3);
        assert_eq!(values, vec![[1.0, 0.0, 2.0], [0.0, 0.5, 0.0]]);
        assert!(all_finite(&values));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let mut values = vec![[3.0, -4.0, 5.0], [f32::NAN, 1.0, 1.0]];
        sanitize_vectors(&mut values);
        let once = values.clone();
        assert_eq!(sanitize_vectors(&mut values), 0);
        assert_eq!(values, once);

        let mut masses = vec![1.0, f32::NAN];
        assert_eq!(sanitize_scalars(&mut masses), 1);
        assert_eq!(sanitize_scalars(&mut masses), 0);
    }

    #[test]
    fn test_sanitized_single() {
        assert_eq!(sanitized([f32::NAN, 2.0, f32::INFINITY]), [0.0, 2.0, 0.0]);
    }
}
