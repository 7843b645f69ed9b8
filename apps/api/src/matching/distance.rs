//! Distance metrics between profile vectors.
//!
//! Vectors of different length are compared as if the shorter one were
//! padded with zeros.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distances {
    pub euclidean: f64,
    pub manhattan: f64,
    pub cosine: f64,
}

fn padded<'a>(a: &'a [f64], b: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    let len = a.len().max(b.len());
    (0..len).map(move |i| {
        (
            a.get(i).copied().unwrap_or(0.0),
            b.get(i).copied().unwrap_or(0.0),
        )
    })
}

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    padded(a, b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

pub fn manhattan(a: &[f64], b: &[f64]) -> f64 {
    padded(a, b).map(|(x, y)| (x - y).abs()).sum()
}

/// `1 - cos(a, b)`. Exactly 1.0 when either vector has zero magnitude.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let dot: f64 = padded(a, b).map(|(x, y)| x * y).sum();
    // Rounding can push the ratio a hair past 1.
    (1.0 - dot / (norm_a * norm_b)).max(0.0)
}

pub fn distances(a: &[f64], b: &[f64]) -> Distances {
    Distances {
        euclidean: euclidean(a, b),
        manhattan: manhattan(a, b),
        cosine: cosine(a, b),
    }
}
