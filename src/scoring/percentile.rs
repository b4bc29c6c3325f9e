/// Percentile rank of `score` within `population`, counting ties as half.
///
/// `(count(< score) + count(<= score)) / 2 / n * 100`. An empty population
/// yields 0.0.
pub fn percentile_of_score(population: &[f64], score: f64) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let below = population.iter().filter(|&&v| v < score).count();
    let at_or_below = population.iter().filter(|&&v| v <= score).count();
    (below + at_or_below) as f64 / 2.0 / population.len() as f64 * 100.0
}

/// Percentile rank of every member against the whole population, in order.
pub fn percentile_ranks(population: &[f64]) -> Vec<f64> {
    population
        .iter()
        .map(|&score| percentile_of_score(population, score))
        .collect()
}
