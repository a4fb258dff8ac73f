//! Monte Carlo uncertainty bounds for a portfolio.
//!
//! Each draw samples every selected strategy's cost from its triangular
//! (min, most likely, max) distribution and its risk reduction from a normal
//! around the point estimate with `std = risk * (1 - confidence)`. Totals
//! are summed per draw; the risk total is capped like any portfolio total.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Triangular};

use riskadvisor_core::{Portfolio, Strategy, UncertaintyBounds, PORTFOLIO_RISK_CAP};

/// A generator for one analysis call: seeded when a seed is configured,
/// from entropy otherwise.
pub fn rng_for(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

enum CostSampler {
    Fixed(f64),
    Triangular(Triangular<f64>),
}

impl CostSampler {
    fn for_strategy(strategy: &Strategy) -> Self {
        let cost = strategy.cost();
        if cost.is_degenerate() {
            return Self::Fixed(cost.most_likely);
        }
        match Triangular::new(cost.min, cost.max, cost.most_likely) {
            Ok(dist) => Self::Triangular(dist),
            Err(_) => Self::Fixed(cost.most_likely),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Fixed(value) => *value,
            Self::Triangular(dist) => dist.sample(rng),
        }
    }
}

enum RiskSampler {
    Fixed(f64),
    Normal(Normal<f64>),
}

impl RiskSampler {
    fn for_strategy(strategy: &Strategy) -> Self {
        let mean = strategy.risk_reduction_pct();
        let std_dev = mean * (1.0 - strategy.confidence());
        if std_dev <= 0.0 {
            return Self::Fixed(mean);
        }
        match Normal::new(mean, std_dev) {
            Ok(dist) => Self::Normal(dist),
            Err(_) => Self::Fixed(mean),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Fixed(value) => *value,
            Self::Normal(dist) => dist.sample(rng),
        }
    }
}

/// Draw `n_simulations` portfolio totals and return their 5th/95th
/// percentiles.
///
/// An empty portfolio or zero draws yields all-zero bounds.
pub fn simulate<R: Rng + ?Sized>(
    portfolio: &Portfolio,
    n_simulations: usize,
    rng: &mut R,
) -> UncertaintyBounds {
    let (costs, risks) = draw(portfolio, n_simulations, rng);
    let bounds = UncertaintyBounds {
        simulations: n_simulations,
        cost_p5: percentile(&costs, 5.0),
        cost_p95: percentile(&costs, 95.0),
        risk_reduction_p5: percentile(&risks, 5.0),
        risk_reduction_p95: percentile(&risks, 95.0),
    };
    tracing::debug!(
        simulations = n_simulations,
        cost_p5 = bounds.cost_p5,
        cost_p95 = bounds.cost_p95,
        "Monte Carlo bounds computed"
    );
    bounds
}

/// Sorted per-draw totals of cost and (capped) risk reduction.
pub fn draw<R: Rng + ?Sized>(
    portfolio: &Portfolio,
    n_simulations: usize,
    rng: &mut R,
) -> (Vec<f64>, Vec<f64>) {
    let samplers: Vec<(CostSampler, RiskSampler)> = portfolio
        .strategies
        .iter()
        .map(|s| (CostSampler::for_strategy(s), RiskSampler::for_strategy(s)))
        .collect();

    let mut costs = Vec::with_capacity(n_simulations);
    let mut risks = Vec::with_capacity(n_simulations);
    for _ in 0..n_simulations {
        let mut cost = 0.0;
        let mut risk = 0.0;
        for (cost_sampler, risk_sampler) in &samplers {
            cost += cost_sampler.sample(rng);
            risk += risk_sampler.sample(rng);
        }
        costs.push(cost);
        risks.push(risk.min(PORTFOLIO_RISK_CAP));
    }

    costs.sort_by(f64::total_cmp);
    risks.sort_by(f64::total_cmp);
    (costs, risks)
}

/// Percentile of sorted data with linear interpolation between closest
/// ranks. Empty input gives 0.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}
