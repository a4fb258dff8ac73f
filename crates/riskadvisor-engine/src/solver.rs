//! Exact 0/1 selection under a single cost constraint.
//!
//! Depth-first branch-and-bound over items sorted by value density, pruned
//! with the fractional (LP-relaxation) bound. Catalogs are tens of items,
//! so the search is exhaustive in the worst case and fast in practice.

use std::cmp::Ordering;

const EPS: f64 = 1e-9;

/// One binary decision variable.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    /// Objective coefficient (maximized).
    pub value: f64,
    /// Constraint coefficient.
    pub cost: f64,
}

/// The optimal subset, as indices into the input slice (ascending).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub chosen: Vec<usize>,
    pub value: f64,
    pub cost: f64,
}

/// Maximize `Σ value·x` subject to `Σ cost·x <= capacity`, `x ∈ {0,1}`.
///
/// Items with non-positive value are never chosen. Among optimal subsets
/// the cheaper one wins; remaining ties keep the first subset found.
/// A negative or non-finite capacity selects nothing.
pub fn solve(items: &[Item], capacity: f64) -> Selection {
    if !(capacity.is_finite() && capacity >= 0.0) {
        return Selection::default();
    }

    let mut order: Vec<usize> = (0..items.len())
        .filter(|&i| items[i].value > 0.0 && items[i].cost <= capacity)
        .collect();
    order.sort_by(|&a, &b| {
        density(&items[b])
            .partial_cmp(&density(&items[a]))
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut search = Search {
        items,
        order: &order,
        capacity,
        current: Vec::with_capacity(order.len()),
        best: Selection::default(),
    };
    search.branch(0, 0.0, 0.0);

    let mut best = search.best;
    best.chosen.sort_unstable();
    best
}

fn density(item: &Item) -> f64 {
    if item.cost > 0.0 {
        item.value / item.cost
    } else {
        f64::INFINITY
    }
}

struct Search<'a> {
    items: &'a [Item],
    order: &'a [usize],
    capacity: f64,
    current: Vec<usize>,
    best: Selection,
}

impl Search<'_> {
    fn branch(&mut self, pos: usize, value: f64, cost: f64) {
        if self.improves(value, cost) {
            self.best = Selection {
                chosen: self.current.clone(),
                value,
                cost,
            };
        }
        if pos == self.order.len() {
            return;
        }
        if self.upper_bound(pos, value, cost) < self.best.value - EPS {
            return;
        }

        let idx = self.order[pos];
        let item = self.items[idx];
        if cost + item.cost <= self.capacity {
            self.current.push(idx);
            self.branch(pos + 1, value + item.value, cost + item.cost);
            self.current.pop();
        }
        self.branch(pos + 1, value, cost);
    }

    fn improves(&self, value: f64, cost: f64) -> bool {
        value > self.best.value + EPS
            || ((value - self.best.value).abs() <= EPS && cost < self.best.cost - EPS)
    }

    /// Greedy fractional fill of the remaining capacity.
    fn upper_bound(&self, pos: usize, value: f64, cost: f64) -> f64 {
        let mut bound = value;
        let mut room = self.capacity - cost;
        for &idx in &self.order[pos..] {
            let item = self.items[idx];
            if item.cost <= room {
                bound += item.value;
                room -= item.cost;
            } else {
                if item.cost > 0.0 {
                    bound += item.value * (room / item.cost);
                }
                break;
            }
        }
        bound
    }
}
