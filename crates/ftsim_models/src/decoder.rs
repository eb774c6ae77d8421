//! Minimum-weight perfect matching decoder.
//!
//! Each sector is decoded independently: the bit values of its qubits give
//! a set of defects, shortest paths between defects (and to the boundary)
//! are found with Dijkstra over blueprint weights, and the cheapest perfect
//! matching is flipped back into the bits. The trial succeeds when no
//! sector is left with a logical error.

use crate::error::{ModelError, Result, check_delta};
use crate::gkp::{SWAPPED_ERROR_PROBABILITY, bin_outcome, bit_error_probability, blueprint_weight};
use crate::lattice::{Lattice, SurfaceCode};
use crate::record::SyndromeRecord;
use bitvec::prelude::*;
use core::cmp::Ordering;
use ftsim_core::{Code, Decoder, DecoderConfig, InnerDecoder, OuterDecoder};
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// Largest defect count matched exactly; larger sets fall back to greedy.
pub const EXACT_MATCHING_LIMIT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partner {
    Boundary,
    Defect(usize),
}

/// Shortest-path tree rooted at one defect.
struct PathTree {
    dist: Vec<f64>,
    prev: Vec<Option<(usize, usize)>>,
}

#[derive(Clone, Copy)]
struct HeapEntry {
    cost: f64,
    node: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Reversed so the max-heap pops the cheapest entry.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

fn shortest_paths(lattice: &Lattice, weights: &[f64], source: usize) -> PathTree {
    let n = lattice.num_nodes();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    heap.push(HeapEntry {
        cost: 0.0,
        node: source,
    });

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        for &(next, edge) in lattice.neighbors(node) {
            let candidate = cost + weights[edge];
            if candidate < dist[next] {
                dist[next] = candidate;
                prev[next] = Some((node, edge));
                heap.push(HeapEntry {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }

    PathTree { dist, prev }
}

/// Exact matching by dynamic programming over defect subsets.
fn match_exact(pair: &[Vec<f64>], to_boundary: &[f64]) -> Option<Vec<(usize, Partner)>> {
    let k = to_boundary.len();
    let full = (1usize << k) - 1;
    let mut cost = vec![f64::INFINITY; full + 1];
    let mut choice = vec![None; full + 1];
    cost[0] = 0.0;

    for mask in 1..=full {
        let i = mask.trailing_zeros() as usize;
        let rest = mask & !(1 << i);

        let via_boundary = cost[rest] + to_boundary[i];
        if via_boundary < cost[mask] {
            cost[mask] = via_boundary;
            choice[mask] = Some(Partner::Boundary);
        }

        let mut others = rest;
        while others != 0 {
            let j = others.trailing_zeros() as usize;
            others &= others - 1;
            let candidate = cost[rest & !(1 << j)] + pair[i][j];
            if candidate < cost[mask] {
                cost[mask] = candidate;
                choice[mask] = Some(Partner::Defect(j));
            }
        }
    }

    if !cost[full].is_finite() {
        return None;
    }

    let mut matching = Vec::with_capacity(k);
    let mut mask = full;
    while mask != 0 {
        let i = mask.trailing_zeros() as usize;
        let partner = choice[mask]?;
        mask &= !(1 << i);
        if let Partner::Defect(j) = partner {
            mask &= !(1 << j);
        }
        matching.push((i, partner));
    }
    Some(matching)
}

/// Cheapest-first greedy matching.
fn match_greedy(pair: &[Vec<f64>], to_boundary: &[f64]) -> Option<Vec<(usize, Partner)>> {
    let k = to_boundary.len();
    let mut candidates = Vec::with_capacity(k * (k + 1) / 2);
    for i in 0..k {
        for j in i + 1..k {
            candidates.push((pair[i][j], i, Partner::Defect(j)));
        }
    }
    for (i, &cost) in to_boundary.iter().enumerate() {
        candidates.push((cost, i, Partner::Boundary));
    }
    candidates.retain(|(cost, _, _)| cost.is_finite());
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut matched = bitvec![0; k];
    let mut matching = Vec::with_capacity(k);
    for (_, i, partner) in candidates {
        if matched[i] {
            continue;
        }
        match partner {
            Partner::Defect(j) if !matched[j] => {
                matched.set(i, true);
                matched.set(j, true);
                matching.push((i, partner));
            }
            Partner::Defect(_) => {}
            Partner::Boundary => {
                matched.set(i, true);
                matching.push((i, partner));
            }
        }
    }

    matched.all().then_some(matching)
}

/// Bits and edge weights of one sector.
struct SectorInput {
    bits: BitVec,
    weights: Vec<f64>,
}

/// Matching decoder over a [`SurfaceCode`].
#[derive(Debug, Clone, Copy)]
pub struct MatchingDecoder {
    exact_limit: usize,
}

impl Default for MatchingDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingDecoder {
    pub fn new() -> Self {
        Self {
            exact_limit: EXACT_MATCHING_LIMIT,
        }
    }

    /// Decoder matching up to `limit` defects exactly, capped at
    /// [`EXACT_MATCHING_LIMIT`].
    pub fn with_exact_limit(limit: usize) -> Self {
        Self {
            exact_limit: limit.min(EXACT_MATCHING_LIMIT),
        }
    }

    fn sector_input(
        lattice: &Lattice,
        sector: usize,
        record: &SyndromeRecord,
        config: &DecoderConfig,
    ) -> Result<SectorInput> {
        let range = lattice.sector_qubits(sector);
        let mut bits = bitvec![0; range.len()];
        let mut weights = Vec::with_capacity(range.len());

        match config {
            DecoderConfig::Direct { inner, weights: w, .. } => {
                check_delta(w.delta)?;
                let p_gkp = bit_error_probability(w.delta);
                for (e, q) in range.enumerate() {
                    if !record.measured[q] {
                        return Err(ModelError::MissingOutcome(q));
                    }
                    let bit = match inner {
                        InnerDecoder::Basic => bin_outcome(record.outcomes[q]),
                    };
                    bits.set(e, bit);
                    let p = if record.swapped[q] {
                        SWAPPED_ERROR_PROBABILITY
                    } else {
                        p_gkp
                    };
                    weights.push(blueprint_weight(p, w.multiplier, w.integer));
                }
            }
            DecoderConfig::Precomputed { .. } => {
                let pre = record
                    .precomputed
                    .as_ref()
                    .ok_or(ModelError::MissingPrecomputed)?;
                for (e, q) in range.enumerate() {
                    bits.set(e, pre.bits[q]);
                    weights.push(blueprint_weight(pre.error_probs[q], 1, false));
                }
            }
        }

        Ok(SectorInput { bits, weights })
    }

    /// Corrects one sector in place and reports whether it is logically
    /// clean afterwards.
    fn decode_sector(
        &self,
        lattice: &Lattice,
        sector: usize,
        input: &mut SectorInput,
    ) -> Result<bool> {
        let defects = lattice.defects(&input.bits);
        if defects.is_empty() {
            return Ok(!lattice.has_logical_error(&input.bits));
        }

        let trees: Vec<PathTree> = defects
            .iter()
            .map(|&d| shortest_paths(lattice, &input.weights, d))
            .collect();
        let k = defects.len();
        let pair: Vec<Vec<f64>> = trees
            .iter()
            .map(|tree| defects.iter().map(|&d| tree.dist[d]).collect())
            .collect();
        let to_boundary: Vec<f64> = match lattice.boundary_node() {
            Some(b) => trees.iter().map(|tree| tree.dist[b]).collect(),
            None => vec![f64::INFINITY; k],
        };

        let matching = if k <= self.exact_limit {
            match_exact(&pair, &to_boundary)
        } else {
            debug!(sector, defects = k, "falling back to greedy matching");
            match_greedy(&pair, &to_boundary)
        }
        .ok_or(ModelError::NoMatching { sector, defects: k })?;

        for (i, partner) in matching {
            let target = match partner {
                Partner::Defect(j) => defects[j],
                Partner::Boundary => lattice
                    .boundary_node()
                    .ok_or(ModelError::NoMatching { sector, defects: k })?,
            };
            let tree = &trees[i];
            let mut node = target;
            while let Some((from, edge)) = tree.prev[node] {
                let flipped = !input.bits[edge];
                input.bits.set(edge, flipped);
                node = from;
            }
        }

        trace!(sector, defects = k, "applied matching correction");
        Ok(!lattice.has_logical_error(&input.bits))
    }
}

impl Decoder<SurfaceCode, SyndromeRecord> for MatchingDecoder {
    type Error = ModelError;

    fn correct(
        &self,
        code: &SurfaceCode,
        syndrome: &SyndromeRecord,
        config: &DecoderConfig,
    ) -> Result<bool> {
        let lattice = code.graph();
        if syndrome.len() != lattice.num_qubits() {
            return Err(ModelError::RecordMismatch {
                expected: lattice.num_qubits(),
                actual: syndrome.len(),
            });
        }
        match config.outer() {
            OuterDecoder::Mwpm => {}
        }

        let mut success = true;
        for sector in 0..lattice.num_sectors() {
            let mut input = Self::sector_input(lattice, sector, syndrome, config)?;
            success &= self.decode_sector(lattice, sector, &mut input)?;
        }
        Ok(success)
    }
}
