//! Surface-code matching lattice.
//!
//! Builds the qubit-level matching graph of a distance-`d` surface code.
//! Detectors (stabilizers) are nodes and qubits are edges; an error on a
//! qubit flips the two detectors at its ends. Open boundaries attach the
//! dangling qubits to one virtual boundary node per sector. A scheme with
//! both primal and dual correction carries two sectors with disjoint qubit
//! ranges.

use crate::error::{ModelError, Result};
use crate::macro_reduce::MacroLattice;
use bitvec::prelude::*;
use ftsim_common::{Boundary, EcScheme};
use ftsim_core::Code;
use tracing::debug;

/// Matching graph shared by every sector of a code.
#[derive(Debug, Clone)]
pub struct Lattice {
    distance: usize,
    ec: EcScheme,
    boundary: Boundary,
    sectors: usize,

    /// Real detectors per sector.
    detectors: usize,

    /// Detector nodes plus the boundary node, if any, per sector.
    nodes: usize,

    /// Qubit edges of one sector as (u, v) node pairs.
    ///
    /// Edge `e` of sector `s` is global qubit `s * edges.len() + e`.
    pub fast_edges: Vec<(u32, u32)>,

    /// Incident (neighbour, edge) pairs per node.
    adjacency: Vec<Vec<(usize, usize)>>,

    /// Edge sets whose crossing parity detects a logical error.
    logical_cuts: Vec<Vec<usize>>,
}

impl Lattice {
    /// Builds the lattice for a code distance, EC scheme and boundary.
    ///
    /// # Arguments
    ///
    /// * `distance` - Code distance, at least 2
    /// * `ec` - Sector selection
    /// * `boundary` - Open (planar) or periodic (toric)
    ///
    /// # Returns
    ///
    /// The lattice, or an error if the distance is too small.
    pub fn new(distance: usize, ec: EcScheme, boundary: Boundary) -> Result<Self> {
        if distance < 2 {
            return Err(ModelError::invalid_parameter(
                "distance",
                format!("{distance} is below the minimum of 2"),
            ));
        }

        let (detectors, nodes, edges, logical_cuts) = match boundary {
            Boundary::Open => planar_edges(distance),
            Boundary::Periodic => toric_edges(distance),
        };

        let mut lattice = Self {
            distance,
            ec,
            boundary,
            sectors: ec.sectors(),
            detectors,
            nodes,
            fast_edges: edges,
            adjacency: Vec::new(),
            logical_cuts,
        };
        lattice.build_adjacency();

        debug!(
            distance,
            %ec,
            %boundary,
            qubits = lattice.num_qubits(),
            detectors = lattice.detectors * lattice.sectors,
            "built surface-code lattice"
        );
        Ok(lattice)
    }

    fn build_adjacency(&mut self) {
        let mut adjacency = vec![Vec::new(); self.nodes];
        for (e, &(u, v)) in self.fast_edges.iter().enumerate() {
            adjacency[u as usize].push((v as usize, e));
            adjacency[v as usize].push((u as usize, e));
        }
        self.adjacency = adjacency;
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    pub fn ec(&self) -> EcScheme {
        self.ec
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn num_sectors(&self) -> usize {
        self.sectors
    }

    /// Qubits in one sector.
    pub fn qubits_per_sector(&self) -> usize {
        self.fast_edges.len()
    }

    /// Qubits across all sectors.
    pub fn num_qubits(&self) -> usize {
        self.fast_edges.len() * self.sectors
    }

    /// Real detectors in one sector.
    pub fn num_detectors(&self) -> usize {
        self.detectors
    }

    /// Nodes in one sector's matching graph, boundary node included.
    pub fn num_nodes(&self) -> usize {
        self.nodes
    }

    /// The virtual boundary node of each sector, if the lattice has one.
    pub fn boundary_node(&self) -> Option<usize> {
        (self.nodes > self.detectors).then_some(self.detectors)
    }

    pub fn neighbors(&self, node: usize) -> &[(usize, usize)] {
        &self.adjacency[node]
    }

    /// Global qubit index range of a sector.
    pub fn sector_qubits(&self, sector: usize) -> core::ops::Range<usize> {
        let per = self.qubits_per_sector();
        sector * per..(sector + 1) * per
    }

    /// Detectors of one sector whose incident qubit parity is odd.
    ///
    /// `bits` holds the bit values of that sector's qubits only.
    pub fn defects(&self, bits: &BitSlice) -> Vec<usize> {
        let mut parity = bitvec![0; self.nodes];
        for e in bits.iter_ones() {
            let (u, v) = self.fast_edges[e];
            let pu = !parity[u as usize];
            parity.set(u as usize, pu);
            let pv = !parity[v as usize];
            parity.set(v as usize, pv);
        }
        parity[..self.detectors].iter_ones().collect()
    }

    /// Whether the sector's bit values carry a nontrivial logical operator.
    ///
    /// Only meaningful once `bits` has no defects left.
    pub fn has_logical_error(&self, bits: &BitSlice) -> bool {
        self.logical_cuts
            .iter()
            .any(|cut| cut.iter().filter(|&&e| bits[e]).count() % 2 == 1)
    }

    /// Groups every qubit into a macronode for the passive architecture.
    ///
    /// When `pad_boundary` is set, macronodes of qubits attached to the
    /// boundary node are filled up with a padding mode.
    pub fn macronize(&self, pad_boundary: bool) -> MacroLattice {
        let per = self.qubits_per_sector();
        let mut padded = bitvec![0; self.num_qubits()];
        if pad_boundary {
            if let Some(b) = self.boundary_node() {
                for &(_, e) in &self.adjacency[b] {
                    for s in 0..self.sectors {
                        padded.set(s * per + e, true);
                    }
                }
            }
        }
        MacroLattice::new(self.num_qubits(), padded)
    }
}

type EdgeLayout = (usize, usize, Vec<(u32, u32)>, Vec<Vec<usize>>);

/// Planar code: `d` rows of `d - 1` detectors, boundary node last.
///
/// Each row has `d` horizontal qubits, the outer two attached to the
/// boundary; `d - 1` rows of vertical qubits join neighbouring rows. The
/// left boundary column is the logical cut.
fn planar_edges(d: usize) -> EdgeLayout {
    let cols = d - 1;
    let detectors = d * cols;
    let b = detectors as u32;
    let node = |r: usize, c: usize| (r * cols + c) as u32;

    let mut edges = Vec::with_capacity(d * d + cols * cols);
    let mut cut = Vec::with_capacity(d);
    for r in 0..d {
        for c in 0..d {
            let left = if c == 0 { b } else { node(r, c - 1) };
            let right = if c == d - 1 { b } else { node(r, c) };
            if c == 0 {
                cut.push(edges.len());
            }
            edges.push((left, right));
        }
    }
    for r in 0..d - 1 {
        for c in 0..cols {
            edges.push((node(r, c), node(r + 1, c)));
        }
    }

    (detectors, detectors + 1, edges, vec![cut])
}

/// Toric code: `d x d` detectors, every row and column wraps.
///
/// The wrapping horizontal and vertical qubits form the two logical cuts.
fn toric_edges(d: usize) -> EdgeLayout {
    let detectors = d * d;
    let node = |r: usize, c: usize| (r * d + c) as u32;

    let mut edges = Vec::with_capacity(2 * d * d);
    let mut horizontal_cut = Vec::with_capacity(d);
    let mut vertical_cut = Vec::with_capacity(d);
    for r in 0..d {
        for c in 0..d {
            if c == d - 1 {
                horizontal_cut.push(edges.len());
            }
            edges.push((node(r, c), node(r, (c + 1) % d)));
        }
    }
    for r in 0..d {
        for c in 0..d {
            if r == d - 1 {
                vertical_cut.push(edges.len());
            }
            edges.push((node(r, c), node((r + 1) % d, c)));
        }
    }

    (detectors, detectors, edges, vec![horizontal_cut, vertical_cut])
}

/// A surface code instance: its lattice and the measured qubits.
#[derive(Debug, Clone)]
pub struct SurfaceCode {
    lattice: Lattice,
    syndrome_indices: Vec<usize>,
}

impl SurfaceCode {
    pub fn new(distance: usize, ec: EcScheme, boundary: Boundary) -> Result<Self> {
        let lattice = Lattice::new(distance, ec, boundary)?;
        let syndrome_indices = (0..lattice.num_qubits()).collect();
        Ok(Self {
            lattice,
            syndrome_indices,
        })
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }
}

impl Code for SurfaceCode {
    type Graph = Lattice;

    fn graph(&self) -> &Lattice {
        &self.lattice
    }

    fn syndrome_indices(&self) -> &[usize] {
        &self.syndrome_indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(len: usize, ones: &[usize]) -> BitVec {
        let mut bits = bitvec![0; len];
        for &i in ones {
            bits.set(i, true);
        }
        bits
    }

    #[test]
    fn planar_counts() {
        for d in 2..7 {
            let lattice = Lattice::new(d, EcScheme::Primal, Boundary::Open).unwrap();
            assert_eq!(lattice.qubits_per_sector(), d * d + (d - 1) * (d - 1));
            assert_eq!(lattice.num_detectors(), d * (d - 1));
            assert_eq!(lattice.boundary_node(), Some(d * (d - 1)));
        }
    }

    #[test]
    fn toric_counts() {
        let lattice = Lattice::new(4, EcScheme::Both, Boundary::Periodic).unwrap();
        assert_eq!(lattice.qubits_per_sector(), 32);
        assert_eq!(lattice.num_qubits(), 64);
        assert_eq!(lattice.boundary_node(), None);
        assert!(lattice.neighbors(5).len() == 4);
    }

    #[test]
    fn distance_below_two_is_rejected() {
        assert!(Lattice::new(1, EcScheme::Primal, Boundary::Open).is_err());
    }

    #[test]
    fn single_flip_creates_defects() {
        let lattice = Lattice::new(3, EcScheme::Primal, Boundary::Open).unwrap();
        let n = lattice.qubits_per_sector();
        // Row 0, middle horizontal qubit joins detectors 0 and 1.
        assert_eq!(lattice.defects(&bits(n, &[1])), vec![0, 1]);
        // Left boundary qubit only flips detector 0.
        assert_eq!(lattice.defects(&bits(n, &[0])), vec![0]);
    }

    #[test]
    fn full_row_is_a_logical_error() {
        let lattice = Lattice::new(3, EcScheme::Primal, Boundary::Open).unwrap();
        let n = lattice.qubits_per_sector();
        let row = bits(n, &[0, 1, 2]);
        assert!(lattice.defects(&row).is_empty());
        assert!(lattice.has_logical_error(&row));

        // Loop from the left boundary through detectors 0 and 2 is trivial.
        let plaquette = bits(n, &[0, 3, 9]);
        assert!(lattice.defects(&plaquette).is_empty());
        assert!(!lattice.has_logical_error(&plaquette));
    }

    #[test]
    fn toric_winding_is_detected() {
        let lattice = Lattice::new(3, EcScheme::Primal, Boundary::Periodic).unwrap();
        let n = lattice.qubits_per_sector();
        let winding = bits(n, &[0, 1, 2]);
        assert!(lattice.defects(&winding).is_empty());
        assert!(lattice.has_logical_error(&winding));
    }

    #[test]
    fn code_measures_every_qubit() {
        let code = SurfaceCode::new(2, EcScheme::Both, Boundary::Open).unwrap();
        assert_eq!(code.syndrome_indices().len(), code.graph().num_qubits());
        assert_eq!(code.syndrome_indices().len(), 10);
    }

    #[test]
    fn padding_marks_boundary_macronodes() {
        let lattice = Lattice::new(3, EcScheme::Primal, Boundary::Open).unwrap();
        let padded = lattice.macronize(true);
        assert_eq!(padded.num_padded(), 6);
        assert_eq!(lattice.macronize(false).num_padded(), 0);

        let toric = Lattice::new(3, EcScheme::Primal, Boundary::Periodic).unwrap();
        assert_eq!(toric.macronize(true).num_padded(), 0);
    }
}
