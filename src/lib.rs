//! Thin adapters over molecular-dynamics trajectory datasets used in drug-discovery
//! ML pipelines: the MD17 and MD22 small-molecule collections (GDML npz archives),
//! and the MISATO protein-ligand archive (HDF5). Each adapter exposes index-based
//! access to per-frame atomic data, and frames can be written out as PDB HETATM
//! records for external 3D viewers.

pub mod download;
mod error;
pub mod gdml;
pub mod md17;
pub mod md22;
pub mod misato;
pub mod pdb;

use lin_alg::f64::Vec3;
use na_seq::Element;

pub use error::{DatasetError, Result};
pub use md17::Md17Dataset;
pub use md22::Md22Dataset;
pub use misato::{MisatoDataset, MisatoEntry};

/// Resolves a nuclear charge (proton count) to an element, across the full
/// periodic table. Charges with no element fail with a lookup error; we never
/// substitute a placeholder, since a wrong symbol would silently corrupt
/// exported structures.
pub fn element_from_z(z: u32) -> Result<Element> {
    let charge = u8::try_from(z).map_err(|_| DatasetError::UnknownElement(z as i64))?;

    Element::from_atomic_number(charge).map_err(|_| DatasetError::UnknownElement(z as i64))
}

/// One MD simulation snapshot. `atomic_numbers`, `positions`, and the derived
/// `atom_type` are index-aligned, and nothing in this crate ever resorts them.
/// A frame is built fresh on each indexed read, and is inert once returned.
#[derive(Clone, Debug)]
pub struct Frame {
    pub atomic_numbers: Vec<u32>,
    /// Å
    pub positions: Vec<Vec3>,
    /// Element symbols resolved from `atomic_numbers`.
    pub atom_type: Vec<Element>,
    /// kcal/mol, where the dataset stores it.
    pub energy: Option<f64>,
    /// kcal/mol/Å, index-aligned with `positions` where present.
    pub force: Option<Vec<Vec3>>,
}

impl Frame {
    /// Builds a frame from raw arrays, annotating each nuclear charge with its
    /// element symbol. Fails if the arrays aren't index-aligned, or on a charge
    /// with no table entry.
    pub fn new(atomic_numbers: Vec<u32>, positions: Vec<Vec3>) -> Result<Self> {
        if atomic_numbers.len() != positions.len() {
            return Err(DatasetError::Mismatch(format!(
                "{} atomic numbers vs {} positions",
                atomic_numbers.len(),
                positions.len()
            )));
        }

        let atom_type = atomic_numbers
            .iter()
            .map(|&z| element_from_z(z))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            atomic_numbers,
            positions,
            atom_type,
            energy: None,
            force: None,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.atomic_numbers.len()
    }
}

/// The uniform contract the adapters present over their heterogeneous backing
/// stores (npz archives, an HDF5 file). One adapter instance should be owned
/// by a single consumer at a time.
pub trait TrajectoryStore {
    type Item;

    /// Number of entries available; constant for the adapter's lifetime.
    fn len(&self) -> usize;

    /// Fetches the entry at `index`, built fresh from the backing store.
    /// Fails with an out-of-range error outside `[0, len())`.
    fn get(&self, index: usize) -> Result<Self::Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
