//! The MISATO protein-ligand MD dataset: a single HDF5 archive with one group
//! per PDB id, holding a short trajectory plus per-frame interaction energies.
//! The archive handle is opened once at construction and held for the
//! adapter's lifetime.

use std::{fs, path::Path};

use lin_alg::f64::Vec3;
use na_seq::Element;

use crate::{DatasetError, Frame, Result, TrajectoryStore, download, element_from_z};

/// Default location of the MD archive, matching the layout `fetch` produces.
pub const DEFAULT_DATA_FILE: &str = "/data/Misato/MD.hdf5";

/// Zenodo record holding the MD archive. Tens of GB; fetched once, then reused
/// from disk.
pub const MD_URL: &str = "https://zenodo.org/record/7711953/files/MD.hdf5";

pub struct MisatoDataset {
    file: hdf5::File,
    ids: Vec<String>,
}

/// One protein-ligand complex: the full short trajectory for a single archive
/// entry, with nuclear charges annotated as element symbols. Built fresh on
/// each indexed read.
#[derive(Clone, Debug)]
pub struct MisatoEntry {
    pub id: String,
    pub atomic_numbers: Vec<u32>,
    pub atom_type: Vec<Element>,
    /// Snapshot coordinates, frames × atoms, Å.
    pub trajectory: Vec<Vec<Vec3>>,
    /// Per-frame protein-ligand interaction energy, where the archive stores it.
    pub interaction_energy: Option<Vec<f64>>,
    /// Start offset of each molecule's atoms within the flat atom arrays.
    pub molecules_begin_atom_index: Vec<usize>,
}

impl MisatoDataset {
    /// Opens the archive read-only. `idx_file`, when given, is a text file of
    /// entry ids (one per line) selecting a pre-built split; otherwise every
    /// entry in the archive is exposed.
    pub fn new(md_data_file: &Path, idx_file: Option<&Path>) -> Result<Self> {
        let file = hdf5::File::open(md_data_file)?;

        let ids: Vec<String> = match idx_file {
            Some(path) => fs::read_to_string(path)?
                .lines()
                .map(str::to_owned)
                .collect(),
            None => file.member_names()?,
        };

        log::debug!(
            "Opened {} with {} entries",
            md_data_file.display(),
            ids.len()
        );

        Ok(Self { file, ids })
    }

    /// Ensures the MD archive is present at `md_data_file`, downloading it from
    /// Zenodo on first use, then opens the dataset. A cached archive is reused
    /// untouched.
    pub fn fetch(md_data_file: &Path, idx_file: Option<&Path>) -> Result<Self> {
        if let Some(parent) = md_data_file.parent() {
            fs::create_dir_all(parent)?;
        }
        download::fetch(MD_URL, md_data_file)?;

        Self::new(md_data_file, idx_file)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

impl TrajectoryStore for MisatoDataset {
    type Item = MisatoEntry;

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn get(&self, index: usize) -> Result<MisatoEntry> {
        let len = self.ids.len();
        if index >= len {
            return Err(DatasetError::IndexOutOfRange { index, len });
        }

        let id = &self.ids[index];
        let group = self.file.group(id)?;

        let charges_raw: Vec<i64> = group.dataset("atoms_element")?.read_raw()?;
        let mut atomic_numbers = Vec::with_capacity(charges_raw.len());
        for v in charges_raw {
            atomic_numbers.push(u32::try_from(v).map_err(|_| DatasetError::UnknownElement(v))?);
        }
        let atom_type = atomic_numbers
            .iter()
            .map(|&z| element_from_z(z))
            .collect::<Result<Vec<_>>>()?;

        let coords_ds = group.dataset("trajectory_coordinates")?;
        let shape = coords_ds.shape();
        if shape.len() != 3 || shape[2] != 3 {
            return Err(DatasetError::Archive(format!(
                "'{id}': expected frames x atoms x 3 coordinates, got {shape:?}"
            )));
        }
        if shape[1] != atomic_numbers.len() {
            return Err(DatasetError::Mismatch(format!(
                "'{id}': {} atoms in trajectory vs {} charges",
                shape[1],
                atomic_numbers.len()
            )));
        }

        let (n_frames, n_atoms) = (shape[0], shape[1]);
        let flat: Vec<f32> = coords_ds.read_raw()?;
        if flat.len() != n_frames * n_atoms * 3 {
            return Err(DatasetError::Archive(format!(
                "'{id}': coordinate block size mismatch"
            )));
        }

        let mut trajectory = Vec::with_capacity(n_frames);
        for t in 0..n_frames {
            let mut snapshot = Vec::with_capacity(n_atoms);
            for k in 0..n_atoms {
                let j = (t * n_atoms + k) * 3;
                snapshot.push(Vec3::new(
                    flat[j] as f64,
                    flat[j + 1] as f64,
                    flat[j + 2] as f64,
                ));
            }
            trajectory.push(snapshot);
        }

        let interaction_energy = match group.dataset("frames_interaction_energy") {
            Ok(ds) => Some(ds.read_raw::<f64>()?),
            Err(_) => None,
        };

        let begin_raw: Vec<i64> = group.dataset("molecules_begin_atom_index")?.read_raw()?;
        let molecules_begin_atom_index = begin_raw.iter().map(|&v| v as usize).collect();

        Ok(MisatoEntry {
            id: id.clone(),
            atomic_numbers,
            atom_type,
            trajectory,
            interaction_energy,
            molecules_begin_atom_index,
        })
    }
}

impl MisatoEntry {
    pub fn n_frames(&self) -> usize {
        self.trajectory.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.atomic_numbers.len()
    }

    /// Extracts snapshot `t` as a standalone frame. Energy is the complex's
    /// interaction energy at that snapshot, where stored.
    pub fn frame(&self, t: usize) -> Result<Frame> {
        let len = self.trajectory.len();
        if t >= len {
            return Err(DatasetError::IndexOutOfRange { index: t, len });
        }

        Ok(Frame {
            atomic_numbers: self.atomic_numbers.clone(),
            atom_type: self.atom_type.clone(),
            positions: self.trajectory[t].clone(),
            energy: self
                .interaction_energy
                .as_ref()
                .and_then(|e| e.get(t).copied()),
            force: None,
        })
    }
}
