//! Loading of GDML trajectory archives: the npz files behind the MD17 and MD22
//! datasets, published on the quantum-machine.org repository. Each archive holds
//! one molecule's trajectory as four arrays: nuclear charges `z` (N), positions
//! `R` (frames × N × 3), energies `E` (frames), and forces `F` (frames × N × 3).

use std::{
    fs,
    fs::File,
    path::{Path, PathBuf},
};

use lin_alg::f64::Vec3;
use na_seq::Element;
use ndarray::{Array1, Array3, ArrayD, Ix1, Ix3};
use ndarray_npy::NpzReader;

use crate::{DatasetError, Frame, Result, download, element_from_z};

pub const GDML_URL: &str = "http://www.quantum-machine.org/gdml/repo/datasets";

/// An in-memory GDML archive. Charges are resolved to element symbols once at
/// load, so a bad charge surfaces before any frame is handed out.
#[derive(Debug)]
pub struct GdmlArchive {
    atomic_numbers: Vec<u32>,
    elements: Vec<Element>,
    positions: Array3<f64>,
    energies: Array1<f64>,
    forces: Array3<f64>,
}

impl GdmlArchive {
    pub fn load(path: &Path) -> Result<Self> {
        let mut npz = NpzReader::new(File::open(path)?)?;
        let names = npz.names()?;

        let z: ArrayD<i64> = npz.by_name(&member(&names, "z", path)?)?;
        let r: ArrayD<f64> = npz.by_name(&member(&names, "R", path)?)?;
        let e: ArrayD<f64> = npz.by_name(&member(&names, "E", path)?)?;
        let f: ArrayD<f64> = npz.by_name(&member(&names, "F", path)?)?;

        let z = z
            .into_dimensionality::<Ix1>()
            .map_err(|_| shape_err(path, "z", "a 1D charge array"))?;
        let positions = r
            .into_dimensionality::<Ix3>()
            .map_err(|_| shape_err(path, "R", "frames x atoms x 3"))?;
        let forces = f
            .into_dimensionality::<Ix3>()
            .map_err(|_| shape_err(path, "F", "frames x atoms x 3"))?;

        // E is stored flat in some archives, and as a (frames, 1) column in others.
        let energies = Array1::from_iter(e.iter().copied());

        let n_atoms = z.len();
        let n_frames = positions.shape()[0];

        if positions.shape()[1] != n_atoms || positions.shape()[2] != 3 {
            return Err(shape_err(path, "R", "frames x atoms x 3"));
        }
        if forces.shape() != positions.shape() {
            return Err(shape_err(path, "F", "the same shape as R"));
        }
        if energies.len() != n_frames {
            return Err(shape_err(path, "E", "one energy per frame"));
        }

        let atomic_numbers = z
            .iter()
            .map(|&v| u32::try_from(v).map_err(|_| DatasetError::UnknownElement(v)))
            .collect::<Result<Vec<_>>>()?;
        let elements = atomic_numbers
            .iter()
            .map(|&z| element_from_z(z))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Loaded {}: {} frames, {} atoms",
            path.display(),
            n_frames,
            n_atoms
        );

        Ok(Self {
            atomic_numbers,
            elements,
            positions,
            energies,
            forces,
        })
    }

    /// Ensures the archive `file` is cached under `root/<name>/raw/`, downloading
    /// it from the GDML repository on first use, then loads it.
    pub fn fetch(root: &Path, name: &str, file: &str) -> Result<Self> {
        let dest = raw_path(root, name, file);
        fs::create_dir_all(dest.parent().unwrap_or(root))?;
        download::fetch(&format!("{GDML_URL}/{file}"), &dest)?;

        Self::load(&dest)
    }

    pub fn n_frames(&self) -> usize {
        self.positions.shape()[0]
    }

    pub fn n_atoms(&self) -> usize {
        self.atomic_numbers.len()
    }

    /// Slices snapshot `index` out of the archive as a standalone frame, with
    /// energy and force populated.
    pub fn frame(&self, index: usize) -> Result<Frame> {
        let len = self.n_frames();
        if index >= len {
            return Err(DatasetError::IndexOutOfRange { index, len });
        }

        let n = self.n_atoms();
        let mut positions = Vec::with_capacity(n);
        let mut force = Vec::with_capacity(n);

        for k in 0..n {
            positions.push(Vec3::new(
                self.positions[[index, k, 0]],
                self.positions[[index, k, 1]],
                self.positions[[index, k, 2]],
            ));
            force.push(Vec3::new(
                self.forces[[index, k, 0]],
                self.forces[[index, k, 1]],
                self.forces[[index, k, 2]],
            ));
        }

        Ok(Frame {
            atomic_numbers: self.atomic_numbers.clone(),
            atom_type: self.elements.clone(),
            positions,
            energy: Some(self.energies[index]),
            force: Some(force),
        })
    }
}

/// Checks the `train` argument against a dataset's split support, returning the
/// archive file to load. Datasets list either a single file (no pre-built
/// splits) or a train/test pair.
pub(crate) fn select_file(
    name: &str,
    files: &'static [&'static str],
    train: Option<bool>,
) -> Result<&'static str> {
    match (files.len(), train) {
        (1, None) => Ok(files[0]),
        (1, Some(t)) => Err(DatasetError::InvalidConfig(format!(
            "'{name}' dataset does not provide pre-defined splits but the 'train' argument is set to '{t}'"
        ))),
        (2, Some(train)) => Ok(if train { files[0] } else { files[1] }),
        (2, None) => Err(DatasetError::InvalidConfig(format!(
            "'{name}' dataset does provide pre-defined splits but the 'train' argument was not specified"
        ))),
        _ => Err(DatasetError::InvalidConfig(format!(
            "'{name}' dataset has an unsupported archive layout"
        ))),
    }
}

/// Cache location of one archive file: `root/<name>/raw/<file>`.
pub(crate) fn raw_path(root: &Path, name: &str, file: &str) -> PathBuf {
    root.join(name).join("raw").join(file)
}

/// Resolves an archive member by key. numpy's savez stores members with a
/// `.npy` suffix; accept both spellings.
fn member(names: &[String], key: &str, path: &Path) -> Result<String> {
    let with_suffix = format!("{key}.npy");
    names
        .iter()
        .find(|n| *n == key || **n == with_suffix)
        .cloned()
        .ok_or_else(|| {
            DatasetError::Archive(format!("Missing member '{key}' in {}", path.display()))
        })
}

fn shape_err(path: &Path, key: &str, expected: &str) -> DatasetError {
    DatasetError::Archive(format!(
        "'{key}' in {} is not {expected}",
        path.display()
    ))
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::fs::File;
    use std::path::Path;

    use ndarray::{Array1, Array3};
    use ndarray_npy::NpzWriter;

    /// Writes a small synthetic GDML archive: deterministic coordinates, one
    /// energy per frame, zero forces.
    pub fn write_archive(path: &Path, n_frames: usize, charges: &[i64]) {
        let n = charges.len();

        let mut r = Array3::<f64>::zeros((n_frames, n, 3));
        for t in 0..n_frames {
            for k in 0..n {
                r[[t, k, 0]] = t as f64 + k as f64 * 0.1;
                r[[t, k, 1]] = 1.23456;
                r[[t, k, 2]] = -2.0;
            }
        }
        let e = Array1::from_iter((0..n_frames).map(|t| -100.0 - t as f64));
        let f = Array3::<f64>::zeros((n_frames, n, 3));
        let z = Array1::from_vec(charges.to_vec());

        let mut npz = NpzWriter::new(File::create(path).unwrap());
        npz.add_array("z", &z).unwrap();
        npz.add_array("R", &r).unwrap();
        npz.add_array("E", &e).unwrap();
        npz.add_array("F", &f).unwrap();
        npz.finish().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("md_datasets_gdml_{}_{name}", process::id()))
    }

    #[test]
    fn loads_frames_with_energy_and_force() {
        let path = temp_path("ethanol.npz");
        // Ethanol: C2H5OH.
        test_util::write_archive(&path, 3, &[6, 6, 8, 1, 1, 1, 1, 1, 1]);

        let archive = GdmlArchive::load(&path).unwrap();
        assert_eq!(archive.n_frames(), 3);
        assert_eq!(archive.n_atoms(), 9);

        let frame = archive.frame(1).unwrap();
        assert_eq!(frame.n_atoms(), 9);
        assert_eq!(frame.atom_type.len(), frame.positions.len());
        assert_eq!(frame.atom_type[2].to_letter(), "O");
        assert_eq!(frame.energy, Some(-101.0));
        assert!((frame.positions[2].x - 1.2).abs() < 1e-12);
        assert!((frame.positions[2].y - 1.23456).abs() < 1e-12);

        let force = frame.force.unwrap();
        assert_eq!(force.len(), 9);
        assert_eq!(force[0].z, 0.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn frame_index_out_of_range_fails() {
        let path = temp_path("short.npz");
        test_util::write_archive(&path, 2, &[8, 1, 1]);

        let archive = GdmlArchive::load(&path).unwrap();
        assert!(archive.frame(0).is_ok());
        assert!(archive.frame(1).is_ok());
        assert!(matches!(
            archive.frame(2),
            Err(DatasetError::IndexOutOfRange { index: 2, len: 2 })
        ));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unknown_charge_fails_at_load() {
        let path = temp_path("bad_z.npz");
        test_util::write_archive(&path, 1, &[6, 999]);

        assert!(matches!(
            GdmlArchive::load(&path),
            Err(DatasetError::UnknownElement(999))
        ));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_member_is_reported_by_name() {
        let path = temp_path("no_forces.npz");
        {
            use ndarray::Array1;
            use ndarray_npy::NpzWriter;

            let mut npz = NpzWriter::new(fs::File::create(&path).unwrap());
            npz.add_array("z", &Array1::from_vec(vec![1i64])).unwrap();
            npz.finish().unwrap();
        }

        match GdmlArchive::load(&path) {
            Err(DatasetError::Archive(msg)) => assert!(msg.contains("'R'")),
            other => panic!("expected archive error, got {other:?}"),
        }

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn member_resolution_accepts_npy_suffix() {
        let names = vec!["z.npy".to_string(), "R".to_string()];
        assert_eq!(member(&names, "z", Path::new("a.npz")).unwrap(), "z.npy");
        assert_eq!(member(&names, "R", Path::new("a.npz")).unwrap(), "R");
        assert!(member(&names, "E", Path::new("a.npz")).is_err());
    }

    #[test]
    fn split_selection_enforces_dataset_support() {
        const SINGLE: &[&str] = &["only.npz"];
        const PAIR: &[&str] = &["train.npz", "test.npz"];

        assert_eq!(select_file("x", SINGLE, None).unwrap(), "only.npz");
        assert!(matches!(
            select_file("x", SINGLE, Some(true)),
            Err(DatasetError::InvalidConfig(_))
        ));

        assert_eq!(select_file("x", PAIR, Some(true)).unwrap(), "train.npz");
        assert_eq!(select_file("x", PAIR, Some(false)).unwrap(), "test.npz");
        assert!(matches!(
            select_file("x", PAIR, None),
            Err(DatasetError::InvalidConfig(_))
        ));
    }
}
