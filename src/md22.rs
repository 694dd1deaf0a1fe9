//! The MD22 collection: MD trajectories of larger molecules and
//! supramolecular complexes, from tetrapeptides up to a double-walled
//! nanotube. None of these archives define pre-built splits.

use std::path::Path;

use crate::{DatasetError, Frame, Result, TrajectoryStore, gdml, gdml::GdmlArchive};

/// Default cache directory for downloaded archives.
pub const DEFAULT_ROOT: &str = "/tmp/MD22";

struct DatasetFiles {
    name: &'static str,
    files: &'static [&'static str],
}

const DATASETS: &[DatasetFiles] = &[
    DatasetFiles { name: "Ac-Ala3-NHMe", files: &["md22_Ac-Ala3-NHMe.npz"] },
    DatasetFiles { name: "Docosahexaenoic acid", files: &["md22_DHA.npz"] },
    DatasetFiles { name: "Stachyose", files: &["md22_stachyose.npz"] },
    DatasetFiles { name: "DNA base pair (AT-AT)", files: &["md22_AT-AT.npz"] },
    DatasetFiles { name: "DNA base pair (AT-AT-CG-CG)", files: &["md22_AT-AT-CG-CG.npz"] },
    DatasetFiles { name: "Buckyball catcher", files: &["md22_buckyball-catcher.npz"] },
    DatasetFiles { name: "Double-walled nanotube", files: &["md22_double-walled_nanotube.npz"] },
];

#[derive(Debug)]
pub struct Md22Dataset {
    pub name: String,
    archive: GdmlArchive,
}

impl Md22Dataset {
    /// Loads `name` from the default cache root, downloading the archive on
    /// first use. No MD22 set defines pre-built splits, so `train` must be
    /// `None`; the argument exists so callers hit a configuration error rather
    /// than a silently ignored flag.
    pub fn new(name: &str, train: Option<bool>) -> Result<Self> {
        Self::with_root(Path::new(DEFAULT_ROOT), name, train)
    }

    /// As `new`, with an explicit cache root. Name and split validation happen
    /// before any filesystem or network access.
    pub fn with_root(root: &Path, name: &str, train: Option<bool>) -> Result<Self> {
        let entry = DATASETS
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| DatasetError::InvalidConfig(format!("Invalid name: {name}")))?;

        let file = gdml::select_file(name, entry.files, train)?;
        let archive = GdmlArchive::fetch(root, name, file)?;

        Ok(Self {
            name: name.to_owned(),
            archive,
        })
    }
}

impl TrajectoryStore for Md22Dataset {
    type Item = Frame;

    fn len(&self) -> usize {
        self.archive.n_frames()
    }

    fn get(&self, index: usize) -> Result<Frame> {
        self.archive.frame(index)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf, process};

    use super::*;
    use crate::gdml::test_util::write_archive;

    fn temp_root(name: &str) -> PathBuf {
        env::temp_dir().join(format!("md_datasets_md22_{}_{name}", process::id()))
    }

    #[test]
    fn unsupported_name_is_rejected_before_io() {
        let err =
            Md22Dataset::with_root(Path::new("/nonexistent"), "unobtainium", None).unwrap_err();
        match err {
            DatasetError::InvalidConfig(msg) => assert!(msg.contains("unobtainium")),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn every_listed_name_passes_validation() {
        // A split argument fails with the "no pre-defined splits" message only
        // after the name lookup succeeds, and before any filesystem access.
        for name in [
            "Ac-Ala3-NHMe",
            "Docosahexaenoic acid",
            "Stachyose",
            "DNA base pair (AT-AT)",
            "DNA base pair (AT-AT-CG-CG)",
            "Buckyball catcher",
            "Double-walled nanotube",
        ] {
            let err =
                Md22Dataset::with_root(Path::new("/nonexistent"), name, Some(true)).unwrap_err();
            match err {
                DatasetError::InvalidConfig(msg) => {
                    assert!(msg.contains("does not provide pre-defined splits"), "{name}: {msg}")
                }
                other => panic!("{name}: expected invalid config, got {other:?}"),
            }
        }
    }

    #[test]
    fn frames_read_from_cached_archive() {
        let root = temp_root("stachyose");
        let path = crate::gdml::raw_path(&root, "Stachyose", "md22_stachyose.npz");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        // A stand-in molecule; the adapter doesn't care about the formula.
        write_archive(&path, 2, &[6, 8, 1, 1]);

        let dataset = Md22Dataset::with_root(&root, "Stachyose", None).unwrap();
        assert_eq!(dataset.len(), 2);

        let frame = dataset.get(0).unwrap();
        assert_eq!(frame.n_atoms(), 4);
        assert!(frame.energy.is_some());
        assert!(frame.force.is_some());

        assert!(matches!(
            dataset.get(2),
            Err(DatasetError::IndexOutOfRange { .. })
        ));

        let _ = fs::remove_dir_all(&root);
    }
}
