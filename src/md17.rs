//! The MD17 collection: ab-initio MD trajectories of ten small organic
//! molecules, plus the revised (rMD17) recomputations and a handful of
//! coupled-cluster sets. The CCSD sets ship as pre-built train/test splits;
//! everything else is a single archive.

use std::path::Path;

use crate::{DatasetError, Frame, Result, TrajectoryStore, gdml, gdml::GdmlArchive};

/// Default cache directory for downloaded archives.
pub const DEFAULT_ROOT: &str = "/tmp/MD17";

struct DatasetFiles {
    name: &'static str,
    /// One archive, or a train/test pair for sets with pre-built splits.
    files: &'static [&'static str],
}

const DATASETS: &[DatasetFiles] = &[
    DatasetFiles { name: "benzene", files: &["md17_benzene2017.npz"] },
    DatasetFiles { name: "uracil", files: &["md17_uracil.npz"] },
    DatasetFiles { name: "naphtalene", files: &["md17_naphthalene.npz"] },
    DatasetFiles { name: "aspirin", files: &["md17_aspirin.npz"] },
    DatasetFiles { name: "salicylic acid", files: &["md17_salicylic.npz"] },
    DatasetFiles { name: "malonaldehyde", files: &["md17_malonaldehyde.npz"] },
    DatasetFiles { name: "ethanol", files: &["md17_ethanol.npz"] },
    DatasetFiles { name: "toluene", files: &["md17_toluene.npz"] },
    DatasetFiles { name: "paracetamol", files: &["md17_paracetamol.npz"] },
    DatasetFiles { name: "azobenzene", files: &["md17_azobenzene.npz"] },
    //
    DatasetFiles { name: "revised benzene", files: &["rmd17_benzene.npz"] },
    DatasetFiles { name: "revised uracil", files: &["rmd17_uracil.npz"] },
    DatasetFiles { name: "revised naphthalene", files: &["rmd17_naphthalene.npz"] },
    DatasetFiles { name: "revised aspirin", files: &["rmd17_aspirin.npz"] },
    DatasetFiles { name: "revised salicylic acid", files: &["rmd17_salicylic.npz"] },
    DatasetFiles { name: "revised malonaldehyde", files: &["rmd17_malonaldehyde.npz"] },
    DatasetFiles { name: "revised ethanol", files: &["rmd17_ethanol.npz"] },
    DatasetFiles { name: "revised toluene", files: &["rmd17_toluene.npz"] },
    DatasetFiles { name: "revised paracetamol", files: &["rmd17_paracetamol.npz"] },
    DatasetFiles { name: "revised azobenzene", files: &["rmd17_azobenzene.npz"] },
    //
    DatasetFiles {
        name: "benzene CCSD(T)",
        files: &["benzene_ccsd_t-train.npz", "benzene_ccsd_t-test.npz"],
    },
    DatasetFiles {
        name: "aspirin CCSD",
        files: &["aspirin_ccsd-train.npz", "aspirin_ccsd-test.npz"],
    },
    DatasetFiles {
        name: "malonaldehyde CCSD(T)",
        files: &["malonaldehyde_ccsd_t-train.npz", "malonaldehyde_ccsd_t-test.npz"],
    },
    DatasetFiles {
        name: "ethanol CCSD(T)",
        files: &["ethanol_ccsd_t-train.npz", "ethanol_ccsd_t-test.npz"],
    },
    DatasetFiles {
        name: "toluene CCSD(T)",
        files: &["toluene_ccsd_t-train.npz", "toluene_ccsd_t-test.npz"],
    },
    DatasetFiles { name: "benzene FHI-aims", files: &["benzene2018_dft.npz"] },
];

#[derive(Debug)]
pub struct Md17Dataset {
    pub name: String,
    archive: GdmlArchive,
}

impl Md17Dataset {
    /// Loads `name` from the default cache root, downloading the archive on
    /// first use. `train` selects the split for the CCSD sets, and must be
    /// omitted for every other set.
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

impl TrajectoryStore for Md17Dataset {
    type Item = Frame;

    fn len(&self) -> usize {
        self.archive.n_frames()
    }

    fn get(&self, index: usize) -> Result<Frame> {
        self.archive.frame(index)
    }
}
