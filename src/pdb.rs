//! Writes a frame out as a minimal PDB file: one fixed-width HETATM record per
//! atom, then an END record. This is the flavor external 3D viewers consume
//! for small molecules; we only export here, never parse.

use std::{fs::File, io::Write, path::Path};

use crate::{DatasetError, Frame, Result};

impl Frame {
    /// Serializes this frame as HETATM records followed by `END`. Serial
    /// numbers are 1-based and follow input order; nothing is reordered or
    /// deduplicated. Overwrites `path` if it exists. The parent directory must
    /// already exist, and the write is not atomic.
    pub fn save_pdb(&self, path: &Path) -> Result<()> {
        // Check alignment before opening the file, so a malformed frame can't
        // leave a partial record set behind.
        if self.atom_type.len() != self.positions.len()
            || self.atomic_numbers.len() != self.positions.len()
        {
            return Err(DatasetError::Mismatch(format!(
                "{} atom types, {} atomic numbers, {} positions",
                self.atom_type.len(),
                self.atomic_numbers.len(),
                self.positions.len()
            )));
        }

        let mut file = File::create(path)?;

        for (i, (el, posit)) in self.atom_type.iter().zip(&self.positions).enumerate() {
            let symbol = el.to_letter();
            writeln!(
                file,
                "HETATM{:>5} {:<4} MOL     1    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           {:>2}",
                i + 1,
                symbol,
                posit.x,
                posit.y,
                posit.z,
                symbol
            )?;
        }
        writeln!(file, "END")?;

        Ok(())
    }
}
