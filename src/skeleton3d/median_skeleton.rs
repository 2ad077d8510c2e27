use anyhow::Result;
use nalgebra::base::*;
use rayon::prelude::*;
use std::path::Path;

use crate::skeleton3d::datastructure::{AtomHandle, Datastructure, FaceHandle, LinkHandle};
use crate::skeleton3d::error::{DatastructureError, DatastructureResult};
use crate::skeleton3d::io::{self, SkeletonFormat};

/// Atom: center in the first three components, radius in the last one
pub type Atom = Vector4<f64>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Link between two atoms
pub struct Link {
    pub h1: AtomHandle,
    pub h2: AtomHandle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Triangle between three atoms
pub struct Face {
    pub atoms: [AtomHandle; 3],
}

impl Link {
    /// Checks if the link uses an atom
    pub fn contains(&self, atom: AtomHandle) -> bool {
        self.h1 == atom || self.h2 == atom
    }
}

impl Face {
    /// Checks if the face uses an atom
    pub fn contains(&self, atom: AtomHandle) -> bool {
        self.atoms.contains(&atom)
    }
}

/// Median skeleton: weighted atoms connected by links and faces
pub struct MedianSkeleton {
    structure: Datastructure<Atom, Link, Face>,
}

impl std::fmt::Debug for MedianSkeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedianSkeleton").finish_non_exhaustive()
    }
}

impl MedianSkeleton {
    /// Median skeleton constructor
    pub fn new() -> MedianSkeleton {
        MedianSkeleton::with_capacity(0, 0, 0)
    }

    /// Median skeleton constructor reserving room for elements
    pub fn with_capacity(nb_atoms: usize, nb_links: usize, nb_faces: usize) -> MedianSkeleton {
        MedianSkeleton {
            structure: Datastructure::new(nb_atoms, nb_links, nb_faces),
        }
    }

    /// Loads a skeleton file
    pub fn load(path: &Path, format: SkeletonFormat) -> Result<MedianSkeleton> {
        io::load(path, format)
    }

    /// Saves the skeleton to a file
    pub fn save(&self, path: &Path, format: SkeletonFormat) -> Result<()> {
        io::save(path, self, format)
    }

    /// Underlying datastructure, to reach element properties
    pub fn structure(&self) -> &Datastructure<Atom, Link, Face> {
        &self.structure
    }

    /// Mutable underlying datastructure
    ///
    /// Links and faces created through it are not checked.
    pub fn structure_mut(&mut self) -> &mut Datastructure<Atom, Link, Face> {
        &mut self.structure
    }

    /// Adds an atom to the skeleton
    pub fn add_atom(&mut self, center: &Vector3<f64>, radius: f64) -> AtomHandle {
        self.structure
            .create_atom_with(Vector4::new(center[0], center[1], center[2], radius))
    }

    /// Adds a link between two distinct atoms
    pub fn add_link(&mut self, h1: AtomHandle, h2: AtomHandle) -> DatastructureResult<LinkHandle> {
        self.structure.atom_index(h1)?;
        self.structure.atom_index(h2)?;
        if h1 == h2 {
            return Err(DatastructureError::DegenerateElement("link"));
        }
        Ok(self.structure.create_link_with(Link { h1, h2 }))
    }

    /// Adds a face between three distinct atoms
    pub fn add_face(
        &mut self,
        h1: AtomHandle,
        h2: AtomHandle,
        h3: AtomHandle,
    ) -> DatastructureResult<FaceHandle> {
        for h in [h1, h2, h3] {
            self.structure.atom_index(h)?;
        }
        if h1 == h2 || h2 == h3 || h1 == h3 {
            return Err(DatastructureError::DegenerateElement("face"));
        }
        Ok(self.structure.create_face_with(Face {
            atoms: [h1, h2, h3],
        }))
    }

    /// Removes an atom along with the links and faces using it
    pub fn remove_atom(&mut self, atom: AtomHandle) -> DatastructureResult<Atom> {
        self.structure.atom_index(atom)?;

        let faces: Vec<FaceHandle> = self
            .structure
            .face_set()
            .handles()
            .into_iter()
            .zip(self.structure.faces())
            .filter_map(|(h, face)| if face.contains(atom) { Some(h) } else { None })
            .collect();
        for face in faces {
            self.structure.remove_face(face)?;
        }

        let links: Vec<LinkHandle> = self
            .structure
            .link_set()
            .handles()
            .into_iter()
            .zip(self.structure.links())
            .filter_map(|(h, link)| if link.contains(atom) { Some(h) } else { None })
            .collect();
        for link in links {
            self.structure.remove_link(link)?;
        }

        self.structure.remove_atom(atom)
    }

    /// Removes a link
    pub fn remove_link(&mut self, link: LinkHandle) -> DatastructureResult<Link> {
        self.structure.remove_link(link)
    }

    /// Removes a face
    pub fn remove_face(&mut self, face: FaceHandle) -> DatastructureResult<Face> {
        self.structure.remove_face(face)
    }

    /// Current index of an atom
    pub fn get_index(&self, atom: AtomHandle) -> DatastructureResult<usize> {
        self.structure.atom_index(atom)
    }

    /// Atom getter
    pub fn get_atom(&self, atom: AtomHandle) -> DatastructureResult<&Atom> {
        self.structure.get_atom(atom)
    }

    /// Mutable atom getter
    pub fn get_atom_mut(&mut self, atom: AtomHandle) -> DatastructureResult<&mut Atom> {
        self.structure.get_atom_mut(atom)
    }

    /// Atom getter by index
    pub fn get_atom_by_index(&self, index: usize) -> DatastructureResult<&Atom> {
        self.structure.get_atom_by_index(index)
    }

    /// Link getter by index
    pub fn get_link_by_index(&self, index: usize) -> DatastructureResult<&Link> {
        self.structure.get_link_by_index(index)
    }

    /// Face getter by index
    pub fn get_face_by_index(&self, index: usize) -> DatastructureResult<&Face> {
        self.structure.get_face_by_index(index)
    }

    /// Gets number of atoms
    pub fn get_number_of_atoms(&self) -> usize {
        self.structure.number_of_atoms()
    }

    /// Gets number of links
    pub fn get_number_of_links(&self) -> usize {
        self.structure.number_of_links()
    }

    /// Gets number of faces
    pub fn get_number_of_faces(&self) -> usize {
        self.structure.number_of_faces()
    }

    /// Atoms, by index
    pub fn atoms(&self) -> &[Atom] {
        self.structure.atoms()
    }

    /// Smallest and largest atom radii, `None` without atoms
    pub fn compute_minmax_radii(&self) -> Option<(f64, f64)> {
        self.atoms().iter().fold(None, |acc, atom| {
            let r = atom[3];
            match acc {
                Some((minr, maxr)) => Some((f64::min(minr, r), f64::max(maxr, r))),
                None => Some((r, r)),
            }
        })
    }

    /// Atom indices of every link, two per link, in link order
    pub fn link_indices(&self) -> DatastructureResult<Vec<u32>> {
        let pairs = self
            .structure
            .links()
            .par_iter()
            .map(|link| -> DatastructureResult<[u32; 2]> {
                Ok([
                    self.get_index(link.h1)? as u32,
                    self.get_index(link.h2)? as u32,
                ])
            })
            .collect::<DatastructureResult<Vec<[u32; 2]>>>()?;
        Ok(pairs.into_iter().flatten().collect())
    }

    /// Atom indices of every face, three per face, in face order
    pub fn face_indices(&self) -> DatastructureResult<Vec<u32>> {
        let triples = self
            .structure
            .faces()
            .par_iter()
            .map(|face| -> DatastructureResult<[u32; 3]> {
                Ok([
                    self.get_index(face.atoms[0])? as u32,
                    self.get_index(face.atoms[1])? as u32,
                    self.get_index(face.atoms[2])? as u32,
                ])
            })
            .collect::<DatastructureResult<Vec<[u32; 3]>>>()?;
        Ok(triples.into_iter().flatten().collect())
    }
}

impl Default for MedianSkeleton {
    fn default() -> Self {
        MedianSkeleton::new()
    }
}
