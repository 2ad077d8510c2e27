use anyhow::Result;
use nalgebra::base::*;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use crate::skeleton3d::datastructure::AtomHandle;
use crate::skeleton3d::MedianSkeleton;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Skeleton file formats
pub enum SkeletonFormat {
    /// Sectioned text format, 0-based indices
    Median,
    /// Line-prefixed text format, 1-based indices
    Web,
}

impl SkeletonFormat {
    /// File extension of the format
    pub fn extension(&self) -> &'static str {
        match self {
            SkeletonFormat::Median => "median",
            SkeletonFormat::Web => "web",
        }
    }
}

impl FromStr for SkeletonFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "median" => Ok(SkeletonFormat::Median),
            "web" => Ok(SkeletonFormat::Web),
            _ => Err(anyhow::Error::msg(format!(
                "Unknown skeleton format \"{}\" (expected median or web)",
                s
            ))),
        }
    }
}

impl fmt::Display for SkeletonFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Loads a skeleton file
pub fn load(path: &Path, format: SkeletonFormat) -> Result<MedianSkeleton> {
    let file = File::open(path)
        .map_err(|e| anyhow::Error::msg(format!("Cannot open {}: {}", path.display(), e)))?;
    let reader = io::BufReader::new(file);
    match format {
        SkeletonFormat::Median => read_median(reader),
        SkeletonFormat::Web => read_web(reader),
    }
}

/// Saves a skeleton file
pub fn save(path: &Path, skeleton: &MedianSkeleton, format: SkeletonFormat) -> Result<()> {
    let mut file = io::BufWriter::new(File::create(path)?);
    match format {
        SkeletonFormat::Median => write_median(&mut file, skeleton)?,
        SkeletonFormat::Web => write_web(&mut file, skeleton)?,
    }
    file.flush()?;
    Ok(())
}

fn parse_values<T: FromStr>(values: &[&str], expected: usize, line_number: usize) -> Result<Vec<T>> {
    if values.len() != expected {
        return Err(anyhow::Error::msg(format!(
            "line {}: expected {} values, found {}",
            line_number,
            expected,
            values.len()
        )));
    }
    values
        .iter()
        .map(|v| {
            v.parse::<T>().map_err(|_| {
                anyhow::Error::msg(format!("line {}: invalid value \"{}\"", line_number, v))
            })
        })
        .collect()
}

fn add_parsed_atom(skeleton: &mut MedianSkeleton, values: &[f64], line_number: usize) -> Result<AtomHandle> {
    if !(values[3] >= 0.0) {
        return Err(anyhow::Error::msg(format!(
            "line {}: invalid atom radius {}",
            line_number, values[3]
        )));
    }
    Ok(skeleton.add_atom(&Vector3::new(values[0], values[1], values[2]), values[3]))
}

fn atom_at(atoms: &[AtomHandle], index: usize, line_number: usize) -> Result<AtomHandle> {
    atoms.get(index).copied().ok_or_else(|| {
        anyhow::Error::msg(format!(
            "line {}: atom index {} out of bounds",
            line_number, index
        ))
    })
}

/// Non-empty, non-comment lines with their 1-based line number
fn significant_lines<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>> {
    let mut lines = Vec::new();
    for (i, line_) in reader.lines().enumerate() {
        let line = line_?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            lines.push((i + 1, trimmed.to_string()));
        }
    }
    Ok(lines)
}

fn read_section_header(
    lines: &mut impl Iterator<Item = (usize, String)>,
    keyword: &str,
) -> Result<usize> {
    match lines.next() {
        None => Ok(0),
        Some((line_number, line)) => {
            let mut line_split = line.split_whitespace();
            if line_split.next() != Some(keyword) {
                return Err(anyhow::Error::msg(format!(
                    "line {}: expected \"{}\" section",
                    line_number, keyword
                )));
            }
            let values: Vec<&str> = line_split.collect();
            Ok(parse_values::<usize>(&values, 1, line_number)?[0])
        }
    }
}

fn next_record(
    lines: &mut impl Iterator<Item = (usize, String)>,
    keyword: &str,
) -> Result<(usize, String)> {
    lines.next().ok_or_else(|| {
        anyhow::Error::msg(format!("Unexpected end of file in \"{}\" section", keyword))
    })
}

const MAX_RESERVED_ATOMS: usize = 1 << 16;

/// Reads a skeleton in median format
///
/// Sections `atoms`, `links` and `faces` come in this order; trailing
/// sections may be omitted.
pub fn read_median<R: BufRead>(reader: R) -> Result<MedianSkeleton> {
    let mut lines = significant_lines(reader)?.into_iter();

    let nb_atoms = read_section_header(&mut lines, "atoms")?;
    // counts are untrusted until their records are read
    let reserved = nb_atoms.min(MAX_RESERVED_ATOMS);
    let mut skeleton = MedianSkeleton::with_capacity(reserved, 0, 0);
    let mut atoms = Vec::with_capacity(reserved);
    for _ in 0..nb_atoms {
        let (line_number, line) = next_record(&mut lines, "atoms")?;
        let split: Vec<&str> = line.split_whitespace().collect();
        let values = parse_values::<f64>(&split, 4, line_number)?;
        atoms.push(add_parsed_atom(&mut skeleton, &values, line_number)?);
    }

    let nb_links = read_section_header(&mut lines, "links")?;
    for _ in 0..nb_links {
        let (line_number, line) = next_record(&mut lines, "links")?;
        let split: Vec<&str> = line.split_whitespace().collect();
        let ind = parse_values::<usize>(&split, 2, line_number)?;
        skeleton
            .add_link(
                atom_at(&atoms, ind[0], line_number)?,
                atom_at(&atoms, ind[1], line_number)?,
            )
            .map_err(|e| anyhow::Error::msg(format!("line {}: {}", line_number, e)))?;
    }

    let nb_faces = read_section_header(&mut lines, "faces")?;
    for _ in 0..nb_faces {
        let (line_number, line) = next_record(&mut lines, "faces")?;
        let split: Vec<&str> = line.split_whitespace().collect();
        let ind = parse_values::<usize>(&split, 3, line_number)?;
        skeleton
            .add_face(
                atom_at(&atoms, ind[0], line_number)?,
                atom_at(&atoms, ind[1], line_number)?,
                atom_at(&atoms, ind[2], line_number)?,
            )
            .map_err(|e| anyhow::Error::msg(format!("line {}: {}", line_number, e)))?;
    }

    if let Some((line_number, _)) = lines.next() {
        return Err(anyhow::Error::msg(format!(
            "line {}: unexpected content after faces section",
            line_number
        )));
    }

    log::debug!(
        "median skeleton read: {} atoms, {} links, {} faces",
        nb_atoms,
        nb_links,
        nb_faces
    );
    Ok(skeleton)
}

/// Reads a skeleton in web format
///
/// Records are `v x y z r`, `l i j` and `f i j k`; other lines are ignored.
pub fn read_web<R: BufRead>(reader: R) -> Result<MedianSkeleton> {
    let mut skeleton = MedianSkeleton::new();
    let mut atoms = Vec::new();

    // links and faces may reference atoms declared later in the file
    let mut links = Vec::new();
    let mut faces = Vec::new();

    for (line_number, line) in significant_lines(reader)? {
        let mut line_split = line.split_whitespace();
        let prefix = line_split.next();
        let values: Vec<&str> = line_split.collect();
        match prefix {
            Some("v") => {
                let values = parse_values::<f64>(&values, 4, line_number)?;
                atoms.push(add_parsed_atom(&mut skeleton, &values, line_number)?);
            }
            Some("l") => {
                let ind = parse_values::<usize>(&values, 2, line_number)?;
                links.push((line_number, [ind[0], ind[1]]));
            }
            Some("f") => {
                let ind = parse_values::<usize>(&values, 3, line_number)?;
                faces.push((line_number, [ind[0], ind[1], ind[2]]));
            }
            _ => {}
        }
    }

    let web_atom = |ind: usize, line_number: usize| -> Result<AtomHandle> {
        if ind == 0 {
            return Err(anyhow::Error::msg(format!(
                "line {}: web indices start at 1",
                line_number
            )));
        }
        atom_at(&atoms, ind - 1, line_number)
    };

    for (line_number, [i, j]) in links {
        let h1 = web_atom(i, line_number)?;
        let h2 = web_atom(j, line_number)?;
        skeleton
            .add_link(h1, h2)
            .map_err(|e| anyhow::Error::msg(format!("line {}: {}", line_number, e)))?;
    }
    for (line_number, [i, j, k]) in faces {
        let h1 = web_atom(i, line_number)?;
        let h2 = web_atom(j, line_number)?;
        let h3 = web_atom(k, line_number)?;
        skeleton
            .add_face(h1, h2, h3)
            .map_err(|e| anyhow::Error::msg(format!("line {}: {}", line_number, e)))?;
    }

    Ok(skeleton)
}

/// Writes a skeleton in median format
pub fn write_median<W: Write>(writer: &mut W, skeleton: &MedianSkeleton) -> Result<()> {
    writeln!(writer, "atoms {}", skeleton.get_number_of_atoms())?;
    for atom in skeleton.atoms() {
        writeln!(writer, "{} {} {} {}", atom[0], atom[1], atom[2], atom[3])?;
    }
    let link_indices = skeleton.link_indices()?;
    writeln!(writer, "links {}", skeleton.get_number_of_links())?;
    for link in link_indices.chunks(2) {
        writeln!(writer, "{} {}", link[0], link[1])?;
    }
    let face_indices = skeleton.face_indices()?;
    writeln!(writer, "faces {}", skeleton.get_number_of_faces())?;
    for face in face_indices.chunks(3) {
        writeln!(writer, "{} {} {}", face[0], face[1], face[2])?;
    }
    Ok(())
}

/// Writes a skeleton in web format
pub fn write_web<W: Write>(writer: &mut W, skeleton: &MedianSkeleton) -> Result<()> {
    for atom in skeleton.atoms() {
        writeln!(writer, "v {} {} {} {}", atom[0], atom[1], atom[2], atom[3])?;
    }
    for link in skeleton.link_indices()?.chunks(2) {
        writeln!(writer, "l {} {}", link[0] + 1, link[1] + 1)?;
    }
    for face in skeleton.face_indices()?.chunks(3) {
        writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDIAN: &str = "# three atoms\n\
        atoms 3\n\
        0 0 0 1\n\
        1 0 0 0.5\n\
        0 1 0 2\n\
        links 2\n\
        0 1\n\
        1 2\n\
        faces 1\n\
        0 1 2\n";

    #[test]
    fn read_median_file() {
        let skeleton = read_median(MEDIAN.as_bytes()).unwrap();
        assert_eq!(skeleton.get_number_of_atoms(), 3);
        assert_eq!(skeleton.get_number_of_links(), 2);
        assert_eq!(skeleton.get_number_of_faces(), 1);
        assert_eq!(skeleton.get_atom_by_index(1).unwrap()[3], 0.5);
        assert_eq!(skeleton.link_indices().unwrap(), vec![0, 1, 1, 2]);
        assert_eq!(skeleton.face_indices().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn median_trailing_sections_are_optional() {
        let skeleton = read_median("atoms 1\n1 2 3 4\n".as_bytes()).unwrap();
        assert_eq!(skeleton.get_number_of_atoms(), 1);
        assert_eq!(skeleton.get_number_of_links(), 0);
        assert_eq!(skeleton.get_number_of_faces(), 0);
    }

    #[test]
    fn median_errors_name_the_line() {
        let err = read_median("atoms 2\n0 0 0 1\n0 0 x 1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{}", err);

        let err = read_median("atoms 1\n0 0 0 1\nlinks 1\n0 4\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("out of bounds"), "{}", err);

        let err = read_median("atoms 1\n0 0 0 -1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("radius"), "{}", err);

        assert!(read_median("atoms 2\n0 0 0 1\n".as_bytes()).is_err());
        assert!(read_median("links 0\n".as_bytes()).is_err());
    }

    #[test]
    fn oversized_median_counts_are_errors() {
        let err = read_median("atoms 4611686018427387904\n0 0 0 1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("atoms"), "{}", err);

        let err = read_median("atoms 100000000000\n0 0 0 1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("end of file"), "{}", err);

        assert!(read_median("atoms 99999999999999999999999\n".as_bytes()).is_err());
    }

    #[test]
    fn read_web_file() {
        let web = "l 1 2\nv 0 0 0 1\nv 1 0 0 1\nv 0 1 0 1\nf 1 2 3\no ignored\n";
        let skeleton = read_web(web.as_bytes()).unwrap();
        assert_eq!(skeleton.get_number_of_atoms(), 3);
        assert_eq!(skeleton.link_indices().unwrap(), vec![0, 1]);
        assert_eq!(skeleton.face_indices().unwrap(), vec![0, 1, 2]);

        assert!(read_web("v 0 0 0 1\nv 1 1 1 1\nl 0 1\n".as_bytes()).is_err());
        assert!(read_web("v 0 0 0 1\nl 1 1\n".as_bytes()).is_err());
    }

    #[test]
    fn written_files_read_back() {
        let skeleton = read_median(MEDIAN.as_bytes()).unwrap();

        let mut median = Vec::new();
        write_median(&mut median, &skeleton).unwrap();
        let copy = read_median(median.as_slice()).unwrap();
        assert_eq!(copy.atoms(), skeleton.atoms());
        assert_eq!(copy.face_indices().unwrap(), skeleton.face_indices().unwrap());

        let mut web = Vec::new();
        write_web(&mut web, &skeleton).unwrap();
        let copy = read_web(web.as_slice()).unwrap();
        assert_eq!(copy.link_indices().unwrap(), skeleton.link_indices().unwrap());
    }

    #[test]
    fn format_names() {
        assert_eq!("median".parse::<SkeletonFormat>().unwrap(), SkeletonFormat::Median);
        assert_eq!("web".parse::<SkeletonFormat>().unwrap(), SkeletonFormat::Web);
        assert!("obj".parse::<SkeletonFormat>().is_err());
        assert_eq!(SkeletonFormat::Web.to_string(), "web");
    }
}
