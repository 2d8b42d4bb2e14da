use super::traits::GeometryFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::{Element, ElementError};
use crate::core::models::molecule::Molecule;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Metadata carried by an XYZ file: the free-form comment line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XyzMetadata {
    /// The second line of the file, with no format imposed on its content.
    pub comment: String,
}

impl XyzMetadata {
    /// Creates metadata with the given comment line.
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
        }
    }
}

/// Error types that can occur when reading or writing XYZ files.
#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
}

/// Specific kinds of parse errors for XYZ format violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XyzParseErrorKind {
    #[error("missing atom count header")]
    MissingHeader,

    #[error("invalid atom count '{0}'")]
    InvalidAtomCount(String),

    #[error("missing comment line")]
    MissingComment,

    #[error("expected an element and three coordinates, found {0} fields")]
    WrongFieldCount(usize),

    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),

    #[error(transparent)]
    InvalidElement(#[from] ElementError),

    #[error("geometry ends after {found} of {expected} atoms")]
    UnexpectedEof { expected: usize, found: usize },
}

fn parse_error(line: usize, kind: XyzParseErrorKind) -> XyzError {
    XyzError::Parse { line, kind }
}

/// Handles reading and writing of the XYZ molecular geometry format.
///
/// An XYZ file is an atom count line, a comment line, then one atom per line
/// as `element x y z` with whitespace-separated fields. Exactly `count` atom
/// lines are consumed (blank lines in between are skipped); anything after the
/// frame, such as further trajectory frames, is left untouched. Element tokens
/// may carry a trailing numeric label (`C7`), so geometries written for Molpro
/// read back cleanly.
pub struct XyzFile;

impl XyzFile {
    /// Writes the molecule with each atom symbol suffixed by its 0-based
    /// index (`C0`, `H1`, ...), the labelled coordinate block Molpro decks
    /// reference atoms by.
    pub fn write_labelled_to(
        molecule: &Molecule,
        metadata: &XyzMetadata,
        writer: &mut impl Write,
    ) -> Result<(), XyzError> {
        writeln!(writer, "{}", molecule.atom_count())?;
        writeln!(writer, "{}", metadata.comment)?;
        for (index, atom) in molecule.atoms().iter().enumerate() {
            writeln!(
                writer,
                "{}{} {:.6} {:.6} {:.6}",
                atom.element.symbol(),
                index,
                atom.position.x,
                atom.position.y,
                atom.position.z
            )?;
        }
        Ok(())
    }

    /// Writes a labelled geometry to a file path.
    pub fn write_labelled_to_path<P: AsRef<std::path::Path>>(
        molecule: &Molecule,
        metadata: &XyzMetadata,
        path: P,
    ) -> Result<(), XyzError> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        Self::write_labelled_to(molecule, metadata, &mut writer)
    }
}

impl GeometryFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Molecule, Self::Metadata), Self::Error> {
        let mut lines = reader.lines();
        let mut line_no = 0usize;

        let count_line = match lines.next() {
            Some(line) => {
                line_no += 1;
                line?
            }
            None => return Err(parse_error(1, XyzParseErrorKind::MissingHeader)),
        };
        let expected: usize = count_line.trim().parse().map_err(|_| {
            parse_error(
                line_no,
                XyzParseErrorKind::InvalidAtomCount(count_line.trim().to_string()),
            )
        })?;

        let comment = match lines.next() {
            Some(line) => {
                line_no += 1;
                line?
            }
            None => return Err(parse_error(line_no + 1, XyzParseErrorKind::MissingComment)),
        };

        let mut molecule = Molecule::new();
        while molecule.atom_count() < expected {
            let line = match lines.next() {
                Some(line) => {
                    line_no += 1;
                    line?
                }
                None => {
                    return Err(parse_error(
                        line_no,
                        XyzParseErrorKind::UnexpectedEof {
                            expected,
                            found: molecule.atom_count(),
                        },
                    ));
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() < 4 {
                return Err(parse_error(
                    line_no,
                    XyzParseErrorKind::WrongFieldCount(fields.len()),
                ));
            }

            let element = Element::parse(fields[0])
                .map_err(|e| parse_error(line_no, XyzParseErrorKind::InvalidElement(e)))?;
            let mut coords = [0.0f64; 3];
            for (slot, field) in coords.iter_mut().zip(&fields[1..4]) {
                *slot = field.parse().map_err(|_| {
                    parse_error(
                        line_no,
                        XyzParseErrorKind::InvalidCoordinate(field.to_string()),
                    )
                })?;
            }
            molecule.push(Atom::new(
                element,
                Point3::new(coords[0], coords[1], coords[2]),
            ));
        }

        Ok((molecule, XyzMetadata { comment }))
    }

    fn write_to(
        molecule: &Molecule,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", molecule.atom_count())?;
        writeln!(writer, "{}", metadata.comment)?;
        for atom in molecule.atoms() {
            writeln!(
                writer,
                "{} {:.6} {:.6} {:.6}",
                atom.element.symbol(),
                atom.position.x,
                atom.position.y,
                atom.position.z
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    const WATER: &str = "3\nwater molecule\nO 0.000000 0.000000 0.000000\nH 0.960000 0.000000 0.000000\nH -0.240000 0.930000 0.000000\n";

    fn read(text: &str) -> Result<(Molecule, XyzMetadata), XyzError> {
        let mut reader = BufReader::new(text.as_bytes());
        XyzFile::read_from(&mut reader)
    }

    mod reading {
        use super::*;

        #[test]
        fn reads_a_plain_geometry() {
            let (molecule, metadata) = read(WATER).unwrap();
            assert_eq!(molecule.atom_count(), 3);
            assert_eq!(metadata.comment, "water molecule");
            assert_eq!(molecule.atom(0).unwrap().element.symbol(), "O");
            let h = molecule.atom(1).unwrap();
            assert!((h.position.x - 0.96).abs() < 1e-12);
        }

        #[test]
        fn accepts_labelled_element_tokens() {
            let text = "2\n\nC0 0.0 0.0 0.0\nH1 1.09 0.0 0.0\n";
            let (molecule, _) = read(text).unwrap();
            assert_eq!(molecule.atom(0).unwrap().element.symbol(), "C");
            assert_eq!(molecule.atom(1).unwrap().element.symbol(), "H");
        }

        #[test]
        fn ignores_extra_columns_after_coordinates() {
            let text = "1\n\nO 0.0 0.0 0.0 -0.834\n";
            let (molecule, _) = read(text).unwrap();
            assert_eq!(molecule.atom_count(), 1);
        }

        #[test]
        fn skips_blank_lines_between_atoms() {
            let text = "2\n\nO 0.0 0.0 0.0\n\nH 1.0 0.0 0.0\n";
            let (molecule, _) = read(text).unwrap();
            assert_eq!(molecule.atom_count(), 2);
        }

        #[test]
        fn stops_after_the_declared_frame() {
            let two_frames = format!("{WATER}3\nsecond frame\nO 0.0 0.0 0.0\nH 1.0 0.0 0.0\nH -1.0 0.0 0.0\n");
            let (molecule, _) = read(&two_frames).unwrap();
            assert_eq!(molecule.atom_count(), 3);
        }

        #[test]
        fn reads_an_empty_frame() {
            let (molecule, metadata) = read("0\nnothing here\n").unwrap();
            assert!(molecule.is_empty());
            assert_eq!(metadata.comment, "nothing here");
        }

        #[test]
        fn fails_on_empty_input() {
            let err = read("").unwrap_err();
            assert!(matches!(
                err,
                XyzError::Parse {
                    line: 1,
                    kind: XyzParseErrorKind::MissingHeader
                }
            ));
        }

        #[test]
        fn fails_on_non_numeric_atom_count() {
            let err = read("three\ncomment\n").unwrap_err();
            assert!(matches!(
                err,
                XyzError::Parse {
                    line: 1,
                    kind: XyzParseErrorKind::InvalidAtomCount(_)
                }
            ));
        }

        #[test]
        fn fails_when_comment_line_is_missing() {
            let err = read("2\n").unwrap_err();
            assert!(matches!(
                err,
                XyzError::Parse {
                    line: 2,
                    kind: XyzParseErrorKind::MissingComment
                }
            ));
        }

        #[test]
        fn fails_on_short_atom_line_with_line_number() {
            let err = read("1\ncomment\nO 0.0 0.0\n").unwrap_err();
            assert!(matches!(
                err,
                XyzError::Parse {
                    line: 3,
                    kind: XyzParseErrorKind::WrongFieldCount(3)
                }
            ));
        }

        #[test]
        fn fails_on_unparseable_coordinate() {
            let err = read("1\ncomment\nO 0.0 zero 0.0\n").unwrap_err();
            assert!(matches!(
                err,
                XyzError::Parse {
                    line: 3,
                    kind: XyzParseErrorKind::InvalidCoordinate(ref c)
                } if c == "zero"
            ));
        }

        #[test]
        fn fails_on_invalid_element_symbol() {
            let err = read("1\ncomment\n12 0.0 0.0 0.0\n").unwrap_err();
            assert!(matches!(
                err,
                XyzError::Parse {
                    line: 3,
                    kind: XyzParseErrorKind::InvalidElement(_)
                }
            ));
        }

        #[test]
        fn fails_when_atoms_run_out_before_the_declared_count() {
            let err = read("3\ncomment\nO 0.0 0.0 0.0\n").unwrap_err();
            assert!(matches!(
                err,
                XyzError::Parse {
                    kind: XyzParseErrorKind::UnexpectedEof {
                        expected: 3,
                        found: 1
                    },
                    ..
                }
            ));
        }
    }

    mod writing {
        use super::*;

        #[test]
        fn writes_count_comment_and_atom_lines() {
            let (molecule, metadata) = read(WATER).unwrap();
            let mut buffer = Vec::new();
            XyzFile::write_to(&molecule, &metadata, &mut buffer).unwrap();
            let text = String::from_utf8(buffer).unwrap();
            assert_eq!(text, WATER);
        }

        #[test]
        fn labelled_writer_appends_atom_indices() {
            let (molecule, _) = read(WATER).unwrap();
            let metadata = XyzMetadata::default();
            let mut buffer = Vec::new();
            XyzFile::write_labelled_to(&molecule, &metadata, &mut buffer).unwrap();
            let text = String::from_utf8(buffer).unwrap();
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines[0], "3");
            assert_eq!(lines[2], "O0 0.000000 0.000000 0.000000");
            assert_eq!(lines[3], "H1 0.960000 0.000000 0.000000");
        }

        #[test]
        fn labelled_output_reads_back_with_plain_symbols() {
            let (molecule, _) = read(WATER).unwrap();
            let mut buffer = Vec::new();
            XyzFile::write_labelled_to(&molecule, &XyzMetadata::default(), &mut buffer).unwrap();
            let text = String::from_utf8(buffer).unwrap();
            let (reread, _) = read(&text).unwrap();
            assert_eq!(reread.atom(0).unwrap().element.symbol(), "O");
            assert_eq!(reread.atom_count(), 3);
        }
    }

    mod paths {
        use super::*;

        #[test]
        fn round_trips_through_the_filesystem() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("water.xyz");
            let (molecule, metadata) = read(WATER).unwrap();
            XyzFile::write_to_path(&molecule, &metadata, &path).unwrap();
            let (reread, remeta) = XyzFile::read_from_path(&path).unwrap();
            assert_eq!(reread, molecule);
            assert_eq!(remeta, metadata);
        }

        #[test]
        fn read_from_missing_path_is_an_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let result = XyzFile::read_from_path(dir.path().join("absent.xyz"));
            assert!(matches!(result, Err(XyzError::Io(_))));
        }
    }
}
