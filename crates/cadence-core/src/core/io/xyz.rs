use crate::core::models::cell::Cell;
use crate::core::models::particle::Particle;
use crate::core::models::system::System;
use nalgebra::{Point3, Vector3};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing XYZ trajectory files.
#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XYZ data at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// A single trajectory frame: the step at which it was recorded and the
/// system configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub step: u64,
    pub system: System,
}

/// An append-mode handle on an XYZ trajectory file.
///
/// Each frame is stored in the conventional layout: a particle count line, a
/// comment line carrying `step=<n>` and optionally `cell=<x>,<y>,<z>`, then
/// one `species x y z` record per particle.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzTrajectory {
    path: PathBuf,
}

impl XyzTrajectory {
    /// Creates a handle for the given path without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the underlying file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes any previously written trajectory file.
    ///
    /// Missing files are not an error.
    pub fn clear(&self) -> Result<(), XyzError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Appends one frame to the trajectory.
    pub fn write_frame(&self, system: &System, step: u64) -> Result<(), XyzError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut out = BufWriter::new(file);
        write_frame_to(&mut out, system, step)?;
        out.flush()?;
        Ok(())
    }

    /// Overwrites the file with a single frame.
    ///
    /// Used by checkpoints, which only ever keep the latest configuration.
    pub fn write_single_frame(&self, system: &System, step: u64) -> Result<(), XyzError> {
        let file = File::create(&self.path)?;
        let mut out = BufWriter::new(file);
        write_frame_to(&mut out, system, step)?;
        out.flush()?;
        Ok(())
    }

    /// Reads every frame in the file.
    pub fn read_frames(&self) -> Result<Vec<Frame>, XyzError> {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);
        let mut frames = Vec::new();
        let mut line_no = 0usize;
        loop {
            match read_frame_from(&mut reader, &mut line_no)? {
                Some(frame) => frames.push(frame),
                None => break,
            }
        }
        Ok(frames)
    }

    /// Reads the last frame in the file, if any.
    pub fn read_last_frame(&self) -> Result<Option<Frame>, XyzError> {
        Ok(self.read_frames()?.pop())
    }
}

fn write_frame_to<W: Write>(out: &mut W, system: &System, step: u64) -> Result<(), XyzError> {
    writeln!(out, "{}", system.particle.len())?;
    match &system.cell {
        Some(cell) => writeln!(
            out,
            "step={} cell={},{},{}",
            step, cell.side.x, cell.side.y, cell.side.z
        )?,
        None => writeln!(out, "step={}", step)?,
    }
    for p in &system.particle {
        writeln!(
            out,
            "{} {} {} {}",
            p.species, p.position.x, p.position.y, p.position.z
        )?;
    }
    Ok(())
}

fn read_frame_from<R: BufRead>(
    reader: &mut R,
    line_no: &mut usize,
) -> Result<Option<Frame>, XyzError> {
    let Some(count_line) = next_line(reader, line_no)? else {
        return Ok(None);
    };
    if count_line.trim().is_empty() {
        return Ok(None);
    }
    let count: usize = count_line
        .trim()
        .parse()
        .map_err(|_| XyzError::Parse {
            line: *line_no,
            message: format!("expected particle count, found '{}'", count_line.trim()),
        })?;

    let comment = next_line(reader, line_no)?.ok_or_else(|| XyzError::Parse {
        line: *line_no,
        message: "missing comment line".to_string(),
    })?;
    let (step, cell) = parse_comment(&comment, *line_no)?;

    let mut particles = Vec::with_capacity(count);
    for _ in 0..count {
        let record = next_line(reader, line_no)?.ok_or_else(|| XyzError::Parse {
            line: *line_no,
            message: "unexpected end of file inside frame".to_string(),
        })?;
        particles.push(parse_particle(&record, *line_no)?);
    }

    Ok(Some(Frame {
        step,
        system: System::with_particles(particles, cell),
    }))
}

fn next_line<R: BufRead>(reader: &mut R, line_no: &mut usize) -> Result<Option<String>, XyzError> {
    let mut buf = String::new();
    let read = reader.read_line(&mut buf)?;
    if read == 0 {
        return Ok(None);
    }
    *line_no += 1;
    Ok(Some(buf))
}

fn parse_comment(comment: &str, line: usize) -> Result<(u64, Option<Cell>), XyzError> {
    let mut step = 0u64;
    let mut cell = None;
    for token in comment.split_whitespace() {
        if let Some(value) = token.strip_prefix("step=") {
            step = value.parse().map_err(|_| XyzError::Parse {
                line,
                message: format!("invalid step '{}'", value),
            })?;
        } else if let Some(value) = token.strip_prefix("cell=") {
            let sides: Vec<f64> = value
                .split(',')
                .map(|s| s.parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| XyzError::Parse {
                    line,
                    message: format!("invalid cell '{}'", value),
                })?;
            if sides.len() != 3 {
                return Err(XyzError::Parse {
                    line,
                    message: format!("cell must have three sides, found {}", sides.len()),
                });
            }
            cell = Some(Cell::new(Vector3::new(sides[0], sides[1], sides[2])));
        }
    }
    Ok((step, cell))
}

fn parse_particle(record: &str, line: usize) -> Result<Particle, XyzError> {
    let fields: Vec<&str> = record.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XyzError::Parse {
            line,
            message: format!("expected 'species x y z', found '{}'", record.trim()),
        });
    }
    let coords: Vec<f64> = fields[1..4]
        .iter()
        .map(|s| s.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| XyzError::Parse {
            line,
            message: format!("invalid coordinates in '{}'", record.trim()),
        })?;
    Ok(Particle::new(
        fields[0],
        Point3::new(coords[0], coords[1], coords[2]),
    ))
}
