//! Fixed-point binary format for linear SVM models.
//!
//! Layout, all integers 4-byte little-endian signed:
//!
//! ```text
//! number_of_inputs
//! number_of_support_vectors
//! repeat number_of_support_vectors:
//!     vector_length, vector_length × value
//! number_of_weights, number_of_weights × value
//! threshold value
//! ```
//!
//! A value is stored as `round(v × 1e9)`, so only magnitudes up to 1 can be
//! written and precision beyond nine decimal places is lost. There is no
//! header or version field. The kernel constant is not stored; decoded models
//! use a plain dot product.
//!
//! Files ending in `.bz2` are transparently (de)compressed.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;

use crate::error::{Error, Result};
use crate::svm::{Linear, SupportVectorMachine};

pub const FIXED_POINT_SCALE: f64 = 1_000_000_000.0;

/// Fixed-point representation of `value`. Fails for `|value| > 1`.
pub fn encode_value(value: f64) -> Result<i32> {
    if !value.is_finite() || value.abs() > 1.0 {
        return Err(Error::ValueOutOfRange(value));
    }
    Ok((value * FIXED_POINT_SCALE).round() as i32)
}

pub fn decode_value(encoded: i32) -> f64 {
    encoded as f64 / FIXED_POINT_SCALE
}

/// Writes the primitives of the model format.
pub struct ModelWriter<W: Write> {
    writer: W,
}

impl<W: Write> ModelWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.writer.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = i32::try_from(count)
            .map_err(|_| Error::InvalidArgument(format!("count {} does not fit the format", count)))?;
        self.write_int(count)
    }

    pub fn write_value(&mut self, value: f64) -> Result<()> {
        self.write_int(encode_value(value)?)
    }

    fn write_values(&mut self, values: &[f64]) -> Result<()> {
        self.write_count(values.len())?;
        values.iter().try_for_each(|v| self.write_value(*v))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads the primitives of the model format.
pub struct ModelReader<R: Read> {
    reader: R,
}

impl<R: Read> ModelReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn read_int(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                Error::InvalidModel("unexpected end of model data".into())
            } else {
                Error::Io(e)
            }
        })?;
        Ok(i32::from_le_bytes(buf))
    }

    fn read_count(&mut self, what: &str) -> Result<usize> {
        let count = self.read_int()?;
        usize::try_from(count)
            .map_err(|_| Error::InvalidModel(format!("negative {} count: {}", what, count)))
    }

    pub fn read_value(&mut self) -> Result<f64> {
        Ok(decode_value(self.read_int()?))
    }

    fn read_values(&mut self, what: &str) -> Result<Vec<f64>> {
        let count = self.read_count(what)?;
        // Grown as values arrive so a corrupt count cannot force a huge allocation
        let mut values = Vec::new();
        for _ in 0..count {
            values.push(self.read_value()?);
        }
        Ok(values)
    }
}

/// Serialise a model into a writer.
pub fn write_model<W: Write>(writer: W, svm: &SupportVectorMachine<Linear>) -> Result<W> {
    let mut w = ModelWriter::new(writer);
    w.write_count(svm.number_of_inputs())?;
    w.write_count(svm.support_vectors().len())?;
    for vector in svm.support_vectors() {
        w.write_values(vector)?;
    }
    w.write_values(svm.weights())?;
    w.write_value(svm.threshold())?;
    Ok(w.into_inner())
}

/// Deserialise a model from a reader. Bytes after the threshold are ignored.
pub fn read_model<R: Read>(reader: R) -> Result<SupportVectorMachine<Linear>> {
    let mut r = ModelReader::new(reader);
    let number_of_inputs = r.read_count("input")?;
    let number_of_support_vectors = r.read_count("support vector")?;
    let mut support_vectors = Vec::new();
    for _ in 0..number_of_support_vectors {
        support_vectors.push(r.read_values("support vector value")?);
    }
    let weights = r.read_values("weight")?;
    let threshold = r.read_value()?;
    SupportVectorMachine::new(number_of_inputs, Linear::default(), support_vectors, weights, threshold)
}

pub fn encode(svm: &SupportVectorMachine<Linear>) -> Result<Vec<u8>> {
    write_model(Vec::new(), svm)
}

pub fn decode(bytes: &[u8]) -> Result<SupportVectorMachine<Linear>> {
    read_model(bytes)
}

fn is_bz2(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "bz2")
}

/// Write a model file, bzip2-compressed if the path ends in `.bz2`.
pub fn save_model<P: AsRef<Path>>(path: P, svm: &SupportVectorMachine<Linear>) -> Result<()> {
    let path = path.as_ref();
    // Encode fully first so an invalid value never leaves a partial file behind
    let bytes = encode(svm)?;
    let writer = BufWriter::new(File::create(path)?);
    if is_bz2(path) {
        let mut encoder = BzEncoder::new(writer, Compression::best());
        encoder.write_all(&bytes)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = writer;
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    Ok(())
}

/// Load a model file, decompressing it if the path ends in `.bz2`.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<SupportVectorMachine<Linear>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    if is_bz2(path) {
        read_model(BzDecoder::new(reader))
    } else {
        read_model(reader)
    }
}
