//! NRRD / NHDR volume reader.
//!
//! Supports attached (`.nrrd`) and detached (`.nhdr` + data file) layouts,
//! raw, gzip and ascii encodings, every NRRD scalar type and both byte
//! orders. Header geometry (`space directions`, `space origin`, or plain
//! `spacings`) is converted to the RAS world convention used by the NIfTI
//! reader.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use burn::tensor::backend::Backend;
use flate2::read::GzDecoder;
use ndarray::Array3;
use regkit_core::spatial::Spacing;
use regkit_core::{Image, ImageMetadata};

use crate::error::{IoError, Result};
use crate::geometry::metadata_from_axis_vectors;

const MAGIC: &str = "NRRD000";

/// Element type of the stored samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ScalarType {
    fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Some(match normalized.as_str() {
            "signed char" | "int8" | "int8_t" => Self::Int8,
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => Self::UInt8,
            "short" | "short int" | "signed short" | "signed short int" | "int16" | "int16_t" => Self::Int16,
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => Self::UInt16,
            "int" | "signed int" | "int32" | "int32_t" => Self::Int32,
            "uint" | "unsigned int" | "uint32" | "uint32_t" => Self::UInt32,
            "longlong" | "long long" | "long long int" | "signed long long" | "signed long long int" | "int64"
            | "int64_t" => Self::Int64,
            "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64" | "uint64_t" => Self::UInt64,
            "float" => Self::Float32,
            "double" => Self::Float64,
            _ => return None,
        })
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Decode one element from exactly `self.size()` bytes.
    fn decode(&self, bytes: &[u8], big_endian: bool) -> f32 {
        macro_rules! read {
            ($t:ty) => {{
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                if big_endian {
                    <$t>::from_be_bytes(buf) as f32
                } else {
                    <$t>::from_le_bytes(buf) as f32
                }
            }};
        }
        match self {
            Self::Int8 => read!(i8),
            Self::UInt8 => read!(u8),
            Self::Int16 => read!(i16),
            Self::UInt16 => read!(u16),
            Self::Int32 => read!(i32),
            Self::UInt32 => read!(u32),
            Self::Int64 => read!(i64),
            Self::UInt64 => read!(u64),
            Self::Float32 => read!(f32),
            Self::Float64 => read!(f64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Raw,
    Gzip,
    Ascii,
}

impl Encoding {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "gzip" | "gz" => Some(Self::Gzip),
            "ascii" | "text" | "txt" => Some(Self::Ascii),
            _ => None,
        }
    }
}

/// Parsed NRRD header.
#[derive(Debug, Clone)]
pub struct NrrdHeader {
    pub scalar_type: ScalarType,
    /// Axis sizes, fastest axis first.
    pub sizes: Vec<usize>,
    pub encoding: Encoding,
    pub big_endian: bool,
    pub space: Option<String>,
    /// Per-axis step vectors; `None` for non-spatial axes.
    pub space_directions: Option<Vec<Option<Vec<f64>>>>,
    pub space_origin: Option<Vec<f64>>,
    pub spacings: Option<Vec<f64>>,
    pub data_file: Option<String>,
    pub line_skip: usize,
    pub byte_skip: i64,
    /// Remaining `key: value` fields and `key:=value` pairs.
    pub fields: BTreeMap<String, String>,
}

impl NrrdHeader {
    /// Parse header text (without the data section).
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut lines = text.lines();
        let magic = lines.next().unwrap_or_default();
        if !magic.starts_with(MAGIC) {
            return Err(IoError::corrupt(path, "missing NRRD magic"));
        }

        let mut raw: BTreeMap<String, String> = BTreeMap::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }
            if line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once(":=") {
                raw.insert(key.to_string(), value.to_string());
            } else if let Some((key, value)) = line.split_once(": ") {
                raw.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
            } else {
                tracing::warn!("Ignoring malformed NRRD header line in {}: {}", path.display(), line);
            }
        }

        let mut take = |key: &str| raw.remove(key);

        let scalar_type = take("type")
            .as_deref()
            .and_then(ScalarType::parse)
            .ok_or_else(|| IoError::corrupt(path, "missing or unknown NRRD type"))?;
        let dimension: usize = take("dimension")
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| IoError::corrupt(path, "missing NRRD dimension"))?;
        let sizes: Vec<usize> = take("sizes")
            .map(|v| v.split_whitespace().filter_map(|s| s.parse().ok()).collect())
            .unwrap_or_default();
        if sizes.len() != dimension {
            return Err(IoError::corrupt(
                path,
                format!("sizes lists {} axes but dimension is {dimension}", sizes.len()),
            ));
        }
        let encoding = match take("encoding") {
            Some(value) => {
                Encoding::parse(&value).ok_or_else(|| IoError::corrupt(path, format!("unsupported encoding '{value}'")))?
            }
            None => return Err(IoError::corrupt(path, "missing NRRD encoding")),
        };
        let big_endian = take("endian").map(|e| e.trim() == "big").unwrap_or(false);

        let space = take("space");
        let space_directions = take("space directions").map(|v| parse_direction_list(&v));
        let space_origin = take("space origin").and_then(|v| parse_vector(&v));
        let spacings = take("spacings").map(|v| {
            v.split_whitespace()
                .map(|s| s.parse::<f64>().unwrap_or(f64::NAN))
                .collect()
        });
        let data_file = take("data file").or_else(|| take("datafile"));
        let line_skip = take("line skip")
            .or_else(|| take("lineskip"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        let byte_skip = take("byte skip")
            .or_else(|| take("byteskip"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);

        Ok(Self {
            scalar_type,
            sizes,
            encoding,
            big_endian,
            space,
            space_directions,
            space_origin,
            spacings,
            data_file,
            line_skip,
            byte_skip,
            fields: raw,
        })
    }

    /// Total sample count, or `None` when the sizes overflow `usize`.
    pub fn num_elements(&self) -> Option<usize> {
        self.sizes.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
    }

    /// Spatial metadata in RAS world coordinates for the given spatial axes.
    fn metadata(&self, spatial_axes: &[usize; 3]) -> ImageMetadata<3> {
        if let Some(directions) = &self.space_directions {
            let columns: Option<Vec<[f64; 3]>> = spatial_axes
                .iter()
                .map(|&axis| match directions.get(axis) {
                    Some(Some(v)) if v.len() == 3 => Some([v[0], v[1], v[2]]),
                    _ => None,
                })
                .collect();
            if let Some(columns) = columns {
                let origin = match &self.space_origin {
                    Some(o) if o.len() == 3 => [o[0], o[1], o[2]],
                    _ => [0.0; 3],
                };
                let (columns, origin) = self.to_ras([columns[0], columns[1], columns[2]], origin);
                return metadata_from_axis_vectors(columns, origin);
            }
        }

        if let Some(spacings) = &self.spacings {
            let mut spacing = [1.0; 3];
            for (slot, &axis) in spacing.iter_mut().zip(spatial_axes) {
                if let Some(s) = spacings.get(axis).filter(|s| s.is_finite() && **s > 0.0) {
                    *slot = *s;
                }
            }
            return ImageMetadata::default().with_spacing(Spacing::new(spacing));
        }

        ImageMetadata::default()
    }

    /// Flip world axes so that +x is right and +y is anterior.
    fn to_ras(&self, mut columns: [[f64; 3]; 3], mut origin: [f64; 3]) -> ([[f64; 3]; 3], [f64; 3]) {
        let space = self.space.as_deref().unwrap_or("").trim().to_ascii_lowercase();
        let flips: [bool; 3] = match space.as_str() {
            "left-posterior-superior" | "lps" => [true, true, false],
            "left-anterior-superior" | "las" => [true, false, false],
            _ => [false, false, false],
        };
        for (row, flip) in flips.iter().enumerate() {
            if *flip {
                origin[row] = -origin[row];
                for column in columns.iter_mut() {
                    column[row] = -column[row];
                }
            }
        }
        (columns, origin)
    }
}

/// Parse `(a,b,c)`.
fn parse_vector(text: &str) -> Option<Vec<f64>> {
    let inner = text.trim().strip_prefix('(')?.strip_suffix(')')?;
    inner.split(',').map(|s| s.trim().parse::<f64>().ok()).collect()
}

/// Parse `(a,b,c) (d,e,f) none ...`.
fn parse_direction_list(text: &str) -> Vec<Option<Vec<f64>>> {
    let mut result = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("none") {
            result.push(None);
            rest = after.trim_start();
        } else if rest.starts_with('(') {
            let end = rest.find(')').map(|i| i + 1).unwrap_or(rest.len());
            result.push(parse_vector(&rest[..end]));
            rest = rest[end..].trim_start();
        } else {
            // Unrecognized token: skip to the next separator.
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            result.push(None);
            rest = rest[end..].trim_start();
        }
    }
    result
}

/// Split an attached-header file into header text and data bytes at the
/// first blank line, whichever line ending it uses.
fn split_attached(bytes: &[u8]) -> (&[u8], &[u8]) {
    let lf = bytes.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = bytes.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));
    let first = match (lf, crlf) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    };
    if let Some((i, len)) = first {
        return (&bytes[..i], &bytes[i + len..]);
    }
    (bytes, &[])
}

fn skip_lines(bytes: &[u8], count: usize) -> &[u8] {
    let mut rest = bytes;
    for _ in 0..count {
        match rest.iter().position(|b| *b == b'\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return &[],
        }
    }
    rest
}

/// Read a `.nrrd` or `.nhdr` file as a `[Z, Y, X]` volume.
pub fn read_nrrd<B: Backend>(path: &Path, device: &B::Device) -> Result<Image<B, 3>> {
    let bytes = fs::read(path).map_err(|e| IoError::io(path, e))?;
    let (header_bytes, attached) = split_attached(&bytes);
    let header_text = String::from_utf8_lossy(header_bytes);
    let header = NrrdHeader::parse(&header_text, path)?;

    let (data_path, raw): (PathBuf, Vec<u8>) = match &header.data_file {
        Some(name) if name.trim() != "LIST" && !name.contains('%') => {
            let data_path = path.parent().unwrap_or_else(|| Path::new(".")).join(name.trim());
            let data = fs::read(&data_path).map_err(|e| IoError::io(&data_path, e))?;
            (data_path, data)
        }
        Some(name) => return Err(IoError::corrupt(path, format!("unsupported data file list '{name}'"))),
        None => (path.to_path_buf(), attached.to_vec()),
    };

    let values = decode_samples(&header, &data_path, skip_lines(&raw, header.line_skip))?;

    // Squeeze singleton axes down to three spatial axes.
    let mut axes: Vec<usize> = (0..header.sizes.len()).collect();
    while axes.len() > 3 {
        match axes.iter().rposition(|&a| header.sizes[a] == 1) {
            Some(i) => {
                axes.remove(i);
            }
            None => break,
        }
    }
    let spatial: [usize; 3] = axes
        .as_slice()
        .try_into()
        .map_err(|_| IoError::corrupt(path, format!("expected a 3-D volume, found sizes {:?}", header.sizes)))?;

    let [x, y, z] = spatial.map(|a| header.sizes[a]);
    let array = Array3::from_shape_vec((z, y, x), values)
        .map_err(|e| IoError::corrupt(path, format!("sample count does not match sizes: {e}")))?;

    let metadata = header.metadata(&spatial);
    tracing::debug!(
        "NRRD volume {} has shape {:?} (z, y, x), spacing {:?}",
        path.display(),
        array.shape(),
        metadata.spacing().to_array()
    );
    if !header.fields.is_empty() {
        tracing::debug!("Unused NRRD fields: {:?}", header.fields.keys().collect::<Vec<_>>());
    }
    Ok(Image::from_array(&array, &metadata, device))
}

fn decode_samples(header: &NrrdHeader, path: &Path, data: &[u8]) -> Result<Vec<f32>> {
    let count = header
        .num_elements()
        .ok_or_else(|| IoError::corrupt(path, format!("sizes {:?} overflow", header.sizes)))?;

    if header.encoding == Encoding::Ascii {
        let text = String::from_utf8_lossy(data);
        let values: Vec<f32> = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .take(count)
            .map(|s| s.parse::<f32>().map_err(|_| IoError::corrupt(path, format!("invalid sample '{s}'"))))
            .collect::<Result<_>>()?;
        if values.len() != count {
            return Err(IoError::corrupt(path, format!("expected {count} samples, found {}", values.len())));
        }
        return Ok(values);
    }

    let bytes = match header.encoding {
        Encoding::Gzip => {
            let mut decoded = Vec::new();
            GzDecoder::new(data)
                .read_to_end(&mut decoded)
                .map_err(|e| IoError::corrupt(path, format!("gzip stream: {e}")))?;
            decoded
        }
        _ => data.to_vec(),
    };

    let size = header.scalar_type.size();
    let needed = count
        .checked_mul(size)
        .ok_or_else(|| IoError::corrupt(path, format!("{count} samples of {size} bytes overflow")))?;
    let start = match header.byte_skip {
        -1 => bytes.len().checked_sub(needed),
        skip if skip >= 0 => usize::try_from(skip).ok(),
        _ => None,
    }
    .ok_or_else(|| IoError::corrupt(path, "invalid byte skip"))?;
    let end = start
        .checked_add(needed)
        .ok_or_else(|| IoError::corrupt(path, format!("byte skip {start} overflows")))?;
    let payload = bytes
        .get(start..end)
        .ok_or_else(|| IoError::corrupt(path, format!("expected {needed} data bytes, found {}", bytes.len().saturating_sub(start))))?;

    Ok(payload
        .chunks_exact(size)
        .map(|chunk| header.scalar_type.decode(chunk, header.big_endian))
        .collect())
}
