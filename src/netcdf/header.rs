//! In-memory header of a classic container, with its XDR encoding and the
//! data layout (variable sizes and offsets) derived from it.

use std::io::{ErrorKind, Read};

use super::error::Error;
use super::types::{AttrValue, NcType};
use super::xdr::{XdrReader, XdrWriter, padding};

const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;

/// Marker for a record count that has to be derived from the file length.
pub(crate) const STREAMING: u32 = 0xFFFF_FFFF;

/// Byte offset of the record count in every classic header.
pub(crate) const NUMRECS_OFFSET: u64 = 4;

/// On-disk flavour of the classic format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    /// CDF-1, 32-bit variable offsets.
    Classic,
    /// CDF-2, 64-bit variable offsets.
    #[default]
    Offset64,
}

impl Version {
    fn magic_byte(self) -> u8 {
        match self {
            Version::Classic => 1,
            Version::Offset64 => 2,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::Classic => f.write_str("CDF-1 (classic)"),
            Version::Offset64 => f.write_str("CDF-2 (64-bit offset)"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Dimension {
    pub name: String,
    /// Declared length; meaningless for the unlimited dimension.
    pub size: usize,
    pub unlimited: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

#[derive(Debug, Clone)]
pub(crate) struct VarInfo {
    pub name: String,
    pub dim_ids: Vec<usize>,
    pub attributes: Vec<Attribute>,
    pub nc_type: NcType,
    /// Unpadded byte size of the whole variable, or of one of its records.
    pub slab: u64,
    pub vsize: u64,
    pub begin: u64,
}

impl VarInfo {
    pub fn new(name: &str, dim_ids: Vec<usize>, nc_type: NcType) -> Self {
        Self {
            name: name.to_string(),
            dim_ids,
            attributes: Vec::new(),
            nc_type,
            slab: 0,
            vsize: 0,
            begin: 0,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        find_attribute(&self.attributes, name)
    }
}

pub(crate) fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a AttrValue> {
    attributes.iter().find(|a| a.name == name).map(|a| &a.value)
}

/// Inserts or replaces an attribute, keeping definition order.
pub(crate) fn set_attribute(attributes: &mut Vec<Attribute>, name: &str, value: AttrValue) {
    match attributes.iter_mut().find(|a| a.name == name) {
        Some(existing) => existing.value = value,
        None => attributes.push(Attribute {
            name: name.to_string(),
            value,
        }),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Header {
    pub version: Version,
    pub numrecs: u64,
    pub streaming: bool,
    pub dimensions: Vec<Dimension>,
    pub attributes: Vec<Attribute>,
    pub variables: Vec<VarInfo>,
    record_stride: u64,
}

impl Header {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            numrecs: 0,
            streaming: false,
            dimensions: Vec::new(),
            attributes: Vec::new(),
            variables: Vec::new(),
            record_stride: 0,
        }
    }

    pub fn find_dimension(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    pub fn find_variable(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    pub fn record_dimension(&self) -> Option<usize> {
        self.dimensions.iter().position(|d| d.unlimited)
    }

    /// Current length of a dimension; the record count for the unlimited one.
    pub fn dim_size(&self, id: usize) -> usize {
        let dim = &self.dimensions[id];
        if dim.unlimited {
            self.numrecs as usize
        } else {
            dim.size
        }
    }

    pub fn is_record_var(&self, var: &VarInfo) -> bool {
        var.dim_ids
            .first()
            .is_some_and(|&id| self.dimensions[id].unlimited)
    }

    /// Unpadded byte size of a whole fixed variable, or of one record of a
    /// record variable; `None` when it overflows 64 bits.
    pub fn slab_size(&self, var: &VarInfo) -> Option<u64> {
        let skip = usize::from(self.is_record_var(var));
        var.dim_ids[skip..]
            .iter()
            .try_fold(var.nc_type.size() as u64, |acc, &id| {
                acc.checked_mul(self.dimensions[id].size as u64)
            })
    }

    /// Bytes between the same variable in two consecutive records.
    pub fn record_size(&self) -> u64 {
        self.record_stride
    }

    /// Derives `slab`, `vsize` and the record stride from the schema.
    /// Overflows are reported through `too_large`.
    fn assign_sizes(&mut self, too_large: fn(String) -> Error) -> Result<(), Error> {
        let mut sizes = Vec::with_capacity(self.variables.len());
        for var in &self.variables {
            let sized = self.slab_size(var).and_then(|slab| {
                let vsize = slab.checked_add(padding((slab % 4) as usize) as u64)?;
                Some((slab, vsize))
            });
            let sized =
                sized.ok_or_else(|| too_large(format!("variable '{}' is too large", var.name)))?;
            sizes.push(sized);
        }
        for (var, (slab, vsize)) in self.variables.iter_mut().zip(sizes) {
            var.slab = slab;
            var.vsize = vsize;
        }

        let records: Vec<&VarInfo> = self
            .variables
            .iter()
            .filter(|v| self.is_record_var(v))
            .collect();
        let stride = match records.as_slice() {
            [single] => Some(single.slab),
            many => many.iter().try_fold(0u64, |acc, v| acc.checked_add(v.vsize)),
        };
        self.record_stride =
            stride.ok_or_else(|| too_large("records are too large".to_string()))?;
        Ok(())
    }

    /// Offset of the first record, or `None` without record variables.
    pub fn record_begin(&self) -> Option<u64> {
        self.variables
            .iter()
            .filter(|v| self.is_record_var(v))
            .map(|v| v.begin)
            .min()
    }

    /// Byte offset one past the last fixed-size variable.
    pub fn fixed_end(&self) -> u64 {
        self.variables
            .iter()
            .filter(|v| !self.is_record_var(v))
            .map(|v| v.begin + v.vsize)
            .max()
            .unwrap_or_else(|| self.encoded_len())
    }

    fn encoded_len(&self) -> u64 {
        self.encode().len() as u64
    }

    /// Assigns `vsize` and `begin` to every variable: fixed-size variables
    /// first in definition order, record variables interleaved after them.
    pub fn compute_layout(&mut self) -> Result<(), Error> {
        self.assign_sizes(Error::Schema)?;
        let records: Vec<bool> = self
            .variables
            .iter()
            .map(|v| self.is_record_var(v))
            .collect();

        // Offsets have a fixed width, so the header length does not depend on them.
        let mut offset = self.encoded_len();

        for pass in [false, true] {
            for (var, &record) in self.variables.iter_mut().zip(&records) {
                if record == pass {
                    var.begin = offset;
                    offset = offset.checked_add(var.vsize).ok_or_else(|| {
                        Error::Schema(format!(
                            "variable '{}' ends past any valid offset",
                            var.name
                        ))
                    })?;
                }
            }
        }

        if self.version == Version::Classic && offset > u64::from(u32::MAX) {
            return Err(Error::Schema(
                "data does not fit in a CDF-1 container, use 64-bit offsets".to_string(),
            ));
        }
        Ok(())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();
        w.write_raw(&[b'C', b'D', b'F', self.version.magic_byte()]);
        w.write_u32(if self.streaming {
            STREAMING
        } else {
            self.numrecs as u32
        });

        if self.dimensions.is_empty() {
            w.write_u32(0);
            w.write_u32(0);
        } else {
            w.write_u32(NC_DIMENSION);
            w.write_u32(self.dimensions.len() as u32);
            for dim in &self.dimensions {
                w.write_string(&dim.name);
                w.write_u32(if dim.unlimited { 0 } else { dim.size as u32 });
            }
        }

        encode_attributes(&mut w, &self.attributes);

        if self.variables.is_empty() {
            w.write_u32(0);
            w.write_u32(0);
        } else {
            w.write_u32(NC_VARIABLE);
            w.write_u32(self.variables.len() as u32);
            for var in &self.variables {
                w.write_string(&var.name);
                w.write_u32(var.dim_ids.len() as u32);
                for &id in &var.dim_ids {
                    w.write_u32(id as u32);
                }
                encode_attributes(&mut w, &var.attributes);
                w.write_u32(var.nc_type.code());
                w.write_u32(var.vsize.min(u64::from(u32::MAX)) as u32);
                match self.version {
                    Version::Classic => w.write_u32(var.begin as u32),
                    Version::Offset64 => w.write_u64(var.begin),
                }
            }
        }

        w.into_inner()
    }

    pub fn decode<R: Read>(reader: R) -> Result<Self, Error> {
        decode_header(&mut XdrReader::new(reader)).map_err(|err| match err {
            Error::Io { source } if source.kind() == ErrorKind::UnexpectedEof => {
                Error::Format("truncated header".to_string())
            }
            other => other,
        })
    }
}

fn encode_attributes(w: &mut XdrWriter, attributes: &[Attribute]) {
    if attributes.is_empty() {
        w.write_u32(0);
        w.write_u32(0);
        return;
    }

    w.write_u32(NC_ATTRIBUTE);
    w.write_u32(attributes.len() as u32);
    for attr in attributes {
        w.write_string(&attr.name);
        w.write_u32(attr.value.nc_type().code());
        w.write_u32(attr.value.len() as u32);
        let mut values = Vec::new();
        attr.value.encode_values(&mut values);
        w.write_opaque(&values);
    }
}

fn decode_header<R: Read>(r: &mut XdrReader<R>) -> Result<Header, Error> {
    let magic = r.read_magic()?;
    let version = match magic {
        [b'C', b'D', b'F', 1] => Version::Classic,
        [b'C', b'D', b'F', 2] => Version::Offset64,
        [b'C', b'D', b'F', 5] => {
            return Err(Error::Format(
                "CDF-5 (64-bit data) containers are not supported".to_string(),
            ));
        }
        [0x89, b'H', b'D', b'F'] => {
            return Err(Error::Format(
                "NetCDF-4/HDF5 containers are not supported".to_string(),
            ));
        }
        _ => {
            return Err(Error::Format(
                "missing 'CDF' magic number".to_string(),
            ));
        }
    };

    let numrecs = r.read_u32()?;
    let mut header = Header::new(version);
    header.streaming = numrecs == STREAMING;
    header.numrecs = if header.streaming { 0 } else { u64::from(numrecs) };

    let count = read_list_header(r, NC_DIMENSION, "dimension")?;
    for _ in 0..count {
        let name = r.read_string()?;
        let size = r.read_u32()? as usize;
        if size == 0 && header.record_dimension().is_some() {
            return Err(Error::Format(
                "more than one unlimited dimension".to_string(),
            ));
        }
        header.dimensions.push(Dimension {
            name,
            size,
            unlimited: size == 0,
        });
    }

    header.attributes = decode_attributes(r)?;

    let count = read_list_header(r, NC_VARIABLE, "variable")?;
    for _ in 0..count {
        let name = r.read_string()?;
        let ndims = r.read_u32()? as usize;
        let mut dim_ids = Vec::new();
        for _ in 0..ndims {
            let id = r.read_u32()? as usize;
            if id >= header.dimensions.len() {
                return Err(Error::Format(format!(
                    "variable '{name}' refers to unknown dimension id {id}"
                )));
            }
            dim_ids.push(id);
        }
        let attributes = decode_attributes(r)?;
        let code = r.read_u32()?;
        let nc_type = NcType::from_code(code)
            .ok_or_else(|| Error::Format(format!("unknown type code {code} for '{name}'")))?;
        let vsize = u64::from(r.read_u32()?);
        let begin = match version {
            Version::Classic => u64::from(r.read_u32()?),
            Version::Offset64 => r.read_u64()?,
        };

        let mut var = VarInfo::new(&name, dim_ids, nc_type);
        var.attributes = attributes;
        var.vsize = vsize;
        var.begin = begin;
        if var
            .dim_ids
            .iter()
            .skip(1)
            .any(|&id| header.dimensions[id].unlimited)
        {
            return Err(Error::Format(format!(
                "variable '{name}' uses the unlimited dimension after its first axis"
            )));
        }
        header.variables.push(var);
    }

    // Strides come from the schema: the stored vsize is clamped for very
    // large variables.
    header.assign_sizes(Error::Format)?;
    if let Some(var) = header
        .variables
        .iter()
        .find(|v| v.begin.checked_add(v.vsize).is_none())
    {
        return Err(Error::Format(format!(
            "variable '{}' ends past any valid offset",
            var.name
        )));
    }

    Ok(header)
}

fn read_list_header<R: Read>(
    r: &mut XdrReader<R>,
    expected: u32,
    what: &str,
) -> Result<u32, Error> {
    let tag = r.read_u32()?;
    let count = r.read_u32()?;
    match tag {
        0 if count == 0 => Ok(0),
        tag if tag == expected => Ok(count),
        other => Err(Error::Format(format!(
            "unexpected tag {other:#x} in {what} list"
        ))),
    }
}

fn decode_attributes<R: Read>(r: &mut XdrReader<R>) -> Result<Vec<Attribute>, Error> {
    let count = read_list_header(r, NC_ATTRIBUTE, "attribute")?;
    let mut attributes = Vec::new();
    for _ in 0..count {
        let name = r.read_string()?;
        let code = r.read_u32()?;
        let nc_type = NcType::from_code(code).ok_or_else(|| {
            Error::Format(format!("unknown type code {code} for attribute '{name}'"))
        })?;
        let nelems = r.read_u32()? as usize;
        let bytes = r.read_opaque(nelems * nc_type.size())?;
        attributes.push(Attribute {
            name,
            value: AttrValue::decode_values(nc_type, &bytes),
        });
    }
    Ok(attributes)
}
