use std::marker::PhantomData;

use super::header::{VarInfo, set_attribute};
use super::types::{AttrValue, NcValue};
use super::{Error, Mode, NcFile, Phase};

/// Typed accessor to one variable of an open container.
///
/// Obtained from [`NcFile::variable`] or [`NcFile::add_variable`]; it borrows
/// the container mutably, so only one accessor exists at a time.
#[derive(Debug)]
pub struct Variable<'a, T: NcValue> {
    file: &'a mut NcFile,
    id: usize,
    marker: PhantomData<T>,
}

impl<'a, T: NcValue> Variable<'a, T> {
    pub(super) fn new(file: &'a mut NcFile, id: usize) -> Self {
        Self {
            file,
            id,
            marker: PhantomData,
        }
    }

    fn info(&self) -> &VarInfo {
        &self.file.header.variables[self.id]
    }

    fn is_record(&self) -> bool {
        self.file.header.is_record_var(self.info())
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    /// Current size of every dimension of the variable, in order.
    pub fn dimensions(&self) -> Vec<usize> {
        self.info()
            .dim_ids
            .iter()
            .map(|&id| self.file.header.dim_size(id))
            .collect()
    }

    pub fn dimension_names(&self) -> Vec<&str> {
        self.info()
            .dim_ids
            .iter()
            .map(|&id| self.file.header.dimensions[id].name.as_str())
            .collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.info().attribute(name)
    }

    pub fn attribute_exists(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn string_attribute(&self, name: &str) -> Result<String, Error> {
        match self.attribute(name) {
            Some(AttrValue::Text(text)) => Ok(text.clone()),
            Some(other) => Err(Error::AttributeType {
                name: name.to_string(),
                expected: "text",
                found: other.nc_type(),
            }),
            None => Err(self.missing_attribute(name)),
        }
    }

    /// First value of a numeric attribute, narrowed to `f32`.
    pub fn float_attribute(&self, name: &str) -> Result<f32, Error> {
        let value = self
            .attribute(name)
            .ok_or_else(|| self.missing_attribute(name))?;
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| Error::AttributeType {
                name: name.to_string(),
                expected: "numeric",
                found: value.nc_type(),
            })
    }

    fn missing_attribute(&self, name: &str) -> Error {
        Error::MissingAttribute {
            variable: self.name().to_string(),
            name: name.to_string(),
        }
    }

    pub fn add_string_attribute(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.add_attribute(name, AttrValue::from(value))
    }

    pub fn add_float_attribute(&mut self, name: &str, value: f32) -> Result<(), Error> {
        self.add_attribute(name, AttrValue::from(value))
    }

    fn add_attribute(&mut self, name: &str, value: AttrValue) -> Result<(), Error> {
        self.file.ensure_define("add a variable attribute")?;
        if name.is_empty() {
            return Err(Error::Schema("attribute names cannot be empty".to_string()));
        }
        set_attribute(&mut self.file.header.variables[self.id].attributes, name, value);
        Ok(())
    }

    /// Reads the hyperslab starting at `start` with extent `count`, in
    /// row-major order.
    pub fn get(&self, start: &[usize], count: &[usize]) -> Result<Vec<T>, Error> {
        if self.file.phase != Phase::Data {
            return Err(Error::Phase {
                operation: "read variable data",
                phase: self.file.phase,
            });
        }

        let shape = self.dimensions();
        self.check_selection(&shape, start, count, false)?;

        let total = self.element_count(count)?;
        if total == 0 {
            return Ok(Vec::new());
        }

        let end = self.selection_end(start, count)?;
        let stored = self.file.file.metadata()?.len();
        if end > stored {
            return Err(Error::Format(format!(
                "data of '{}' ends at byte {end}, past the end of the file ({stored} bytes)",
                self.name()
            )));
        }

        let mut values = Vec::with_capacity(total);
        let size = T::TYPE.size();
        for (offset, len) in self.runs(start, count) {
            let bytes = self.file.read_at(offset, len * size)?;
            values.extend(bytes.chunks_exact(size).map(T::decode));
        }
        Ok(values)
    }

    /// Writes `data` (row-major) into the hyperslab at `start` with extent
    /// `count`. Writing past the last record extends the record dimension.
    pub fn add(&mut self, start: &[usize], count: &[usize], data: &[T]) -> Result<(), Error> {
        if self.file.mode == Mode::Read {
            return Err(Error::ReadOnly("write variable data"));
        }
        if self.file.phase != Phase::Data {
            return Err(Error::Phase {
                operation: "write variable data",
                phase: self.file.phase,
            });
        }

        let shape = self.dimensions();
        self.check_selection(&shape, start, count, true)?;

        let total = self.element_count(count)?;
        if data.len() != total {
            return Err(Error::bounds(
                self.name(),
                format!(
                    "selection holds {total} values but {} were given",
                    data.len()
                ),
            ));
        }
        if total == 0 {
            return Ok(());
        }
        self.selection_end(start, count)?;

        if self.is_record() {
            let end = (start[0] + count[0]) as u64;
            if end > self.file.header.numrecs {
                self.file.grow_records(end)?;
            }
        }

        let size = T::TYPE.size();
        let mut cursor = 0;
        for (offset, len) in self.runs(start, count) {
            let mut bytes = Vec::with_capacity(len * size);
            for &value in &data[cursor..cursor + len] {
                value.encode(&mut bytes);
            }
            cursor += len;
            self.file.write_at(offset, &bytes)?;
        }
        Ok(())
    }

    /// Validates a selection; `growing` lets the record axis exceed the
    /// current record count.
    fn check_selection(
        &self,
        shape: &[usize],
        start: &[usize],
        count: &[usize],
        growing: bool,
    ) -> Result<(), Error> {
        let ndims = shape.len();
        if start.len() != ndims || count.len() != ndims {
            return Err(Error::bounds(
                self.name(),
                format!(
                    "expected {ndims} start and count entries, got {} and {}",
                    start.len(),
                    count.len()
                ),
            ));
        }

        let record = self.is_record();
        for axis in 0..ndims {
            let end = start[axis].checked_add(count[axis]);
            if growing && record && axis == 0 {
                if end.is_none_or(|end| end > u32::MAX as usize) {
                    return Err(Error::bounds(
                        self.name(),
                        format!(
                            "records {} + {} exceed the record count limit",
                            start[axis], count[axis]
                        ),
                    ));
                }
                continue;
            }
            if end.is_none_or(|end| end > shape[axis]) {
                return Err(Error::bounds(
                    self.name(),
                    format!(
                        "axis {axis}: start {} + count {} exceeds size {}",
                        start[axis], count[axis], shape[axis]
                    ),
                ));
            }
        }
        Ok(())
    }

    fn element_count(&self, count: &[usize]) -> Result<usize, Error> {
        count
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| Error::bounds(self.name(), "selection holds too many values"))
    }

    /// Byte offset one past the last element of a checked, non-empty
    /// selection. Every run offset of the selection lies below it.
    fn selection_end(&self, start: &[usize], count: &[usize]) -> Result<u64, Error> {
        let header = &self.file.header;
        let info = self.info();
        let record = header.is_record_var(info);
        let last = |axis: usize| (start[axis] + count[axis] - 1) as u64;

        let end = info
            .dim_ids
            .iter()
            .enumerate()
            .skip(usize::from(record))
            .try_fold(0u64, |linear, (axis, &id)| {
                linear
                    .checked_mul(header.dimensions[id].size as u64)?
                    .checked_add(last(axis))
            })
            .and_then(|linear| linear.checked_add(1)?.checked_mul(T::TYPE.size() as u64))
            .and_then(|bytes| {
                let base = if record {
                    info.begin
                        .checked_add(last(0).checked_mul(header.record_size())?)?
                } else {
                    info.begin
                };
                base.checked_add(bytes)
            });
        end.ok_or_else(|| Error::bounds(self.name(), "selection lies past any valid offset"))
    }

    /// Contiguous `(byte offset, element count)` runs covering a non-empty
    /// selection, in row-major order.
    fn runs(&self, start: &[usize], count: &[usize]) -> Vec<(u64, usize)> {
        let ndims = start.len();
        if ndims == 0 {
            return vec![(self.info().begin, 1)];
        }

        // Records are interleaved, so a 1-D record variable is read per record.
        let split = if self.is_record() && ndims == 1 {
            1
        } else {
            ndims - 1
        };
        let run_len: usize = count[split..].iter().product();
        let outer: usize = count[..split].iter().product();
        let size = T::TYPE.size() as u64;

        let mut runs: Vec<(u64, usize)> = Vec::with_capacity(outer);
        let mut index = start.to_vec();
        for k in 0..outer {
            let mut rem = k;
            for axis in (0..split).rev() {
                index[axis] = start[axis] + rem % count[axis];
                rem /= count[axis];
            }

            let offset = self.offset_of(&index);
            match runs.last_mut() {
                Some((prev, len)) if *prev + *len as u64 * size == offset => *len += run_len,
                _ => runs.push((offset, run_len)),
            }
        }
        runs
    }

    fn offset_of(&self, index: &[usize]) -> u64 {
        let header = &self.file.header;
        let info = self.info();
        let record = header.is_record_var(info);

        let mut linear = 0u64;
        for (axis, &id) in info.dim_ids.iter().enumerate().skip(usize::from(record)) {
            linear = linear * header.dimensions[id].size as u64 + index[axis] as u64;
        }

        let base = if record {
            info.begin + index[0] as u64 * header.record_size()
        } else {
            info.begin
        };
        base + linear * T::TYPE.size() as u64
    }
}

impl Variable<'_, u8> {
    /// Stores a string in a one-dimensional char variable, zero-padded.
    pub fn add_str(&mut self, value: &str) -> Result<(), Error> {
        let width = match self.dimensions().as_slice() {
            [width] => *width,
            _ => {
                return Err(Error::bounds(
                    self.name(),
                    "a single string needs a one-dimensional char variable",
                ));
            }
        };
        let row = self.padded(value, width)?;
        self.add(&[0], &[width], &row)
    }

    /// Stores one string per row of a two-dimensional char variable.
    pub fn add_strings(&mut self, values: &[&str]) -> Result<(), Error> {
        let width = match self.dimensions().as_slice() {
            [_, width] => *width,
            _ => {
                return Err(Error::bounds(
                    self.name(),
                    "a list of strings needs a two-dimensional char variable",
                ));
            }
        };

        let mut data = Vec::with_capacity(values.len() * width);
        for value in values {
            data.extend(self.padded(value, width)?);
        }
        self.add(&[0, 0], &[values.len(), width], &data)
    }

    /// Reads the variable as strings, one per row of its last dimension.
    pub fn get_strings(&self) -> Result<Vec<String>, Error> {
        let shape = self.dimensions();
        let width = shape.last().copied().unwrap_or(1);
        if width == 0 {
            return Ok(Vec::new());
        }

        let data = self.get(&vec![0; shape.len()], &shape)?;
        Ok(data
            .chunks(width)
            .map(|row| {
                String::from_utf8_lossy(row)
                    .trim_end_matches('\0')
                    .to_string()
            })
            .collect())
    }

    fn padded(&self, value: &str, width: usize) -> Result<Vec<u8>, Error> {
        if value.len() > width {
            return Err(Error::bounds(
                self.name(),
                format!("'{value}' is longer than {width} characters"),
            ));
        }
        let mut row = value.as_bytes().to_vec();
        row.resize(width, 0);
        Ok(row)
    }
}
