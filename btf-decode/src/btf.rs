use std::{
    convert::AsRef,
    fs::File,
    io::{self, BufReader, Cursor, Read, Seek},
    path::Path,
    slice,
};

use memmap2::MmapOptions;

use crate::{
    cbtf,
    error::{BtfError, ErrorCode, Result},
    reader::{Endianness, ReadError, Reader},
    types::Type,
};

/// Catalog of decoded BTF type entries.
///
/// A catalog is constructed once from a single input blob and is immutable
/// thereafter. Entries keep the order they have in the type section; the
/// 1-based position of an entry is its type id, and id 0 is the reserved
/// void entry.
#[derive(Debug)]
pub struct Btf {
    types: Vec<Type>,
}

impl Btf {
    /// Decode a BTF file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Btf> {
        let file = File::open(path).map_err(open_error)?;
        Self::from_reader(&mut Reader::new(BufReader::new(file)))
    }

    /// Same as [`Btf::from_file`] but reading through a memory mapping of
    /// the file instead of buffered I/O.
    pub fn from_mmap_file<P: AsRef<Path>>(path: P) -> Result<Btf> {
        let file = File::open(path).map_err(open_error)?;
        let mmap = unsafe { MmapOptions::new().map_copy_read_only(&file) }.map_err(open_error)?;
        Self::from_reader(&mut Reader::new(Cursor::new(mmap)))
    }

    /// Perform the same actions as [`Btf::from_file`], but fed with a byte
    /// slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Btf> {
        Self::from_reader(&mut Reader::new(Cursor::new(bytes)))
    }

    fn from_reader<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Btf> {
        let endianness = detect_endianness(reader)?;
        reader.set_endianness(endianness);

        reader.seek(0)?;
        let header = cbtf::btf_header::from_reader(reader)?;

        Ok(Btf {
            types: parse_type_section(reader, &header)?,
        })
    }

    /// Number of entries in the catalog, the reserved void entry included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Entries in type-section order, starting with the void entry.
    pub fn iter(&self) -> slice::Iter<'_, Type> {
        self.types.iter()
    }

    /// Find a type entry using its id as a key.
    pub fn resolve_type_by_id(&self, id: u32) -> Option<&Type> {
        self.types.get(id as usize)
    }

    /// Find the ids of the entries carrying the given name. Anonymous
    /// entries are never matched.
    pub fn resolve_ids_by_name(&self, name: &str) -> Vec<u32> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, r#type)| r#type.name() == Some(name))
            .map(|(id, _)| id as u32)
            .collect()
    }

    /// Find the entries carrying the given name.
    pub fn resolve_types_by_name(&self, name: &str) -> Vec<&Type> {
        self.types
            .iter()
            .filter(|r#type| r#type.name() == Some(name))
            .collect()
    }

    /// Find the ids of the entries whose name matches a regex.
    #[cfg(feature = "regex")]
    pub fn resolve_ids_by_regex(&self, re: &regex::Regex) -> Vec<u32> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, r#type)| r#type.name().is_some_and(|name| re.is_match(name)))
            .map(|(id, _)| id as u32)
            .collect()
    }

    /// Find the entries whose name matches a regex.
    #[cfg(feature = "regex")]
    pub fn resolve_types_by_regex(&self, re: &regex::Regex) -> Vec<&Type> {
        self.types
            .iter()
            .filter(|r#type| r#type.name().is_some_and(|name| re.is_match(name)))
            .collect()
    }
}

fn open_error(err: io::Error) -> BtfError {
    ReadError::from_io(err, None).into()
}

// The magic is probed with a tentative little-endian setting; the value read
// back decides the actual byte order of the blob, which the caller commits
// on the reader before any further multi-byte read.
fn detect_endianness<R: Read + Seek>(reader: &mut Reader<R>) -> Result<Endianness> {
    reader.seek(0)?;
    reader.set_endianness(Endianness::Little);

    match reader.u16()? {
        cbtf::BTF_MAGIC => Ok(Endianness::Little),
        cbtf::BTF_MAGIC_SWAPPED => Ok(Endianness::Big),
        _ => Err(BtfError::new(ErrorCode::InvalidMagicValue, None)),
    }
}

/// Read the NUL-terminated string at an absolute offset, leaving the cursor
/// where it was on every exit path. The bytes are decoded as UTF-8, with
/// invalid sequences replaced.
pub(crate) fn parse_string<R: Read + Seek>(reader: &mut Reader<R>, offset: u64) -> Result<String> {
    let original = reader.offset()?;

    let result = (|| -> Result<String> {
        reader.seek(offset)?;

        let mut raw = Vec::new();
        loop {
            match reader.u8()? {
                0 => break,
                byte => raw.push(byte),
            }
        }

        Ok(String::from_utf8_lossy(&raw).into_owned())
    })();

    let restored = reader.seek(original);

    let string = result?;
    restored?;
    Ok(string)
}

// Walk the type section from start to end, appending decoded entries in
// encounter order. The declared section length bounds the iteration: a new
// entry is read as long as the cursor has not reached the declared end, so a
// final entry overrunning it is consumed whole and accepted.
fn parse_type_section<R: Read + Seek>(
    reader: &mut Reader<R>,
    header: &cbtf::btf_header,
) -> Result<Vec<Type>> {
    let start = header.hdr_len as u64 + header.type_off as u64;
    let end = start + header.type_len as u64;

    reader.seek(start)?;

    // Id 0 is the void entry, not described in the type section.
    let mut types = vec![Type::Void];

    loop {
        let current = reader.offset()?;
        if current >= end {
            break;
        }

        let bt = cbtf::btf_type::from_reader(reader)?;
        types.push(Type::from_reader(reader, header, &bt)?);
    }

    Ok(types)
}
