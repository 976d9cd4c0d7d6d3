//! # ELF helpers
//!
//! Helpers extracting raw BTF data from the .BTF ELF section, especially
//! useful for decoding BTF data shipped in kernel modules or vmlinux images.
//! Compressed ELF files are not handled.

use std::{fs, path::Path};

use elf::{endian::AnyEndian, ElfBytes};

use crate::error::{BtfError, ErrorCode, Result};
use crate::reader::ReadError;

/// Extract raw BTF data from the .BTF ELF section of the given file. The
/// output can be fed to [`crate::Btf::from_bytes`].
pub fn extract_btf_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let file = fs::read(&path).map_err(|e| BtfError::from(ReadError::from_io(e, None)))?;

    let elf = ElfBytes::<AnyEndian>::minimal_parse(&file).map_err(elf_error)?;

    let btf_hdr = elf
        .section_header_by_name(".BTF")
        .map_err(elf_error)?
        .ok_or_else(|| BtfError::new(ErrorCode::Unknown, None))?;

    let (btf, chdr) = elf.section_data(&btf_hdr).map_err(elf_error)?;
    if chdr.is_some() {
        // Compressed .BTF sections are not supported.
        return Err(BtfError::new(ErrorCode::Unknown, None));
    }

    Ok(btf.to_vec())
}

// The error taxonomy has no dedicated class for malformed containers; ELF
// level failures surface as unclassified.
fn elf_error(_: elf::ParseError) -> BtfError {
    BtfError::new(ErrorCode::Unknown, None)
}
