//! Wire-level representation of the BTF metadata. See,
//! <https://www.kernel.org/doc/html/latest/bpf/btf.html>
//!
//! Please use a packed C representation so mem::size_of can be used.

#![allow(non_camel_case_types, dead_code)]

use btf_decode_derive::btf_wire;

pub(crate) const BTF_MAGIC: u16 = 0xeb9f;
// The magic as seen through a little-endian read of a big-endian blob.
pub(crate) const BTF_MAGIC_SWAPPED: u16 = 0x9feb;

/// Size in bytes of the common prefix every type entry starts with.
pub(crate) const BTF_TYPE_HEADER_SIZE: u64 = 12;

pub(crate) const BTF_INT_SIGNED: u32 = 1 << 0;
pub(crate) const BTF_INT_CHAR: u32 = 1 << 1;
pub(crate) const BTF_INT_BOOL: u32 = 1 << 2;

/// Kinds the decoder handles. The restrict qualifier (11) and kinds
/// introduced after func/func-proto are rejected at dispatch time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BtfKind {
    Int,
    Ptr,
    Array,
    Struct,
    Union,
    Enum,
    Fwd,
    Typedef,
    Volatile,
    Const,
    Func,
    FuncProto,
}

impl BtfKind {
    pub(crate) fn from_id(kind: u32) -> Option<BtfKind> {
        Some(match kind {
            1 => BtfKind::Int,
            2 => BtfKind::Ptr,
            3 => BtfKind::Array,
            4 => BtfKind::Struct,
            5 => BtfKind::Union,
            6 => BtfKind::Enum,
            7 => BtfKind::Fwd,
            8 => BtfKind::Typedef,
            9 => BtfKind::Volatile,
            10 => BtfKind::Const,
            12 => BtfKind::Func,
            13 => BtfKind::FuncProto,
            _ => return None,
        })
    }
}

#[btf_wire]
pub(crate) struct btf_header {
    pub(crate) magic: u16,
    pub(crate) version: u8,
    pub(crate) flags: u8,
    pub(crate) hdr_len: u32,
    pub(crate) type_off: u32,
    pub(crate) type_len: u32,
    pub(crate) str_off: u32,
    pub(crate) str_len: u32,
}

impl btf_header {
    /// Absolute file offset of a string pool reference. Section offsets are
    /// relative to the end of the header.
    pub(crate) fn string_offset(&self, name_off: u32) -> u64 {
        self.hdr_len as u64 + self.str_off as u64 + name_off as u64
    }
}

#[btf_wire]
pub(crate) struct btf_type {
    pub(crate) name_off: u32,
    // bits 0-15:  vlen
    // bits 16-23: reserved
    // bits 24-28: kind
    // bits 29-30: reserved
    // bit  31:    kind_flag
    info: u32,
    // union {
    //         _u32 size;
    //         _u32 type;
    // };
    size_type: u32,
}

impl btf_type {
    pub(crate) fn vlen(&self) -> u32 {
        self.info & 0xffff
    }

    pub(crate) fn kind(&self) -> u32 {
        (self.info >> 24) & 0x1f
    }

    pub(crate) fn kind_flag(&self) -> bool {
        (self.info >> 31) & 0x1 != 0
    }

    pub(crate) fn size(&self) -> u32 {
        self.size_type
    }

    pub(crate) fn r#type(&self) -> u32 {
        self.size_type
    }
}

#[btf_wire]
pub(crate) struct btf_int {
    data: u32,
}

impl btf_int {
    pub(crate) fn encoding(&self) -> u32 {
        (self.data & 0x0f00_0000) >> 24
    }

    pub(crate) fn offset(&self) -> u32 {
        (self.data & 0x00ff_0000) >> 16
    }

    pub(crate) fn bits(&self) -> u32 {
        self.data & 0x0000_00ff
    }
}

#[btf_wire]
pub(crate) struct btf_array {
    pub(crate) r#type: u32,
    pub(crate) index_type: u32,
    pub(crate) nelems: u32,
}

#[btf_wire]
pub(crate) struct btf_member {
    pub(crate) name_off: u32,
    pub(crate) r#type: u32,
    pub(crate) offset: u32,
}

#[btf_wire]
pub(crate) struct btf_enum {
    pub(crate) name_off: u32,
    pub(crate) val: i32,
}

#[btf_wire]
pub(crate) struct btf_param {
    pub(crate) name_off: u32,
    pub(crate) r#type: u32,
}
