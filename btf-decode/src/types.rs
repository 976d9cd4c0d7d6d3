//! Decoded representation of BTF type entries.
//!
//! Each kind has its own layout in the type section and its own encoding
//! rules. The `from_reader` constructors below enforce those rules and
//! resolve string references, so a constructed value is always well-formed.

use std::{
    io::{Read, Seek},
    mem,
};

use log::debug;

use crate::{
    btf::parse_string,
    cbtf,
    error::{BtfError, ErrorCode, FileRange, Result},
    reader::Reader,
};

/// A decoded BTF type entry.
///
/// Entries are produced in type-section order; the position of an entry in
/// the catalog (1-based) is its type id. Id 0 is the reserved [`Type::Void`]
/// entry, which has no representation in the type section.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Type {
    Void,
    Int(Int),
    Ptr(Ptr),
    Array(Array),
    Struct(Struct),
    Union(Union),
    Enum(Enum),
    Fwd(Fwd),
    Typedef(Typedef),
    Volatile(Volatile),
    Const(Const),
    Func(Func),
    FuncProto(FuncProto),
}

impl Type {
    /// Decode the entry following an already-consumed type header,
    /// dispatching on its kind.
    pub(crate) fn from_reader<R: Read + Seek>(
        reader: &mut Reader<R>,
        header: &cbtf::btf_header,
        bt: &cbtf::btf_type,
    ) -> Result<Self> {
        let kind = match cbtf::BtfKind::from_id(bt.kind()) {
            Some(kind) => kind,
            None => {
                debug!("unsupported entry of kind {}", bt.kind());
                let range = type_header_range(reader, 0)?;
                return Err(BtfError::new(ErrorCode::InvalidBtfKind, Some(range)));
            }
        };

        Ok(match kind {
            cbtf::BtfKind::Int => Type::Int(Int::from_reader(reader, header, bt)?),
            cbtf::BtfKind::Ptr => Type::Ptr(Ptr {
                type_id: qualifier_type_id(reader, bt, ErrorCode::InvalidPtrEncoding)?,
            }),
            cbtf::BtfKind::Array => Type::Array(Array::from_reader(reader, bt)?),
            cbtf::BtfKind::Struct => Type::Struct(Struct::from_reader(reader, header, bt)?),
            cbtf::BtfKind::Union => Type::Union(Struct::from_reader(reader, header, bt)?),
            cbtf::BtfKind::Enum => Type::Enum(Enum::from_reader(reader, header, bt)?),
            cbtf::BtfKind::Fwd => Type::Fwd(Fwd::from_reader(reader, header, bt)?),
            cbtf::BtfKind::Typedef => Type::Typedef(Typedef::from_reader(reader, header, bt)?),
            cbtf::BtfKind::Volatile => Type::Volatile(Volatile {
                type_id: qualifier_type_id(reader, bt, ErrorCode::InvalidVolatileEncoding)?,
            }),
            cbtf::BtfKind::Const => Type::Const(Const {
                type_id: qualifier_type_id(reader, bt, ErrorCode::InvalidPtrEncoding)?,
            }),
            cbtf::BtfKind::Func => Type::Func(Func::from_reader(reader, header, bt)?),
            cbtf::BtfKind::FuncProto => {
                Type::FuncProto(FuncProto::from_reader(reader, header, bt)?)
            }
        })
    }

    /// Name of the entry, for the kinds that carry one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Int(int) => Some(&int.name),
            Type::Struct(r#struct) | Type::Union(r#struct) => r#struct.name.as_deref(),
            Type::Enum(r#enum) => r#enum.name.as_deref(),
            Type::Fwd(fwd) => Some(&fwd.name),
            Type::Typedef(typedef) => Some(&typedef.name),
            Type::Func(func) => Some(&func.name),
            _ => None,
        }
    }

    /// Short name of the entry kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Void => "void",
            Type::Int(_) => "int",
            Type::Ptr(_) => "ptr",
            Type::Array(_) => "array",
            Type::Struct(_) => "struct",
            Type::Union(_) => "union",
            Type::Enum(_) => "enum",
            Type::Fwd(_) => "fwd",
            Type::Typedef(_) => "typedef",
            Type::Volatile(_) => "volatile",
            Type::Const(_) => "const",
            Type::Func(_) => "func",
            Type::FuncProto(_) => "func-proto",
        }
    }
}

// Range of the just-consumed type header plus its kind-specific trailer.
// Encoding errors are reported against this range; it must be computed
// before the trailer is consumed.
fn type_header_range<R: Read + Seek>(reader: &mut Reader<R>, trailer: u64) -> Result<FileRange> {
    Ok(FileRange {
        offset: reader.offset()? - cbtf::BTF_TYPE_HEADER_SIZE,
        size: cbtf::BTF_TYPE_HEADER_SIZE + trailer,
    })
}

// Shared by the ptr, const and volatile qualifier kinds: no name, no vlen,
// no kind flag, the referenced type id in the size/type word, no trailer.
fn qualifier_type_id<R: Read + Seek>(
    reader: &mut Reader<R>,
    bt: &cbtf::btf_type,
    code: ErrorCode,
) -> Result<u32> {
    let range = type_header_range(reader, 0)?;

    if bt.name_off != 0 || bt.kind_flag() || bt.vlen() != 0 {
        return Err(BtfError::new(code, Some(range)));
    }

    Ok(bt.r#type())
}

/// Integer type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Int {
    pub name: String,
    /// Total width in bytes; one of 1, 2, 4, 8 or 16.
    pub size: u32,
    /// Width in bits of the represented value.
    pub bits: u32,
    /// Bit offset of the value within the byte width.
    pub offset: u32,
    pub is_signed: bool,
    pub is_char: bool,
    pub is_bool: bool,
}

impl Int {
    fn from_reader<R: Read + Seek>(
        reader: &mut Reader<R>,
        header: &cbtf::btf_header,
        bt: &cbtf::btf_type,
    ) -> Result<Int> {
        let range = type_header_range(reader, mem::size_of::<cbtf::btf_int>() as u64)?;
        let invalid = BtfError::new(ErrorCode::InvalidIntEncoding, Some(range));

        if bt.kind_flag() || bt.vlen() != 0 {
            return Err(invalid);
        }

        let size = bt.size();
        if !matches!(size, 1 | 2 | 4 | 8 | 16) {
            return Err(invalid);
        }

        if bt.name_off == 0 {
            return Err(invalid);
        }
        let name = parse_string(reader, header.string_offset(bt.name_off))?;

        let info = cbtf::btf_int::from_reader(reader)?;

        let encoding = info.encoding();
        let is_signed = encoding & cbtf::BTF_INT_SIGNED != 0;
        let is_char = encoding & cbtf::BTF_INT_CHAR != 0;
        let is_bool = encoding & cbtf::BTF_INT_BOOL != 0;

        // The signed, char and bool encodings are mutually exclusive.
        if [is_signed, is_char, is_bool].iter().filter(|set| **set).count() > 1 {
            return Err(invalid);
        }

        let bits = info.bits();
        if bits > 128 || bits > size * 8 {
            return Err(invalid);
        }

        let offset = info.offset();
        if offset + bits > size * 8 {
            return Err(invalid);
        }

        Ok(Int {
            name,
            size,
            bits,
            offset,
            is_signed,
            is_char,
            is_bool,
        })
    }
}

/// Pointer to another type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ptr {
    pub type_id: u32,
}

/// Volatile qualifier over another type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Volatile {
    pub type_id: u32,
}

/// Const qualifier over another type.
pub type Const = Volatile;

/// Array type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Array {
    pub elem_type_id: u32,
    pub index_type_id: u32,
    pub nelems: u32,
}

impl Array {
    fn from_reader<R: Read + Seek>(reader: &mut Reader<R>, bt: &cbtf::btf_type) -> Result<Array> {
        let range = type_header_range(reader, mem::size_of::<cbtf::btf_array>() as u64)?;

        if bt.name_off != 0 || bt.kind_flag() || bt.vlen() != 0 || bt.size() != 0 {
            return Err(BtfError::new(ErrorCode::InvalidArrayEncoding, Some(range)));
        }

        let array = cbtf::btf_array::from_reader(reader)?;

        Ok(Array {
            elem_type_id: array.r#type,
            index_type_id: array.index_type,
            nelems: array.nelems,
        })
    }
}

/// Struct type. Also used for unions, which share the layout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Struct {
    pub name: Option<String>,
    /// Total size in bytes.
    pub size: u32,
    pub members: Vec<Member>,
}

/// Union type.
pub type Union = Struct;

impl Struct {
    fn from_reader<R: Read + Seek>(
        reader: &mut Reader<R>,
        header: &cbtf::btf_header,
        bt: &cbtf::btf_type,
    ) -> Result<Struct> {
        let name = match bt.name_off {
            0 => None,
            name_off => Some(parse_string(reader, header.string_offset(name_off))?),
        };

        let mut members = Vec::new();
        for _ in 0..bt.vlen() {
            let member = cbtf::btf_member::from_reader(reader)?;

            let name = match member.name_off {
                0 => None,
                name_off => Some(parse_string(reader, header.string_offset(name_off))?),
            };

            members.push(Member {
                kind_flag: bt.kind_flag(),
                name,
                type_id: member.r#type,
                offset: member.offset,
            });
        }

        Ok(Struct {
            name,
            size: bt.size(),
            members,
        })
    }
}

/// A [`Struct`] (or [`Union`]) member.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Member {
    // The parent's kind flag selects the offset encoding.
    kind_flag: bool,
    pub name: Option<String>,
    pub type_id: u32,
    /// Raw offset word; see [`Member::bit_offset`] and
    /// [`Member::bitfield_size`] for its interpretation.
    pub offset: u32,
}

impl Member {
    /// Offset of the member in bits from the start of the parent.
    pub fn bit_offset(&self) -> u32 {
        match self.kind_flag {
            true => self.offset & 0xff_ffff,
            false => self.offset,
        }
    }

    /// Width of the bitfield, for parents encoding bitfields in the member
    /// offset word.
    pub fn bitfield_size(&self) -> Option<u32> {
        match self.kind_flag {
            true => Some(self.offset >> 24),
            false => None,
        }
    }
}

/// Enumeration type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Enum {
    pub name: Option<String>,
    /// Width of the underlying integer in bytes; one of 1, 2, 4 or 8.
    pub size: u32,
    pub members: Vec<EnumMember>,
}

/// An [`Enum`] member.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub val: i32,
}

impl Enum {
    fn from_reader<R: Read + Seek>(
        reader: &mut Reader<R>,
        header: &cbtf::btf_header,
        bt: &cbtf::btf_type,
    ) -> Result<Enum> {
        let trailer = bt.vlen() as u64 * mem::size_of::<cbtf::btf_enum>() as u64;
        let range = type_header_range(reader, trailer)?;
        let invalid = BtfError::new(ErrorCode::InvalidEnumEncoding, Some(range));

        if bt.kind_flag() || bt.vlen() == 0 {
            return Err(invalid);
        }

        let size = bt.size();
        if !matches!(size, 1 | 2 | 4 | 8) {
            return Err(invalid);
        }

        let name = match bt.name_off {
            0 => None,
            name_off => Some(parse_string(reader, header.string_offset(name_off))?),
        };

        let mut members = Vec::new();
        for _ in 0..bt.vlen() {
            let member = cbtf::btf_enum::from_reader(reader)?;

            if member.name_off == 0 {
                return Err(invalid);
            }
            let name = parse_string(reader, header.string_offset(member.name_off))?;

            members.push(EnumMember {
                name,
                val: member.val,
            });
        }

        Ok(Enum {
            name,
            size,
            members,
        })
    }
}

/// Forward declaration of a struct or union.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fwd {
    pub name: String,
    /// True when the declaration forward-declares a union, false for a
    /// struct.
    pub is_union: bool,
}

impl Fwd {
    fn from_reader<R: Read + Seek>(
        reader: &mut Reader<R>,
        header: &cbtf::btf_header,
        bt: &cbtf::btf_type,
    ) -> Result<Fwd> {
        let range = type_header_range(reader, 0)?;

        if bt.name_off == 0 || bt.vlen() != 0 || bt.size() != 0 {
            return Err(BtfError::new(ErrorCode::InvalidFwdEncoding, Some(range)));
        }

        Ok(Fwd {
            name: parse_string(reader, header.string_offset(bt.name_off))?,
            is_union: bt.kind_flag(),
        })
    }
}

/// Type alias.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Typedef {
    pub name: String,
    pub type_id: u32,
}

impl Typedef {
    fn from_reader<R: Read + Seek>(
        reader: &mut Reader<R>,
        header: &cbtf::btf_header,
        bt: &cbtf::btf_type,
    ) -> Result<Typedef> {
        let range = type_header_range(reader, 0)?;

        if bt.name_off == 0 || bt.kind_flag() || bt.vlen() != 0 {
            return Err(BtfError::new(
                ErrorCode::InvalidTypedefEncoding,
                Some(range),
            ));
        }

        Ok(Typedef {
            name: parse_string(reader, header.string_offset(bt.name_off))?,
            type_id: bt.r#type(),
        })
    }
}

/// Function symbol, referencing its prototype.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Func {
    pub name: String,
    pub type_id: u32,
}

impl Func {
    fn from_reader<R: Read + Seek>(
        reader: &mut Reader<R>,
        header: &cbtf::btf_header,
        bt: &cbtf::btf_type,
    ) -> Result<Func> {
        let range = type_header_range(reader, 0)?;

        if bt.name_off == 0 || bt.kind_flag() || bt.vlen() != 0 {
            return Err(BtfError::new(ErrorCode::InvalidFuncEncoding, Some(range)));
        }

        Ok(Func {
            name: parse_string(reader, header.string_offset(bt.name_off))?,
            type_id: bt.r#type(),
        })
    }
}

/// Function prototype.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FuncProto {
    pub return_type_id: u32,
    pub parameters: Vec<Parameter>,
    /// Set when the encoded parameter list ended with the anonymous, void
    /// typed sentinel marking a variadic prototype. The sentinel itself is
    /// not kept.
    pub variadic: bool,
}

/// A [`FuncProto`] parameter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    pub name: Option<String>,
    pub type_id: u32,
}

impl FuncProto {
    fn from_reader<R: Read + Seek>(
        reader: &mut Reader<R>,
        header: &cbtf::btf_header,
        bt: &cbtf::btf_type,
    ) -> Result<FuncProto> {
        let trailer = bt.vlen() as u64 * mem::size_of::<cbtf::btf_param>() as u64;
        let range = type_header_range(reader, trailer)?;

        if bt.name_off != 0 || bt.kind_flag() {
            return Err(BtfError::new(
                ErrorCode::InvalidFuncProtoEncoding,
                Some(range),
            ));
        }

        let mut parameters = Vec::new();
        for _ in 0..bt.vlen() {
            let param = cbtf::btf_param::from_reader(reader)?;

            let name = match param.name_off {
                0 => None,
                name_off => Some(parse_string(reader, header.string_offset(name_off))?),
            };

            parameters.push(Parameter {
                name,
                type_id: param.r#type,
            });
        }

        let variadic = match parameters.last() {
            Some(last) => last.name.is_none() && last.type_id == 0,
            None => false,
        };
        if variadic {
            parameters.pop();
        }

        Ok(FuncProto {
            return_type_id: bt.r#type(),
            parameters,
            variadic,
        })
    }
}
