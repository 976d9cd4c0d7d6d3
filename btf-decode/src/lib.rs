//! Decoder for the [BPF Type Format (BTF)](https://www.kernel.org/doc/html/latest/bpf/btf.html).
//! BTF is a compact debug-info encoding describing types, function
//! prototypes, structure layouts, etc. and is often used, but not limited,
//! to deal with [eBPF](https://ebpf.io) programs.
//!
//! ### Decoding BTF
//!
//! The main object this library offers is [`Btf`], a catalog of decoded
//! type entries constructed from a BTF blob. Each entry is validated against
//! the encoding rules of its kind while the blob is walked, so a constructed
//! catalog only ever holds well-formed entries. On a standard Linux
//! environment the kernel exposes its own BTF under `/sys/kernel/btf`.
//!
//! ```no_run
//! use btf_decode::{Btf, Type};
//!
//! let btf = Btf::from_file("/sys/kernel/btf/vmlinux").unwrap();
//!
//! if let Some(Type::Int(int)) = btf.resolve_type_by_id(1) {
//!     println!("type id 1 is {}, {} bytes wide", int.name, int.size);
//! }
//! ```
//!
//! [`Btf`] can also be constructed from a byte slice or through a memory
//! mapping of the input file, see [`Btf::from_bytes`] and
//! [`Btf::from_mmap_file`].
//!
//! ### Resolving entries
//!
//! A type id is the 1-based position of an entry in the catalog; id 0 is the
//! reserved void entry. Ids referenced by other entries (pointer targets,
//! typedef targets, ...) resolve through [`Btf::resolve_type_by_id`], and
//! named entries can be looked up with [`Btf::resolve_ids_by_name`].
//!
//! ```no_run
//! use btf_decode::{Btf, Type};
//!
//! let btf = Btf::from_file("/sys/kernel/btf/vmlinux").unwrap();
//!
//! for id in btf.resolve_ids_by_name("sk_buff") {
//!     if let Some(Type::Struct(r#struct)) = btf.resolve_type_by_id(id) {
//!         println!("sk_buff has {} members", r#struct.members.len());
//!     }
//! }
//! ```
//!
//! ### Errors
//!
//! Decoding stops at the first problem and returns a [`BtfError`] carrying a
//! failure class and, when one is known, the file range it was detected on.
//! No partially decoded catalog is ever returned.
//!
//! ### Feature flags
//!
//! - `elf`: enable `utils::elf`, helpers extracting the raw BTF blob from
//!   the `.BTF` section of ELF files (e.g. kernel modules).
//! - `regex`: enable name lookups by regex (`regex::Regex`).

pub mod btf;
pub mod error;
pub mod reader;
pub mod types;
#[cfg(feature = "elf")]
pub mod utils;

mod cbtf;

#[doc(inline)]
pub use btf::*;
pub use error::*;
pub use types::*;
