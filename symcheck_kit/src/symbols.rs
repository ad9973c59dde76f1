//! Symbol resolution
//!
//! Loads the dynamic symbol table of a library once and answers "where is
//! this symbol" for as many names as needed. A missing symbol is a normal
//! answer, not an error.

use std::collections::HashMap;

use goblin::elf::header::EM_ARM;
use goblin::elf::program_header::{ProgramHeader, PT_LOAD};
use goblin::elf::sym::STT_FUNC;
use goblin::elf::Elf;
use thiserror::Error;

use crate::binary::BinaryImage;

/// Binary could not be analysed
#[derive(Debug, Error)]
#[error("extract symbols from {library}@{release}: {source}")]
pub struct ResolveError {
    pub release: String,
    pub library: String,
    pub source: goblin::error::Error,
}

/// Symbols loaded from one binary
pub trait SymbolTable {
    /// File offset of `name`, or `None` if the binary does not define it
    fn resolve(&self, name: &str) -> Option<u64>;

    /// Number of resolvable symbols
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns a binary image into a symbol table
pub trait SymbolResolver {
    fn load(&self, image: &BinaryImage) -> Result<Box<dyn SymbolTable>, ResolveError>;
}

/// Dynamic symbols of an ELF shared library
#[derive(Debug, Clone, Default)]
pub struct ElfSymbolTable {
    offsets: HashMap<String, u64>,
}

impl ElfSymbolTable {
    /// Parse `data` and collect its defined dynamic symbols
    ///
    /// Symbol values are translated to file offsets through the `PT_LOAD`
    /// segment containing them. On 32-bit ARM the Thumb bit of function
    /// symbols is cleared first. Undefined (imported) symbols are skipped.
    pub fn parse(data: &[u8]) -> Result<Self, goblin::error::Error> {
        let elf = Elf::parse(data)?;
        let thumb = elf.header.e_machine == EM_ARM;
        let mut offsets = HashMap::new();

        for sym in elf.dynsyms.iter() {
            if sym.st_shndx == 0 {
                continue;
            }
            let Some(name) = elf.dynstrtab.get_at(sym.st_name) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            let value = symbol_address(thumb, sym.st_type(), sym.st_value);
            offsets
                .entry(name.to_string())
                .or_insert_with(|| vaddr_to_offset(&elf.program_headers, value).unwrap_or(value));
        }

        Ok(Self { offsets })
    }
}

impl SymbolTable for ElfSymbolTable {
    fn resolve(&self, name: &str) -> Option<u64> {
        self.offsets.get(name).copied()
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }
}

/// Symbol value with the Thumb interworking bit cleared for ARM functions
fn symbol_address(thumb: bool, st_type: u8, value: u64) -> u64 {
    if thumb && st_type == STT_FUNC {
        value & !1
    } else {
        value
    }
}

/// File offset of `vaddr` through the `PT_LOAD` segment containing it
///
/// Segments whose bounds overflow are ignored.
fn vaddr_to_offset(program_headers: &[ProgramHeader], vaddr: u64) -> Option<u64> {
    program_headers
        .iter()
        .filter(|ph| ph.p_type == PT_LOAD)
        .find_map(|ph| {
            let end = ph.p_vaddr.checked_add(ph.p_filesz)?;
            if vaddr < ph.p_vaddr || vaddr >= end {
                return None;
            }
            (vaddr - ph.p_vaddr).checked_add(ph.p_offset)
        })
}

/// Resolver for ELF libraries
#[derive(Debug, Clone, Copy, Default)]
pub struct ElfResolver;

impl SymbolResolver for ElfResolver {
    fn load(&self, image: &BinaryImage) -> Result<Box<dyn SymbolTable>, ResolveError> {
        let table = ElfSymbolTable::parse(&image.data).map_err(|source| ResolveError {
            release: image.release.to_string(),
            library: image.library.clone(),
            source,
        })?;

        log::debug!(
            "{}@{}: {} dynamic symbol(s)",
            image.library,
            image.release,
            table.len()
        );
        Ok(Box::new(table))
    }
}

// ============================================================================
// Tests
// ============================================================================
