//! Metadata tokens identifying nodes of the type graph.
//!
//! Every type and method in a [`crate::graph::TypeGraph`] is addressed by a [`Token`]. The
//! layout follows ECMA-335: the high byte selects the metadata table, the low 24 bits hold the
//! row. Only the `TypeDef` and `MethodDef` tables are used by this crate. Tokens are unique
//! across the whole graph, not only within a single assembly, because the graph builder
//! allocates rows for all loaded assemblies from one counter.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Table id of the `TypeDef` table
    pub const TYPE_DEF: u8 = 0x02;
    /// Table id of the `MethodDef` table
    pub const METHOD_DEF: u8 = 0x06;

    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a `TypeDef` token for the given (1-based) row
    #[must_use]
    pub fn type_def(row: u32) -> Self {
        Token((u32::from(Self::TYPE_DEF) << 24) | (row & 0x00FF_FFFF))
    }

    /// Creates a `MethodDef` token for the given (1-based) row
    #[must_use]
    pub fn method_def(row: u32) -> Self {
        Token((u32::from(Self::METHOD_DEF) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if this token points into the `TypeDef` table
    #[must_use]
    pub fn is_type_def(&self) -> bool {
        self.table() == Self::TYPE_DEF && self.row() != 0
    }

    /// Returns true if this token points into the `MethodDef` table
    #[must_use]
    pub fn is_method_def(&self) -> bool {
        self.table() == Self::METHOD_DEF && self.row() != 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
