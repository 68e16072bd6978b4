//! Configuration of the preservation pass.
//!
//! The values normally come from the platform profile of the trimming pipeline: which assembly
//! is the product (platform binding) assembly, which well-known types form the native-bridging
//! contract, and how deep structural walks may go before the graph is considered malformed.

use crate::graph::{ParamType, TypeName};

/// Assembly that historically ships bridged types and is trusted like the product assembly.
pub const COMPAT_ASSEMBLY: &str = "System.Net.Http";

/// Product assembly of the iOS platform bindings
pub const IOS_PRODUCT_ASSEMBLY: &str = "Xamarin.iOS";

/// Product assembly of the macOS platform bindings
pub const MAC_PRODUCT_ASSEMBLY: &str = "Xamarin.Mac";

/// Root of all native-bridged object types
pub const BRIDGE_ROOT: TypeName = TypeName::new("Foundation", "NSObject");

/// Interface of types that wrap a native handle without being bridged objects
pub const NATIVE_OBJECT: TypeName = TypeName::new("ObjCRuntime", "INativeObject");

/// Configuration for the preservation pass
///
/// # Examples
///
/// ```rust
/// use nsmark::MarkerConfig;
///
/// let config = MarkerConfig::mac();
/// assert_eq!(config.product_assembly, "Xamarin.Mac");
/// assert_eq!(config.compat_assembly, "System.Net.Http");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerConfig {
    /// Simple name of the product (platform binding) assembly
    pub product_assembly: String,

    /// Simple name of the additional trusted assembly (default: [`COMPAT_ASSEMBLY`])
    pub compat_assembly: String,

    /// Root bridging base type (default: `Foundation.NSObject`)
    pub bridge_root: TypeName,

    /// Native handle interface (default: `ObjCRuntime.INativeObject`)
    pub native_object: TypeName,

    /// Parameter type of the handle constructor the native runtime calls (default: `IntPtr`)
    pub native_handle: ParamType,

    /// Maximum number of enclosing types above a nested type (default: 64)
    pub max_nesting_depth: usize,

    /// Maximum number of base types above a type, the type itself not counted (default: 64)
    pub max_hierarchy_depth: usize,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self::ios()
    }
}

impl MarkerConfig {
    /// Creates a configuration for the given product assembly with default contract types
    pub fn new(product_assembly: impl Into<String>) -> Self {
        Self {
            product_assembly: product_assembly.into(),
            compat_assembly: COMPAT_ASSEMBLY.to_string(),
            bridge_root: BRIDGE_ROOT,
            native_object: NATIVE_OBJECT,
            native_handle: ParamType::I,
            max_nesting_depth: 64,
            max_hierarchy_depth: 64,
        }
    }

    /// Creates the configuration for iOS applications
    #[must_use]
    pub fn ios() -> Self {
        Self::new(IOS_PRODUCT_ASSEMBLY)
    }

    /// Creates the configuration for macOS applications
    #[must_use]
    pub fn mac() -> Self {
        Self::new(MAC_PRODUCT_ASSEMBLY)
    }

    /// Override the maximum nesting and hierarchy depth
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self.max_hierarchy_depth = depth;
        self
    }
}
