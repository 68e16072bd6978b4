use thiserror::Error;

use crate::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The preservation pass itself works on already-validated metadata and degrades gracefully for
/// absent information (no methods, no overrides, no attributes). The variants below therefore
/// describe contract violations of the type graph handed to the pass, or invalid input handed to
/// the graph builder.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Invalid names or dangling references passed to the graph builder
///
/// ## Graph Errors
/// - [`Error::TypeNotFound`] - A type token that is not part of the graph
/// - [`Error::MethodNotFound`] - A method token that is not part of the graph
/// - [`Error::NestingCycle`] - The declaring-type chain of a type loops back on itself
/// - [`Error::RecursionLimit`] - A nesting or inheritance chain exceeded the configured depth
///
/// # Examples
///
/// ```rust
/// use nsmark::{Error, graph::AssemblyIdentity};
///
/// match AssemblyIdentity::parse("") {
///     Ok(identity) => println!("Parsed {}", identity),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed name: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be processed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Failed to find a type in the `TypeGraph`.
    ///
    /// The associated [`Token`] identifies which type was not found.
    #[error("Failed to find type in TypeGraph - {0}")]
    TypeNotFound(Token),

    /// Failed to find a method in the `TypeGraph`.
    ///
    /// The associated [`Token`] identifies which method was not found.
    #[error("Failed to find method in TypeGraph - {0}")]
    MethodNotFound(Token),

    /// The declaring-type chain of a type is cyclic.
    ///
    /// Nesting must form a tree. The associated [`Token`] is the first type that was visited
    /// twice while walking outwards.
    #[error("Cyclic nesting detected at type - {0}")]
    NestingCycle(Token),

    /// Recursion limit reached.
    ///
    /// Walks along nesting and inheritance chains are bounded by the depth configured in
    /// [`crate::MarkerConfig`]. The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),
}
