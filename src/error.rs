use thiserror::Error;

use crate::identity::IdentityKind;

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
/// This enum covers all failure conditions that can occur while parsing security descriptor
/// binary structures, constructing rule value objects, resolving identities, and mutating or
/// querying access-control lists. Each variant provides specific context about the failure
/// mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## Binary Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid binary structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond buffer boundaries
/// - [`Error::NotSupported`] - Unsupported structure revision or ACE type
/// - [`Error::Empty`] - Empty input provided
///
/// ## Rule Construction Errors
/// - [`Error::EmptyAccessMask`] - Access mask without any bits set
/// - [`Error::EmptyAuditFlags`] - Audit rule without success or failure flags
/// - [`Error::InvalidIdentity`] - Identity that cannot be normalized for ACL storage
///
/// ## Identity Resolution Errors
/// - [`Error::InvalidTargetKind`] - Requested identity kind is not a valid translation target
/// - [`Error::IdentityNotMapped`] - No mapping exists for the identity being translated
///
/// ## Synchronization Errors
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust
/// use aclscope::{Error, identity::SecurityIdentifier};
///
/// match "S-1-banana".parse::<SecurityIdentifier>() {
///     Ok(sid) => println!("parsed {}", sid),
///     Err(Error::InvalidSidString(s)) => eprintln!("not a SID: {}", s),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Binary parsing errors
    /// The structure is damaged and could not be parsed.
    ///
    /// This error indicates that a security descriptor, ACL or ACE binary blob does not
    /// conform to its expected layout. The error includes the source location where the
    /// malformation was detected for debugging purposes.
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

    /// An out of bound access was attempted while parsing a binary structure.
    ///
    /// This error occurs when trying to read data beyond the end of the provided
    /// buffer. It's a safety check to prevent buffer overruns during parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This structure revision or entry type is not supported.
    ///
    /// Indicates a security descriptor revision other than 1, an ACL revision this
    /// library does not know, or a compound ACE (a reserved ACE type that carries its
    /// own incompatible layout).
    #[error("This structure revision or ACE type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    // Rule construction errors
    /// An access mask with no bits set was supplied.
    ///
    /// Every authorization rule and every ACE must request at least one right;
    /// a zero mask would produce an entry that can never match an access check.
    #[error("The access mask must have at least one bit set")]
    EmptyAccessMask,

    /// An audit rule was constructed without success or failure flags.
    ///
    /// Audit rules must specify at least one of the two audit conditions, otherwise
    /// the resulting SACL entry would never generate an audit record.
    #[error("Audit rules require at least one of the Success or Failure flags")]
    EmptyAuditFlags,

    /// The supplied identity cannot be normalized to the canonical identity kind.
    ///
    /// All identities are stored in ACLs as security identifiers; an identity that
    /// cannot be represented as one is rejected at rule construction time.
    #[error("The identity '{0}' cannot be normalized to a security identifier")]
    InvalidIdentity(String),

    // Identity resolution errors
    /// The requested identity kind is not a valid translation target.
    ///
    /// Raised by query operations before any ACL is inspected when the caller asks for
    /// rules expressed in an identity kind the resolver does not serve.
    #[error("'{0:?}' is not a valid identity translation target")]
    InvalidTargetKind(IdentityKind),

    /// No mapping exists for the identity being translated.
    ///
    /// The identity resolver has no record connecting the source identity to the
    /// requested target kind. Propagated unchanged through query operations.
    #[error("No mapping for identity '{0}'")]
    IdentityNotMapped(String),

    /// A string could not be parsed as a security identifier.
    ///
    /// The `S-1-...` form requires a revision of 1, a decimal (or `0x` hexadecimal)
    /// identifier authority and at most fifteen decimal subauthorities.
    #[error("Invalid SID string - '{0}'")]
    InvalidSidString(String),

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically
    /// when trying to acquire a rwlock that was poisoned by a panicking writer.
    #[error("Failed to lock target")]
    LockError,

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories, such as a collaborator
    /// violating its documented contract in a recoverable way.
    #[error("{0}")]
    Error(String),
}
