use thiserror::Error;

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
/// Every variant that originates inside a function analysis carries the function name (and,
/// where one exists, the block name) so a fault can be located in the input program.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - The JSON wire record could not be turned into an instruction
/// - [`Error::MalformedIr`] - Structurally invalid function body (duplicate labels, phis in input)
/// - [`Error::UndefinedBlock`] - A `jmp`, `br` or phi label names a block that does not exist
/// - [`Error::UseBeforeDefinition`] - A variable is read with no reaching definition (strict policy)
///
/// ## Analysis Errors
/// - [`Error::InvariantViolation`] - A post-hoc verifier rejected a computed result
/// - [`Error::IterationLimit`] - A fixed point did not converge within its configured bound
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Json`] - JSON syntax or shape errors from `serde_json`
///
/// # Examples
///
/// ```rust,no_run
/// use brilflow::{AnalysisConfig, Error, Program, ssa::to_ssa};
///
/// let program = Program::from_json_str(r#"{"functions": []}"#)?;
/// for function in &program.functions {
///     match to_ssa(function, &AnalysisConfig::default()) {
///         Ok(_) => {}
///         Err(Error::UndefinedBlock { function, block, target }) => {
///             eprintln!("{function}: block {block} jumps to missing label {target}");
///         }
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// # Ok::<(), brilflow::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The wire record is damaged and could not be decoded.
    ///
    /// Raised while converting flat JSON instruction records into typed instructions, e.g. a
    /// phi whose `args` and `labels` differ in length. The error includes the source location
    /// where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The function body violates a structural rule of the IR.
    #[error("Malformed IR in function '{function}', block '{block}': {message}")]
    MalformedIr {
        /// Function containing the fault
        function: String,
        /// Block containing the fault
        block: String,
        /// What is wrong
        message: String,
    },

    /// A branch, jump or phi label references a block name absent from the function.
    #[error("Function '{function}', block '{block}' references undefined block '{target}'")]
    UndefinedBlock {
        /// Function containing the fault
        function: String,
        /// Block whose terminator or phi names the missing target
        block: String,
        /// The label that does not exist
        target: String,
    },

    /// A computed analysis result failed verification.
    ///
    /// Downstream passes (SSA construction in particular) assume correct dominance, so this is
    /// always fatal for the function.
    #[error("Invariant violation in function '{function}': {message}")]
    InvariantViolation {
        /// Function whose result is inconsistent
        function: String,
        /// Description of the broken invariant
        message: String,
    },

    /// A variable was read before any definition reached it.
    ///
    /// Only produced under [`crate::UseBeforeDefPolicy::Reject`].
    #[error("Function '{function}', block '{block}': use of '{variable}' before definition")]
    UseBeforeDefinition {
        /// Function containing the use
        function: String,
        /// Block containing the use
        block: String,
        /// The variable read without a definition
        variable: String,
    },

    /// Iteration limit reached.
    ///
    /// Every fixed point computed here is monotone over a finite lattice, so hitting the bound
    /// indicates a bug or a non-monotone input rather than a slow program.
    #[error("{analysis} did not converge within {limit} iterations")]
    IterationLimit {
        /// Name of the fixed-point computation
        analysis: &'static str,
        /// The limit that was reached
        limit: usize,
    },

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// JSON error while reading or writing a program.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
