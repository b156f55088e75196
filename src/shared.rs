use std::fmt;

/// Autonomous System number.
pub type ASN = u32;

/// Business relationship of a neighbor, from the owning AS's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Customer,
    Peer,
    Provider,
}

impl Relation {
    /// The relation the neighbor sees looking back at us.
    pub fn invert(&self) -> Self {
        match self {
            Relation::Customer => Relation::Provider,
            Relation::Provider => Relation::Customer,
            Relation::Peer => Relation::Peer,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relation::Customer => "CUSTOMER",
            Relation::Peer => "PEER",
            Relation::Provider => "PROVIDER",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug)]
pub struct InvalidRelFile {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

impl fmt::Display for InvalidRelFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid relationship file at line {}: {} ({:?})",
            self.line_number, self.reason, self.line
        )
    }
}

impl std::error::Error for InvalidRelFile {}

#[derive(Debug)]
pub struct UnknownAS {
    pub asn: ASN,
}

impl fmt::Display for UnknownAS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown AS {}", self.asn)
    }
}

impl std::error::Error for UnknownAS {}

#[derive(Debug)]
pub struct NoRoute {
    pub victim: ASN,
    pub hops: usize,
}

impl fmt::Display for NoRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no {}-hop route to victim {} to hijack",
            self.hops, self.victim
        )
    }
}

impl std::error::Error for NoRoute {}

/// Assertion failure: `prefer` called on routes that don't share an
/// origin and a final AS, or a route entered a table with a self-cycle.
#[derive(Debug)]
pub struct InvariantViolation {
    pub detail: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violation: {}", self.detail)
    }
}

impl std::error::Error for InvariantViolation {}

/// Errors that can end a trial or a batch. `UnknownAS` is deliberately
/// recoverable at the batch level (SPEC_FULL §7): a caller iterating
/// trials should catch it, warn, and record a 0 success rate rather than
/// aborting, which is why it carries data instead of being folded into
/// `NoRoute`.
#[derive(Debug)]
pub enum SimulatorError {
    InvalidRelFile(InvalidRelFile),
    UnknownAS(UnknownAS),
    NoRoute(NoRoute),
    InvariantViolation(InvariantViolation),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::InvalidRelFile(e) => e.fmt(f),
            SimulatorError::UnknownAS(e) => e.fmt(f),
            SimulatorError::NoRoute(e) => e.fmt(f),
            SimulatorError::InvariantViolation(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for SimulatorError {}

impl From<InvalidRelFile> for SimulatorError {
    fn from(e: InvalidRelFile) -> Self {
        SimulatorError::InvalidRelFile(e)
    }
}

impl From<UnknownAS> for SimulatorError {
    fn from(e: UnknownAS) -> Self {
        SimulatorError::UnknownAS(e)
    }
}

impl From<NoRoute> for SimulatorError {
    fn from(e: NoRoute) -> Self {
        SimulatorError::NoRoute(e)
    }
}

impl From<InvariantViolation> for SimulatorError {
    fn from(e: InvariantViolation) -> Self {
        SimulatorError::InvariantViolation(e)
    }
}
