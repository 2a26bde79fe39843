use core::fmt;

use axerrno::AxError;

use crate::dispatch::DelegatedExit;
use crate::exit::VmxExitReason;

/// Who has to pay for a failed VM exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The hypervisor's own invariants are broken. The host must stop.
    Host,
    /// Only the VM owning the vcpu is affected and should be terminated.
    Vm,
}

/// Errors returned by the VM exit handlers.
///
/// Faults the guest would see on real hardware are not errors: they are injected into the
/// guest and the handler succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmExitError {
    /// The vcpu is not bound to the physical CPU handling its exit.
    IdentityMismatch {
        /// The physical CPU handling the exit.
        current: usize,
        /// The physical CPU the vcpu is bound to, `None` if unbound.
        bound: Option<usize>,
    },
    /// The basic exit reason does not fit in the dispatch table.
    UnknownExitReason {
        /// The full exit-reason field.
        raw: u64,
    },
    /// A general-purpose register index outside `0..16`.
    InvalidRegisterIndex(u64),
    /// A control-register access the processor never reports as a VM exit.
    UnhandledCrAccess {
        /// The access type from the exit qualification.
        access_type: u8,
        /// The control register number.
        cr: u8,
    },
    /// The vcpu's active world index is out of range.
    InvalidWorld(usize),
    /// The guest ran into an exit it cannot survive, e.g. a triple fault.
    GuestFatal(VmxExitReason),
    /// A handler implemented outside this crate failed.
    Delegated {
        /// The exit that was delegated.
        exit: DelegatedExit,
        /// The error it returned.
        err: AxError,
    },
}

impl VmExitError {
    /// Classifies the error.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::IdentityMismatch { .. }
            | Self::UnknownExitReason { .. }
            | Self::InvalidRegisterIndex(_)
            | Self::UnhandledCrAccess { .. }
            | Self::InvalidWorld(_) => Severity::Host,
            Self::GuestFatal(_) | Self::Delegated { .. } => Severity::Vm,
        }
    }
}

impl fmt::Display for VmExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityMismatch { current, bound } => write!(
                f,
                "vcpu is not running on its pcpu (current {}, bound {:?})",
                current, bound
            ),
            Self::UnknownExitReason { raw } => write!(f, "invalid exit reason: {:#018x}", raw),
            Self::InvalidRegisterIndex(idx) => write!(f, "register index {} out of range", idx),
            Self::UnhandledCrAccess { access_type, cr } => write!(
                f,
                "unhandled CR access: type {} on CR{}",
                access_type, cr
            ),
            Self::InvalidWorld(world) => write!(f, "invalid world index {}", world),
            Self::GuestFatal(reason) => write!(f, "fatal guest exit: {:?}", reason),
            Self::Delegated { exit, err } => write!(f, "{:?} handler failed: {:?}", exit, err),
        }
    }
}

impl From<VmExitError> for AxError {
    fn from(err: VmExitError) -> Self {
        match err {
            VmExitError::IdentityMismatch { .. } | VmExitError::InvalidWorld(_) => {
                AxError::BadState
            }
            VmExitError::UnknownExitReason { .. }
            | VmExitError::InvalidRegisterIndex(_)
            | VmExitError::UnhandledCrAccess { .. } => AxError::InvalidData,
            VmExitError::GuestFatal(_) => AxError::Unsupported,
            VmExitError::Delegated { err, .. } => err,
        }
    }
}

/// The result of a VM exit handler.
pub type ExitResult<T = ()> = Result<T, VmExitError>;
