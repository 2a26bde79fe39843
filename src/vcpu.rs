use crate::error::{ExitResult, VmExitError};

/// Index of a general-purpose register, in the order used by instruction encodings
/// and exit qualifications (`RAX`, `RCX`, `RDX`, `RBX`, `RSP`, `RBP`, `RSI`, `RDI`, `R8`..`R15`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GprIndex(u8);

impl GprIndex {
    pub const RAX: Self = Self(0);
    pub const RCX: Self = Self(1);
    pub const RDX: Self = Self(2);
    pub const RBX: Self = Self(3);

    /// Number of general-purpose registers.
    pub const COUNT: usize = 16;

    /// Creates an index, failing if `idx` does not name one of the 16 registers.
    pub fn new(idx: u64) -> ExitResult<Self> {
        if idx < Self::COUNT as u64 {
            Ok(Self(idx as u8))
        } else {
            Err(VmExitError::InvalidRegisterIndex(idx))
        }
    }

    /// The raw index, always below [`GprIndex::COUNT`].
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Input and output registers of a `CPUID` instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuidRegs {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

/// Exit state recorded on a vcpu for the VM exit being handled.
///
/// The run loop stores the raw exit reason here before calling
/// [`vmexit_handler`](crate::vmexit_handler); the handler fills in the rest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VmExitState {
    /// The full exit-reason VMCS field.
    pub exit_reason: u64,
    /// The exit qualification. Only read from the VMCS for exits whose handler needs it.
    pub exit_qualification: u64,
    /// The IDT-vectoring information of this exit. Cleared once the event is re-queued.
    pub idt_vectoring_info: u32,
}

impl VmExitState {
    /// Creates the state for a fresh exit with the given raw exit reason.
    pub const fn new(exit_reason: u64) -> Self {
        Self {
            exit_reason,
            exit_qualification: 0,
            idt_vectoring_info: 0,
        }
    }
}
