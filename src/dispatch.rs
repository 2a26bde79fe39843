use crate::config::NR_VMX_EXIT_REASONS;
use crate::exit::VmxExitReason;

/// Exits whose handlers are implemented outside this crate, behind
/// [`AxExitVCpu::handle_delegated`](crate::AxExitVCpu::handle_delegated).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegatedExit {
    ExceptionNmi,
    ExternalInterrupt,
    InterruptWindow,
    Vmcall,
    IoInstruction,
    Rdmsr,
    Wrmsr,
    TprBelowThreshold,
    ApicAccess,
    VirtualizedEoi,
    EptViolation,
    EptMisconfig,
    ApicWrite,
}

/// The handler selected for a basic exit reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitHandler {
    Cpuid,
    CrAccess,
    Xsetbv,
    Wbinvd,
    PreemptionTimer,
    /// Handled by a collaborator.
    Delegated(DelegatedExit),
    /// No emulation: log and resume the guest.
    Unhandled,
    /// No emulation, and the guest cannot resume.
    Fatal,
}

/// An entry of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitDispatchEntry {
    /// The handler for the exit.
    pub handler: ExitHandler,
    /// Whether the exit qualification has to be read before calling the handler.
    pub need_exit_qualification: bool,
}

impl ExitDispatchEntry {
    const fn new(handler: ExitHandler) -> Self {
        Self {
            handler,
            need_exit_qualification: false,
        }
    }

    const fn with_qualification(handler: ExitHandler) -> Self {
        Self {
            handler,
            need_exit_qualification: true,
        }
    }
}

const UNHANDLED: ExitDispatchEntry = ExitDispatchEntry::new(ExitHandler::Unhandled);

/// Selects the dispatch entry of a named exit reason.
///
/// Reasons for which [`VmxExitReason::is_architecturally_fatal`] holds are routed to
/// [`ExitHandler::Fatal`].
pub const fn dispatch_entry(reason: VmxExitReason) -> ExitDispatchEntry {
    use DelegatedExit as D;
    use ExitDispatchEntry as E;
    use ExitHandler as H;
    use VmxExitReason as R;

    let entry = match reason {
        R::EXCEPTION_NMI => E::new(H::Delegated(D::ExceptionNmi)),
        R::EXTERNAL_INTERRUPT => E::new(H::Delegated(D::ExternalInterrupt)),
        R::INTERRUPT_WINDOW => E::new(H::Delegated(D::InterruptWindow)),
        R::CPUID => E::new(H::Cpuid),
        R::VMCALL => E::new(H::Delegated(D::Vmcall)),
        R::CR_ACCESS => E::with_qualification(H::CrAccess),
        R::IO_INSTRUCTION => E::with_qualification(H::Delegated(D::IoInstruction)),
        R::MSR_READ => E::new(H::Delegated(D::Rdmsr)),
        R::MSR_WRITE => E::new(H::Delegated(D::Wrmsr)),
        R::TPR_BELOW_THRESHOLD => E::new(H::Delegated(D::TprBelowThreshold)),
        R::APIC_ACCESS => E::with_qualification(H::Delegated(D::ApicAccess)),
        R::VIRTUALIZED_EOI => E::with_qualification(H::Delegated(D::VirtualizedEoi)),
        R::EPT_VIOLATION => E::with_qualification(H::Delegated(D::EptViolation)),
        R::EPT_MISCONFIG => E::with_qualification(H::Delegated(D::EptMisconfig)),
        R::APIC_WRITE => E::with_qualification(H::Delegated(D::ApicWrite)),
        R::PREEMPTION_TIMER => E::new(H::PreemptionTimer),
        R::WBINVD => E::new(H::Wbinvd),
        R::XSETBV => E::new(H::Xsetbv),
        R::INVALID_GUEST_STATE => E::with_qualification(H::Unhandled),
        R::TRIPLE_FAULT
        | R::MSR_LOAD_FAIL
        | R::MCE_DURING_VMENTRY
        | R::INIT
        | R::SIPI
        | R::IO_SMI
        | R::OTHER_SMI
        | R::NMI_WINDOW
        | R::TASK_SWITCH
        | R::GETSEC
        | R::HLT
        | R::INVD
        | R::INVLPG
        | R::RDPMC
        | R::RDTSC
        | R::RSM
        | R::VMCLEAR
        | R::VMLAUNCH
        | R::VMPTRLD
        | R::VMPTRST
        | R::VMREAD
        | R::VMRESUME
        | R::VMWRITE
        | R::VMOFF
        | R::VMON
        | R::DR_ACCESS
        | R::MWAIT_INSTRUCTION
        | R::MONITOR_TRAP_FLAG
        | R::MONITOR_INSTRUCTION
        | R::PAUSE_INSTRUCTION
        | R::GDTR_IDTR
        | R::LDTR_TR
        | R::INVEPT
        | R::RDTSCP
        | R::INVVPID
        | R::RDRAND
        | R::INVPCID
        | R::VMFUNC
        | R::ENCLS
        | R::RDSEED
        | R::PML_FULL
        | R::XSAVES
        | R::XRSTORS => UNHANDLED,
    };

    if reason.is_architecturally_fatal() {
        ExitDispatchEntry {
            handler: H::Fatal,
            ..entry
        }
    } else {
        entry
    }
}

const fn build_dispatch_table() -> [ExitDispatchEntry; NR_VMX_EXIT_REASONS] {
    let mut table = [UNHANDLED; NR_VMX_EXIT_REASONS];
    let mut i = 0;
    while i < NR_VMX_EXIT_REASONS {
        table[i] = match VmxExitReason::from_raw(i as u16) {
            Some(reason) => dispatch_entry(reason),
            // Encodings not assigned by the architecture.
            None => UNHANDLED,
        };
        i += 1;
    }
    table
}

/// The dispatch table, indexed by basic exit reason. Built at compile time.
pub static DISPATCH_TABLE: [ExitDispatchEntry; NR_VMX_EXIT_REASONS] = build_dispatch_table();

/// Looks up the dispatch entry of a basic exit reason, `None` if it is out of range.
pub fn lookup_dispatch_entry(basic_exit_reason: u16) -> Option<&'static ExitDispatchEntry> {
    DISPATCH_TABLE.get(basic_exit_reason as usize)
}
