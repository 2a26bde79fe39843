use bit_field::BitField;
use memory_addr::{def_usize_addr, def_usize_addr_formatter};
use x86::vmx::vmcs;

use crate::hal::AxVmExitHal;

def_usize_addr! {
    /// A guest virtual address.
    pub type GuestVirtAddr;
}

def_usize_addr_formatter! {
    GuestVirtAddr = "GVA:{}";
}

macro_rules! vmx_exit_reasons {
    ($($(#[$doc:meta])* $name:ident = $value:literal,)+) => {
        /// The basic exit reason of a VM exit, i.e. bits 15:0 of the exit-reason VMCS field.
        ///
        /// See SDM Volume 3D, Appendix C "VMX Basic Exit Reasons". Encodings 35, 38 and 42
        /// are not assigned by the architecture and have no variant here.
        #[allow(non_camel_case_types)]
        #[repr(u16)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum VmxExitReason {
            $($(#[$doc])* $name = $value,)+
        }

        impl VmxExitReason {
            /// Every named basic exit reason, in encoding order.
            pub const ALL: &'static [VmxExitReason] = &[$(VmxExitReason::$name,)+];

            /// Decodes a basic exit reason. Returns `None` for unassigned encodings.
            pub const fn from_raw(raw: u16) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$name),)+
                    _ => None,
                }
            }
        }
    };
}

vmx_exit_reasons! {
    /// Exception or non-maskable interrupt.
    EXCEPTION_NMI = 0,
    /// External interrupt.
    EXTERNAL_INTERRUPT = 1,
    /// Triple fault.
    TRIPLE_FAULT = 2,
    /// INIT signal.
    INIT = 3,
    /// Start-up IPI.
    SIPI = 4,
    /// I/O system-management interrupt.
    IO_SMI = 5,
    /// Other SMI.
    OTHER_SMI = 6,
    /// Interrupt window.
    INTERRUPT_WINDOW = 7,
    /// NMI window.
    NMI_WINDOW = 8,
    /// Task switch.
    TASK_SWITCH = 9,
    CPUID = 10,
    GETSEC = 11,
    HLT = 12,
    INVD = 13,
    INVLPG = 14,
    RDPMC = 15,
    RDTSC = 16,
    RSM = 17,
    VMCALL = 18,
    VMCLEAR = 19,
    VMLAUNCH = 20,
    VMPTRLD = 21,
    VMPTRST = 22,
    VMREAD = 23,
    VMRESUME = 24,
    VMWRITE = 25,
    VMOFF = 26,
    VMON = 27,
    /// Control-register accesses.
    CR_ACCESS = 28,
    /// Debug-register accesses.
    DR_ACCESS = 29,
    /// I/O instruction.
    IO_INSTRUCTION = 30,
    MSR_READ = 31,
    MSR_WRITE = 32,
    /// VM-entry failure due to invalid guest state.
    INVALID_GUEST_STATE = 33,
    /// VM-entry failure due to MSR loading.
    MSR_LOAD_FAIL = 34,
    MWAIT_INSTRUCTION = 36,
    /// Monitor trap flag.
    MONITOR_TRAP_FLAG = 37,
    MONITOR_INSTRUCTION = 39,
    PAUSE_INSTRUCTION = 40,
    /// VM-entry failure due to machine-check event.
    MCE_DURING_VMENTRY = 41,
    /// TPR below threshold.
    TPR_BELOW_THRESHOLD = 43,
    /// APIC access.
    APIC_ACCESS = 44,
    /// Virtualized EOI.
    VIRTUALIZED_EOI = 45,
    /// Access to GDTR or IDTR.
    GDTR_IDTR = 46,
    /// Access to LDTR or TR.
    LDTR_TR = 47,
    EPT_VIOLATION = 48,
    EPT_MISCONFIG = 49,
    INVEPT = 50,
    RDTSCP = 51,
    /// VMX-preemption timer expired.
    PREEMPTION_TIMER = 52,
    INVVPID = 53,
    WBINVD = 54,
    XSETBV = 55,
    /// APIC write.
    APIC_WRITE = 56,
    RDRAND = 57,
    INVPCID = 58,
    VMFUNC = 59,
    ENCLS = 60,
    RDSEED = 61,
    /// Page-modification log full.
    PML_FULL = 62,
    XSAVES = 63,
    XRSTORS = 64,
}

impl VmxExitReason {
    /// Whether the guest cannot continue after an exit with this reason.
    ///
    /// A triple fault shuts the logical processor down, and the VM-entry failures leave
    /// the guest without a valid state to resume into.
    pub const fn is_architecturally_fatal(self) -> bool {
        matches!(
            self,
            Self::TRIPLE_FAULT
                | Self::INVALID_GUEST_STATE
                | Self::MSR_LOAD_FAIL
                | Self::MCE_DURING_VMENTRY
        )
    }
}

/// Extracts the basic exit reason (bits 15:0) from the raw exit-reason value.
pub const fn basic_exit_reason(raw_exit_reason: u64) -> u16 {
    (raw_exit_reason & 0xffff) as u16
}

/// A snapshot of the exit information used for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct VmxExitInfo {
    /// The full exit-reason field, including the auxiliary flags in the upper bits.
    pub raw_exit_reason: u64,
    /// The basic exit reason.
    pub basic_reason: u16,
    /// VM exit was incident to VM entry failure (bit 31).
    pub entry_failure: bool,
    /// Guest `RIP` at the time of the exit.
    pub guest_rip: GuestVirtAddr,
    /// The exit qualification, whatever the exit reason.
    pub exit_qualification: u64,
}

impl VmxExitInfo {
    /// Builds the snapshot from a raw exit reason, reading the guest `RIP` and the exit
    /// qualification from the VMCS.
    pub fn read<H: AxVmExitHal>(raw_exit_reason: u64) -> Self {
        Self {
            raw_exit_reason,
            basic_reason: basic_exit_reason(raw_exit_reason),
            entry_failure: raw_exit_reason.get_bit(31),
            guest_rip: GuestVirtAddr::from_usize(H::vmcs_read(vmcs::guest::RIP) as usize),
            exit_qualification: H::vmcs_read(vmcs::ro::EXIT_QUALIFICATION),
        }
    }

    /// The named exit reason, if the basic reason is an assigned encoding.
    pub const fn reason(&self) -> Option<VmxExitReason> {
        VmxExitReason::from_raw(self.basic_reason)
    }
}
