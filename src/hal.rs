/// Trace events emitted while handling VM exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A CPUID exit was emulated. Arguments: vcpu id, 0.
    VmexitCpuid,
    /// A control-register access was emulated. Arguments: access type, CR number.
    VmexitCrAccess,
    /// An exit reason without dedicated emulation was seen. Arguments: raw exit reason, 0.
    VmexitUnhandled,
}

/// The interfaces which the underlying platform (kernel or hypervisor) must implement
/// for the exit handlers.
///
/// All functions operate on the physical CPU that is currently handling the VM exit.
pub trait AxVmExitHal {
    /// Returns the id of the current physical CPU.
    fn current_cpu_id() -> usize;

    /// Returns the id of the bootstrap processor.
    fn boot_cpu_id() -> usize {
        0
    }

    /// Reads a field of the current VMCS.
    ///
    /// # Parameters
    ///
    /// * `field` - The field encoding, e.g. `x86::vmx::vmcs::ro::EXIT_QUALIFICATION`.
    ///
    /// # Returns
    ///
    /// * `u64` - The field value, zero-extended for 16 and 32 bit fields.
    fn vmcs_read(field: u32) -> u64;

    /// Writes a field of the current VMCS.
    fn vmcs_write(field: u32, value: u64);

    /// Reads a model-specific register.
    fn read_msr(msr: u32) -> u64;

    /// Writes the host `XCR0` register.
    fn write_xcr0(value: u64);

    /// Returns the TSC frequency in kHz.
    fn tsc_khz() -> u32;

    /// Masks interrupt delivery on the current physical CPU.
    fn irq_disable();

    /// Unmasks interrupt delivery on the current physical CPU.
    fn irq_enable();

    /// Writes back and invalidates all caches of the current physical CPU (`WBINVD`).
    fn cache_flush_invalidate_all();

    /// Whether the IOMMU guarantees snoop control for the DMA of the given VM.
    fn iommu_snoop_supported(vm_id: usize) -> bool;

    /// Lets the hypervisor console run its periodic work.
    fn console_kick() {}

    /// Emits a trace event.
    fn trace_event(event: TraceEvent, arg0: u64, arg1: u64) {
        trace!("{:?}: {:#x} {:#x}", event, arg0, arg1);
    }
}
