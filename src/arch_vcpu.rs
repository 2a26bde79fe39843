use axerrno::AxResult;

use crate::dispatch::DelegatedExit;
use crate::vcpu::{CpuidRegs, GprIndex, VmExitState};

/// The vcpu interface required by the VM exit handlers.
///
/// It is implemented by the x86 vcpu of the hypervisor. Register emulation, interrupt
/// controller emulation and the delegated exit handlers all stay behind this trait, so the
/// exit-handling core only decodes the exit and routes it.
///
/// All methods are called on the physical CPU the vcpu is bound to, while the guest is not
/// running.
pub trait AxExitVCpu {
    /// The id of the vcpu.
    fn vcpu_id(&self) -> usize;

    /// The id of the VM this vcpu belongs to.
    fn vm_id(&self) -> usize;

    /// The physical CPU this vcpu is currently bound to, `None` if it is not bound.
    fn bound_cpu_id(&self) -> Option<usize>;

    /// The exit state of the exit being handled.
    fn exit_state(&self) -> &VmExitState;

    /// The mutable exit state of the exit being handled.
    fn exit_state_mut(&mut self) -> &mut VmExitState;

    /// The index of the active execution context (world).
    fn cur_context(&self) -> usize;

    /// Gets the value of a general-purpose register.
    fn gpr(&self, reg: GprIndex) -> u64;

    /// Sets the value of a general-purpose register.
    fn set_gpr(&mut self, reg: GprIndex, val: u64);

    /// Emulates a guest write to `CR0`.
    ///
    /// Reserved and architecturally invalid bits are checked here; the implementation
    /// injects a fault into the guest if the value is rejected.
    fn set_cr0(&mut self, val: u64);

    /// Emulates a guest write to `CR4`, with the same rules as [`AxExitVCpu::set_cr0`].
    fn set_cr4(&mut self, val: u64);

    /// Gets the task-priority threshold of the virtual local APIC, as seen through `CR8`.
    fn cr8(&self) -> u64;

    /// Sets the task-priority threshold of the virtual local APIC through `CR8`.
    fn set_cr8(&mut self, val: u64);

    /// Queues an exception to be delivered on the next VM entry.
    fn queue_exception(&mut self, vector: u8, error_code: Option<u32>) -> AxResult;

    /// Injects a general-protection fault into the guest.
    fn inject_gp(&mut self, error_code: u32);

    /// Requests an NMI to be delivered on the next VM entry.
    fn request_nmi(&mut self);

    /// Keeps the guest `RIP` unchanged on the next VM entry, so the interrupted
    /// instruction runs again.
    fn retain_rip(&mut self);

    /// Computes the virtualized result of a `CPUID` instruction in place.
    fn guest_cpuid(&mut self, regs: &mut CpuidRegs);

    /// Handles an exit whose emulation lives outside this crate.
    fn handle_delegated(&mut self, exit: DelegatedExit) -> AxResult;
}
