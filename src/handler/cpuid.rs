use crate::arch_vcpu::AxExitVCpu;
use crate::error::ExitResult;
use crate::hal::{AxVmExitHal, TraceEvent};
use crate::vcpu::{CpuidRegs, GprIndex};

/// Handles a `CPUID` exit. The leaf itself is emulated by [`AxExitVCpu::guest_cpuid`].
pub(super) fn handle_cpuid<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) -> ExitResult {
    let mut regs = CpuidRegs {
        eax: vcpu.gpr(GprIndex::RAX) as u32,
        ebx: vcpu.gpr(GprIndex::RBX) as u32,
        ecx: vcpu.gpr(GprIndex::RCX) as u32,
        edx: vcpu.gpr(GprIndex::RDX) as u32,
    };
    vcpu.guest_cpuid(&mut regs);

    // CPUID zero-extends its 32-bit results.
    vcpu.set_gpr(GprIndex::RAX, regs.eax.into());
    vcpu.set_gpr(GprIndex::RBX, regs.ebx.into());
    vcpu.set_gpr(GprIndex::RCX, regs.ecx.into());
    vcpu.set_gpr(GprIndex::RDX, regs.edx.into());

    H::trace_event(TraceEvent::VmexitCpuid, vcpu.vcpu_id() as u64, 0);
    Ok(())
}
