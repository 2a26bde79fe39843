use crate::arch_vcpu::AxExitVCpu;
use crate::error::ExitResult;
use crate::hal::AxVmExitHal;

/// Handles a `WBINVD` exit. The flush is only needed when DMA of the VM is not snooped.
pub(super) fn handle_wbinvd<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) -> ExitResult {
    if !H::iommu_snoop_supported(vcpu.vm_id()) {
        H::cache_flush_invalidate_all();
    }
    Ok(())
}
