use x86::controlregs::{Cr4, Xcr0};
use x86::vmx::vmcs;

use crate::arch_vcpu::AxExitVCpu;
use crate::config::NR_WORLD;
use crate::error::{ExitResult, VmExitError};
use crate::hal::AxVmExitHal;
use crate::vcpu::GprIndex;

/// Whether `value` is an architecturally valid `XCR0`.
///
/// x87 state can never be disabled, and AVX state requires SSE state.
pub fn xcr0_is_valid(value: u64) -> bool {
    let x87 = Xcr0::XCR0_FPU_MMX_STATE.bits();
    let sse = Xcr0::XCR0_SSE_STATE.bits();
    let avx = Xcr0::XCR0_AVX_STATE.bits();

    if value & x87 == 0 {
        return false;
    }
    value & (sse | avx) != avx
}

/// Handles an `XSETBV` exit.
///
/// Invalid requests from the guest end in a #GP injected into it, the handler itself
/// only fails on a corrupted world index.
pub(super) fn handle_xsetbv<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) -> ExitResult {
    let guest_cr4 = H::vmcs_read(vmcs::guest::CR4);
    if guest_cr4 & Cr4::CR4_ENABLE_OS_XSAVE.bits() as u64 == 0 {
        vcpu.inject_gp(0);
        return Ok(());
    }

    let world = vcpu.cur_context();
    if world >= NR_WORLD {
        error!("XSETBV from invalid world {}", world);
        return Err(VmExitError::InvalidWorld(world));
    }

    // Only XCR0 exists.
    if vcpu.gpr(GprIndex::RCX) != 0 {
        vcpu.inject_gp(0);
        return Ok(());
    }

    let value = (vcpu.gpr(GprIndex::RAX) & 0xffff_ffff) | (vcpu.gpr(GprIndex::RDX) << 32);
    if !xcr0_is_valid(value) {
        warn!("Guest tried to set invalid XCR0 {:#x}", value);
        vcpu.inject_gp(0);
        return Ok(());
    }

    H::write_xcr0(value);
    Ok(())
}
