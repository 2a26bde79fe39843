use crate::arch_vcpu::AxExitVCpu;
use crate::error::{ExitResult, VmExitError};
use crate::exit::VmxExitInfo;
use crate::hal::{AxVmExitHal, TraceEvent};

fn report<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &V) -> VmxExitInfo {
    let info = VmxExitInfo::read::<H>(vcpu.exit_state().exit_reason);
    error!(
        "Unhandled VM exit condition from guest at {:?}",
        info.guest_rip
    );
    error!(
        "Exit Reason: {:#018x}, entry failure: {}",
        info.raw_exit_reason, info.entry_failure
    );
    error!("Exit qualification: {:#018x}", info.exit_qualification);
    H::trace_event(TraceEvent::VmexitUnhandled, info.raw_exit_reason, 0);
    info
}

/// Handles an exit without emulation. The guest resumes.
pub(super) fn handle_unhandled<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) -> ExitResult {
    report::<H, V>(vcpu);
    Ok(())
}

/// Handles an exit after which the guest cannot resume.
pub(super) fn handle_fatal<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) -> ExitResult {
    let info = report::<H, V>(vcpu);
    match info.reason() {
        Some(reason) => Err(VmExitError::GuestFatal(reason)),
        None => Err(VmExitError::UnknownExitReason {
            raw: info.raw_exit_reason,
        }),
    }
}
