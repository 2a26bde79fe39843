//! The VM exit dispatcher and the handlers of the exits emulated by this crate.

mod cpuid;
mod cr;
mod preemption;
mod unhandled;
mod wbinvd;
mod xsetbv;

use x86::vmx::vmcs;

use crate::arch_vcpu::AxExitVCpu;
use crate::dispatch::{self, DelegatedExit, ExitHandler};
use crate::error::{ExitResult, VmExitError};
use crate::event::PendingEvent;
use crate::exit::{basic_exit_reason, VmxExitReason};
use crate::hal::AxVmExitHal;
use crate::percpu::IrqGuard;

pub use cr::{CrAccessInfo, CrAccessType};
pub use preemption::preemption_timer_ticks;
pub use xsetbv::xcr0_is_valid;

/// Handles the VM exit that just happened on `vcpu`.
///
/// `vcpu.exit_state().exit_reason` must hold the exit-reason field of this exit. Lost
/// hardware exceptions and NMIs are queued for re-injection, then the exit is routed to its
/// handler through [`DISPATCH_TABLE`](crate::DISPATCH_TABLE).
///
/// # Returns
///
/// * `Ok(())` - The vcpu can resume, possibly with an injected fault.
/// * `Err(e)` - The vcpu cannot resume; [`VmExitError::severity`] tells whether the VM or the
///   whole host has to stop.
pub fn vmexit_handler<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) -> ExitResult {
    let current = H::current_cpu_id();
    if vcpu.bound_cpu_id() != Some(current) {
        error!(
            "vcpu is not running on its pcpu! current: {}, bound: {:?}",
            current,
            vcpu.bound_cpu_id()
        );
        return Err(VmExitError::IdentityMismatch {
            current,
            bound: vcpu.bound_cpu_id(),
        });
    }

    requeue_pending_event::<H, V>(vcpu);

    let raw_exit_reason = vcpu.exit_state().exit_reason;
    let basic_reason = basic_exit_reason(raw_exit_reason);
    debug!("Exit Reason: {:#018x}", raw_exit_reason);

    let Some(entry) = dispatch::lookup_dispatch_entry(basic_reason) else {
        error!("Invalid Exit Reason: {:#018x}", raw_exit_reason);
        return Err(VmExitError::UnknownExitReason {
            raw: raw_exit_reason,
        });
    };

    if entry.need_exit_qualification {
        vcpu.exit_state_mut().exit_qualification = H::vmcs_read(vmcs::ro::EXIT_QUALIFICATION);
    }

    if basic_reason == VmxExitReason::EXTERNAL_INTERRUPT as u16 {
        let _irq_guard = IrqGuard::<H>::new();
        invoke::<H, V>(entry.handler, vcpu)
    } else {
        invoke::<H, V>(entry.handler, vcpu)
    }
}

/// Reads the IDT-vectoring information and queues a lost hardware exception or NMI.
fn requeue_pending_event<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) {
    let raw = H::vmcs_read(vmcs::ro::IDT_VECTORING_INFO) as u32;
    vcpu.exit_state_mut().idt_vectoring_info = raw;

    match PendingEvent::decode(raw) {
        PendingEvent::HardwareException {
            vector,
            error_code_valid,
        } => {
            let error_code = if error_code_valid {
                Some(H::vmcs_read(vmcs::ro::IDT_VECTORING_ERR_CODE) as u32)
            } else {
                None
            };
            if let Err(err) = vcpu.queue_exception(vector, error_code) {
                warn!("Failed to re-queue exception {:#x}: {:?}", vector, err);
            }
            vcpu.exit_state_mut().idt_vectoring_info = 0;
        }
        PendingEvent::Nmi => {
            vcpu.request_nmi();
            vcpu.exit_state_mut().idt_vectoring_info = 0;
        }
        // External interrupts and software events are not re-injected here.
        PendingEvent::Other { .. } | PendingEvent::None => {}
    }
}

fn invoke<H: AxVmExitHal, V: AxExitVCpu>(handler: ExitHandler, vcpu: &mut V) -> ExitResult {
    match handler {
        ExitHandler::Cpuid => cpuid::handle_cpuid::<H, V>(vcpu),
        ExitHandler::CrAccess => cr::handle_cr_access::<H, V>(vcpu),
        ExitHandler::Xsetbv => xsetbv::handle_xsetbv::<H, V>(vcpu),
        ExitHandler::Wbinvd => wbinvd::handle_wbinvd::<H, V>(vcpu),
        ExitHandler::PreemptionTimer => preemption::handle_preemption_timer::<H, V>(vcpu),
        ExitHandler::Delegated(exit) => delegate(exit, vcpu),
        ExitHandler::Unhandled => unhandled::handle_unhandled::<H, V>(vcpu),
        ExitHandler::Fatal => unhandled::handle_fatal::<H, V>(vcpu),
    }
}

fn delegate<V: AxExitVCpu>(exit: DelegatedExit, vcpu: &mut V) -> ExitResult {
    vcpu.handle_delegated(exit).map_err(|err| VmExitError::Delegated { exit, err })
}
