use bit_field::BitField;
use x86::msr::IA32_VMX_MISC;
use x86::vmx::vmcs;

use crate::arch_vcpu::AxExitVCpu;
use crate::config::PREEMPTION_TIMER_EXPIRY_MS;
use crate::error::ExitResult;
use crate::hal::AxVmExitHal;

/// Number of preemption-timer ticks in [`PREEMPTION_TIMER_EXPIRY_MS`].
///
/// The timer counts down by 1 every time bit `rate_shift` of the TSC changes, where
/// `rate_shift` is bits 4:0 of `IA32_VMX_MISC`. A shift of 64 or more yields 0.
pub fn preemption_timer_ticks(tsc_khz: u32, rate_shift: u32) -> u32 {
    let timer_hz = (u64::from(tsc_khz) * 1000)
        .checked_shr(rate_shift)
        .unwrap_or(0);
    let ticks = timer_hz * PREEMPTION_TIMER_EXPIRY_MS / 1000;
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

/// Handles a VMX-preemption timer expiry: rearms the timer, kicks the console on the
/// bootstrap processor and resumes the guest at the same instruction.
pub(super) fn handle_preemption_timer<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) -> ExitResult {
    let rate_shift = H::read_msr(IA32_VMX_MISC).get_bits(0..5) as u32;
    let ticks = preemption_timer_ticks(H::tsc_khz(), rate_shift);
    H::vmcs_write(vmcs::guest::VMX_PREEMPTION_TIMER_VALUE, ticks.into());

    if H::current_cpu_id() == H::boot_cpu_id() {
        H::console_kick();
    }

    vcpu.retain_rip();
    Ok(())
}
