//! Build-time configuration of the exit-handling core.

/// Number of basic exit reasons defined by the architecture.
///
/// See SDM Volume 3D, Appendix C "VMX Basic Exit Reasons". Encodings `0..=64`.
pub const NR_VMX_EXIT_REASONS: usize = 65;

/// Time slice granted to the guest between two preemption-timer exits, in milliseconds.
pub const PREEMPTION_TIMER_EXPIRY_MS: u64 = 40;

/// Number of execution contexts ("worlds") a vcpu can switch between.
pub const NR_WORLD: usize = 2;
