//! Decoding of the IDT-vectoring information field.
//!
//! When a VM exit happens during event delivery, the processor records the event in the
//! IDT-vectoring information field. Hardware exceptions and NMIs recorded there were lost
//! by the exit and have to be delivered again on the next VM entry.

use bit_field::BitField;
use bitflags::bitflags;

bitflags! {
    /// Flag bits of the IDT-vectoring information field.
    ///
    /// See SDM Volume 3C, Section 25.9.3, Table 25-20.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IdtVectoringInfo: u32 {
        /// Error code valid.
        const ERROR_CODE_VALID = 1 << 11;
        /// NMI unblocking due to IRET.
        const NMI_UNBLOCKING = 1 << 12;
        /// The field holds a valid event.
        const VALID = 1 << 31;
    }
}

/// The interruption type, bits 10:8 of the interruption-information fields.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionType {
    /// External interrupt.
    External = 0,
    /// Non-maskable interrupt.
    Nmi = 2,
    /// Hardware exception (e.g. #PF).
    HardwareException = 3,
    /// Software interrupt (`INT n`).
    SoftwareInterrupt = 4,
    /// Privileged software exception (`INT1`).
    PrivilegedSoftwareException = 5,
    /// Software exception (`INT3` or `INTO`).
    SoftwareException = 6,
    /// Other event.
    Other = 7,
}

impl InterruptionType {
    /// Decodes the 3-bit interruption type. Returns `None` for the reserved encoding 1.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::External),
            2 => Some(Self::Nmi),
            3 => Some(Self::HardwareException),
            4 => Some(Self::SoftwareInterrupt),
            5 => Some(Self::PrivilegedSoftwareException),
            6 => Some(Self::SoftwareException),
            7 => Some(Self::Other),
            _ => None,
        }
    }
}

/// An event that was being delivered to the guest when the VM exit happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingEvent {
    /// Nothing was being delivered.
    None,
    /// A hardware exception. The error code, if any, lives in a separate VMCS field.
    HardwareException {
        /// The exception vector.
        vector: u8,
        /// Whether an error code was pushed with the exception.
        error_code_valid: bool,
    },
    /// A non-maskable interrupt.
    Nmi,
    /// External interrupts and software-generated events, which are not re-injected here.
    Other {
        /// The interruption type. `None` for the reserved encoding.
        ty: Option<InterruptionType>,
        /// The vector.
        vector: u8,
    },
}

impl PendingEvent {
    /// Decodes a raw IDT-vectoring information value.
    pub fn decode(raw: u32) -> Self {
        let flags = IdtVectoringInfo::from_bits_truncate(raw);
        if !flags.contains(IdtVectoringInfo::VALID) {
            return Self::None;
        }
        let vector = raw.get_bits(0..8) as u8;
        let ty = InterruptionType::from_raw(raw.get_bits(8..11) as u8);
        match ty {
            Some(InterruptionType::HardwareException) => Self::HardwareException {
                vector,
                error_code_valid: flags.contains(IdtVectoringInfo::ERROR_CODE_VALID),
            },
            Some(InterruptionType::Nmi) => Self::Nmi,
            _ => Self::Other { ty, vector },
        }
    }
}
