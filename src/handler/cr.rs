use bit_field::BitField;

use crate::arch_vcpu::AxExitVCpu;
use crate::error::{ExitResult, VmExitError};
use crate::hal::{AxVmExitHal, TraceEvent};
use crate::vcpu::GprIndex;

/// The access type of a control-register access, bits 5:4 of the exit qualification.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrAccessType {
    MovToCr = 0,
    MovFromCr = 1,
    Clts = 2,
    Lmsw = 3,
}

/// Exit qualification of a control-register access.
///
/// See SDM Volume 3C, Section 28.2.1, Table 28-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrAccessInfo {
    /// Number of the control register.
    pub cr_number: u8,
    /// Type of the access.
    pub access_type: CrAccessType,
    /// The general-purpose register operand of a `MOV CR`.
    pub gpr: u8,
}

impl CrAccessInfo {
    /// Decodes the exit qualification.
    pub fn from_qualification(qualification: u64) -> Self {
        let access_type = match qualification.get_bits(4..6) {
            0 => CrAccessType::MovToCr,
            1 => CrAccessType::MovFromCr,
            2 => CrAccessType::Clts,
            _ => CrAccessType::Lmsw,
        };
        Self {
            cr_number: qualification.get_bits(0..4) as u8,
            access_type,
            gpr: qualification.get_bits(8..12) as u8,
        }
    }
}

/// `CR8` has 4 significant bits; setting any other bit raises #GP.
const CR8_RESERVED_MASK: u64 = !0xf;

/// Handles a control-register access exit.
///
/// Only `MOV to CR0/CR4/CR8` and `MOV from CR8` are configured to exit, any other access
/// means the qualification was decoded wrongly.
pub(super) fn handle_cr_access<H: AxVmExitHal, V: AxExitVCpu>(vcpu: &mut V) -> ExitResult {
    let qualification = vcpu.exit_state().exit_qualification;
    let info = CrAccessInfo::from_qualification(qualification);
    let idx = GprIndex::new(info.gpr.into()).inspect_err(|_| {
        error!(
            "Invalid register operand {} in CR access, qualification {:#x}",
            info.gpr, qualification
        )
    })?;
    let reg = vcpu.gpr(idx);

    match (info.access_type, info.cr_number) {
        (CrAccessType::MovToCr, 0) => vcpu.set_cr0(reg),
        (CrAccessType::MovToCr, 4) => vcpu.set_cr4(reg),
        (CrAccessType::MovToCr, 8) => {
            if reg & CR8_RESERVED_MASK != 0 {
                debug!("Invalid cr8 write operation from guest: {:#x}", reg);
                vcpu.inject_gp(0);
            } else {
                vcpu.set_cr8(reg);
            }
        }
        (CrAccessType::MovFromCr, 8) => {
            let val = vcpu.cr8();
            vcpu.set_gpr(idx, val);
        }
        (access_type, cr) => {
            error!(
                "Unhandled CR access: {:?} CR{}, qualification {:#x}",
                access_type, cr, qualification
            );
            return Err(VmExitError::UnhandledCrAccess {
                access_type: access_type as u8,
                cr,
            });
        }
    }

    H::trace_event(
        TraceEvent::VmexitCrAccess,
        info.access_type as u64,
        info.cr_number.into(),
    );
    Ok(())
}
