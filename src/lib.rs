// Copyright 2025 The Axvisor Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! AxVmExit - VMX exit dispatch and handling for ArceOS hypervisors.
//!
//! This crate runs on every VM exit of an Intel VMX guest. It re-queues the exception or
//! NMI whose delivery the exit interrupted, decodes the basic exit reason and routes the
//! exit to its handler through a dispatch table that is built at compile time.
//!
//! # Features
//!
//! - Total dispatch table over all 65 basic exit reasons
//! - Emulation of `CPUID`, control-register accesses, `XSETBV` and `WBINVD`
//! - VMX-preemption timer rearming
//! - Hand-off of device, interrupt and memory exits to the vcpu implementation
//! - Errors classified by whether the VM or the host has to stop
//!
//! The hardware and the vcpu are reached through the [`AxVmExitHal`] and [`AxExitVCpu`]
//! traits.

#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate log;

// Core modules
mod arch_vcpu; // Vcpu interface used by the handlers
mod config; // Build-time constants
mod dispatch; // Dispatch table
mod error; // Error types and severities
mod event; // IDT-vectoring information decoding
mod exit; // Basic exit reasons
mod hal; // Hardware abstraction layer interfaces
mod handler; // Dispatcher and per-reason handlers
mod percpu; // Physical-CPU-local interrupt masking
mod vcpu; // Per-vcpu exit state and register types

// Public API exports
pub use arch_vcpu::AxExitVCpu;
pub use config::*;
pub use dispatch::{
    dispatch_entry, lookup_dispatch_entry, DelegatedExit, ExitDispatchEntry, ExitHandler,
    DISPATCH_TABLE,
};
pub use error::{ExitResult, Severity, VmExitError};
pub use event::{IdtVectoringInfo, InterruptionType, PendingEvent};
pub use exit::{basic_exit_reason, GuestVirtAddr, VmxExitInfo, VmxExitReason};
pub use hal::{AxVmExitHal, TraceEvent};
pub use handler::*;
pub use percpu::IrqGuard;
pub use vcpu::*;
