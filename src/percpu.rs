use core::marker::PhantomData;

use crate::hal::AxVmExitHal;

/// Masks interrupt delivery on the current physical CPU for as long as it is alive.
///
/// Interrupts are unmasked again when the guard is dropped, which covers every way out
/// of the scope holding it, including early returns with an error.
///
/// ```ignore
/// let _guard = IrqGuard::<MyHal>::new();
/// handle_external_interrupt()?;
/// ```
pub struct IrqGuard<H: AxVmExitHal> {
    _hal: PhantomData<H>,
    // Interrupt state belongs to the physical CPU, so the guard must stay on it.
    _not_send: PhantomData<*const ()>,
}

impl<H: AxVmExitHal> IrqGuard<H> {
    /// Disable interrupts on the current CPU.
    pub fn new() -> Self {
        H::irq_disable();
        Self {
            _hal: PhantomData,
            _not_send: PhantomData,
        }
    }
}

impl<H: AxVmExitHal> Default for IrqGuard<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: AxVmExitHal> Drop for IrqGuard<H> {
    fn drop(&mut self) {
        H::irq_enable();
    }
}
