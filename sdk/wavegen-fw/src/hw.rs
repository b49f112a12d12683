use bit_field::BitField;
use wavegen_core::{OutputBus, SampleTimer};

use crate::regs::{Cr1, Dier, Egr, GpioRegs, Sr, TIM2_IRQN, TimRegs, gpiob, nvic, tim2};

/// TIM2 as the sample clock. Zero-sized apart from the register pointer, so both the interrupt
/// and the USB callback conjure their own.
pub struct Tim2 {
    regs: &'static TimRegs,
}

impl Tim2 {
    /// # Safety
    /// The caller must be the interrupt handler or the (non-reentrant) command path; nothing else
    /// may touch TIM2.
    #[inline(always)]
    pub unsafe fn steal() -> Self {
        Self { regs: tim2() }
    }
}

impl SampleTimer for Tim2 {
    #[inline(always)]
    fn set_divisor(&mut self, divisor: u32) {
        // PSC is 16 bits wide; the engine config rejects clocks that would need more
        unsafe { self.regs.psc.write(divisor.get_bits(0..16)) }
    }

    #[inline(always)]
    fn set_reload(&mut self, reload: u32) {
        unsafe { self.regs.arr.write(reload) }
    }

    #[inline(always)]
    fn force_update(&mut self) {
        unsafe {
            self.regs.cr1.modify(|r| r | Cr1::URS.bits());
            self.regs.egr.write(Egr::UG.bits());
        }
    }

    #[inline(always)]
    fn enable(&mut self) {
        unsafe { self.regs.cr1.modify(|r| r | Cr1::CEN.bits()) }
    }

    #[inline(always)]
    fn disable(&mut self) {
        unsafe { self.regs.cr1.modify(|r| r & !Cr1::CEN.bits()) }
    }

    #[inline(always)]
    fn is_enabled(&self) -> bool {
        Cr1::from_bits_truncate(self.regs.cr1.read()).contains(Cr1::CEN)
    }

    #[inline(always)]
    fn enable_interrupt(&mut self) {
        unsafe {
            self.regs.dier.modify(|r| r | Dier::UIE.bits());
            nvic().iser[TIM2_IRQN / 32].write(1 << (TIM2_IRQN % 32));
        }
    }

    #[inline(always)]
    fn take_pending(&mut self) -> bool {
        let pending = Sr::from_bits_truncate(self.regs.sr.read()).contains(Sr::UIF);
        if pending {
            // rc_w0: writing 1 elsewhere leaves the other flags alone
            unsafe { self.regs.sr.write(!Sr::UIF.bits()) }
        }
        pending
    }
}

/// PB0..PB7 wired to the DAC0808 data inputs.
pub struct PortB {
    regs: &'static GpioRegs,
}

impl PortB {
    /// # Safety
    /// Only the sample interrupt may drive PB0..PB7.
    #[inline(always)]
    pub unsafe fn steal() -> Self {
        Self { regs: gpiob() }
    }
}

impl OutputBus for PortB {
    #[inline(always)]
    fn write(&mut self, sample: u8) {
        // set and reset halves in one BSRR write: all eight lines change together and
        // PB8..PB15 are untouched
        let mut bsrr = 0u32;
        bsrr.set_bits(0..8, sample as u32);
        bsrr.set_bits(16..24, !sample as u32);
        unsafe { self.regs.bsrr.write(bsrr) }
    }
}
