use bitflags::bitflags;
use volatile_register::{RO, RW, WO};

pub const TIM2_BASE: usize = 0x4000_0000;
pub const GPIOB_BASE: usize = 0x4002_0400;
pub const NVIC_ISER_BASE: usize = 0xE000_E100;

pub const TIM2_IRQN: usize = 28;

/// General-purpose timer (TIM2..TIM5), up to ARR.
#[repr(C)]
pub struct TimRegs {
    pub cr1: RW<u32>,
    pub cr2: RW<u32>,
    pub smcr: RW<u32>,
    pub dier: RW<u32>,
    pub sr: RW<u32>,
    pub egr: WO<u32>,
    pub ccmr1: RW<u32>,
    pub ccmr2: RW<u32>,
    pub ccer: RW<u32>,
    pub cnt: RW<u32>,
    pub psc: RW<u32>,
    pub arr: RW<u32>,
}

#[repr(C)]
pub struct GpioRegs {
    pub moder: RW<u32>,
    pub otyper: RW<u32>,
    pub ospeedr: RW<u32>,
    pub pupdr: RW<u32>,
    pub idr: RO<u32>,
    pub odr: RW<u32>,
    pub bsrr: WO<u32>,
}

#[repr(C)]
pub struct NvicIser {
    pub iser: [RW<u32>; 8],
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Cr1: u32 {
        const CEN  = 1 << 0;
        /// Only counter overflow raises UIF; a software UG stays silent.
        const URS  = 1 << 2;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Dier: u32 {
        const UIE = 1 << 0;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Sr: u32 {
        const UIF = 1 << 0;
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Egr: u32 {
        const UG = 1 << 0;
    }
}

#[inline(always)]
pub fn tim2() -> &'static TimRegs {
    unsafe { &*(TIM2_BASE as *const TimRegs) }
}

#[inline(always)]
pub fn gpiob() -> &'static GpioRegs {
    unsafe { &*(GPIOB_BASE as *const GpioRegs) }
}

#[inline(always)]
pub fn nvic() -> &'static NvicIser {
    unsafe { &*(NVIC_ISER_BASE as *const NvicIser) }
}
