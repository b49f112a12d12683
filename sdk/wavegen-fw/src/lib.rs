//! STM32F4 binding of the wavegen engine, linked into the vendor firmware image.
//!
//! The C side brings up clocks, configures PB0..PB7 as outputs and runs the USB CDC stack,
//! then calls [`wavegen_start`] once and forwards every CDC receive callback to
//! [`wavegen_cdc_receive`]. `TIM2_IRQHandler` is defined here and must not be defined in C.
#![no_std]

mod boot;
mod hw;
mod regs;

use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};
use wavegen_core::{ClockConfig, Engine, EngineConfig};

use crate::hw::{PortB, Tim2};

static mut ENGINE: MaybeUninit<Engine> = MaybeUninit::uninit();
static READY: AtomicBool = AtomicBool::new(false);

#[inline(always)]
fn engine() -> Option<&'static Engine> {
    if READY.load(Ordering::Acquire) {
        // written once in wavegen_start before READY, never again
        Some(unsafe { (*&raw const ENGINE).assume_init_ref() })
    } else {
        None
    }
}

/// Builds the tables and starts the sample clock. Returns 0 on success, -1 if the core clock
/// cannot produce the supported frequency range (the caller should halt).
#[unsafe(no_mangle)]
pub extern "C" fn wavegen_start() -> i32 {
    if READY.load(Ordering::Acquire) {
        return 0;
    }

    let clock = ClockConfig { base_clock_hz: unsafe { boot::SystemCoreClock }, ..ClockConfig::default() };
    let built = match Engine::new(EngineConfig::default().with_clock(clock)) {
        Ok(built) => built,
        Err(e) => {
            error!("wavegen config rejected: {}", e);
            return -1;
        }
    };

    unsafe { (*&raw mut ENGINE).write(built) };
    READY.store(true, Ordering::Release);

    if let Some(engine) = engine() {
        engine.start(unsafe { Tim2::steal() });
        info!("wavegen started");
    }
    0
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "C" fn TIM2_IRQHandler() {
    match engine() {
        Some(engine) => engine.on_tick(unsafe { Tim2::steal() }, unsafe { PortB::steal() }),
        None => {
            // spurious: nothing to play yet
            let mut timer = unsafe { Tim2::steal() };
            let _ = wavegen_core::SampleTimer::take_pending(&mut timer);
        }
    }
}

/// USB CDC receive hook, same shape as the vendor `CDC_Receive_FS` arguments.
///
/// # Safety
/// `buf` must point to at least `*len` readable bytes when both pointers are non-null, and the
/// transport must not call this again before it returns.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wavegen_cdc_receive(buf: *const u8, len: *const u32) {
    let Some(engine) = engine() else { return };

    let bytes: &[u8] = if buf.is_null() || len.is_null() {
        &[]
    } else {
        unsafe { core::slice::from_raw_parts(buf, *len as usize) }
    };

    // the protocol has no reply; the result only feeds the engine's counters
    let _ = engine.handle_command(unsafe { Tim2::steal() }, bytes);
}
