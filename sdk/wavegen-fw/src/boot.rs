use core::panic::PanicInfo;

unsafe extern "C" {
    #[allow(non_upper_case_globals)]
    /// CMSIS core clock, kept current by the vendor clock setup.
    pub unsafe static SystemCoreClock: u32;
}

// fatal halting belongs to the vendor image
#[panic_handler]
fn panic(_panic: &PanicInfo<'_>) -> ! {
    loop {}
}
