//! Integration tests exercising the full scanner -> classifier ->
//! epoch reconstructor -> ring -> renderer pipeline end to end. Narrower,
//! module-scoped coverage lives alongside each module's own `#[cfg(test)]`.



#[cfg(feature = "log")]
use log::LevelFilter;

#[cfg(feature = "log")]
use std::sync::Once;

#[cfg(feature = "log")]
static INIT: Once = Once::new();

#[cfg(feature = "log")]
pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

#[cfg(not(feature = "log"))]
pub fn init_logger() {}
