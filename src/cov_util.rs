// Logging macros that vanish under coverage builds so trace formatting does not skew line counts.
// All arms forward the token stream untouched, so `target:` forms work as they do with `log`.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        #[cfg(not(coverage))]
        {
            log::debug!($($arg)+);
        }
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        #[cfg(not(coverage))]
        {
            log::info!($($arg)+);
        }
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        #[cfg(not(coverage))]
        {
            log::warn!($($arg)+);
        }
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        #[cfg(not(coverage))]
        {
            log::error!($($arg)+);
        }
    };
}
