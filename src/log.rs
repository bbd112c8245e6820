//! Logging macros
//!
//! Forward to `defmt` on target. On host builds the arguments are only
//! borrowed, so values that exist for logging stay used.

#![allow(unused_macros, unused_imports)]

#[collapse_debuginfo(yes)]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        #[cfg(feature = "embedded")]
        {
            defmt::trace!($s $(, $x)*);
        }
        #[cfg(not(feature = "embedded"))]
        {
            let _ = ($(&$x,)*);
        }
    };
}
pub(crate) use trace;

#[collapse_debuginfo(yes)]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        #[cfg(feature = "embedded")]
        {
            defmt::debug!($s $(, $x)*);
        }
        #[cfg(not(feature = "embedded"))]
        {
            let _ = ($(&$x,)*);
        }
    };
}
pub(crate) use debug;

#[collapse_debuginfo(yes)]
macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        #[cfg(feature = "embedded")]
        {
            defmt::info!($s $(, $x)*);
        }
        #[cfg(not(feature = "embedded"))]
        {
            let _ = ($(&$x,)*);
        }
    };
}
pub(crate) use info;

#[collapse_debuginfo(yes)]
macro_rules! warni {
    ($s:literal $(, $x:expr)* $(,)?) => {
        #[cfg(feature = "embedded")]
        {
            defmt::warn!($s $(, $x)*);
        }
        #[cfg(not(feature = "embedded"))]
        {
            let _ = ($(&$x,)*);
        }
    };
}
pub(crate) use warni as warn;

#[collapse_debuginfo(yes)]
macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        #[cfg(feature = "embedded")]
        {
            defmt::error!($s $(, $x)*);
        }
        #[cfg(not(feature = "embedded"))]
        {
            let _ = ($(&$x,)*);
        }
    };
}
pub(crate) use error;
