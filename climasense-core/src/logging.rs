// Conditional logging shim: uses `defmt` when enabled, otherwise the
// arguments are still type-checked through `format_args!` and discarded.
//
// Format strings must stay within the subset both backends accept:
// `{}` for numbers and `Display` types, `{:?}` for enums, and
// `{:#x}`-style hex hints (optionally zero-padded) for integers.

#[cfg(feature = "defmt")]
macro_rules! trace {
    ($($arg:tt)*) => {{
        defmt::trace!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => {{
        defmt::debug!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! info {
    ($($arg:tt)*) => {{
        defmt::info!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($($arg:tt)*) => {{
        defmt::warn!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! error {
    ($($arg:tt)*) => {{
        defmt::error!($($arg)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{
        $crate::logging::discard(core::format_args!($($arg)*));
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{
        $crate::logging::discard(core::format_args!($($arg)*));
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{
        $crate::logging::discard(core::format_args!($($arg)*));
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{
        $crate::logging::discard(core::format_args!($($arg)*));
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! error {
    ($($arg:tt)*) => {{
        $crate::logging::discard(core::format_args!($($arg)*));
    }};
}

#[cfg(not(feature = "defmt"))]
#[inline(always)]
pub(crate) fn discard(_args: core::fmt::Arguments<'_>) {}
