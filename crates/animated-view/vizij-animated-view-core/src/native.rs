//! Native-driver eligibility.

use crate::config::NativeFallback;

/// Top-level style properties the host's native-thread driver can animate.
pub const NATIVE_DRIVER_PROPS: &[&str] = &[
    "transform",
    "opacity",
    "shadowOffset",
    "shadowRadius",
    "shadowOpacity",
    "textShadowOffset",
    "textShadowRadius",
];

#[inline]
pub fn is_native_eligible(prop: &str) -> bool {
    NATIVE_DRIVER_PROPS.contains(&prop)
}

/// Decision for one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeGate {
    /// The view does not use the native driver.
    Off,
    Native,
    Downgraded { ineligible: Vec<String> },
    Rejected { ineligible: Vec<String> },
}

impl NativeGate {
    /// Evaluate the top-level properties of a batch.
    pub fn evaluate<'a>(
        use_native_driver: bool,
        fallback: NativeFallback,
        props: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        if !use_native_driver {
            return Self::Off;
        }
        let mut ineligible: Vec<String> = Vec::new();
        for prop in props {
            if !is_native_eligible(prop) && !ineligible.iter().any(|p| p == prop) {
                ineligible.push(prop.to_string());
            }
        }
        match (ineligible.is_empty(), fallback) {
            (true, _) => Self::Native,
            (false, NativeFallback::Downgrade) => Self::Downgraded { ineligible },
            (false, NativeFallback::Reject) => Self::Rejected { ineligible },
        }
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}
