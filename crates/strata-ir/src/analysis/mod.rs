//! Side-channel analysis over a finished layer tree.
//!
//! Both passes only read the IR and can run before or after normalization.

pub mod components;
pub mod tokens;

pub use components::{detect_components, Component, ComponentInstance, ComponentReport, Signature};
pub use tokens::{
    extract_tokens, ColorToken, ColorUsage, DesignTokens, SpacingScale, SpacingToken,
    TypographyToken,
};
