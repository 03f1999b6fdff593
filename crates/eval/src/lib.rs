// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mb-eval: deterministic numeric evaluators behind the bridge's operations.

pub mod compound;
pub mod curves;
pub mod expr;
pub mod fold;
pub mod impound;
pub mod jitter;
pub mod recover;
pub mod volphi;

pub use compound::{CompoundError, CompoundTable};
pub use expr::{eval_str, Env, EvalError, Rpn};
pub use fold::{Crease, FoldError, FoldingField, Kernel};
pub use impound::ImpoundList;
pub use jitter::HaltonJitter;
pub use recover::{RecoverySmoother, SmootherParams};
pub use volphi::{VolPhi, VolPhiParams, VolPhiUpdate};
