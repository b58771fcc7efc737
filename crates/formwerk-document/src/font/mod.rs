// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font module — standard fonts, custom font embedding, and resolution.

pub mod embed;
pub mod resolver;
pub mod standard;

pub use embed::EmbedMode;
pub use resolver::{FontFace, FontResolver, ResolvedFont};
pub use standard::StandardFont;
