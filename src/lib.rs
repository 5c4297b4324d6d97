// SPDX-License-Identifier: MIT

pub mod llm;
pub mod qualifier;
