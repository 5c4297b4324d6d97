// SPDX-License-Identifier: MIT

pub mod website;
