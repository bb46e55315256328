// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Value parsers. Every parser returns a [`ValueParseResult`](crate::ValueParseResult)
//! and never panics on caller data.

pub mod generic;
pub mod special;
