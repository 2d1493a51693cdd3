// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod backend;
pub mod index_manager;
pub mod indexer;
pub mod logging;
pub mod normalizer;
pub mod search;
pub mod validator;
