// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of WattPlan.

//! Integration test crate. All tests live under `tests/`.
