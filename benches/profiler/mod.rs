// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|raw| raw.trim().parse().ok()).unwrap_or(default)
}

/// Criterion tuned through `BENCH_*` variables, with a flamegraph profiler attached.
pub fn criterion() -> Criterion {
    let frequency = env_or("PROFILE_FREQ", 100_i32).clamp(1, 1000);
    let sample_size = env_or("BENCH_SAMPLE_SIZE", 50_usize).clamp(10, 200);
    let warmup = Duration::from_secs(env_or("BENCH_WARMUP_SECS", 2_u64).clamp(1, 60));
    let measurement = Duration::from_secs(env_or("BENCH_MEASUREMENT_SECS", 4_u64).clamp(1, 120));

    Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(warmup)
        .measurement_time(measurement)
        .with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
