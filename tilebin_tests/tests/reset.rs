// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reuse of the bin table across dispatches.

use anyhow::{bail, Result};
use tilebin::{Binner, BinnerOptions, BinningConfig, Completion, Session};
use tilebin_tests::{binner, gpu_error, glyph_scene};

fn dispatch_and_read(binner: &Binner, session: &Session) -> Result<Vec<u32>> {
    if binner.dispatch(session).wait(session) == Completion::TimedOut {
        bail!("dispatch timed out");
    }
    binner
        .read_bin_counts(session)
        .and_then(|counts| counts.into_result())
        .map_err(gpu_error)
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn repeated_runs_are_identical() -> Result<()> {
    let Some(session) = tilebin_tests::session()? else {
        return Ok(());
    };
    let mut binner = binner(&session, BinningConfig::default(), BinnerOptions::default())?;
    let paths = glyph_scene();
    let first = binner.run(&session, &paths).map_err(gpu_error)?;
    let second = binner.run(&session, &paths).map_err(gpu_error)?;
    assert!(first.is_complete() && second.is_complete());
    assert_eq!(first, second);
    Ok(())
}

#[test]
#[cfg_attr(skip_gpu_tests, ignore)]
fn without_reset_counts_accumulate() -> Result<()> {
    let Some(session) = tilebin_tests::session()? else {
        return Ok(());
    };
    let options = BinnerOptions {
        reset_before_dispatch: false,
    };
    let mut binner = binner(&session, BinningConfig::default(), options)?;
    binner
        .upload(&session, &glyph_scene())
        .map_err(gpu_error)?;
    if binner.reset(&session).wait(&session) == Completion::TimedOut {
        bail!("reset timed out");
    }

    let first = dispatch_and_read(&binner, &session)?;
    let second = dispatch_and_read(&binner, &session)?;
    assert!(first.iter().zip(&second).all(|(a, b)| b >= a));
    assert_eq!(
        second.iter().sum::<u32>(),
        2 * first.iter().sum::<u32>(),
        "second dispatch should add the same counts again"
    );

    // An explicit reset brings the table back to a single dispatch.
    if binner.reset(&session).wait(&session) == Completion::TimedOut {
        bail!("reset timed out");
    }
    let third = dispatch_and_read(&binner, &session)?;
    assert_eq!(third, first);
    session.check_faults().map_err(gpu_error)?;
    Ok(())
}
