// SPDX-License-Identifier: LGPL-3.0-or-later
//
// Persisted state: saving the controls and restoring them into a fresh
// processor must reproduce the same derived engine state.

use corrupt_dsp_units::corrupter::controls::{Controls, ParamId, STATE_SIZE, StateError};
use corrupt_dsp_units::corrupter::processor::Processor;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn representative() -> Controls {
    Controls {
        resample_rate: 0.35,
        bit_depth: 0.6,
        playback_rate: 0.8,
        resample_lfo: 0.25,
        resample_lfo_depth: 0.7,
        bit_crush_lfo: 0.5,
        bit_crush_lfo_depth: 0.4,
        playback_rate_lfo: 0.1,
        playback_rate_lfo_depth: 0.3,
        wet_mix: 0.9,
        dry_mix: 0.2,
        bypass: false,
    }
}

#[test]
fn restored_state_matches_derived_values() {
    init_logging();
    let mut original = Processor::new(2, 44100.0);
    original.set_controls(representative());
    let saved = original.save_state();
    assert_eq!(saved.len(), STATE_SIZE);

    let mut restored = Processor::new(2, 44100.0);
    restored
        .load_state(&saved)
        .expect("representative state must restore");

    assert_eq!(restored.controls(), original.controls());
    assert_eq!(restored.engine().cached_state(), original.engine().cached_state());
}

#[test]
fn restore_matches_live_control_changes() {
    // Controls changed one by one and applied by the next block end up in
    // the same place as a state restore.
    let mut live = Processor::new(1, 48000.0);
    let target = representative();
    for id in ParamId::ALL {
        live.set_control(id, target.get(id));
    }
    live.apply_controls();

    let mut restored = Processor::new(1, 48000.0);
    restored
        .load_state(&target.to_bytes())
        .expect("state must restore");

    assert_eq!(restored.engine().cached_state(), live.engine().cached_state());
}

#[test]
fn bypass_flag_survives_roundtrip() {
    let mut p = Processor::new(1, 44100.0);
    p.set_bypass(true);
    let saved = p.save_state();

    let mut q = Processor::new(1, 44100.0);
    q.load_state(&saved).expect("state must restore");
    assert!(q.is_bypassed());
}

#[test]
fn truncated_state_is_rejected() {
    init_logging();
    let mut p = Processor::new(1, 44100.0);
    let saved = Controls::default().to_bytes();
    let err = p.load_state(&saved[..STATE_SIZE - 4]).unwrap_err();
    assert_eq!(
        err,
        StateError::Truncated {
            expected: STATE_SIZE,
            actual: STATE_SIZE - 4
        }
    );
}

#[test]
fn non_finite_state_is_rejected() {
    let mut bytes = representative().to_bytes();
    bytes[36..40].copy_from_slice(&f32::INFINITY.to_le_bytes());
    let mut p = Processor::new(1, 44100.0);
    assert_eq!(
        p.load_state(&bytes),
        Err(StateError::NonFinite { field: "wet_mix" })
    );
    assert_eq!(*p.controls(), Controls::default());
}
