//! End-to-end chain scenarios driven through `DynamicChain::evaluate`.

use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;
use chain_dynamics::chain::{
    ChainAttributes, ChainSettings, ChainSetup, DynamicChain, EvalTime, FrameTriple, History,
    JointAttributes, JointOutput, LimitAttributes, RampedScalar, SolverMode, SolverPhase,
};
use chain_dynamics::error::SourceError;
use glam::{Mat4, Quat, Vec3};

/// Input at the origin; the goal sits on the input until `t > 0`, then at
/// (0, 10, 0).
fn jump(_joint: usize, time: f64) -> Result<FrameTriple, SourceError> {
    let goal = if time > 0.0 {
        Vec3::new(0.0, 10.0, 0.0)
    } else {
        Vec3::ZERO
    };
    Ok(FrameTriple::new(
        Mat4::IDENTITY,
        Mat4::IDENTITY,
        Mat4::from_translation(goal),
    ))
}

/// Unit segments along +Y, swung about Z at the root.
fn swinging(joint: usize, time: f64) -> Result<FrameTriple, SourceError> {
    let root = Mat4::from_quat(Quat::from_rotation_z(0.6 * (0.25 * time as f32).sin()));
    let parent = if joint == 0 {
        Mat4::IDENTITY
    } else {
        root * Mat4::from_translation(Vec3::new(0.0, joint as f32 - 1.0, 0.0))
    };
    let input = root * Mat4::from_translation(Vec3::new(0.0, joint as f32, 0.0));
    Ok(FrameTriple::new(
        parent.inverse(),
        input,
        input * Mat4::from_translation(Vec3::Y),
    ))
}

fn scenario_chain(settings: ChainSettings) -> DynamicChain {
    let attributes = ChainAttributes {
        mass: RampedScalar::constant(1.0),
        stiffness: RampedScalar::constant(0.5),
        damping: RampedScalar::constant(0.5),
        gravity: RampedScalar::constant(0.0),
        ..ChainAttributes::with_joints(1)
    };
    DynamicChain::new(settings, attributes)
}

fn run(chain: &mut DynamicChain, times: &[f64]) -> Vec<(usize, JointOutput)> {
    let source = History::new(swinging);
    let mut outputs: Vec<(usize, JointOutput)> = Vec::new();
    for &time in times {
        outputs.clear();
        chain
            .evaluate(EvalTime::at(time), &source, &source, &mut outputs)
            .unwrap();
    }
    outputs
}

fn iterating_chain(joints: usize) -> DynamicChain {
    let settings = ChainSettings {
        solver_mode: SolverMode::IterateFromStart,
        start_time: 0.0,
        up_vector: Vec3::X,
        ..Default::default()
    };
    DynamicChain::new(settings, ChainAttributes::with_joints(joints))
}

fn jump_settings(stretch: f32) -> ChainSettings {
    ChainSettings {
        start_time: 0.0,
        up_vector: Vec3::X,
        stretch_positive: stretch,
        stretch_negative: stretch,
        ..Default::default()
    }
}

/// Simulated goal positions for frames `1..=frames` after the jump.
fn jump_trajectory(chain: &mut DynamicChain, frames: u32) -> Vec<Vec3> {
    let source = History::new(jump);
    let mut sink: Vec<(usize, JointOutput)> = Vec::new();
    chain.evaluate(EvalTime::at(0.0), &source, &source, &mut sink).unwrap();

    (1..=frames)
        .map(|frame| {
            chain
                .evaluate(EvalTime::at(f64::from(frame)), &source, &source, &mut sink)
                .unwrap();
            chain.state().joint(0).unwrap().goal_position()
        })
        .collect()
}

#[test]
fn jumping_goal_lags_overshoots_within_bounds_and_settles() {
    let mut chain = scenario_chain(jump_settings(1.0));
    let path = jump_trajectory(&mut chain, 200);
    let target = Vec3::new(0.0, 10.0, 0.0);

    // damping ratio 0.5 is underdamped: the first crossing is approached
    // monotonically, then the overshoot stays inside the decay envelope
    let zeta = 0.5_f32;
    let envelope = 10.0 * (1.0 + (-std::f32::consts::PI * zeta / (1.0 - zeta * zeta).sqrt()).exp());

    assert!(path[0].y > 0.0 && path[0].y < 10.0, "frame 1: {}", path[0]);
    let crossing = path.iter().position(|p| p.y >= target.y).unwrap();
    assert!(crossing >= 1 && crossing < 20);
    for pair in path[..=crossing].windows(2) {
        assert!(pair[1].y > pair[0].y, "{} then {}", pair[0], pair[1]);
    }
    for (frame, p) in path.iter().take(20).enumerate() {
        assert!(p.y <= envelope, "frame {}: {p} above {envelope}", frame + 1);
        assert!(p.x.abs() < 1e-5 && p.z.abs() < 1e-5);
    }

    let settled = path[199];
    assert!(settled.abs_diff_eq(target, 1e-3), "{settled}");
}

#[test]
fn rigid_length_holds_the_rest_distance() {
    let mut chain = scenario_chain(jump_settings(0.0));
    let path = jump_trajectory(&mut chain, 20);

    for p in path {
        assert_abs_diff_eq!(p.length(), 10.0, epsilon = 1e-4);
        assert!(p.y > 0.0);
    }
}

#[test]
fn replay_is_deterministic() {
    let direct = run(&mut iterating_chain(3), &[0.0, 10.0]);
    let replayed = run(&mut iterating_chain(3), &[0.0, 10.0]);
    assert_eq!(direct, replayed);
}

#[test]
fn replay_does_not_depend_on_the_scrub_path() {
    let direct = run(&mut iterating_chain(3), &[0.0, 10.0]);
    let incremental = run(&mut iterating_chain(3), &[0.0, 3.0, 5.0, 10.0]);
    assert_eq!(direct, incremental);

    let scrubbed_back = run(&mut iterating_chain(3), &[0.0, 10.0, 7.0]);
    let fresh = run(&mut iterating_chain(3), &[0.0, 7.0]);
    assert_eq!(scrubbed_back, fresh);
}

#[test]
fn evaluating_at_the_start_restores_the_rest_pose() {
    let settings = ChainSettings {
        start_time: 0.0,
        up_vector: Vec3::X,
        ..Default::default()
    };
    let mut chain = DynamicChain::new(settings, ChainAttributes::with_joints(3));
    run(&mut chain, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

    let outputs = run(&mut chain, &[0.0]);

    assert_eq!(chain.state().phase(), SolverPhase::RestingAtStart);
    for (joint, output) in outputs {
        let state = chain.state().joint(joint).unwrap();
        let frames = swinging(joint, 0.0).unwrap();
        assert_eq!(state.goal_velocity(), Vec3::ZERO);
        assert!(state
            .goal_position()
            .abs_diff_eq(frames.goal.w_axis.truncate(), 1e-6));
        assert!(output
            .matrix
            .abs_diff_eq(frames.relative * frames.input, 1e-5));
    }
}

#[test]
fn zero_limits_never_produce_nan() {
    let zero = LimitAttributes {
        enabled: true,
        positive: Vec3::ZERO,
        negative: Vec3::ZERO,
    };
    let attributes = ChainAttributes {
        joints: (0..3)
            .map(|index| JointAttributes {
                limit: Some(zero),
                ..JointAttributes::new(index)
            })
            .collect(),
        ..Default::default()
    };
    let settings = ChainSettings {
        start_time: 0.0,
        smoothing: Vec3::ZERO,
        ..Default::default()
    };
    let mut chain = DynamicChain::new(settings, attributes);
    let times: Vec<f64> = (0..60).map(f64::from).collect();

    let outputs = run(&mut chain, &times);

    assert_eq!(outputs.len(), 3);
    for (_, output) in outputs {
        assert!(output.matrix.is_finite());
        assert!(output.rotation.is_finite());
    }
}

#[test]
fn once_mode_clamps_large_time_jumps() {
    let settings = ChainSettings {
        start_time: 0.0,
        up_vector: Vec3::X,
        ..Default::default()
    };
    let mut jumped = scenario_chain(settings.clone());
    let mut unit = scenario_chain(settings);
    let source = History::new(jump);
    let mut a: BTreeMap<usize, JointOutput> = BTreeMap::new();
    let mut b: BTreeMap<usize, JointOutput> = BTreeMap::new();

    jumped.evaluate(EvalTime::at(0.0), &source, &source, &mut a).unwrap();
    jumped.evaluate(EvalTime::at(100.0), &source, &source, &mut a).unwrap();
    unit.evaluate(EvalTime::at(0.0), &source, &source, &mut b).unwrap();
    unit.evaluate(EvalTime::at(1.0), &source, &source, &mut b).unwrap();

    let jumped = jumped.state().joint(0).unwrap();
    let unit = unit.state().joint(0).unwrap();
    assert_eq!(jumped.goal_velocity(), unit.goal_velocity());
    assert_eq!(jumped.goal_position(), unit.goal_position());
}

#[test]
fn setup_file_drives_a_chain() {
    let path = std::env::temp_dir().join(format!("chain-setup-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        [settings]
        solver_mode = "iterate-from-start"
        start_time = 0.0
        up_vector = [1.0, 0.0, 0.0]

        [attributes]
        damping = { value = 1.0 }

        [[attributes.joints]]
        index = 0

        [[attributes.joints]]
        index = 1
        "#,
    )
    .unwrap();

    let setup = ChainSetup::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_abs_diff_eq!(setup.attributes.damping.value, 1.0);

    let mut chain = setup.into_chain();
    let outputs = run(&mut chain, &[0.0, 4.0]);

    assert_eq!(outputs.len(), 2);
    assert_eq!(chain.state().last_time(), 4.0);
}
