use chain_dynamics::chain::{
    ChainAttributes, ChainSettings, ChainSetup, EvalTime, FrameSnapshot, History,
    JointOutput, LevelMatrices, SolverMode,
};
use chain_dynamics::error::ChainError;
use clap::{Parser, ValueEnum};
use glam::{Mat4, Quat, Vec3};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Once,
    Iterate,
}

/// Drives a swinging chain through the dynamics solver and prints the path
/// of its simulated tip.
#[derive(Debug, Parser)]
#[command(name = "chain-demo", version)]
struct Args {
    /// Chain setup (TOML). Without one, default settings are used.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 48)]
    frames: u32,

    /// Joint count, used only without --config.
    #[arg(long, default_value_t = 4)]
    joints: usize,

    /// Overrides the solver mode of the setup.
    #[arg(long, value_enum)]
    mode: Option<Mode>,
}

/// Root swing angle at `time`.
fn swing(time: f64) -> f32 {
    0.6 * (0.25 * time as f32).sin()
}

/// FK chain of unit segments along +Y, rotated about Z at the root.
fn level_at(joint: usize, time: f64) -> LevelMatrices {
    let root = Mat4::from_quat(Quat::from_rotation_z(swing(time)));
    let parent = if joint == 0 {
        Mat4::IDENTITY
    } else {
        root * Mat4::from_translation(Vec3::new(0.0, joint as f32 - 1.0, 0.0))
    };
    let input = root * Mat4::from_translation(Vec3::new(0.0, joint as f32, 0.0));
    let goal = input * Mat4::from_translation(Vec3::Y);

    LevelMatrices {
        parent,
        input,
        goal,
    }
}

fn snapshot_at(joints: &[usize], time: f64) -> FrameSnapshot {
    joints
        .iter()
        .fold(FrameSnapshot::default(), |snapshot, &joint| {
            snapshot.with_level(joint, level_at(joint, time))
        })
}

fn main() -> Result<(), ChainError> {
    env_logger::init();
    let args = Args::parse();

    let mut setup = match &args.config {
        Some(path) => ChainSetup::load(path)?,
        None => ChainSetup {
            settings: ChainSettings {
                start_time: 0.0,
                up_vector: Vec3::X,
                ..Default::default()
            },
            attributes: ChainAttributes::with_joints(args.joints),
        },
    };
    if let Some(mode) = args.mode {
        setup.settings.solver_mode = match mode {
            Mode::Once => SolverMode::Once,
            Mode::Iterate => SolverMode::IterateFromStart,
        };
    }

    let joints = setup.attributes.indices();
    let Some(&tip) = joints.last() else {
        log::warn!("chain has no joints, nothing to simulate");
        return Ok(());
    };
    let start = setup.settings.start_time;
    log::info!(
        "simulating {} joints for {} frames ({:?})",
        joints.len(),
        args.frames,
        setup.settings.solver_mode
    );

    let mut chain = setup.into_chain();
    let history = History::new(|joint, time| Ok(level_at(joint, time).resolve(&Mat4::IDENTITY)));
    let mut outputs: Vec<(usize, JointOutput)> = Vec::new();

    for frame in 0..=args.frames {
        let time = start + f64::from(frame);
        let current = snapshot_at(&joints, time);
        outputs.clear();
        chain.evaluate(EvalTime::at(time), &current, &history, &mut outputs)?;

        if let Some(state) = chain.state().joint(tip) {
            let p = state.goal_position();
            let rest = level_at(tip, time).goal.w_axis.truncate();
            println!(
                "{time:>6.1}  tip ({:>7.3}, {:>7.3}, {:>7.3})  lag {:.4}",
                p.x,
                p.y,
                p.z,
                p.distance(rest)
            );
        }
    }

    Ok(())
}
