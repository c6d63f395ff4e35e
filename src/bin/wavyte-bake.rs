use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use wavyte_bake::{
    AbsorbTarget, BakeOpts, BakedArtifact, Baker, Ease, EntityKind, Fps, Point, PropertyValue,
    Rgba, SoundSample, Vec2, Vec3, tween_number,
};

#[derive(Parser, Debug)]
#[command(name = "wavyte-bake", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake a builtin demo behavior and print a JSON summary.
    Bake(BakeArgs),
    /// List the builtin demo behaviors.
    Demos,
}

#[derive(Parser, Debug)]
struct BakeArgs {
    /// Demo behavior to bake.
    #[arg(long, value_enum)]
    demo: Demo,

    /// Bake options JSON. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation frame rate (frames per second).
    #[arg(long)]
    fps: Option<u32>,

    /// Simulation budget in seconds.
    #[arg(long)]
    max_length: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Demo {
    /// Fade a rectangle in with a chime, then remove it.
    Fade,
    /// Orbit a mesh around the active camera and absorb it.
    Orbit,
    /// Fail after a few frames to show the fallback.
    Error,
    /// Never finish; runs until the budget is spent.
    Forever,
    /// No behavior at all.
    Empty,
}

impl Demo {
    fn describe(self) -> &'static str {
        match self {
            Self::Fade => "fade a rectangle in with a chime, then remove it",
            Self::Orbit => "orbit a mesh around the active camera and absorb it",
            Self::Error => "fail after a few frames to show the fallback",
            Self::Forever => "never finish; runs until the budget is spent",
            Self::Empty => "no behavior at all",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Bake(args) => cmd_bake(args),
        Command::Demos => {
            for demo in Demo::value_variants() {
                if let Some(name) = demo.to_possible_value() {
                    println!("{:<8} {}", name.get_name(), demo.describe());
                }
            }
            Ok(())
        }
    }
}

fn cmd_bake(args: BakeArgs) -> anyhow::Result<()> {
    let mut opts = match &args.config {
        Some(path) => BakeOpts::from_path(path)?,
        None => BakeOpts::default(),
    };
    if let Some(fps) = args.fps {
        opts.fps = Fps::new(fps, 1)?;
    }
    if let Some(max_length) = args.max_length {
        opts.max_length_secs = max_length;
    }
    let baker = Baker::new(opts).context("invalid bake options")?;

    let artifact = bake_demo(&baker, args.demo)?;
    let summary = artifact.summary();
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serialize bake summary")?
    );
    Ok(())
}

fn bake_demo(baker: &Baker, demo: Demo) -> anyhow::Result<BakedArtifact> {
    let sample_rate = baker.opts().sample_rate;
    let artifact = match demo {
        Demo::Fade => {
            let chime = Arc::new(SoundSample::sine("chime", sample_rate, 880.0, 0.25, 8_000)?);
            baker.bake_fn(move |_scene, api| {
                let chime = chime.clone();
                async move {
                    let rect = api.create_with(
                        EntityKind::Shape2D,
                        [
                            ("opacity", PropertyValue::Number(0.0)),
                            ("color", Rgba::new(0.2, 0.6, 1.0, 1.0).into()),
                        ],
                    )?;
                    api.play_sound(chime, 0.8)?;
                    tween_number(&api, rect, "opacity", 0.0, 1.0, 1.0, Ease::InOutQuad).await?;
                    api.wait_seconds(0.5).await;
                    api.destroy(rect)?;
                    Ok(())
                }
            })?
        }
        Demo::Orbit => baker.bake_fn(|_scene, api| async move {
            let camera = api.create(EntityKind::Camera)?;
            api.set_active_camera(Some(camera))?;
            let mesh = api.create(EntityKind::Mesh3D)?;
            api.create_render_buffer(256, 256)?;
            let handle = api.begin_handle_3d("orbit", Vec3::new(0.0, 0.0, 0.0))?;

            let radius = 3.0;
            let mut angle: f64 = 0.0;
            while angle < std::f64::consts::TAU {
                api.wait_next_frame().await;
                angle += std::f64::consts::TAU * api.frame_delta()? / 2.0;
                let p = Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
                api.set_property(mesh, "position", p)?;
            }
            api.end_handle(handle)?;

            let label = api.create_with(EntityKind::Text2D, [("text", "absorbed")])?;
            api.set_property(label, "position", Vec2::new(0.0, 40.0))?;
            let target = AbsorbTarget {
                point: Some(Vec3::new(0.0, 0.0, 0.0)),
                screen_point: Some(Point::new(0.0, 0.0)),
            };
            for step in 1..=10 {
                api.absorb(mesh, f64::from(step) / 10.0, target)?;
                api.wait_next_frame().await;
            }
            api.destroy(mesh)?;
            Ok(())
        })?,
        Demo::Error => baker.bake_fn(|_scene, api| async move {
            api.create(EntityKind::Shape2D)?;
            api.wait_frames(3).await;
            Err(anyhow::anyhow!("demo failure at t={:.3}s", api.now()))
        })?,
        Demo::Forever => baker.bake_fn(|_scene, api| async move {
            let dot = api.create(EntityKind::Shape2D)?;
            let mut frames = 0u64;
            while frames < u64::MAX {
                api.wait_next_frame().await;
                frames += 1;
                api.set_property(dot, "rotation", frames as f64)?;
            }
            Ok(())
        })?,
        Demo::Empty => baker.bake_project(None)?,
    };
    Ok(artifact)
}
