use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Runs scripted input through the interaction systems and logs what happens",
    version
)]
pub struct Args {
    /// Scene JSON describing items, the interactor and world objects
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Input script JSON listing per-step key and movement input
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Use the built-in demo for whichever of --scene/--script is missing
    #[arg(long)]
    pub demo: bool,

    /// Path to write the event log and final world summary as JSON
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,

    /// Fixed timestep in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub frame_dt: f32,

    /// Print per-object state after the run
    #[arg(long)]
    pub verbose: bool,
}

/// Validated run settings. A `None` scene or script means the built-in demo.
#[derive(Debug)]
pub struct RunArgs {
    pub scene: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub event_log_json: Option<PathBuf>,
    pub frame_dt: f32,
    pub verbose: bool,
}

pub fn parse() -> Result<RunArgs> {
    let args = Args::parse();
    args.into_run_args()
}

impl Args {
    fn into_run_args(self) -> Result<RunArgs> {
        if !self.demo && self.scene.is_none() {
            bail!("--scene is required unless --demo is given");
        }
        if !self.demo && self.script.is_none() {
            bail!("--script is required unless --demo is given");
        }
        if !(self.frame_dt.is_finite() && self.frame_dt > 0.0) {
            bail!("--frame-dt must be a positive number of seconds");
        }

        Ok(RunArgs {
            scene: self.scene,
            script: self.script,
            event_log_json: self.event_log_json,
            frame_dt: self.frame_dt,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(args: &[&str]) -> Result<RunArgs> {
        let mut argv = vec!["interact_sim"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv)?.into_run_args()
    }

    #[test]
    fn demo_needs_no_files() {
        let args = parse_from(&["--demo"]).expect("demo args");
        assert!(args.scene.is_none());
        assert!(args.script.is_none());
        assert!((args.frame_dt - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn files_are_required_without_demo() {
        assert!(parse_from(&[]).is_err());
        assert!(parse_from(&["--scene", "scene.json"]).is_err());
        let args = parse_from(&["--scene", "scene.json", "--script", "script.json"])
            .expect("explicit files");
        assert_eq!(args.scene, Some(PathBuf::from("scene.json")));
    }

    #[test]
    fn frame_dt_must_be_positive() {
        assert!(parse_from(&["--demo", "--frame-dt", "0"]).is_err());
        assert!(parse_from(&["--demo", "--frame-dt", "-0.5"]).is_err());
        let args = parse_from(&["--demo", "--frame-dt", "0.05"]).expect("valid dt");
        assert_eq!(args.frame_dt, 0.05);
    }
}
