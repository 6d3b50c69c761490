//! Command definitions for the rest timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{RestRequest, SetEntry};

// ============================================================================
// CLI Structure
// ============================================================================

/// Rest timer - counts down between sets and alerts you at zero
#[derive(Parser, Debug)]
#[command(
    name = "rest-timer",
    version,
    about = "Rest-interval timer for the terminal",
    long_about = "Counts down the rest between two sets, keeps the display awake\n\
                  and alerts with a tone and a screen flash when the rest is over.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a rest countdown
    Start(StartArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Start Command Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Exercise being rested for
    #[arg(short, long, value_parser = validate_exercise_name)]
    pub exercise: String,

    /// Rest duration in seconds (0 or less completes immediately)
    #[arg(short, long, allow_negative_numbers = true)]
    pub rest: i64,

    /// Completed set as WEIGHTxREPS or REPS; repeat for each set
    #[arg(short, long = "set", value_name = "SET", value_parser = parse_set)]
    pub sets: Vec<SetEntry>,

    /// Path to a JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Disable the tone alert
    #[arg(long)]
    pub no_audio: bool,

    /// Do not keep the display awake
    #[arg(long)]
    pub no_wake_lock: bool,
}

impl StartArgs {
    /// Builds the rest request these arguments describe.
    pub fn to_request(&self) -> RestRequest {
        RestRequest {
            exercise_name: self.exercise.clone(),
            rest_seconds: self.rest,
            sets: self.sets.clone(),
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the exercise name.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_exercise_name(s: &str) -> Result<String, String> {
    let name = s.trim();
    if name.is_empty() {
        return Err("exercise name must not be empty".to_string());
    }
    if name.chars().count() > 100 {
        return Err("exercise name must be at most 100 characters".to_string());
    }
    Ok(name.to_string())
}

/// Parses a set written as `135x10`, `135×10` or `10`.
pub fn parse_set(s: &str) -> Result<SetEntry, String> {
    let s = s.trim();
    let parse_reps = |reps: &str| {
        reps.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid reps '{}'", reps.trim()))
    };

    match s.split_once(['x', 'X', '×']) {
        Some((weight, reps)) => {
            let weight = weight
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w >= 0.0)
                .ok_or_else(|| format!("invalid weight '{}'", weight.trim()))?;
            Ok(SetEntry::weighted(weight, parse_reps(reps)?))
        }
        None => Ok(SetEntry::bodyweight(parse_reps(s)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["rest-timer"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["rest-timer", "-v"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_start_command() {
            let cli = Cli::parse_from([
                "rest-timer",
                "start",
                "--exercise",
                "Bench Press",
                "--rest",
                "90",
                "--set",
                "135x10",
                "--set",
                "12",
            ]);
            match cli.command {
                Some(Commands::Start(args)) => {
                    assert_eq!(args.exercise, "Bench Press");
                    assert_eq!(args.rest, 90);
                    assert_eq!(
                        args.sets,
                        vec![SetEntry::weighted(135.0, 10), SetEntry::bodyweight(12)]
                    );
                    assert!(!args.no_audio);
                    assert!(!args.no_wake_lock);
                }
                _ => panic!("Expected Start command"),
            }
        }

        #[test]
        fn test_parse_negative_rest() {
            let cli = Cli::parse_from(["rest-timer", "start", "-e", "Row", "-r", "-5"]);
            match cli.command {
                Some(Commands::Start(args)) => {
                    assert_eq!(args.rest, -5);
                    assert_eq!(args.to_request().total_seconds(), 0);
                }
                _ => panic!("Expected Start command"),
            }
        }

        #[test]
        fn test_start_requires_exercise() {
            let result = Cli::try_parse_from(["rest-timer", "start", "--rest", "60"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_completions_command() {
            let cli = Cli::parse_from(["rest-timer", "completions", "zsh"]);
            assert!(matches!(cli.command, Some(Commands::Completions { .. })));
        }
    }

    // ------------------------------------------------------------------------
    // Validation Tests
    // ------------------------------------------------------------------------

    mod validation_tests {
        use super::*;

        #[test]
        fn test_exercise_name_trimmed() {
            assert_eq!(validate_exercise_name("  Squat ").unwrap(), "Squat");
        }

        #[test]
        fn test_exercise_name_blank() {
            assert!(validate_exercise_name("   ").is_err());
        }

        #[test]
        fn test_exercise_name_too_long() {
            assert!(validate_exercise_name(&"a".repeat(101)).is_err());
            assert!(validate_exercise_name(&"a".repeat(100)).is_ok());
        }

        #[test]
        fn test_parse_set_forms() {
            assert_eq!(parse_set("135x10").unwrap(), SetEntry::weighted(135.0, 10));
            assert_eq!(parse_set("47.5X8").unwrap(), SetEntry::weighted(47.5, 8));
            assert_eq!(parse_set("225×5").unwrap(), SetEntry::weighted(225.0, 5));
            assert_eq!(parse_set("12").unwrap(), SetEntry::bodyweight(12));
        }

        #[test]
        fn test_parse_set_rejects_garbage() {
            assert!(parse_set("heavy").is_err());
            assert!(parse_set("135x").is_err());
            assert!(parse_set("-5x10").is_err());
            assert!(parse_set("x10").is_err());
        }
    }
}
