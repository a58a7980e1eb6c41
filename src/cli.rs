//! Command-line commands and interactive prompt

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use rustyline::DefaultEditor;
use std::time::Duration;
use tracing::warn;

use crate::client::{BottangoClient, Transport, WaitOutcome};
use crate::error::BottangoError;
use crate::types::PlaybackState;

/// Commands available both as subcommands and in the interactive prompt
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Check whether Bottango is ready to animate
    Status,
    /// List available animations in index order
    List,
    /// Show the selected animation
    Current,
    /// Show the playback state and effector readouts
    State,
    /// Select an animation by name and play it
    Play {
        /// Animation name
        name: String,
        /// Requested start offset in milliseconds
        #[arg(long, default_value_t = 0)]
        offset_ms: i64,
        /// Block until the animation has finished
        #[arg(long)]
        wait: bool,
        /// Give up waiting after this many seconds
        #[arg(long = "timeout-secs", value_parser = parse_timeout, requires = "wait")]
        timeout: Option<Duration>,
    },
    /// Pause playback
    Pause,
    /// Resume playback
    Resume,
    /// Emergency stop: turn master live off (re-enable it in Bottango)
    Stop,
    /// Block until the current animation has finished
    Wait {
        /// Give up after this many seconds
        #[arg(long = "timeout-secs", value_parser = parse_timeout)]
        timeout: Option<Duration>,
    },
    /// Start the interactive prompt
    Repl,
}

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq)]
pub enum ReplLine {
    Command(Command),
    Help,
    Exit,
    Empty,
}

/// Parse a timeout given in (fractional) seconds
pub fn parse_timeout(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got {}", value));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("timeout {} is out of range", value))
}

/// Parse a prompt line.
///
/// `play` takes the rest of the line as the animation name, so names may
/// contain spaces; a trailing `--wait` waits for the animation to finish.
pub fn parse_line(line: &str) -> Result<ReplLine> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" => return Ok(ReplLine::Empty),
        "help" | "?" => return Ok(ReplLine::Help),
        "exit" | "quit" => return Ok(ReplLine::Exit),
        "status" => Command::Status,
        "list" | "ls" => Command::List,
        "current" => Command::Current,
        "state" => Command::State,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "stop" => Command::Stop,
        "play" => {
            let (name, wait) = match rest.rsplit_once(char::is_whitespace) {
                Some((name, "--wait")) => (name.trim(), true),
                _ if rest == "--wait" => ("", true),
                _ => (rest, false),
            };
            if name.is_empty() {
                anyhow::bail!("usage: play <animation name> [--wait]");
            }
            Command::Play {
                name: name.to_string(),
                offset_ms: 0,
                wait,
                timeout: None,
            }
        }
        "wait" => {
            let timeout = if rest.is_empty() {
                None
            } else {
                Some(parse_timeout(rest).map_err(anyhow::Error::msg)?)
            };
            Command::Wait { timeout }
        }
        other => anyhow::bail!("unknown command '{}', type 'help' for a list", other),
    };

    Ok(ReplLine::Command(command))
}

/// Run one command, printing its result.
///
/// `default_timeout` applies to waits that do not name their own.
pub fn execute<T: Transport>(
    client: &BottangoClient<T>,
    command: &Command,
    default_timeout: Option<Duration>,
) -> std::result::Result<(), BottangoError> {
    match command {
        Command::Status => {
            if client.can_animate()? {
                println!("{}", "✅ Bottango is ready to animate".green());
            } else {
                println!("{}", "❌ Bottango is not ready to animate".red());
            }
        }
        Command::List => {
            let animations = client.refresh_animation_list()?;
            if animations.is_empty() {
                println!("{}", "No animations".yellow());
            }
            for (index, name) in animations.iter().enumerate() {
                println!("  {:>3}  {}", index.to_string().cyan(), name);
            }
        }
        Command::Current => match client.get_current_animation()? {
            Some(name) => println!("{}", name.bright_white()),
            None => println!("{}", "(no animation selected)".yellow()),
        },
        Command::State => {
            let state = client.get_playback_state()?;
            println!("{}", format_state(&state));
        }
        Command::Play {
            name,
            offset_ms,
            wait,
            timeout,
        } => {
            client.play_animation(name, *offset_ms)?;
            println!("▶️  {}", name.green());
            if *wait {
                report_wait(client.wait_animation_done(timeout.or(default_timeout))?);
            }
        }
        Command::Pause => {
            client.pause_animation()?;
            println!("⏸️  Paused");
        }
        Command::Resume => {
            client.resume_animation()?;
            println!("▶️  Resumed");
        }
        Command::Stop => {
            client.emergency_stop()?;
            println!(
                "{}",
                "🛑 Emergency stop sent, re-enable live output in Bottango".red().bold()
            );
        }
        Command::Wait { timeout } => {
            report_wait(client.wait_animation_done(timeout.or(default_timeout))?);
        }
        // The prompt is started by the caller
        Command::Repl => {}
    }
    Ok(())
}

/// Run a command and apply the exit policy: a connection failure is
/// returned as an error, any other failure is reported and swallowed.
pub fn run_command<T: Transport>(
    client: &BottangoClient<T>,
    command: &Command,
    default_timeout: Option<Duration>,
) -> Result<()> {
    match execute(client, command, default_timeout) {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => {
            warn!("Command {:?} failed: {}", command, e);
            eprintln!("{} {}", "⚠️ ".yellow(), e);
            Ok(())
        }
    }
}

/// Interactive prompt; returns on `exit`, end of input, or a fatal error
pub fn run_repl<T: Transport>(
    client: &BottangoClient<T>,
    default_timeout: Option<Duration>,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("Type 'help' for commands, 'exit' to quit.");

    loop {
        let readline = rl.readline("bottango> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                match parse_line(&line) {
                    Ok(ReplLine::Exit) => break,
                    Ok(ReplLine::Empty) => {}
                    Ok(ReplLine::Help) => print_help(),
                    Ok(ReplLine::Command(Command::Repl)) => {}
                    Ok(ReplLine::Command(command)) => {
                        run_command(client, &command, default_timeout)?
                    }
                    Err(e) => eprintln!("{}", e.to_string().yellow()),
                }
            }
            Err(_) => break,
        }
    }

    Ok(())
}

fn report_wait(outcome: WaitOutcome) {
    match outcome {
        WaitOutcome::Finished(state) => println!(
            "{} '{}'",
            "✅ Finished".green(),
            state.selected_animation_name
        ),
        WaitOutcome::TimedOut(state) => println!(
            "{} waiting for '{}' ({} / {} ms)",
            "⏱️  Timed out".yellow(),
            state.selected_animation_name,
            state.playback_time_in_ms,
            state.duration_in_ms
        ),
    }
}

/// Multi-line summary of a playback state
pub fn format_state(state: &PlaybackState) -> String {
    let mut out = format!(
        "Animation: [{}] {}\nPlaying:   {}\nTime:      {} / {} ms ({:.0}%)\nEffectors: {}",
        state.selected_animation_index,
        state.selected_animation_name,
        if state.is_playing { "yes" } else { "no" },
        state.playback_time_in_ms,
        state.duration_in_ms,
        state.progress() * 100.0,
        state.effectors.len()
    );

    for effector in &state.effectors {
        let value = |v: Option<f64>| {
            v.map(|v| format!("{:.3}", v))
                .unwrap_or_else(|| "-".to_string())
        };
        out.push_str(&format!(
            "\n  {} ({}) via {}{}  movement={} signal={}",
            effector.name,
            effector.identifier,
            effector.driver_name,
            if effector.live && effector.driver_live { "" } else { " [not live]" },
            value(effector.movement),
            value(effector.signal)
        ));
    }

    out
}

fn print_help() {
    println!("\n{}", "Commands:".bold());
    for (usage, description) in [
        ("status", "check whether Bottango can animate"),
        ("list", "list animations"),
        ("current", "show the selected animation"),
        ("state", "show playback state and effectors"),
        ("play <name> [--wait]", "play an animation"),
        ("pause / resume", "pause or resume playback"),
        ("stop", "emergency stop"),
        ("wait [seconds]", "wait for the animation to finish"),
        ("exit", "quit"),
    ] {
        println!("  {:<22} {}", usage.yellow(), description);
    }
    println!();
}
