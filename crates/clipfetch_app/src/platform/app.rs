use std::fs;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clipfetch_core::{update, AppState, Msg, Platform};
use clipfetch_engine::{EngineConfig, SessionStore};
use clipfetch_logging::{clip_debug, clip_info};

use super::cli::Cli;
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::render::{notice_line, StatusPrinter};

const TICK: Duration = Duration::from_millis(75);

/// Everything the message loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum AppInput {
    Core(Msg),
    /// Ctrl-C.
    Interrupt,
    /// The user typed `quit`.
    Quit,
    /// Stdin reached end of input.
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    OneShot,
    Interactive,
}

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::initialize(LogDestination::from_flags(cli.log_file), cli.verbose);
    if let Ok(path) = dotenvy::dotenv() {
        clip_debug!("Loaded environment from {:?}", path);
    }

    let mut config = EngineConfig::from_env();
    if let Some(server) = cli.server.clone() {
        config = config.with_server_url(server);
    }
    if let Some(output) = cli.output.clone() {
        config.download_dir = output;
    }
    let cookies = match &cli.cookies_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read cookies file {}", path.display()))?,
        None => String::new(),
    };

    let session = SessionStore::new(config.state_dir.clone()).get_or_create();
    clip_info!(
        "Session {} server={} downloads={:?}",
        session,
        config.server_url,
        config.download_dir
    );

    let (input_tx, input_rx) = mpsc::channel();
    let runner =
        EffectRunner::new(&config, session, input_tx.clone()).context("failed to start engine")?;
    let mut controller = Controller::new(runner);
    controller.dispatch(Msg::PlatformSelected(cli.platform.into()));
    controller.dispatch(Msg::QualitySelected(cli.quality.clone()));
    controller.dispatch(Msg::CookiesChanged(cookies));

    let mode = match cli.url {
        Some(url) => {
            controller.dispatch(Msg::UrlChanged(url));
            controller.dispatch(Msg::StartClicked);
            Mode::OneShot
        }
        None => {
            println!("Enter a URL to download. Commands: platform <name>, quality <preset>, cancel, quit.");
            spawn_stdin_reader(input_tx);
            Mode::Interactive
        }
    };

    let code = controller.run(input_rx, mode);
    controller.shutdown();
    Ok(code)
}

struct Controller {
    state: AppState,
    runner: EffectRunner,
    printer: StatusPrinter,
    failed: bool,
}

impl Controller {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            printer: StatusPrinter::default(),
            failed: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        for notice in self.runner.run(effects) {
            self.failed |= notice.is_error();
            println!("{}", notice_line(&notice));
        }
        if self.state.consume_dirty() {
            if let Some(line) = self.printer.next_line(&self.state.view()) {
                println!("{line}");
            }
        }
    }

    /// Idle with no artifact still being written.
    fn settled(&self) -> bool {
        self.state.job_state().is_idle() && self.state.view().transfers_pending == 0
    }

    fn run(&mut self, input_rx: mpsc::Receiver<AppInput>, mode: Mode) -> ExitCode {
        let mut quitting = mode == Mode::OneShot;
        loop {
            if quitting && self.settled() {
                break;
            }
            match input_rx.recv_timeout(TICK) {
                Ok(AppInput::Core(msg)) => self.dispatch(msg),
                Ok(AppInput::Interrupt) => {
                    if self.state.job_state().is_idle() {
                        break;
                    }
                    self.failed |= mode == Mode::OneShot;
                    self.dispatch(Msg::CancelClicked);
                }
                Ok(AppInput::Quit) => {
                    quitting = true;
                    if !self.state.job_state().is_idle() {
                        self.dispatch(Msg::CancelClicked);
                    }
                }
                Ok(AppInput::InputClosed) => quitting = true,
                Err(RecvTimeoutError::Timeout) => self.dispatch(Msg::Tick),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if mode == Mode::OneShot && self.failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    fn shutdown(self) {
        self.runner.shutdown();
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            for input in parse_line(&line) {
                if input_tx.send(input).is_err() {
                    return;
                }
            }
        }
        let _ = input_tx.send(AppInput::InputClosed);
    });
}

/// One stdin line as loop inputs. Anything that is not a command is a URL.
fn parse_line(line: &str) -> Vec<AppInput> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    match (word.to_ascii_lowercase().as_str(), rest) {
        ("", _) => Vec::new(),
        ("quit" | "exit", "") => vec![AppInput::Quit],
        ("cancel", "") => vec![AppInput::Core(Msg::CancelClicked)],
        ("platform", name) if !name.is_empty() => {
            vec![AppInput::Core(Msg::PlatformSelected(Platform::parse(name)))]
        }
        ("quality", preset) if !preset.is_empty() => {
            vec![AppInput::Core(Msg::QualitySelected(preset.to_string()))]
        }
        _ => vec![
            AppInput::Core(Msg::UrlChanged(line.to_string())),
            AppInput::Core(Msg::StartClicked),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn url_lines_start_a_job() {
        assert_eq!(
            parse_line("  https://youtu.be/abc123 "),
            vec![
                AppInput::Core(Msg::UrlChanged("https://youtu.be/abc123".to_string())),
                AppInput::Core(Msg::StartClicked),
            ]
        );
    }

    #[test]
    fn commands_are_recognised() {
        assert_eq!(parse_line("quit"), vec![AppInput::Quit]);
        assert_eq!(parse_line("EXIT"), vec![AppInput::Quit]);
        assert_eq!(
            parse_line("cancel"),
            vec![AppInput::Core(Msg::CancelClicked)]
        );
        assert_eq!(
            parse_line("platform  Spotify"),
            vec![AppInput::Core(Msg::PlatformSelected(Platform::Spotify))]
        );
        assert_eq!(
            parse_line("quality 720p"),
            vec![AppInput::Core(Msg::QualitySelected("720p".to_string()))]
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert!(parse_line("").is_empty());
        assert!(parse_line("   ").is_empty());
    }

    #[test]
    fn incomplete_commands_fall_through_as_urls() {
        assert_eq!(
            parse_line("platform"),
            vec![
                AppInput::Core(Msg::UrlChanged("platform".to_string())),
                AppInput::Core(Msg::StartClicked),
            ]
        );
    }
}
