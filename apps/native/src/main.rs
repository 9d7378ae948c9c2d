//! Terminal front-end for the serial monitor core
//!
//! Reads from stdin or a file (e.g. `/dev/ttyUSB0` after `stty -F ... raw 115200`)
//! or runs the demo feed, and prints what the monitor publishes.

use actor_protocol::{DisplayDelta, ReceivedRecord, Settings, SystemEvent, UiCommand};
use actor_runtime::{spawn_actor, ChannelManager};
use clap::{Parser, ValueEnum};
use connection_actors::{DisplayMode, MonitorActor, MonitorConfig, RecordOrder};
use core_types::SerialConfig;
use decoders::DecodeMode;
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncRead;
use transport_native::{StreamHost, TerminalBell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// Raw concatenated text
    Stream,
    /// One timestamped line per received chunk
    Records,
}

#[derive(Debug, Parser)]
#[command(name = "serial-monitor", version, about = "Watch text arriving from a serial device")]
struct Cli {
    /// Read from this file or device instead of stdin
    #[arg(long, conflicts_with = "demo")]
    file: Option<PathBuf>,

    /// Print simulated sensor readings instead of reading a device
    #[arg(long)]
    demo: bool,

    /// Baud rate recorded for the session (any positive integer)
    #[arg(long, default_value = "9600")]
    baud: String,

    /// Do not ring the terminal bell on received text
    #[arg(long)]
    no_sound: bool,

    #[arg(long, value_enum, default_value_t = Layout::Stream)]
    layout: Layout,

    /// Stop on malformed UTF-8 instead of substituting U+FFFD
    #[arg(long)]
    strict: bool,
}

impl Cli {
    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            display_mode: match self.layout {
                Layout::Stream => DisplayMode::Stream,
                // A terminal only appends, so log order is the only sensible one
                Layout::Records => DisplayMode::Records(RecordOrder::OldestFirst),
            },
            decode_mode: if self.strict {
                DecodeMode::Strict
            } else {
                DecodeMode::Lossy
            },
            ..MonitorConfig::default()
        }
    }

    fn settings(&self) -> Settings {
        Settings {
            baud_rate: self.baud.clone(),
            sound_enabled: !self.no_sound,
            auto_scroll: true,
        }
    }
}

/// `HH:MM:SS.mmm` (UTC) for a microsecond epoch timestamp
fn time_of_day(received_at_us: u64) -> String {
    let ms = received_at_us / 1_000;
    let secs = ms / 1_000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        (secs / 3_600) % 24,
        (secs / 60) % 60,
        secs % 60,
        ms % 1_000
    )
}

fn format_record(record: &ReceivedRecord) -> String {
    format!("[{}] {}", time_of_day(record.received_at_us), record.text)
}

/// Exit status once the monitor is done
#[derive(Debug, Default)]
struct Outcome {
    failed: bool,
}

impl Outcome {
    fn exit_code(&self) -> ExitCode {
        if self.failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

async fn run<R: AsyncRead + Unpin + 'static>(cli: Cli, reader: R, label: String) -> Outcome {
    let (mut manager, handles) = ChannelManager::new();
    let mut events = manager.take_event_receiver();

    let monitor = MonitorActor::new(
        StreamHost::new(reader, label),
        TerminalBell,
        cli.monitor_config(),
        handles.event_tx.clone(),
        manager.state_sender(),
    )
    .with_settings(cli.settings());
    spawn_actor(monitor, handles.state_rx, handles.event_tx);

    let start = if cli.demo {
        UiCommand::StartDemo
    } else {
        UiCommand::Connect
    };
    let mut outcome = Outcome::default();
    if let Err(e) = manager.send_command(start) {
        eprintln!("{}", e.user_message());
        outcome.failed = true;
        return outcome;
    }

    let mut stdout = std::io::stdout();
    let mut started = false;
    let mut interrupted = false;

    loop {
        let event = tokio::select! {
            event = events.next() => event,
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                let _ = manager.send_command(UiCommand::Shutdown);
                continue;
            }
        };
        // Stream ends once the monitor has shut down
        let Some(event) = event else { break };

        match event {
            SystemEvent::StateChanged { state } => {
                eprintln!("-- {}", state.status_text());
                if state.has_session() || state.is_receiving() {
                    started = true;
                } else if started {
                    // Session over (end of stream, error or interrupt)
                    let _ = manager.send_command(UiCommand::Shutdown);
                }
            }
            SystemEvent::DisplayChanged { delta, .. } => {
                let written = match delta {
                    DisplayDelta::TextAppended { text } => write!(stdout, "{}", text),
                    DisplayDelta::Appended(record) => writeln!(stdout, "{}", format_record(&record)),
                    DisplayDelta::Cleared => Ok(()),
                };
                if written.and_then(|()| stdout.flush()).is_err() {
                    // Downstream pipe closed
                    let _ = manager.send_command(UiCommand::Shutdown);
                }
            }
            SystemEvent::StatusUpdate { message } => eprintln!("-- {}", message),
            SystemEvent::Error { error } => {
                eprintln!("error: {}", error.user_message());
                outcome.failed = true;
                if !started {
                    let _ = manager.send_command(UiCommand::Shutdown);
                }
            }
            SystemEvent::ErrorCleared | SystemEvent::SettingsChanged { .. } => {}
        }
    }

    outcome
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = SerialConfig::from_baud_input(&cli.baud) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: cannot start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let local = tokio::task::LocalSet::new();

    let outcome = local.block_on(&runtime, async move {
        match cli.file.clone() {
            Some(path) => match tokio::fs::File::open(&path).await {
                Ok(file) => {
                    let label = path.display().to_string();
                    run(cli, file, label).await
                }
                Err(e) => {
                    eprintln!("error: cannot open {}: {}", path.display(), e);
                    Outcome { failed: true }
                }
            },
            None => run(cli, tokio::io::stdin(), "stdin".to_string()).await,
        }
    });

    // A pending stdin read sits on a blocking thread; don't wait for it
    runtime.shutdown_background();
    outcome.exit_code()
}
