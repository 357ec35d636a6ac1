use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant as HostInstant};

use gait_core::driver::{PlanStepper, SignalSink};
use gait_core::keys::KeySet;
use gait_core::queue::{CommandQueue, QueueError};
use gait_core::repl::commands::{CommandError, CommandExecutor, CommandOutcome, HoldAck};
use gait_core::repl::completion::{CompletionEngine, Replacement};
use gait_core::repl::grammar::StepCommand;
use gait_core::repl::status::{QueueSnapshot, StatusFormatter};
use gait_core::telemetry::TelemetryRecorder;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "hold",
        "hold <keys> <steps>             - append a key hold (keys: q/w/o/p letters or `none`)",
    ),
    (
        "step",
        "step [all|count=<n>]            - drive the stepping loop forward",
    ),
    (
        "plan",
        "plan show|consolidate|reset|clear - inspect or rework the authored plan",
    ),
    (
        "status",
        "status                          - display queue and rig state",
    ),
    (
        "help",
        "help [topic]                    - show help for a command",
    ),
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranscriptProfile {
    Stride,
    Consolidate,
    Replay,
}

impl TranscriptProfile {
    pub fn log_path(self) -> &'static str {
        match self {
            TranscriptProfile::Stride => "transcripts/emulator-stride.log",
            TranscriptProfile::Consolidate => "transcripts/emulator-consolidate.log",
            TranscriptProfile::Replay => "transcripts/emulator-replay.log",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            TranscriptProfile::Stride => "Gait Controller Emulator stride transcript",
            TranscriptProfile::Consolidate => "Gait Controller Emulator consolidation transcript",
            TranscriptProfile::Replay => "Gait Controller Emulator replay transcript",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, String> {
        if tag.eq_ignore_ascii_case("stride") {
            Ok(Self::Stride)
        } else if tag.eq_ignore_ascii_case("consolidate") {
            Ok(Self::Consolidate)
        } else if tag.eq_ignore_ascii_case("replay") {
            Ok(Self::Replay)
        } else {
            Err(format!("Unknown transcript profile `{tag}`"))
        }
    }
}

#[derive(Debug)]
pub enum CompletionResponse {
    NoMatches,
    Applied { replacement: Replacement },
    Suggestions { options: Vec<&'static str> },
}

/// Stand-in for the physics integrator: tracks what the rig would be holding.
#[derive(Debug, Default)]
struct TraceRig {
    held: KeySet,
    transitions: u64,
}

impl SignalSink for TraceRig {
    fn apply(&mut self, keys: KeySet) {
        if keys != self.held {
            self.transitions += 1;
        }
        self.held = keys;
    }
}

pub struct Session {
    executor: CommandExecutor<CommandQueue>,
    stepper: PlanStepper,
    telemetry: TelemetryRecorder,
    rig: TraceRig,
    transcript: TranscriptLogger,
    started_at: HostInstant,
    command_count: usize,
    completion: CompletionEngine,
}

impl Session {
    pub fn new(profile: TranscriptProfile) -> io::Result<Self> {
        let transcript = TranscriptLogger::new(profile)?;
        let executor = CommandExecutor::new(CommandQueue::new());

        Ok(Self {
            executor,
            stepper: PlanStepper::new(),
            telemetry: TelemetryRecorder::new(),
            rig: TraceRig::default(),
            transcript,
            started_at: HostInstant::now(),
            command_count: 0,
            completion: CompletionEngine::new(),
        })
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let elapsed = self.started_at.elapsed();
        self.transcript
            .append_line(elapsed, TranscriptRole::Host, trimmed)?;
        self.command_count += 1;

        let total_before = self.executor.store().total_planned_steps();
        let lines = match self.executor.execute(trimmed) {
            Ok(CommandOutcome::Hold(ack)) => self.handle_hold_ack(&ack),
            Ok(CommandOutcome::Step(request)) => self.handle_step(request),
            Ok(CommandOutcome::Consolidate(ack)) => {
                self.stepper.rewind();
                vec![
                    format!(
                        "OK plan consolidate holds {} -> {}",
                        ack.holds_before, ack.holds_after
                    ),
                    "execution restarted from the top of the plan".to_string(),
                ]
            }
            Ok(CommandOutcome::Reset(ack)) => {
                self.stepper.rewind();
                self.rig.release_all();
                vec![format!(
                    "OK plan reset holds={} progress cleared",
                    ack.holds
                )]
            }
            Ok(CommandOutcome::Clear(ack)) => {
                self.telemetry.record_plan_cleared(
                    ack.holds,
                    total_before,
                    self.stepper.step_count(),
                );
                self.stepper.rewind();
                self.rig.release_all();
                vec![format!("OK plan clear discarded={}", ack.holds)]
            }
            Ok(CommandOutcome::Show) => self.handle_show(),
            Ok(CommandOutcome::Status) => self.handle_status(),
            Ok(CommandOutcome::Help(topic)) => self.handle_help(topic),
            Err(CommandError::Parse(err)) => vec![format!("ERR syntax {err}")],
            Err(CommandError::Plan(err)) => vec![format!("ERR plan {err}")],
        };

        self.record_output(elapsed, &lines)?;
        Ok(lines)
    }

    pub fn handle_completion(
        &mut self,
        buffer: &str,
        cursor: usize,
    ) -> io::Result<CompletionResponse> {
        let length = buffer.len();
        let cursor = cursor.min(length);
        let (prefix, suffix) = buffer.split_at(cursor);
        let elapsed = self.started_at.elapsed();
        self.transcript
            .log_completion_request(elapsed, prefix, suffix, cursor)?;

        let result = self.completion.complete(buffer, cursor);
        if result.options.is_empty() {
            self.transcript.log_completion_none(elapsed)?;
            return Ok(CompletionResponse::NoMatches);
        }

        let options: Vec<&'static str> = result.options.iter().copied().collect();
        if options.len() == 1 {
            let candidate = options[0];
            if let Some(replacement) = result.replacement {
                let replacement_log = replacement.clone();
                self.transcript
                    .log_completion_applied(elapsed, candidate, Some(replacement_log))?;
                return Ok(CompletionResponse::Applied { replacement });
            }
            self.transcript
                .log_completion_applied(elapsed, candidate, None)?;
            return Ok(CompletionResponse::NoMatches);
        }

        self.transcript.log_completion_options(elapsed, &options)?;
        Ok(CompletionResponse::Suggestions { options })
    }

    fn handle_hold_ack(&mut self, ack: &HoldAck) -> Vec<String> {
        if ack.queued {
            let total_steps = self.executor.store().total_planned_steps();
            self.telemetry
                .record_plan_queued(ack.plan_len, total_steps, self.stepper.step_count());
            vec![format!(
                "OK hold {} queued plan-holds={} total-steps={}",
                ack.hold, ack.plan_len, total_steps
            )]
        } else {
            vec![format!("OK hold {} skipped (zero duration)", ack.hold)]
        }
    }

    fn handle_step(&mut self, request: StepCommand) -> Vec<String> {
        let mut lines = Vec::new();

        match request {
            StepCommand::All => {
                let served =
                    self.stepper
                        .drain(self.executor.store_mut(), &mut self.rig, &mut self.telemetry);
                if served == 0 {
                    lines.push("ERR step nothing queued to serve".to_string());
                } else {
                    lines.push(format!("OK step all served={served}"));
                    lines.push("plan exhausted; rig released".to_string());
                }
            }
            StepCommand::Once | StepCommand::Count(_) => {
                let requested = match request {
                    StepCommand::Once => 1,
                    StepCommand::Count(count) => u64::from(count),
                    StepCommand::All => unreachable!("handled above"),
                };

                let mut served = 0;
                while served < requested {
                    match self.stepper.advance(
                        self.executor.store_mut(),
                        &mut self.rig,
                        &mut self.telemetry,
                    ) {
                        Ok(keys) => {
                            served += 1;
                            lines.push(format!(
                                "t={:>4} {}",
                                self.stepper.step_count() - 1,
                                keys
                            ));
                        }
                        Err(QueueError::Empty) => {
                            lines.push(format!(
                                "plan exhausted after {served} of {requested} steps"
                            ));
                            break;
                        }
                    }
                }

                if served == requested {
                    lines.push(format!("OK step served={served}"));
                }
            }
        }

        lines
    }

    fn handle_show(&self) -> Vec<String> {
        let queue = self.executor.store();
        if queue.history().is_empty() {
            return vec!["plan empty".to_string()];
        }

        let snapshot = QueueSnapshot::of_queue(queue);
        let mut lines = vec![format!(
            "plan holds={} total-steps={}",
            snapshot.plan_holds, snapshot.total_steps
        )];

        for (index, hold) in queue.history().iter().enumerate() {
            let marker = match snapshot.current_index {
                Some(current) if index < current => "done",
                Some(current) if index == current => {
                    if snapshot.empty {
                        "done"
                    } else {
                        "active"
                    }
                }
                _ => "pending",
            };
            lines.push(format!("  {index}. {hold} [{marker}]"));
        }

        lines
    }

    fn handle_status(&self) -> Vec<String> {
        let snapshot = QueueSnapshot::of_queue(self.executor.store());
        let formatter = StatusFormatter::new(&snapshot);

        let mut plan_line = String::new();
        formatter
            .write_plan_line(&mut plan_line)
            .expect("writing to a String cannot fail");
        let mut hold_line = String::new();
        formatter
            .write_hold_line(&mut hold_line)
            .expect("writing to a String cannot fail");

        let telemetry_line = match self.telemetry.latest() {
            Some(record) => format!(
                "telemetry events={} last={}",
                self.telemetry.len(),
                record.event
            ),
            None => format!("telemetry events={} last=n/a", self.telemetry.len()),
        };

        vec![
            plan_line,
            hold_line,
            format!(
                "rig held={} transitions={} steps-driven={}",
                self.rig.held,
                self.rig.transitions,
                self.stepper.step_count()
            ),
            telemetry_line,
        ]
    }

    fn handle_help(&self, topic: Option<&str>) -> Vec<String> {
        let mut lines = Vec::new();
        match topic {
            Some(target) if !target.is_empty() => {
                if let Some((_, detail)) = HELP_TOPICS
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(target))
                {
                    lines.push((*detail).to_string());
                } else {
                    lines.push(format!("No help available for `{target}`."));
                    lines.push(format!("Available topics: {}", help_topic_list()));
                }
            }
            _ => {
                lines.push("Available commands:".to_string());
                for (_, detail) in HELP_TOPICS {
                    lines.push(format!("  {detail}"));
                }
                lines.push("Type `help <topic>` for a specific command.".to_string());
            }
        }

        lines
    }

    fn record_output(&mut self, elapsed: Duration, lines: &[String]) -> io::Result<()> {
        for line in lines {
            self.transcript
                .append_line(elapsed, TranscriptRole::Emulator, line)?;
        }
        Ok(())
    }
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(profile: TranscriptProfile) -> io::Result<Self> {
        let path = Path::new(profile.log_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header(profile)?;
        Ok(logger)
    }

    fn write_header(&mut self, profile: TranscriptProfile) -> io::Result<()> {
        writeln!(self.writer, "# {}", profile.header())?;
        writeln!(
            self.writer,
            "# Timestamps are milliseconds since session start"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(
        &mut self,
        elapsed: Duration,
        role: TranscriptRole,
        line: &str,
    ) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }

    fn log_completion_request(
        &mut self,
        elapsed: Duration,
        prefix: &str,
        suffix: &str,
        cursor: usize,
    ) -> io::Result<()> {
        let message = format!("[TAB] prefix={prefix:?} suffix={suffix:?} cursor={cursor}");
        self.append_line(elapsed, TranscriptRole::Host, &message)
    }

    fn log_completion_none(&mut self, elapsed: Duration) -> io::Result<()> {
        self.append_line(elapsed, TranscriptRole::Emulator, "completion: no matches")
    }

    fn log_completion_applied(
        &mut self,
        elapsed: Duration,
        candidate: &str,
        replacement: Option<Replacement>,
    ) -> io::Result<()> {
        let message = match replacement {
            Some(rep) => format!(
                "completion applied: {candidate} (range={}..{})",
                rep.start, rep.end
            ),
            None => format!("completion candidate: {candidate} (no replacement applied)"),
        };
        self.append_line(elapsed, TranscriptRole::Emulator, &message)
    }

    fn log_completion_options(
        &mut self,
        elapsed: Duration,
        options: &[&'static str],
    ) -> io::Result<()> {
        let summary = format!("completion options ({})", options.len());
        self.append_line(elapsed, TranscriptRole::Emulator, &summary)?;
        for option in options {
            let line = format!("  {option}");
            self.append_line(elapsed, TranscriptRole::Emulator, &line)?;
        }
        Ok(())
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}

fn help_topic_list() -> String {
    let mut buffer = String::new();
    for (index, (name, _)) in HELP_TOPICS.iter().enumerate() {
        if index > 0 {
            buffer.push_str(", ");
        }
        buffer.push_str(name);
    }
    buffer
}
