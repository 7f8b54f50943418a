//! Prompter application entry point.
//!
//! Orchestrates the complete flow:
//! script text → chunks → countdown → capture + alignment → review handoff
//!
//! The interactive loop is a rehearsal harness over the provider contracts:
//! stdin lines stand in for recognizer hypotheses, prefixed `:` lines are
//! operator commands, and the capture provider buffers in memory. Real
//! microphone and speech engines plug in through the same traits.

use crate::analyzer::Analysis;
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::output;
use crate::script::{Chunker, Script};
use crate::session::{
    DiscardReviewSink, FileReviewSink, MemoryCapture, MockRecognizer, RecognitionAlternative,
    RecognizerEvent, ReviewSink, SessionController, SessionPhase,
};
use crossbeam_channel::{bounded, select, tick, unbounded};
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Read script text from a file, or from stdin when no path is given.
pub fn read_script_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin().lock(), &mut text)?;
            Ok(text)
        }
    }
}

/// Produce an analysis for `text`: remote when configured, local otherwise.
///
/// The remote analyzer is only consulted when enabled and not bypassed;
/// any remote failure falls back to the local chunker.
pub async fn build_analysis(config: &Config, text: &str, no_analyze: bool) -> Result<Analysis> {
    let chunker = Chunker::with_config(config.chunker_config());

    #[cfg(feature = "analyzer")]
    if config.analyzer.enabled && !no_analyze {
        let analyzer = crate::analyzer::GeminiAnalyzer::new(
            config.analyzer.api_key.clone().unwrap_or_default(),
        )
        .with_model(config.analyzer.model.clone());
        return crate::analyzer::analyze_or_chunk(&analyzer, &chunker, text, &crate::error::LogReporter)
            .await;
    }

    #[cfg(not(feature = "analyzer"))]
    let _ = no_analyze;

    Ok(Analysis::from_script(chunker.chunk(text)?))
}

/// Operator input line, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputLine {
    Advance,
    TogglePause,
    Finish,
    Cancel,
    Hypothesis(String),
    Empty,
}

impl InputLine {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            ":n" | ":next" => Self::Advance,
            ":p" | ":pause" => Self::TogglePause,
            ":q" | ":done" => Self::Finish,
            ":x" | ":cancel" => Self::Cancel,
            text => Self::Hypothesis(text.to_string()),
        }
    }
}

/// Run one interactive prompter session to completion.
///
/// Blocks until the script is finished, the operator stops, or stdin closes.
pub fn run_session(config: &Config, script: Script, quiet: bool) -> Result<()> {
    let (capture_tx, capture_rx) = unbounded();
    let capture = MemoryCapture::new(capture_tx);

    let recognizer = MockRecognizer::new();
    let recognizer_active = recognizer.active_flag();

    let review: Box<dyn ReviewSink> = match &config.session.recording_path {
        Some(path) => Box::new(FileReviewSink::new(path).quiet(quiet)),
        None => Box::new(DiscardReviewSink),
    };

    let mut controller = SessionController::new(
        script,
        Box::new(recognizer),
        Box::new(capture),
        review,
    )
    .with_countdown_secs(config.session.countdown_secs)
    .with_tail_words(config.session.tail_phrase_words);

    if !quiet {
        eprintln!("Speak along, or type what was said and press enter.");
        eprintln!("Commands: :n next, :p pause/resume, :q finish, :x cancel");
    }

    // Stdin reader thread; the channel closing means stdin is gone.
    let (line_tx, line_rx) = bounded::<String>(defaults::EVENT_BUFFER);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    controller.begin()?;
    output::render_session(&controller);

    let ticker = tick(Duration::from_secs(1));
    let mut stdin_closed = false;

    while controller.phase() != SessionPhase::Completed {
        select! {
            recv(ticker) -> _ => {
                controller.tick()?;
            }
            recv(capture_rx) -> event => {
                if let Ok(event) = event {
                    controller.handle_capture_event(event)?;
                }
            }
            recv(line_rx) -> line => {
                match line {
                    Ok(line) => handle_input_line(
                        &mut controller,
                        InputLine::parse(&line),
                        recognizer_active.load(Ordering::SeqCst),
                    )?,
                    Err(_) => {
                        if !stdin_closed {
                            stdin_closed = true;
                            controller.finish();
                        }
                    }
                }
            }
        }
        output::render_session(&controller);
    }

    // Teardown queued the final artifact; hand it over before returning.
    while let Ok(event) = capture_rx.try_recv() {
        controller.handle_capture_event(event)?;
    }

    Ok(())
}

fn handle_input_line(
    controller: &mut SessionController,
    input: InputLine,
    recognizer_active: bool,
) -> Result<()> {
    match input {
        InputLine::Empty => Ok(()),
        InputLine::Advance => {
            controller.advance();
            Ok(())
        }
        InputLine::TogglePause => {
            if controller.is_paused() {
                controller.resume();
            } else {
                controller.pause();
            }
            Ok(())
        }
        InputLine::Finish => {
            controller.finish();
            Ok(())
        }
        InputLine::Cancel => {
            controller.cancel();
            Ok(())
        }
        InputLine::Hypothesis(text) => {
            // Hypotheses only flow while the recognizer is live, mirroring a
            // real engine that stops delivering results when stopped.
            if recognizer_active {
                controller.handle_recognizer_event(RecognizerEvent::Result {
                    result_index: 0,
                    results: vec![RecognitionAlternative {
                        transcript: text,
                        is_final: true,
                    }],
                })?;
            }
            Ok(())
        }
    }
}
