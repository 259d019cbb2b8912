//! Interactive terminal run of the strategy assistant.
//!
//! Drives the wizard engine against the offline playbook, so it works with
//! no oracle, no server, and no network. Rendering is a straight projection
//! of the wizard state: progress bar, the active question, or the result.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use compass_core::domain::strategy::{Recommendation, StrategyRequest};
use compass_core::playbook;
use compass_core::wizard::{
    Answer, QuestionStep, RenderMode, SelectionMode, StepOption, Wizard, WizardState,
};

/// Selection feedback pause, matching the site widget's highlight delay.
const SELECT_FEEDBACK_DELAY: Duration = Duration::from_millis(250);

const PLACEHOLDER: &str = "—";

pub fn run() -> ExitCode {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    match drive(&mut input, &mut output, SELECT_FEEDBACK_DELAY) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("assist failed: {error}");
            ExitCode::from(1)
        }
    }
}

fn drive(
    input: &mut impl BufRead,
    output: &mut impl Write,
    feedback_delay: Duration,
) -> io::Result<()> {
    let wizard = Wizard::default();
    let mut state = wizard.new_state();

    writeln!(output, "Compass strategy assistant (offline playbook mode)")?;
    writeln!(output, "Answer a few questions to get an automation strategy.\n")?;

    loop {
        // The loop only ever re-enters with a question active: loading and
        // result are handled inline on submit.
        let prompt_step = match wizard.render_mode(&state) {
            RenderMode::Question(step) => step.clone(),
            RenderMode::Loading | RenderMode::Result(_) => return Ok(()),
        };

        render_progress(output, wizard.progress_percent(&state))?;
        if let Some(message) = state.error() {
            writeln!(output, "! {message}")?;
        }
        render_question(output, &prompt_step, &state)?;

        let line = match read_trimmed(input)? {
            Some(line) => line,
            None => return Ok(()),
        };

        if line.eq_ignore_ascii_case("q") {
            writeln!(output, "Goodbye.")?;
            return Ok(());
        }

        match prompt_step.mode {
            SelectionMode::Single => {
                let Some(value) = option_value(&prompt_step.options, &line) else {
                    writeln!(output, "Pick a number between 1 and {}.\n", prompt_step.options.len())?;
                    continue;
                };
                if let Err(error) = wizard.select_single(&mut state, &prompt_step.id, &value) {
                    writeln!(output, "{error}\n")?;
                    continue;
                }
                thread::sleep(feedback_delay);
                writeln!(output)?;
            }
            SelectionMode::Multi => {
                if line.is_empty() {
                    let answers = match wizard.begin_submit(&mut state) {
                        Ok(answers) => answers,
                        Err(error) => {
                            writeln!(output, "{error}\n")?;
                            continue;
                        }
                    };

                    render_progress(output, wizard.progress_percent(&state))?;
                    writeln!(output, "Analyzing your answers...\n")?;

                    let request = StrategyRequest::from_answers(&answers);
                    let recommendation = playbook::recommend(&request);
                    if let Err(error) =
                        wizard.complete_submit(&mut state, recommendation.to_value())
                    {
                        writeln!(output, "{error}\n")?;
                        continue;
                    }

                    let again = render_result_and_ask_restart(input, output, &wizard, &state)?;
                    if !again {
                        return Ok(());
                    }
                    if let Err(error) = wizard.restart(&mut state) {
                        writeln!(output, "{error}\n")?;
                    }
                    writeln!(output)?;
                    continue;
                }

                let Some(value) = option_value(&prompt_step.options, &line) else {
                    writeln!(
                        output,
                        "Pick a number between 1 and {}, or press Enter to analyze.\n",
                        prompt_step.options.len()
                    )?;
                    continue;
                };
                if let Err(error) = wizard.toggle_multi(&mut state, &prompt_step.id, &value) {
                    writeln!(output, "{error}\n")?;
                }
                writeln!(output)?;
            }
        }
    }
}

fn render_progress(output: &mut impl Write, percent: u8) -> io::Result<()> {
    let filled = usize::from(percent) / 10;
    writeln!(output, "[{}{}] {percent}%", "#".repeat(filled), "-".repeat(10 - filled))
}

fn render_question(
    output: &mut impl Write,
    step: &QuestionStep,
    state: &WizardState,
) -> io::Result<()> {
    writeln!(output, "{}", step.prompt)?;
    for (index, option) in step.options.iter().enumerate() {
        let selected = match state.answer(&step.id) {
            Some(Answer::Single(value)) => *value == option.value,
            Some(Answer::Multi(values)) => values.contains(&option.value),
            None => false,
        };
        let marker = if selected { "*" } else { " " };
        writeln!(output, " {marker} {}) {}", index + 1, option.label)?;
    }

    match step.mode {
        SelectionMode::Single => write!(output, "Choose an option (q to quit): ")?,
        SelectionMode::Multi => {
            write!(output, "Toggle options, press Enter to analyze (q to quit): ")?
        }
    }
    output.flush()
}

fn render_result_and_ask_restart(
    input: &mut impl BufRead,
    output: &mut impl Write,
    wizard: &Wizard,
    state: &WizardState,
) -> io::Result<bool> {
    render_progress(output, wizard.progress_percent(state))?;

    let recommendation = match wizard.render_mode(state) {
        RenderMode::Result(value) => Recommendation::from_value(value),
        RenderMode::Loading | RenderMode::Question(_) => Recommendation::default(),
    };

    let dash = |field: &Option<String>| field.clone().unwrap_or_else(|| PLACEHOLDER.to_string());

    writeln!(output, "Recommended strategy\n")?;
    writeln!(output, "  Diagnosis:      {}", dash(&recommendation.diagnosis))?;
    writeln!(output, "  System:         {}", dash(&recommendation.system))?;
    writeln!(output, "  Hours saved/wk: {}", dash(&recommendation.hours_saved))?;
    writeln!(output, "  Timeline:       {}", dash(&recommendation.timeline))?;
    match &recommendation.plan {
        Some(plan) if !plan.is_empty() => {
            writeln!(output, "  Plan:")?;
            for (week, deliverable) in plan {
                writeln!(output, "    {week}: {deliverable}")?;
            }
        }
        _ => writeln!(output, "  Plan:           {PLACEHOLDER}")?,
    }
    writeln!(output, "  Next step:      {}\n", dash(&recommendation.next_step))?;

    write!(output, "Start over? (y/N): ")?;
    output.flush()?;

    match read_trimmed(input)? {
        Some(line) => Ok(line.eq_ignore_ascii_case("y")),
        None => Ok(false),
    }
}

fn option_value(options: &[StepOption], line: &str) -> Option<String> {
    let index = line.parse::<usize>().ok()?;
    options.get(index.checked_sub(1)?).map(|option| option.value.clone())
}

/// Returns `None` on EOF so a closed stdin ends the session cleanly.
fn read_trimmed(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut buffer = String::new();
    let read = input.read_line(&mut buffer)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buffer.trim().to_string()))
}
