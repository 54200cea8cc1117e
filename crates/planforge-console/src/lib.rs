//! Colorful console output for diversification runs.
//!
//! Provides a custom `tracing` layer that formats loop events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Run start/end and accepted plans
//! - **DEBUG**: Oracle calls and constraint growth
//! - **WARN**: Failed iterations, oracle timeouts and panics

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static RUN_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the PlanForge banner and sets up tracing. `RUST_LOG` overrides
/// the default `planforge_solver=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let mut filter = EnvFilter::builder().from_env_lossy();
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
            if let Ok(directive) = "planforge_solver=info".parse() {
                filter = filter.add_directive(directive);
            }
        }

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(PlanConsoleLayer)
            .try_init();
    });
}

// Marks the start of a run for elapsed time tracking.
fn mark_run_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    RUN_START_NANOS.store(nanos, Ordering::Relaxed);
}

// Returns elapsed time since run start.
fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = RUN_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
 ____  _             _____
|  _ \| | __ _ _ __ |  ___|__  _ __ __ _  ___
| |_) | |/ _` | '_ \| |_ / _ \| '__/ _` |/ _ \
|  __/| | (_| | | | |  _| (_) | | | (_| |  __/
|_|   |_|\__,_|_| |_|_|  \___/|_|  \__, |\___|
                                   |___/
"#;

    let version_line = format!(
        "              v{} - Behaviour-Diverse Planning\n",
        VERSION
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats diversification events with colors.
pub struct PlanConsoleLayer;

impl<S: Subscriber> Layer<S> for PlanConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();

        if !target.starts_with("planforge_solver") && !target.starts_with("planforge::") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    problem: Option<String>,
    oracle: Option<String>,
    status: Option<String>,
    signature: Option<String>,
    error: Option<String>,
    message: Option<String>,
    k: Option<String>,
    dimensions: Option<u64>,
    index: Option<u64>,
    iteration: Option<u64>,
    steps: Option<u64>,
    plans: Option<u64>,
    runs: Option<u64>,
    constraints: Option<u64>,
    forbidden: Option<u64>,
    oracle_calls: Option<u64>,
    oracle_ms: Option<u64>,
    timeout_ms: Option<u64>,
    duration_ms: Option<u64>,
}

impl EventVisitor {
    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "problem" => self.problem = Some(value),
            "oracle" => self.oracle = Some(value),
            "status" => self.status = Some(value),
            "signature" => self.signature = Some(value),
            "error" => self.error = Some(value),
            "message" => self.message = Some(value),
            "k" => self.k = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "dimensions" => self.dimensions = Some(value),
            "index" => self.index = Some(value),
            "iteration" => self.iteration = Some(value),
            "steps" => self.steps = Some(value),
            "plans" => self.plans = Some(value),
            "runs" => self.runs = Some(value),
            "constraints" => self.constraints = Some(value),
            "forbidden" => self.forbidden = Some(value),
            "oracle_calls" => self.oracle_calls = Some(value),
            "oracle_ms" => self.oracle_ms = Some(value),
            "timeout_ms" => self.timeout_ms = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field.name(), value.to_string());
    }
}

fn format_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "diversify_start" => format_run_start(v),
        "diversify_end" => format_run_end(v),
        "plan_found" => format_plan_found(v),
        "oracle_call" => format_oracle_call(v),
        "oracle_unsolvable" => format_unsolvable(v),
        "iteration_failed" => format_iteration_failed(v),
        "oracle_timeout" => format_oracle_timeout(v),
        "oracle_panic" => format_oracle_panic(v),
        "parallel_start" => format_parallel_start(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_run_start(v: &EventVisitor) -> String {
    mark_run_start();
    let problem = v.problem.as_deref().unwrap_or("problem");
    let oracle = v.oracle.as_deref().unwrap_or("oracle");
    let dimensions = v.dimensions.unwrap_or(0);
    let k = match v.k.as_deref() {
        Some(s) if s.starts_with("Some(") => s
            .trim_start_matches("Some(")
            .trim_end_matches(')')
            .to_string(),
        _ => "∞".to_string(),
    };

    format!(
        "{} {} Diversifying {} │ oracle {} │ {} dimensions │ k = {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        problem.white().bold(),
        oracle.bright_blue(),
        dimensions.to_formatted_string(&Locale::en).bright_yellow(),
        k.bright_yellow()
    )
}

fn format_run_end(v: &EventVisitor) -> String {
    let status = v.status.as_deref().unwrap_or("unknown");
    let plans = v.plans.unwrap_or(0);
    let calls = v.oracle_calls.unwrap_or(0);
    let duration = v.duration_ms.unwrap_or(0);

    let status_colored = match status {
        "limit_reached" | "exhausted" => status.bright_green().bold().to_string(),
        "cancelled" => status.yellow().bold().to_string(),
        _ => status.bright_red().bold().to_string(),
    };

    let mut output = format!(
        "{} {} Run complete │ {} │ {} plans │ {} oracle calls │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        status_colored,
        plans.to_formatted_string(&Locale::en).bright_yellow(),
        calls.to_formatted_string(&Locale::en).white(),
        format_duration_ms(duration).yellow()
    );

    // Summary box
    output.push_str("\n\n");
    output.push_str(&box_rule('╔', '╗'));
    output.push('\n');

    let headline = format!("{} DISTINCT PLANS", plans.to_formatted_string(&Locale::en));
    let inner_width: usize = 58;
    let total_pad = inner_width.saturating_sub(headline.chars().count());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        headline.bright_green().bold(),
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(&box_rule('╠', '╣'));
    output.push('\n');
    output.push_str(&format!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Stopped:",
        status,
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(&box_rule('╚', '╝'));
    output.push('\n');

    output
}

fn box_rule(left: char, right: char) -> String {
    format!("{}{}{}", left, "═".repeat(58), right)
        .bright_cyan()
        .to_string()
}

fn format_plan_found(v: &EventVisitor) -> String {
    let index = v.index.unwrap_or(0);
    let steps = v.steps.unwrap_or(0);
    let signature = v.signature.as_deref().unwrap_or("()");
    let oracle_ms = v.oracle_ms.unwrap_or(0);

    format!(
        "{} {} Plan {:>4} │ {:>6} steps │ {} │ {}",
        format_elapsed(),
        "✓".bright_green(),
        index.to_formatted_string(&Locale::en).bright_yellow(),
        steps.to_formatted_string(&Locale::en).white(),
        signature.bright_magenta().bold(),
        format_duration_ms(oracle_ms).yellow()
    )
}

fn format_oracle_call(v: &EventVisitor) -> String {
    format!(
        "{} {} Oracle call {:>4} │ {} constraints │ {} forbidden",
        format_elapsed(),
        "⚡".bright_cyan(),
        v.iteration.unwrap_or(0).to_formatted_string(&Locale::en).white(),
        v.constraints.unwrap_or(0).to_formatted_string(&Locale::en).bright_black(),
        v.forbidden.unwrap_or(0).to_formatted_string(&Locale::en).bright_black()
    )
}

fn format_unsolvable(v: &EventVisitor) -> String {
    format!(
        "{} {} Iteration {:>4} │ no plan with new behaviour",
        format_elapsed(),
        "◀".bright_blue(),
        v.iteration.unwrap_or(0).to_formatted_string(&Locale::en).white()
    )
}

fn format_iteration_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} Iteration {:>4} │ {}",
        format_elapsed(),
        "✗".bright_red(),
        v.iteration.unwrap_or(0).to_formatted_string(&Locale::en).white(),
        v.error.as_deref().unwrap_or("unknown error").bright_red()
    )
}

fn format_oracle_timeout(v: &EventVisitor) -> String {
    format!(
        "{} {} Oracle {} exceeded {}",
        format_elapsed(),
        "⏱".yellow(),
        v.oracle.as_deref().unwrap_or("oracle").bright_blue(),
        format_duration_ms(v.timeout_ms.unwrap_or(0)).yellow()
    )
}

fn format_oracle_panic(v: &EventVisitor) -> String {
    format!(
        "{} {} Oracle {} panicked: {}",
        format_elapsed(),
        "✗".bright_red(),
        v.oracle.as_deref().unwrap_or("oracle").bright_blue(),
        v.message.as_deref().unwrap_or("").bright_red()
    )
}

fn format_parallel_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} independent runs on {}",
        format_elapsed(),
        "▶".bright_green(),
        v.runs.unwrap_or(0).to_formatted_string(&Locale::en).bright_yellow(),
        v.problem.as_deref().unwrap_or("problem").white().bold()
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
