mod age;
mod app;
mod form;
mod svg;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use app::AppState;
use chrono::{Local, NaiveDate};
use clap::Parser;
use form::{Field, RawInput};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "agecalc")]
#[command(about = "Compute an age in years, months and days from a birth date")]
struct Cli {
    /// Birth day (submits once instead of prompting)
    #[arg(long)]
    day: Option<String>,

    /// Birth month
    #[arg(long)]
    month: Option<String>,

    /// Birth year
    #[arg(long)]
    year: Option<String>,

    /// Use this date as today (YYYY-MM-DD) instead of the local clock
    #[arg(long)]
    today: Option<String>,

    /// Highest year the form accepts
    #[arg(
        long,
        default_value_t = form::DEFAULT_MAX_YEAR,
        value_parser = clap::value_parser!(u32).range(1..=form::MAX_SUPPORTED_YEAR as i64)
    )]
    max_year: u32,

    /// Print the outcome of each submission as JSON
    #[arg(long)]
    json: bool,

    /// Write the result card to this SVG file after each submission
    #[arg(long)]
    svg: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "dark")]
    theme: svg::Theme,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn one_shot(&self) -> bool {
        self.day.is_some() || self.month.is_some() || self.year.is_some()
    }

    fn today(&self) -> Result<NaiveDate> {
        match &self.today {
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("--today expects YYYY-MM-DD, got {s:?}")),
            None => Ok(Local::now().date_naive()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut app = AppState::new(cli.max_year);
    let mut stdout = tokio::io::stdout();

    if cli.one_shot() {
        let valid = run_once(&cli, &mut app, &mut stdout).await?;
        return Ok(if valid {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let stdin = BufReader::new(tokio::io::stdin());
    run_interactive(&cli, &mut app, stdin, &mut stdout).await?;
    Ok(ExitCode::SUCCESS)
}

/// Submit the `--day/--month/--year` values once. Returns whether they were accepted.
async fn run_once<W>(cli: &Cli, app: &mut AppState, out: &mut W) -> Result<bool>
where
    W: AsyncWrite + Unpin,
{
    let input = RawInput::new(
        cli.day.clone().unwrap_or_default(),
        cli.month.clone().unwrap_or_default(),
        cli.year.clone().unwrap_or_default(),
    );
    app.submit(input, cli.today()?);
    show(cli, app, out).await?;
    Ok(app.is_valid())
}

/// Prompt for the three fields, submit, show, repeat until `q` or end of input.
async fn run_interactive<R, W>(cli: &Cli, app: &mut AppState, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    info!("form ready");
    out.write_all(app.render_text().as_bytes()).await?;

    loop {
        let mut values = Vec::with_capacity(Field::ALL.len());
        for rule in form::rules(cli.max_year) {
            match prompt(&mut lines, out, rule.label, rule.placeholder).await? {
                Some(v) => values.push(v),
                None => {
                    info!("session ended");
                    return Ok(());
                }
            }
        }

        let [day, month, year]: [String; 3] = values
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected three field values"))?;
        let today = cli.today()?;
        debug!(%today, "submitting");
        app.submit(RawInput::new(day, month, year), today);
        show(cli, app, out).await?;
    }
}

/// Reads one answer; `None` on end of input or `q`.
async fn prompt<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    label: &str,
    placeholder: &str,
) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    out.write_all(format!("{label} ({placeholder}): ").as_bytes())
        .await?;
    out.flush().await?;

    let line = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?;
    Ok(line
        .map(|l| l.trim_end_matches('\r').to_string())
        .filter(|l| l != "q"))
}

async fn show<W>(cli: &Cli, app: &AppState, out: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let view = if cli.json {
        format!("{}\n", serde_json::to_string(&app.outcome())?)
    } else {
        format!("\n{}", app.render_text())
    };
    out.write_all(view.as_bytes()).await?;
    out.flush().await?;

    if let Some(age) = app.result().filter(|_| app.is_valid()) {
        info!(age = %age.age_string(), "age computed");
    }

    if let Some(path) = &cli.svg {
        fs::write(path, svg::generate_svg(app, cli.theme))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "card written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(["agecalc", "--today", "2024-06-15"].iter().chain(args))
    }

    async fn session(cli: &Cli, input: &[u8]) -> (AppState, String) {
        let mut app = AppState::new(cli.max_year);
        let mut out = Vec::new();
        run_interactive(cli, &mut app, input, &mut out).await.unwrap();
        (app, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_prompt_strips_carriage_return() {
        let mut lines = (&b"12\r\n"[..]).lines();
        let mut out = Vec::new();
        let answer = prompt(&mut lines, &mut out, "Day", "DD").await.unwrap();
        assert_eq!(answer.as_deref(), Some("12"));
        assert_eq!(out, b"Day (DD): ");
    }

    #[tokio::test]
    async fn test_prompt_quit_and_end_of_input() {
        let mut lines = (&b"q\n"[..]).lines();
        let mut out = Vec::new();
        assert_eq!(prompt(&mut lines, &mut out, "Day", "DD").await.unwrap(), None);
        assert_eq!(prompt(&mut lines, &mut out, "Day", "DD").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_submits_then_quits() {
        let cli = cli(&[]);
        let (app, out) = session(&cli, b"1\r\n1\r\n2000\r\nq\n").await;
        assert!(app.is_valid());
        assert!(out.contains("Year (YYYY): "));
        assert!(out.contains("24 years\n5 months\n14 days"));
        assert!(out.ends_with("Day (DD): "));
    }

    #[tokio::test]
    async fn test_quit_mid_form_does_not_submit() {
        let cli = cli(&[]);
        let (app, out) = session(&cli, b"1\nq\n2000\n").await;
        assert!(app.result().is_none());
        assert!(app.errors().is_empty());
        assert!(out.ends_with("Month (MM): "));
        assert!(!out.contains("Year (YYYY)"));
    }

    #[tokio::test]
    async fn test_empty_input_ends_session() {
        let cli = cli(&[]);
        let (app, out) = session(&cli, b"").await;
        assert!(app.result().is_none());
        assert!(out.contains("-- years"));
        assert!(out.ends_with("Day (DD): "));
    }

    #[tokio::test]
    async fn test_empty_line_is_submitted_as_empty_field() {
        let cli = cli(&["--json"]);
        let (app, out) = session(&cli, b"\n1\n2000\n").await;
        assert_eq!(app.errors()[&Field::Day].message, form::REQUIRED_MESSAGE);
        assert!(out.contains(r#""kind":"Required""#));
    }

    #[tokio::test]
    async fn test_one_shot_reports_validity() {
        let good = cli(&["--day", "1", "--month", "1", "--year", "2000", "--json"]);
        let mut app = AppState::new(good.max_year);
        let mut out = Vec::new();
        assert!(run_once(&good, &mut app, &mut out).await.unwrap());
        assert!(String::from_utf8(out).unwrap().contains(r#""years":24"#));

        let bad = cli(&["--day", "31", "--month", "2", "--year", "2020"]);
        let mut app = AppState::new(bad.max_year);
        let mut out = Vec::new();
        assert!(!run_once(&bad, &mut app, &mut out).await.unwrap());
        assert!(String::from_utf8(out).unwrap().contains("! Must be a valid date"));
    }

    #[test]
    fn test_max_year_limited_to_buildable_dates() {
        assert_eq!(cli(&["--max-year", "262142"]).max_year, 262_142);
        let err = Cli::try_parse_from(["agecalc", "--max-year", "3000000000"]);
        assert!(err.is_err());
        assert!(Cli::try_parse_from(["agecalc", "--max-year", "0"]).is_err());
    }

    #[test]
    fn test_bad_today_is_an_error() {
        let cli = Cli::parse_from(["agecalc", "--today", "15/06/2024"]);
        assert!(cli.today().is_err());
    }
}
