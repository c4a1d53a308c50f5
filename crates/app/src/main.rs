use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use challenge_core::model::{Question, StreakState};
use services::{
    AppServices, ChallengeCatalog, ChallengeError, Clock, DailyChallenge, DailyChallengeService,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "app=info,services=info,storage=warn";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play   [--db <sqlite_url>] [--questions <file.toml>]");
    eprintln!("  cargo run -p app -- streak [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:challenge.sqlite3");
    eprintln!("  --questions <built-in Dubai real estate challenge>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CHALLENGE_DB_URL, CHALLENGE_QUESTIONS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Streak,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "streak" => Some(Self::Streak),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    questions: Option<PathBuf>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("CHALLENGE_DB_URL")
            .ok()
            .map_or_else(
                || normalize_sqlite_url("challenge.sqlite3".into()),
                normalize_sqlite_url,
            );
        let mut questions = std::env::var("CHALLENGE_QUESTIONS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    questions = Some(PathBuf::from(require_value(args, "--questions")?));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, questions })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

//
// ─── TERMINAL VIEW ─────────────────────────────────────────────────────────────
//

/// Map a typed answer to an option index: a 1-based number or the option text.
fn parse_choice(input: &str, question: &Question) -> Option<usize> {
    let input = input.trim();
    if let Ok(number) = input.parse::<usize>() {
        return (1..=question.options().len())
            .contains(&number)
            .then(|| number - 1);
    }
    question
        .options()
        .iter()
        .position(|option| option.eq_ignore_ascii_case(input))
}

fn streak_line(streak: StreakState) -> String {
    let days = streak.streak_count();
    let unit = if days == 1 { "day" } else { "days" };
    match streak.last_completion_date() {
        Some(date) => format!("Current streak: {days} {unit} (last completed {date})"),
        None => format!("Current streak: {days} {unit}"),
    }
}

/// Reads one line; `None` on end of input.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

async fn play(
    service: &DailyChallengeService,
    catalog: &ChallengeCatalog,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(out, "Daily Challenge")?;
    writeln!(out, "{}", streak_line(service.current_streak().await))?;
    writeln!(out)?;
    writeln!(out, "Topic: {}", catalog.intro().topic)?;
    writeln!(out, "Duration: {}", catalog.intro().duration)?;
    write!(out, "Press Enter to start...")?;
    out.flush()?;
    if read_line(input)?.is_none() {
        return Ok(());
    }

    let mut challenge = service.start(catalog.questions().to_vec()).await?;
    loop {
        if !run_questions(service, &mut challenge, input, out).await? {
            return Ok(());
        }
        show_results(&challenge, out)?;

        write!(out, "Retry? [y/N] ")?;
        out.flush()?;
        match read_line(input)? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                service.reset(&mut challenge);
            }
            _ => return Ok(()),
        }
    }
}

/// Returns `false` if input ended before the run completed.
async fn run_questions(
    service: &DailyChallengeService,
    challenge: &mut DailyChallenge,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, Box<dyn std::error::Error>> {
    while let Some(question) = challenge.session().current_question().cloned() {
        let progress = challenge.session().progress();
        writeln!(out)?;
        writeln!(out, "Question {} of {}", progress.current, progress.total)?;
        writeln!(out, "{}", question.prompt())?;
        for (index, option) in question.options().iter().enumerate() {
            writeln!(out, "  {}. {option}", index + 1)?;
        }

        let choice = loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                return Ok(false);
            };
            match parse_choice(&line, &question) {
                Some(choice) => break choice,
                None => writeln!(out, "Pick a number between 1 and {}.", question.options().len())?,
            }
        };

        let selected = question.options()[choice].clone();
        match service.submit_answer(challenge, selected).await {
            Ok(_) => {}
            Err(ChallengeError::Storage(err)) => {
                tracing::error!(error = %err, "could not save streak, retrying once");
                if let Err(err) = service.finalize_streak(challenge).await {
                    tracing::error!(error = %err, "streak not saved");
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(true)
}

fn show_results(challenge: &DailyChallenge, out: &mut impl Write) -> io::Result<()> {
    let results = challenge.session().results();
    writeln!(out)?;
    writeln!(
        out,
        "You scored {} out of {} ({}%)",
        results.score,
        results.total,
        results.percentage()
    )?;
    for (index, review) in results.reviews.iter().enumerate() {
        let mark = if review.is_correct { "correct" } else { "wrong" };
        writeln!(out, "  {}. {} [{mark}]", index + 1, review.prompt)?;
        writeln!(out, "     your answer: {}", review.selected)?;
        if !review.is_correct {
            writeln!(out, "     correct answer: {}", review.correct_option)?;
        }
    }
    writeln!(out, "{}", streak_line(challenge.streak()))?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog = match parsed.questions.as_deref() {
        Some(path) => ChallengeCatalog::load(path)?,
        None => ChallengeCatalog::builtin(),
    };

    prepare_sqlite_file(&parsed.db_url)?;
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::default_clock(), catalog).await?;
    tracing::debug!(db_url = %parsed.db_url, ?cmd, "services ready");

    let challenge = services.challenge();
    match cmd {
        Command::Play => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            play(
                &challenge,
                &services.catalog(),
                &mut stdin.lock(),
                &mut stdout.lock(),
            )
            .await
        }
        Command::Streak => {
            println!("{}", streak_line(challenge.current_streak().await));
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use challenge_core::time::fixed_now;
    use std::io::Cursor;

    fn question() -> Question {
        Question::new("Q", ["10%", "20%", "Downtown Dubai"], "20%").unwrap()
    }

    #[test]
    fn choice_accepts_number_or_text() {
        let q = question();
        assert_eq!(parse_choice("2\n", &q), Some(1));
        assert_eq!(parse_choice(" downtown dubai ", &q), Some(2));
        assert_eq!(parse_choice("0", &q), None);
        assert_eq!(parse_choice("4", &q), None);
        assert_eq!(parse_choice("maybe", &q), None);
    }

    #[test]
    fn streak_line_pluralizes() {
        assert_eq!(streak_line(StreakState::default()), "Current streak: 0 days");
        let date = fixed_now().date_naive();
        assert_eq!(
            streak_line(StreakState::new(1, Some(date))),
            "Current streak: 1 day (last completed 2023-11-14)"
        );
    }

    #[test]
    fn args_parse_flags() {
        let mut argv = ["--db", "sqlite::memory:", "--questions", "q.toml"]
            .into_iter()
            .map(String::from);
        let args = Args::parse(&mut argv).unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.questions, Some(PathBuf::from("q.toml")));

        let mut argv = ["--db"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut argv),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/challenge.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/challenge.sqlite3"));
    }

    #[tokio::test]
    async fn scripted_play_completes_and_retries() {
        let services =
            AppServices::in_memory(Clock::fixed(fixed_now()), ChallengeCatalog::builtin());
        let challenge = services.challenge();
        let mut input = Cursor::new("\n3\n2\n1\ny\n1\n1\n2\nn\n");
        let mut out = Vec::new();

        play(&challenge, &services.catalog(), &mut input, &mut out)
            .await
            .unwrap();

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("You scored 3 out of 3 (100%)"));
        assert!(transcript.contains("You scored 0 out of 3 (0%)"));
        assert!(transcript.contains("correct answer: Downtown Dubai"));
        assert_eq!(challenge.current_streak().await.streak_count(), 1);
    }
}
