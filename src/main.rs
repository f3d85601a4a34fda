use clap::Parser;
use data::{Records, Stamp};
use layout::StyleMap;
use read::{load_entries, load_expenses, load_incomes};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use write::{write_report, PdfCanvas};

mod compute;
mod data;
mod layout;
mod read;
mod write;

/// Renders the load, expense and income sheets of the working directory into a
/// one-page PDF report. Without arguments it reads `entry.csv`, `expense.csv`
/// and `income.csv` and writes `report.pdf`.
#[derive(Debug, Parser)]
#[command(name = "load-report", version)]
struct Config {
    #[arg(long, default_value = "entry.csv")]
    entries: PathBuf,

    #[arg(long, default_value = "expense.csv")]
    expenses: PathBuf,

    #[arg(long, default_value = "income.csv")]
    incomes: PathBuf,

    #[arg(long, default_value = "report.pdf")]
    output: PathBuf,

    /// Extra width in mm for a column, as HEADER=MM (repeatable)
    #[arg(long = "pad", value_name = "HEADER=MM", value_parser = parse_padding)]
    padding: Vec<(String, f32)>,

    #[arg(long, help = "Enable debug output")]
    verbose: bool,
}

fn parse_padding(arg: &str) -> Result<(String, f32), String> {
    let (header, extra) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected HEADER=MM, got {arg:?}"))?;
    let extra = extra
        .trim()
        .parse()
        .map_err(|e| format!("bad width {extra:?}: {e}"))?;
    Ok((header.to_owned(), extra))
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "load_report=debug"
    } else {
        "load_report=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn run(config: &Config) -> Result<(), anyhow::Error> {
    // everything is read before anything is drawn
    let records = Records {
        entries: load_entries(&config.entries)?,
        expenses: load_expenses(&config.expenses)?,
        incomes: load_incomes(&config.incomes)?,
    };
    let style = config
        .padding
        .iter()
        .fold(StyleMap::default(), |style, (header, extra)| {
            style.with_padding(header.as_str(), *extra)
        });
    let mut canvas = PdfCanvas::new("Report")?;
    write_report(&mut canvas, &style, &Stamp::now(), &records)?;
    canvas.save(&config.output)?;
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let config = Config::parse();
    init_logger(config.verbose);
    tracing::debug!("{config:?}");
    run(&config)
}

#[cfg(test)]
mod tests {
    use super::{parse_padding, run, Config};
    use clap::Parser;
    use std::fs;

    #[test]
    fn parses_padding() {
        assert_eq!(parse_padding("Notes=12.5"), Ok(("Notes".into(), 12.5)));
        assert_eq!(parse_padding("A=B=3"), Ok(("A=B".into(), 3.0)));
        assert!(parse_padding("Notes").is_err());
        assert!(parse_padding("Notes=wide").is_err());
    }

    #[test]
    fn defaults_to_fixed_names() {
        let config = Config::parse_from(["load-report"]);
        assert_eq!(config.entries.to_str(), Some("entry.csv"));
        assert_eq!(config.expenses.to_str(), Some("expense.csv"));
        assert_eq!(config.incomes.to_str(), Some("income.csv"));
        assert_eq!(config.output.to_str(), Some("report.pdf"));
        assert!(config.padding.is_empty());
    }

    fn config_in(dir: &std::path::Path) -> Config {
        let arg = |name: &str| dir.join(name).into_os_string();
        Config::parse_from([
            "load-report".into(),
            "--entries".into(),
            arg("entry.csv"),
            "--expenses".into(),
            arg("expense.csv"),
            "--incomes".into(),
            arg("income.csv"),
            "--output".into(),
            arg("report.pdf"),
            "--pad".into(),
            "Notes=30".into(),
        ])
    }

    #[test]
    fn end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("entry.csv"), "A,P,10,5,5,0,x\n").unwrap();
        fs::write(dir.path().join("expense.csv"), "").unwrap();
        fs::write(dir.path().join("income.csv"), "rent,100,march\n").unwrap();
        run(&config_in(dir.path())).unwrap();
        assert!(fs::read(dir.path().join("report.pdf"))
            .unwrap()
            .starts_with(b"%PDF"));
    }

    #[test]
    fn read_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("entry.csv"), "A,P,10,5,5,0,x\n").unwrap();
        fs::write(dir.path().join("expense.csv"), "diesel,100\n").unwrap();
        fs::write(dir.path().join("income.csv"), "").unwrap();
        assert!(run(&config_in(dir.path())).is_err());
        assert!(!dir.path().join("report.pdf").exists());
    }
}
