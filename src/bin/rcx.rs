use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rcx_rs::session::{Notifier, Session};
use rcx_rs::stats::{self, ColumnSummary, format_number};
use rcx_rs::viz::{self, ChartKind, ChartSpec};
use rcx_rs::{Client, FetchConfig, Field, SortOrder, Source, Table, storage};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "rcx",
    version,
    about = "Fetch, explore, chart & export REST Countries data"
)]
struct Cli {
    #[command(flatten)]
    fetch: FetchArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Which endpoint to read the dataset from.
    #[arg(long, value_enum, default_value_t = SourceArg::Mirror, global = true)]
    source: SourceArg,
    /// Custom endpoint URL (overrides --source).
    #[arg(long, global = true)]
    url: Option<String>,
    /// Extra attempts on transient failures (0-5).
    #[arg(long, default_value_t = 3, global = true)]
    retries: u32,
    /// Backoff factor in seconds; retry n waits factor * 2^n.
    #[arg(long, default_value_t = 0.5, global = true)]
    backoff: f64,
    /// Per-attempt timeout in seconds.
    #[arg(long, default_value_t = 10, global = true)]
    timeout: u64,
}

#[derive(ValueEnum, Clone, Debug)]
enum SourceArg {
    Live,
    Mirror,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table (optionally filtered and sorted).
    Table {
        #[command(flatten)]
        view: ViewArgs,
        /// Print at most this many rows.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print summary statistics for one column.
    Stats {
        /// Column key, e.g. population or region.
        #[arg(short, long, default_value = "population")]
        field: Field,
    },
    /// Save the (filtered, sorted) table to a file.
    Export {
        #[command(flatten)]
        view: ViewArgs,
        /// Output path; format inferred by --format or extension.
        #[arg(long, default_value = storage::FILTERED_CSV_FILENAME)]
        out: PathBuf,
        /// Output format (csv or json).
        #[arg(long, value_enum)]
        format: Option<OutFormat>,
    },
    /// Render a chart of two columns.
    Plot(PlotArgs),
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Sort by this column.
    #[arg(long)]
    sort: Option<Field>,
    /// Sort descending instead of ascending.
    #[arg(long, default_value_t = false)]
    desc: bool,
    /// Keep rows with population >= this value.
    #[arg(long)]
    min_pop: Option<i64>,
    /// Keep rows with population <= this value.
    #[arg(long)]
    max_pop: Option<i64>,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Scatter,
    Line,
    Bar,
    Pie,
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// X column (labels for pie charts).
    #[arg(long)]
    x: Field,
    /// Y column (slice sizes for pie charts).
    #[arg(long)]
    y: Field,
    #[arg(long, value_enum, default_value_t = KindArg::Scatter)]
    kind: KindArg,
    /// Output path (.png or .svg).
    #[arg(long, default_value = storage::CHART_PNG_FILENAME)]
    out: PathBuf,
    #[arg(long, requires = "x_max")]
    x_min: Option<f64>,
    #[arg(long, requires = "x_min")]
    x_max: Option<f64>,
    #[arg(long, requires = "y_max")]
    y_min: Option<f64>,
    #[arg(long, requires = "y_min")]
    y_max: Option<f64>,
    #[arg(long, default_value_t = viz::DEFAULT_WIDTH)]
    width: u32,
    #[arg(long, default_value_t = viz::DEFAULT_HEIGHT)]
    height: u32,
    /// Custom chart title.
    #[arg(long)]
    title: Option<String>,
}

impl FetchArgs {
    fn to_config(&self) -> FetchConfig {
        let source = match (&self.url, &self.source) {
            (Some(url), _) => Source::Custom(url.clone()),
            (None, SourceArg::Live) => Source::LiveApi,
            (None, SourceArg::Mirror) => Source::StaticMirror,
        };
        FetchConfig::default()
            .with_source(source)
            .with_max_retries(self.retries)
            .with_backoff_factor(self.backoff)
            .with_timeout(Duration::from_secs(self.timeout))
    }
}

impl ViewArgs {
    fn apply(&self, table: &Table) -> Table {
        let filtered = match (self.min_pop, self.max_pop) {
            (None, None) => table.clone(),
            (lo, hi) => table.filter_population(lo.unwrap_or(i64::MIN), hi.unwrap_or(i64::MAX)),
        };
        match self.sort {
            Some(field) => {
                let order = if self.desc {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                };
                filtered.sorted_by(field, order)
            }
            None => filtered,
        }
    }
}

impl From<KindArg> for ChartKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Scatter => ChartKind::Scatter,
            KindArg::Line => ChartKind::Line,
            KindArg::Bar => ChartKind::Bar,
            KindArg::Pie => ChartKind::Pie,
        }
    }
}

/// Fetch diagnostics go to stderr; stdout stays clean for data.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let client = Client::new(cli.fetch.to_config())?;
    let session = Session::load(&client, &mut StderrNotifier);
    let table = session.table();

    match cli.cmd {
        Command::Table { view, limit } => cmd_table(&view.apply(table), limit),
        Command::Stats { field } => cmd_stats(table, field),
        Command::Export { view, out, format } => cmd_export(&view.apply(table), out, format),
        Command::Plot(args) => cmd_plot(table, args),
    }
}

fn cmd_table(table: &Table, limit: Option<usize>) -> Result<()> {
    let shown = match limit {
        Some(n) => table.head(n),
        None => table.clone(),
    };
    let columns: Vec<Vec<String>> = Field::ALL
        .iter()
        .map(|&f| shown.column(f).iter().map(|c| c.display()).collect())
        .collect();
    let widths: Vec<usize> = Field::ALL
        .iter()
        .zip(&columns)
        .map(|(f, cells)| {
            cells
                .iter()
                .map(|c| c.chars().count())
                .chain(std::iter::once(f.key().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = Field::ALL
        .iter()
        .zip(&widths)
        .map(|(f, w)| format!("{:<w$}", f.key()))
        .collect();
    println!("{}", header.join("  "));
    for i in 0..shown.len() {
        let line: Vec<String> = Field::ALL
            .iter()
            .enumerate()
            .map(|(c, f)| {
                let w = widths[c];
                if f.is_numeric() {
                    format!("{:>w$}", columns[c][i])
                } else {
                    format!("{:<w$}", columns[c][i])
                }
            })
            .collect();
        println!("{}", line.join("  "));
    }
    eprintln!("{} of {} rows", shown.len(), table.len());
    Ok(())
}

fn cmd_stats(table: &Table, field: Field) -> Result<()> {
    match stats::summarize(table, field) {
        None => println!("{}: no data, statistics undefined", field.key()),
        Some(ColumnSummary::Numeric(s)) => println!(
            "{}  count={}  min={}  max={}  mean={}  median={}  std={}",
            s.field.key(),
            s.count,
            format_number(s.min),
            format_number(s.max),
            format_number(s.mean),
            format_number(s.median),
            s.std_dev.map(format_number).unwrap_or_else(|| "NA".into()),
        ),
        Some(ColumnSummary::Text(s)) => println!(
            "{}  count={}  missing={}  distinct={}  most_common={}",
            s.field.key(),
            s.count,
            s.missing,
            s.distinct,
            s.most_common.as_deref().unwrap_or("NA"),
        ),
    }
    Ok(())
}

fn cmd_export(table: &Table, out: PathBuf, format: Option<OutFormat>) -> Result<()> {
    let fmt = match format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => out.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(table, &out)?,
        "json" => storage::save_json(table, &out)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", table.len(), out.display());
    Ok(())
}

fn cmd_plot(table: &Table, args: PlotArgs) -> Result<()> {
    if table.is_empty() {
        eprintln!("nothing to plot");
        return Ok(());
    }
    let mut spec = ChartSpec::new(args.x, args.y, args.kind.into());
    if let (Some(lo), Some(hi)) = (args.x_min, args.x_max) {
        spec = spec.with_x_range(lo, hi);
    }
    if let (Some(lo), Some(hi)) = (args.y_min, args.y_max) {
        spec = spec.with_y_range(lo, hi);
    }
    if let Some(title) = args.title {
        spec = spec.with_title(title);
    }
    viz::render_chart(table, &spec, &args.out, args.width, args.height)?;
    eprintln!("Wrote chart to {}", args.out.display());
    Ok(())
}
