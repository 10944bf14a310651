use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use wbi_dash::catalog::{self, COUNTRY_GROUPS, DEFAULT_INDICATORS};
use wbi_dash::report::{self, ChartSection, ImageSize};
use wbi_dash::view_state::Action;
use wbi_dash::{
    ChartType, Client, CountryDirectory, DashConfig, DashboardState, FetchRequest, Fetcher,
    YearRange, config, dataset, stats, storage, viz,
};

#[derive(Parser, Debug)]
#[command(
    name = "wbi-dash",
    version,
    about = "Fetch, chart & export World Bank economic indicators"
)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog indicators (label and provider code).
    Indicators {
        /// Case-insensitive substring filter on the label.
        #[arg(long)]
        filter: Option<String>,
    },
    /// List curated country groups.
    Groups,
    /// List recognized countries (falls back to major economies when offline).
    Countries,
    /// Fetch indicators for countries and years, then chart/export.
    Fetch(FetchArgs),
    /// Load a CSV file (country_code, country_name, indicator, year, value), then chart/export.
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Country codes separated by comma or semicolon (e.g., DEU,USA)
    #[arg(short, long)]
    countries: Option<String>,
    /// Country group tag (e.g., G7, BRICS); members are added to --countries.
    #[arg(short, long)]
    group: Option<String>,
    /// Indicator labels separated by semicolon (e.g., "GDP (Current US$);Population").
    #[arg(short, long)]
    indicators: Option<String>,
    /// Year range YYYY:YYYY (or a single YYYY).
    #[arg(short, long)]
    years: Option<String>,
    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// CSV file to load.
    file: PathBuf,
    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Chart type per indicator, `LABEL=TYPE` (line, bar, scatter, area, box, heatmap, histogram). Repeatable.
    #[arg(long = "chart")]
    chart: Vec<String>,
    /// Export the dataset as a timestamped CSV.
    #[arg(long, default_value_t = false)]
    csv: bool,
    /// Export a timestamped PDF report with all charts.
    #[arg(long, default_value_t = false)]
    pdf: bool,
    /// Write every chart as SVG into this directory.
    #[arg(long)]
    charts: Option<PathBuf>,
    /// Override the export root directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Print grouped statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn fmt_num(x: f64) -> String {
    if x.is_finite() {
        // Format up to 4 decimals, then trim trailing zeros and trailing dot.
        let s = format!("{:.4}", x);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        "NA".to_string()
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Indicator labels may contain commas, so only `;` separates them.
fn parse_indicators(s: &str) -> Vec<String> {
    s.split(';')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_chart_choice(s: &str) -> Result<(String, ChartType)> {
    let (label, kind) = s
        .rsplit_once('=')
        .with_context(|| format!("invalid --chart '{s}', expected LABEL=TYPE"))?;
    Ok((label.trim().to_string(), kind.parse()?))
}

fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

fn load_config(path: Option<&Path>) -> Result<DashConfig> {
    match path {
        Some(p) => {
            config::load(p).with_context(|| format!("reading config {}", p.display()))
        }
        None => Ok(DashConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref())?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cfg.logging.level.as_str()),
    )
    .init();

    match cli.cmd {
        Command::Indicators { filter } => cmd_indicators(filter.as_deref()),
        Command::Groups => cmd_groups(),
        Command::Countries => cmd_countries(&cfg),
        Command::Fetch(args) => {
            apply_out_dir(&mut cfg, &args.out);
            cmd_fetch(args, &cfg)
        }
        Command::Import(args) => {
            apply_out_dir(&mut cfg, &args.out);
            cmd_import(args, &cfg)
        }
    }
}

fn apply_out_dir(cfg: &mut DashConfig, out: &OutputArgs) {
    if let Some(dir) = out.out_dir.as_ref() {
        cfg.export.exports_dir = dir.clone();
    }
}

fn cmd_indicators(filter: Option<&str>) -> Result<()> {
    let needle = filter.map(str::to_lowercase);
    for label in catalog::indicator_labels() {
        if needle
            .as_deref()
            .is_some_and(|n| !label.to_lowercase().contains(n))
        {
            continue;
        }
        let code = catalog::indicator_code(label).unwrap_or_default();
        println!("{label}\t{code}");
    }
    Ok(())
}

fn cmd_groups() -> Result<()> {
    for g in COUNTRY_GROUPS {
        println!(
            "{}\t{}\t[{}]\t{}\t{}",
            g.tag,
            g.name,
            g.color.as_str(),
            g.countries.join(","),
            g.description
        );
    }
    Ok(())
}

fn cmd_countries(cfg: &DashConfig) -> Result<()> {
    let client = Client::from_config(&cfg.api)?;
    let directory = CountryDirectory::new(cfg.cache.countries_ttl());
    for c in directory.get(&client).iter() {
        println!("{}\t{}", c.code, c.name);
    }
    Ok(())
}

fn cmd_fetch(args: FetchArgs, cfg: &DashConfig) -> Result<()> {
    let client = Client::from_config(&cfg.api)?;

    let mut countries = args.countries.as_deref().map(parse_list).unwrap_or_default();
    if let Some(tag) = args.group.as_deref() {
        let group = catalog::country_group(tag)
            .with_context(|| format!("unknown country group '{tag}'"))?;
        let directory = CountryDirectory::new(cfg.cache.countries_ttl());
        let known = directory.get(&client);
        for code in group.members_in(known.iter().map(|c| c.code.as_str())) {
            if !countries.contains(&code) {
                countries.push(code);
            }
        }
    }
    let indicators = match args.indicators.as_deref() {
        Some(s) => parse_indicators(s),
        None => DEFAULT_INDICATORS.iter().map(|s| s.to_string()).collect(),
    };
    let range = match args.years.as_deref() {
        Some(s) => YearRange::parse(s)
            .with_context(|| format!("invalid --years '{s}', expected YYYY or YYYY:YYYY"))?,
        None => cfg.years.default_range(),
    };

    let fetcher = Fetcher::new(&client, cfg.api.rate_limit_delay());
    let mut state = DashboardState::new();
    let report = state.fetch(
        &fetcher,
        FetchRequest {
            countries,
            indicators,
            range,
        },
        cfg,
    )?;
    for p in report.skipped() {
        eprintln!("Skipped {} / {}", p.country, p.indicator);
    }
    finish(state, &args.out, cfg)
}

fn cmd_import(args: ImportArgs, cfg: &DashConfig) -> Result<()> {
    let staged = dataset::import_file(
        &args.file,
        cfg.validation.max_file_size_bytes(),
        &cfg.years,
    )
        .with_context(|| format!("importing {}", args.file.display()))?;
    let mut state = DashboardState::new();
    state.apply(Action::StageImport(staged))?;
    if let Some(n) = state.notice() {
        eprintln!("{n}");
    }
    state.apply(Action::ActivateImport)?;
    finish(state, &args.out, cfg)
}

/// Apply chart choices, print the chart list and run the requested exports.
fn finish(mut state: DashboardState, out: &OutputArgs, cfg: &DashConfig) -> Result<()> {
    if let Some(n) = state.notice() {
        eprintln!("{n}");
    }
    let Some(ds) = state.dataset().cloned() else {
        return Ok(());
    };

    let choices = out
        .chart
        .iter()
        .map(|s| parse_chart_choice(s))
        .collect::<Result<Vec<_>>>()?;
    state.set_chart_types(choices.iter().map(|(l, t)| (l.as_str(), *t)));

    let charts = state.render_all();
    for (sel, spec) in &charts {
        println!("{} [{}]: {}", sel.indicator, sel.chart_type, spec.title());
    }

    if let Some(dir) = out.charts.as_ref() {
        std::fs::create_dir_all(dir)?;
        for (i, (sel, spec)) in charts.iter().enumerate() {
            let path = dir.join(format!(
                "{:02}_{}_{}.svg",
                i + 1,
                slug(&sel.indicator),
                sel.chart_type
            ));
            viz::save_chart(spec, &path, cfg.export.chart_width, cfg.export.chart_height)?;
            eprintln!("Wrote chart to {}", path.display());
        }
    }

    if out.csv {
        match storage::export_csv(&ds, cfg.export.csv_dir()) {
            Ok(path) => eprintln!("Saved {} rows to {}", ds.len(), path.display()),
            Err(e) => bail!("CSV export failed: {e}"),
        }
    }

    if out.pdf {
        let sections: Vec<ChartSection> = charts
            .into_iter()
            .map(|(sel, spec)| ChartSection {
                indicator: sel.indicator,
                chart_type: sel.chart_type,
                spec,
            })
            .collect();
        let size = ImageSize {
            width: cfg.export.chart_width,
            height: cfg.export.chart_height,
        };
        let exported = report::export_pdf(&ds, &sections, cfg.export.pdf_dir(), size)
            .context("PDF export failed")?;
        for ind in &exported.omitted_images {
            eprintln!("Chart image omitted for {ind}");
        }
        eprintln!("Wrote report to {}", exported.path.display());
    }

    if out.stats {
        for s in stats::grouped_summary(ds.records()) {
            println!(
                "{} • {}  count={}  min={} max={} mean={} median={}",
                s.key.country_code,
                s.key.indicator_name,
                s.count,
                fmt_num(s.min),
                fmt_num(s.max),
                fmt_num(s.mean),
                fmt_num(s.median)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_choice_splits_on_last_equals() {
        let (l, t) = parse_chart_choice("GDP (Current US$)=bar").unwrap();
        assert_eq!(l, "GDP (Current US$)");
        assert_eq!(t, ChartType::Bar);
        assert!(parse_chart_choice("GDP").is_err());
        assert!(parse_chart_choice("GDP=pie").is_err());
    }

    #[test]
    fn indicator_lists_keep_commas() {
        assert_eq!(
            parse_indicators("Exports of Goods and Services (% of GDP); Population"),
            vec![
                "Exports of Goods and Services (% of GDP)".to_string(),
                "Population".to_string()
            ]
        );
        assert_eq!(parse_list("DEU, USA;FRA"), vec!["DEU", "USA", "FRA"]);
    }

    #[test]
    fn slugs_are_file_safe() {
        assert_eq!(slug("GDP (Current US$)"), "gdp_current_us");
    }
}
