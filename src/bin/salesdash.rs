use clap::{Args, Parser, Subcommand};

use salesdash::reports::Page;
use salesdash::{PageOutput, PageSelection, SalesDashboard, TopN};

#[derive(Parser)]
#[command(name = "salesdash", about = "Sales analytics dashboard CLI")]
struct Cli {
    /// Database path (default: ~/.salesdash/salesdash.db)
    #[arg(long, env = "SALESDASH_DB")]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List dashboard pages in menu order
    Pages,
    /// Render a page by its menu label
    Show {
        /// Page label, e.g. "Top Performers"
        page: String,
        /// Number of top performers per industry (1-5)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=5))]
        top: u8,
        /// User ID for Sales Trends (default: first user)
        #[arg(long)]
        user: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Industry-wise average monthly revenue
    Earnings {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Top performers by industry
    TopPerformers {
        /// Number of top performers per industry (1-5)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=5))]
        top: u8,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Monthly user revenue and order counts
    Trends {
        /// User ID to chart (default: first user)
        #[arg(long)]
        user: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show source data status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output the full report as JSON
    #[arg(long, conflicts_with_all = ["csv", "chart"])]
    json: bool,
    /// Output the result table as CSV
    #[arg(long, conflicts_with = "chart")]
    csv: bool,
    /// Output the chart specification as JSON
    #[arg(long)]
    chart: bool,
    /// Only show table rows containing this text (case-insensitive)
    #[arg(long)]
    filter: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Commands::Pages = cli.command {
        for (i, page) in Page::ALL.iter().enumerate() {
            println!("{}. {}", i + 1, page.label());
        }
        return Ok(());
    }

    let db = match &cli.db {
        Some(path) => salesdash::Database::open_at(path).await?,
        None => salesdash::Database::open().await?,
    };
    let dash = SalesDashboard::new(db);

    match cli.command {
        Commands::Pages => {}
        Commands::Status { json } => {
            print_status(&dash, json).await?;
        }
        Commands::Show {
            page,
            top,
            user,
            output,
        } => {
            let selection = match Page::from_label(&page)? {
                Page::IndustryEarnings => PageSelection::IndustryEarnings,
                Page::TopPerformers => PageSelection::TopPerformers(TopN::new(top)?),
                Page::SalesTrends => PageSelection::SalesTrends(user),
            };
            show(&dash, &selection, &output).await?;
        }
        Commands::Earnings { output } => {
            show(&dash, &PageSelection::IndustryEarnings, &output).await?;
        }
        Commands::TopPerformers { top, output } => {
            show(&dash, &PageSelection::TopPerformers(TopN::new(top)?), &output).await?;
        }
        Commands::Trends { user, output } => {
            show(&dash, &PageSelection::SalesTrends(user), &output).await?;
        }
    }

    Ok(())
}

async fn show(
    dash: &SalesDashboard,
    selection: &PageSelection,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let rendered = dash.render(selection).await?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }
    if output.chart {
        match rendered.chart() {
            Some(chart) => println!("{}", serde_json::to_string_pretty(&chart)?),
            None => anyhow::bail!("No chart: there are no users to select."),
        }
        return Ok(());
    }

    let table = match output.filter.as_deref() {
        Some(needle) => rendered.table().filter(needle),
        None => rendered.table().clone(),
    };
    if output.csv {
        print!("{}", salesdash::render::to_csv(&table));
        return Ok(());
    }

    println!("{}", page_title(&rendered));
    println!();
    if table.is_empty() {
        println!("No rows.");
    } else {
        print!("{}", salesdash::render::format_table(&table));
        println!("\n{} rows", table.len());
    }

    if let PageOutput::SalesTrends { report, selected } = &rendered {
        match selected {
            Some(trend) => print_trend(trend),
            None => println!("\nNo users to select."),
        }
        if !report.user_ids.is_empty() {
            println!("\nAvailable users: {}", report.user_ids.join(", "));
        }
    }
    Ok(())
}

fn page_title(output: &PageOutput) -> String {
    match output {
        PageOutput::IndustryEarnings(_) => "Industry-wise Average Monthly Revenue".to_string(),
        PageOutput::TopPerformers(r) => format!("Top {} Performers by Industry", r.top_n),
        PageOutput::SalesTrends { .. } => "Monthly User Revenue and Order Counts".to_string(),
    }
}

fn print_trend(trend: &salesdash::UserTrend) {
    println!("\nUser ID: {}", trend.user_id);
    println!("  {:<16} {:>12} {:>12}", "Month", "Revenue", "Order Count");
    for (rev, orders) in trend.revenue.iter().zip(&trend.order_count) {
        println!(
            "  {:<16} {:>12.2} {:>12.0}",
            rev.month, rev.value, orders.value
        );
    }
}

async fn print_status(dash: &SalesDashboard, json: bool) -> anyhow::Result<()> {
    let status = dash.status().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }
    println!("Data Status");
    if let Some(path) = dash.db().path() {
        println!("  Database:   {}", path.display());
    }
    println!("  Orders:     {}", status.orders);
    println!("  Users:      {}", status.users);
    println!("  Industries: {}", status.industries);
    println!(
        "  Purchases:  {} to {}",
        status.first_purchase.as_deref().unwrap_or("n/a"),
        status.last_purchase.as_deref().unwrap_or("n/a")
    );
    Ok(())
}
