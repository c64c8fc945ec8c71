use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use jobfeed::client::SearchClient;
use jobfeed::feed::JobFeed;
use jobfeed::filter::{FilterCriteria, Role};
use jobfeed::models::JobPosting;

#[derive(Parser)]
#[command(name = "jobfeed")]
#[command(about = "Browse remote job postings with filters and infinite scroll")]
struct Cli {
    /// Override the search endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and list postings matching the filters
    Search {
        /// Role filter (all, frontend, backend, lead, android)
        #[arg(short, long, default_value = "all")]
        role: Role,

        /// Location filter (empty matches any)
        #[arg(short, long, default_value = "")]
        location: String,

        /// Exact minimum experience in years
        #[arg(short, long)]
        experience: Option<u32>,

        /// Minimum base salary in LPA
        #[arg(short, long)]
        salary: Option<u32>,

        /// Company name search text
        #[arg(short, long, default_value = "")]
        company: String,

        /// Number of pages to scroll through
        #[arg(short, long, default_value = "3")]
        pages: u32,

        /// Print full cards with the company description preview
        #[arg(long)]
        details: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            role,
            location,
            experience,
            salary,
            company,
            pages,
            details,
        } => {
            let client = match cli.endpoint {
                Some(endpoint) => SearchClient::with_endpoint(endpoint),
                None => SearchClient::new(),
            };
            let criteria = FilterCriteria {
                role,
                location,
                min_experience: experience,
                min_salary: salary,
                company_search: company,
            };
            let feed = JobFeed::with_criteria(client, criteria);
            feed.start().await;

            // Simulated scroll: after each rendered page the sentinel
            // comes into view, asking for the next one. The trigger
            // detaches itself once the result set is exhausted.
            let requested = Rc::new(Cell::new(false));
            let flag = requested.clone();
            let _sub = feed.trigger().subscribe(move || flag.set(true));

            let mut scrolled = 1;
            while scrolled < pages && feed.trigger().is_attached() {
                feed.trigger().set_intersecting(true);
                if requested.replace(false) {
                    feed.load_more().await;
                    scrolled += 1;
                }
                feed.trigger().set_intersecting(false);
            }

            let fetched = feed.snapshot().postings.len();
            let visible = feed.visible_postings();
            if visible.is_empty() {
                println!("No postings matched the filters.");
            } else if details {
                for job in &visible {
                    print_card(job);
                }
            } else {
                print_table(&visible);
            }
            println!(
                "\nShowing {} of {} fetched posting(s).{}",
                visible.len(),
                fetched,
                if feed.snapshot().has_more {
                    " Scroll further for more."
                } else {
                    " End of results."
                }
            );
        }
    }

    Ok(())
}

fn print_table(jobs: &[JobPosting]) {
    println!(
        "{:<25} {:<12} {:<15} {:>4} {:>14}",
        "COMPANY", "ROLE", "LOCATION", "EXP", "SALARY (LPA)"
    );
    println!("{}", "-".repeat(74));
    for job in jobs {
        println!(
            "{:<25} {:<12} {:<15} {:>4} {:>14}",
            truncate(&job.company_name, 23),
            truncate(&job.job_role, 10),
            truncate(&job.location, 13),
            job.min_experience_years(),
            format!("{}-{}", job.min_salary_lpa(), job.max_salary_lpa()),
        );
    }
}

fn print_card(job: &JobPosting) {
    println!("{} - {} ({})", job.company_name, job.job_role, job.location);
    println!(
        "  Estimated salary: {} LPA - {} LPA | Minimum experience: {} year(s)",
        job.min_salary_lpa(),
        job.max_salary_lpa(),
        job.min_experience_years()
    );
    let (preview, truncated) = job.description_preview();
    if !preview.is_empty() {
        println!("  About: {}{}", preview, if truncated { "…" } else { "" });
    }
    println!();
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
