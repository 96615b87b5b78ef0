//! Job command handlers
//!
//! Handles all job-related CLI commands: submitting, listing, and deleting.

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use framegrid_core::domain::job::{Job, JobId, JobStatus};
use framegrid_core::dto::job::SubmitJob;

use framegrid_client::CoordinatorClient;

use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a new render job
    Submit {
        /// Project to render
        #[arg(long)]
        project: String,

        /// First frame (inclusive)
        #[arg(long)]
        start: i32,

        /// Last frame (inclusive)
        #[arg(long)]
        end: i32,

        /// Priority; lower values are scheduled first
        #[arg(long, default_value_t = 0)]
        priority: i32,
    },
    /// List active jobs in scheduling order
    List,
    /// Delete a job, orphaning any tasks still checked out
    Delete {
        /// Job ID
        id: JobId,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = CoordinatorClient::new(&config.coordinator_url);

    match command {
        JobCommands::Submit {
            project,
            start,
            end,
            priority,
        } => submit_job(&client, project, start, end, priority).await,
        JobCommands::List => list_jobs(&client).await,
        JobCommands::Delete { id } => delete_job(&client, id).await,
    }
}

/// Submit a job and display the assigned id
async fn submit_job(
    client: &CoordinatorClient,
    project: String,
    start: i32,
    end: i32,
    priority: i32,
) -> Result<()> {
    let job = client
        .submit_job(&SubmitJob {
            project,
            start,
            end,
            priority: Some(priority),
        })
        .await?;

    println!("{}", "Job submitted".green().bold());
    print_job_summary(&job);

    Ok(())
}

/// List active jobs
async fn list_jobs(client: &CoordinatorClient) -> Result<()> {
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("{}", "No active jobs.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

/// Delete a job
async fn delete_job(client: &CoordinatorClient, id: JobId) -> Result<()> {
    client.delete_job(id).await?;
    println!("{}", format!("Job {} deleted", id).green());
    Ok(())
}

/// Print a job summary
fn print_job_summary(job: &Job) {
    let done: usize = job.complete.values().map(|t| t.frames.len()).sum();

    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Project:  {}", job.project);
    println!("    Frames:   {}..{} ({} total)", job.start, job.end, job.total);
    println!("    Priority: {}", job.priority);
    println!("    Status:   {}", colorize_status(&job.status));
    println!(
        "    Progress: {}/{} rendered, {} queued, {} assigned",
        done,
        job.total,
        job.queued.len(),
        job.assigned.len()
    );
    println!();
}

/// Colorize a job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    match status {
        JobStatus::Accepted => "accepted".yellow(),
        JobStatus::Processing => "processing".cyan(),
        JobStatus::Complete => "complete".green(),
    }
}
