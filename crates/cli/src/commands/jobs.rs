//! Delivery job commands.

use clap::Subcommand;

use madina_client::MadinaClient;
use madina_client::types::{Job, JobInput, ListQuery};
use madina_core::{Action, JobId, JobStatus, OrderId, UserId};

use super::{CommandResult, require};

#[derive(Subcommand)]
pub enum JobAction {
    /// List all delivery jobs (back office)
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    /// List jobs assigned to you (riders)
    Mine,
    /// Create a delivery job for an order (back office)
    Create {
        /// Order ID
        #[arg(short, long)]
        order: String,
        /// Delivery address
        #[arg(short, long)]
        address: String,
        /// Rider user ID
        #[arg(short, long)]
        rider: Option<String>,
    },
    /// Delete a job (back office)
    Delete { id: String },
    /// Update the delivery status of a job (riders)
    SetStatus {
        /// Job ID
        id: String,
        /// open, assigned, picked_up, completed, cancelled
        status: String,
    },
}

fn print_job(job: &Job) {
    println!(
        "{}  order {}  {}  {}  rider {}",
        job.id,
        job.order,
        job.status,
        job.address,
        job.rider
            .as_ref()
            .map_or_else(|| "-".to_owned(), ToString::to_string)
    );
}

pub async fn run(client: &MadinaClient, action: JobAction) -> CommandResult {
    match action {
        JobAction::List {
            page,
            limit,
            search,
        } => {
            require(client, Action::ManageJobs).await?;
            let result = client
                .jobs()
                .list(&ListQuery {
                    page,
                    limit,
                    search,
                })
                .await?;
            for job in &result.data {
                print_job(job);
            }
            println!("page {}/{} ({} total)", result.page, result.total_pages, result.total);
        }
        JobAction::Mine => {
            require(client, Action::ViewAssignedJobs).await?;
            let result = client.jobs().assigned(&ListQuery::default()).await?;
            for job in &result.data {
                print_job(job);
            }
        }
        JobAction::Create {
            order,
            address,
            rider,
        } => {
            require(client, Action::ManageJobs).await?;
            let job = client
                .jobs()
                .create(&JobInput {
                    order: OrderId::new(order),
                    rider: rider.map(UserId::new),
                    address,
                })
                .await?;
            println!("created job {}", job.id);
        }
        JobAction::Delete { id } => {
            require(client, Action::ManageJobs).await?;
            client.jobs().delete(&JobId::new(id)).await?;
            println!("deleted");
        }
        JobAction::SetStatus { id, status } => {
            require(client, Action::UpdateJobStatus).await?;
            let status: JobStatus =
                serde_json::from_value(serde_json::Value::String(status))
                    .map_err(|_| "unknown job status")?;
            let job = client.jobs().update_status(&JobId::new(id), status).await?;
            println!("job {} is now {}", job.id, job.status);
        }
    }

    Ok(())
}
